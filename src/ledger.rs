//! Stock ledger - the only writer of item quantities.
//!
//! Every quantity change is committed in one atomic batch with the log row
//! that explains it, CAS-guarded by the item version seen when the change
//! was computed. Losing the race means recomputing from a fresh read, so
//! two concurrent sales can never both spend the same unit.

use log::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::{ChangeType, InventoryLog, Item, User};
use crate::error::InventoryError;
use crate::store::{Document, DocumentStore, StoreError, WriteBatch};

/// How many times a contended change is recomputed before giving up.
const MAX_COMMIT_ATTEMPTS: usize = 8;

/// Applies stock movements and validates stored quantities against their
/// movement history.
pub struct Ledger<'a, S: DocumentStore> {
    store: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: DocumentStore> Ledger<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Ledger { store, clock }
    }

    /// Apply a signed stock movement to an item and return the log row
    /// that records it.
    ///
    /// Rejected movements (zero delta, unknown item or actor, insufficient
    /// stock) write nothing at all: no log row, no quantity change.
    pub fn apply_change(
        &self,
        item_id: Uuid,
        user_id: Uuid,
        change_amount: i64,
        change_type: ChangeType,
        notes: &str,
    ) -> Result<InventoryLog, InventoryError> {
        if change_amount == 0 {
            return Err(InventoryError::Validation(
                "change amount must not be zero".into(),
            ));
        }
        if self.store.get::<User>(user_id)?.is_none() {
            return Err(InventoryError::ReferentialIntegrity {
                collection: InventoryLog::COLLECTION,
                field: "user_id",
                id: user_id,
            });
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self
                .store
                .get::<Item>(item_id)?
                .ok_or(InventoryError::NotFound {
                    collection: Item::COLLECTION,
                    id: item_id,
                })?;
            let mut item = current.data;

            // Quantity only ever grows by i64 deltas from zero, so it fits i64.
            let next = match (item.quantity as i64).checked_add(change_amount) {
                Some(next) => next,
                None => {
                    return Err(InventoryError::Validation(
                        "change amount overflows item quantity".into(),
                    ))
                }
            };
            if next < 0 {
                return Err(InventoryError::InsufficientStock {
                    item_id,
                    available: item.quantity,
                    requested: change_amount.unsigned_abs(),
                });
            }

            let before = item.quantity;
            item.quantity = next as u64;

            let log = InventoryLog {
                id: Uuid::new_v4(),
                item_id,
                user_id,
                change_amount,
                change_type,
                timestamp: self.clock.now(),
                notes: notes.to_string(),
            };

            let mut batch = WriteBatch::new();
            batch.insert(&log)?;
            batch.update(&item, current.version)?;

            match self.store.commit(batch) {
                Ok(()) => {
                    debug!(
                        "{} of {} applied to item {} (quantity {} -> {})",
                        change_type, change_amount, item_id, before, item.quantity
                    );
                    return Ok(log);
                }
                Err(StoreError::ConcurrencyConflict { .. }) => {
                    debug!(
                        "stock change for item {} lost a write race (attempt {})",
                        item_id, attempt
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(InventoryError::Conflict {
            collection: Item::COLLECTION,
            id: item_id,
        })
    }

    /// Compare an item's stored quantity against the sum of its logged
    /// movements. Drift is reported, never an error; deleting log rows is
    /// allowed and this is how it becomes visible.
    pub fn reconcile(&self, item_id: Uuid) -> Result<Reconciliation, InventoryError> {
        let item = self
            .store
            .get::<Item>(item_id)?
            .ok_or(InventoryError::NotFound {
                collection: Item::COLLECTION,
                id: item_id,
            })?
            .data;

        let ledger_sum: i64 = self
            .store
            .find::<InventoryLog>(&|log| log.item_id == item_id)?
            .iter()
            .map(|log| log.data.change_amount)
            .sum();

        let report = Reconciliation {
            item_id,
            recorded_quantity: item.quantity,
            ledger_sum,
        };
        if !report.is_consistent() {
            warn!(
                "item {} quantity {} disagrees with ledger sum {}",
                item_id, report.recorded_quantity, report.ledger_sum
            );
        }
        Ok(report)
    }
}

/// Outcome of [`Ledger::reconcile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub item_id: Uuid,
    pub recorded_quantity: u64,
    pub ledger_sum: i64,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.ledger_sum >= 0 && self.recorded_quantity == self.ledger_sum as u64
    }

    /// Stored quantity minus ledger sum. Zero when consistent.
    pub fn drift(&self) -> i64 {
        self.recorded_quantity as i64 - self.ledger_sum
    }
}
