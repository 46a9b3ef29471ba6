//! `Stockroom` - the assembled inventory database.
//!
//! ```ignore
//! let db = Stockroom::in_memory();
//! let ids = seed_demo_data(&db)?;
//! let report = db.ledger().reconcile(ids.smartphone)?;
//! assert!(report.is_consistent());
//! ```

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::ledger::Ledger;
use crate::query::Queries;
use crate::repository::{Categories, InventoryLogs, Items, Orders, Users};
use crate::store::{DocumentStore, InMemoryStore};

/// A document store bundled with the repositories, ledger and queries
/// over it. Clones share the store and clock.
#[derive(Clone)]
pub struct Stockroom<S: DocumentStore = InMemoryStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl Stockroom<InMemoryStore> {
    /// In-memory database on the system clock.
    pub fn in_memory() -> Self {
        Stockroom::new(InMemoryStore::new(), Arc::new(SystemClock))
    }

    /// In-memory database on a caller-supplied clock.
    pub fn in_memory_with_clock(clock: Arc<dyn Clock>) -> Self {
        Stockroom::new(InMemoryStore::new(), clock)
    }
}

impl<S: DocumentStore> Stockroom<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Stockroom { store, clock }
    }

    pub fn users(&self) -> Users<'_, S> {
        Users::new(&self.store, self.clock.as_ref())
    }

    pub fn categories(&self) -> Categories<'_, S> {
        Categories::new(&self.store)
    }

    pub fn items(&self) -> Items<'_, S> {
        Items::new(&self.store)
    }

    pub fn orders(&self) -> Orders<'_, S> {
        Orders::new(&self.store, self.clock.as_ref())
    }

    pub fn inventory_logs(&self) -> InventoryLogs<'_, S> {
        InventoryLogs::new(&self.store)
    }

    pub fn ledger(&self) -> Ledger<'_, S> {
        Ledger::new(&self.store, self.clock.as_ref())
    }

    pub fn queries(&self) -> Queries<'_, S> {
        Queries::new(&self.store)
    }

    /// The underlying store, for callers composing their own batches.
    pub fn store(&self) -> &S {
        &self.store
    }
}
