use std::fmt;

use uuid::Uuid;

use crate::domain::OrderStatus;
use crate::store::StoreError;

/// Error type for every repository, ledger and query operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A unique field already holds this value.
    DuplicateKey {
        collection: &'static str,
        field: &'static str,
        value: String,
    },
    /// The addressed document does not exist.
    NotFound { collection: &'static str, id: Uuid },
    /// A write referenced a document that does not exist.
    ReferentialIntegrity {
        collection: &'static str,
        field: &'static str,
        id: Uuid,
    },
    /// A stock deduction would take the quantity below zero.
    InsufficientStock {
        item_id: Uuid,
        available: u64,
        requested: u64,
    },
    /// An order status change the state machine does not allow.
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    /// Input rejected before touching the store.
    Validation(String),
    /// A concurrent writer kept winning; the operation was retried and
    /// gave up without applying anything.
    Conflict { collection: &'static str, id: Uuid },
    /// The store itself failed.
    Storage(String),
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::DuplicateKey {
                collection,
                field,
                value,
            } => write!(f, "duplicate key {}.{} = {}", collection, field, value),
            InventoryError::NotFound { collection, id } => {
                write!(f, "document not found: {}:{}", collection, id)
            }
            InventoryError::ReferentialIntegrity {
                collection,
                field,
                id,
            } => write!(
                f,
                "referential integrity violation: {}.{} references missing id {}",
                collection, field, id
            ),
            InventoryError::InsufficientStock {
                item_id,
                available,
                requested,
            } => write!(
                f,
                "insufficient stock for item {}: {} available, {} requested",
                item_id, available, requested
            ),
            InventoryError::InvalidTransition { from, to } => {
                write!(f, "invalid order status transition: {} -> {}", from, to)
            }
            InventoryError::Validation(reason) => write!(f, "validation failed: {}", reason),
            InventoryError::Conflict { collection, id } => {
                write!(f, "persistent write conflict on {}:{}", collection, id)
            }
            InventoryError::Storage(reason) => write!(f, "storage error: {}", reason),
        }
    }
}

impl std::error::Error for InventoryError {}

impl From<StoreError> for InventoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey {
                collection,
                field,
                value,
            } => InventoryError::DuplicateKey {
                collection,
                field,
                value,
            },
            StoreError::NotFound { collection, id } => {
                InventoryError::NotFound { collection, id }
            }
            StoreError::ConcurrencyConflict { collection, id, .. } => {
                InventoryError::Conflict { collection, id }
            }
            StoreError::Serde(reason) => InventoryError::Storage(reason),
            StoreError::Storage(reason) => InventoryError::Storage(reason),
        }
    }
}
