use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::store::Document;

/// Why a stock level moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Restock,
    Sale,
    Adjustment,
    Return,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeType::Restock => "Restock",
            ChangeType::Sale => "Sale",
            ChangeType::Adjustment => "Adjustment",
            ChangeType::Return => "Return",
        };
        f.write_str(name)
    }
}

/// One logged stock movement. Written only by the ledger, in the same
/// atomic batch as the item quantity it explains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryLog {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub change_amount: i64,
    pub change_type: ChangeType,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
}

impl Document for InventoryLog {
    const COLLECTION: &'static str = catalog::INVENTORY_LOGS.name;

    fn id(&self) -> Uuid {
        self.id
    }
}
