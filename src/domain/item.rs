use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::store::Document;

/// A stocked product. `item_name` is unique.
///
/// `quantity` is owned by the inventory ledger: items are created holding
/// zero stock, and every change afterwards goes through a logged stock
/// movement. Nothing else writes this field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub item_name: String,
    pub category_id: Uuid,
    pub price: Decimal,
    pub size: String,
    pub quantity: u64,
    pub description: String,
}

impl Document for Item {
    const COLLECTION: &'static str = catalog::ITEMS.name;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Input for creating an item. There is deliberately no quantity here;
/// stock enters through the ledger.
#[derive(Clone, Debug)]
pub struct NewItem {
    pub item_name: String,
    pub category_id: Uuid,
    pub price: Decimal,
    pub size: String,
    pub description: String,
}

/// Partial update of an item. Quantity is absent for the same reason it is
/// absent from [`NewItem`].
#[derive(Clone, Debug, Default)]
pub struct ItemPatch {
    pub item_name: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub size: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_json_uses_catalog_field_names() {
        let item = Item {
            id: Uuid::new_v4(),
            item_name: "Smartphone".into(),
            category_id: Uuid::new_v4(),
            price: Decimal::new(35_000_000, 2),
            size: "Medium".into(),
            quantity: 50,
            description: "Latest model smartphone with advanced features".into(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["item_name"], "Smartphone");
        assert_eq!(json["quantity"], 50);
        assert_eq!(json["price"], "350000.00");
    }
}
