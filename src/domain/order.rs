use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::store::Document;

/// Lifecycle state of an order.
///
/// The legal transitions are Pending -> Shipped, Pending -> Cancelled and
/// Shipped -> Delivered. Delivered and Cancelled are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Shipped) | (Pending, Cancelled) | (Shipped, Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// One line of an order. Name and price are copied from the item at order
/// time so later catalog edits do not rewrite history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: Uuid,
    pub item_name: String,
    pub qty: u64,
    pub price: Decimal,
}

/// A customer order. Everything except `status` is immutable once placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub items: Vec<OrderLine>,
}

impl Document for Order {
    const COLLECTION: &'static str = catalog::ORDERS.name;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// One requested line of a new order, by item id.
#[derive(Clone, Debug)]
pub struct NewOrderLine {
    pub item_id: Uuid,
    pub qty: u64,
}

/// Input for placing an order.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub lines: Vec<NewOrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn transition_table() {
        assert!(Pending.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states() {
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Shipped.is_terminal());
    }

    #[test]
    fn status_serializes_pascal_case() {
        assert_eq!(serde_json::to_string(&Pending).unwrap(), "\"Pending\"");
        assert_eq!(serde_json::to_string(&Shipped).unwrap(), "\"Shipped\"");
    }
}
