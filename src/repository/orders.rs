use log::debug;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::{Item, NewOrder, Order, OrderLine, OrderStatus, User};
use crate::error::InventoryError;
use crate::store::{Document, DocumentStore};

/// Repository for customer orders.
pub struct Orders<'a, S: DocumentStore> {
    store: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: DocumentStore> Orders<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Orders { store, clock }
    }

    /// Place an order. Lines snapshot the item name and price at order
    /// time, and the total is computed here, never taken from the caller.
    ///
    /// Placing an order does not touch stock. Goods leave the shelf when
    /// the shipment is recorded as a ledger movement.
    pub fn create(&self, new: NewOrder) -> Result<Order, InventoryError> {
        if new.lines.is_empty() {
            return Err(InventoryError::Validation(
                "order must contain at least one line".into(),
            ));
        }
        if self.store.get::<User>(new.user_id)?.is_none() {
            return Err(InventoryError::ReferentialIntegrity {
                collection: Order::COLLECTION,
                field: "user_id",
                id: new.user_id,
            });
        }

        let mut items = Vec::with_capacity(new.lines.len());
        let mut total_amount = Decimal::ZERO;
        for line in &new.lines {
            if line.qty == 0 {
                return Err(InventoryError::Validation(
                    "order line quantity must be positive".into(),
                ));
            }
            let item = self
                .store
                .get::<Item>(line.item_id)?
                .ok_or(InventoryError::ReferentialIntegrity {
                    collection: Order::COLLECTION,
                    field: "items.item_id",
                    id: line.item_id,
                })?
                .data;

            total_amount += item.price * Decimal::from(line.qty);
            items.push(OrderLine {
                item_id: item.id,
                item_name: item.item_name,
                qty: line.qty,
                price: item.price,
            });
        }

        let order = Order {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            order_date: self.clock.now(),
            status: OrderStatus::Pending,
            total_amount,
            items,
        };
        self.store.insert(&order)?;
        Ok(order)
    }

    pub fn get(&self, id: Uuid) -> Result<Order, InventoryError> {
        match self.store.get::<Order>(id)? {
            Some(found) => Ok(found.data),
            None => Err(InventoryError::NotFound {
                collection: Order::COLLECTION,
                id,
            }),
        }
    }

    /// Orders of one user, newest first.
    pub fn for_user(&self, user_id: Uuid) -> Result<Vec<Order>, InventoryError> {
        let mut orders: Vec<Order> = self
            .store
            .find::<Order>(&|order| order.user_id == user_id)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    pub fn find(&self, predicate: &dyn Fn(&Order) -> bool) -> Result<Vec<Order>, InventoryError> {
        Ok(self
            .store
            .find::<Order>(predicate)?
            .into_iter()
            .map(|found| found.data)
            .collect())
    }

    pub fn list(&self) -> Result<Vec<Order>, InventoryError> {
        let mut orders: Vec<Order> = self
            .store
            .find::<Order>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    /// Advance an order through its lifecycle. Status is the only mutable
    /// field of a placed order.
    pub fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<Order, InventoryError> {
        let current = self
            .store
            .get::<Order>(id)?
            .ok_or(InventoryError::NotFound {
                collection: Order::COLLECTION,
                id,
            })?;

        let mut order = current.data;
        if !order.status.can_transition_to(next) {
            return Err(InventoryError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }
        order.status = next;
        self.store.update(&order, current.version)?;

        debug!("order {} moved to {}", id, next);
        Ok(order)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), InventoryError> {
        if !self.store.delete::<Order>(id)? {
            return Err(InventoryError::NotFound {
                collection: Order::COLLECTION,
                id,
            });
        }
        Ok(())
    }
}
