//! Cross-collection read views.
//!
//! These are the reporting joins, rebuilt as typed lookups over the
//! repositories' collections. A dangling reference never aborts a view:
//! the missing piece comes back as `None` and a warning records it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Category, ChangeType, InventoryLog, Item, Order, OrderLine, OrderStatus, User,
};
use crate::error::InventoryError;
use crate::store::DocumentStore;

/// An order joined with the user who placed it.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderWithUser {
    pub order_id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
}

/// An item joined with its category.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemWithCategory {
    pub item_id: Uuid,
    pub item_name: String,
    pub category_name: Option<String>,
    pub quantity: u64,
    pub price: Decimal,
    pub size: String,
}

/// One order line with the current item and category behind it, when they
/// still exist.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderLineDetails {
    pub line: OrderLine,
    pub item: Option<Item>,
    pub category: Option<Category>,
}

/// A fully expanded order.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderDetails {
    pub order_id: Uuid,
    pub username: Option<String>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub lines: Vec<OrderLineDetails>,
}

/// A stock movement joined with its actor, item and category.
#[derive(Clone, Debug, PartialEq)]
pub struct LogWithContext {
    pub log_id: Uuid,
    pub username: Option<String>,
    pub item_name: Option<String>,
    pub category_name: Option<String>,
    pub change_amount: i64,
    pub change_type: ChangeType,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
}

/// Units sold and revenue for one category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySales {
    pub category_name: String,
    pub total_items_sold: u64,
    pub total_revenue: Decimal,
}

/// Read-only query service over the whole store.
pub struct Queries<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> Queries<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Queries { store }
    }

    fn all_users(&self) -> Result<HashMap<Uuid, User>, InventoryError> {
        Ok(self
            .store
            .find::<User>(&|_| true)?
            .into_iter()
            .map(|found| (found.data.id, found.data))
            .collect())
    }

    fn all_items(&self) -> Result<HashMap<Uuid, Item>, InventoryError> {
        Ok(self
            .store
            .find::<Item>(&|_| true)?
            .into_iter()
            .map(|found| (found.data.id, found.data))
            .collect())
    }

    fn all_categories(&self) -> Result<HashMap<Uuid, Category>, InventoryError> {
        Ok(self
            .store
            .find::<Category>(&|_| true)?
            .into_iter()
            .map(|found| (found.data.id, found.data))
            .collect())
    }

    /// All orders with the user who placed each one, newest first.
    pub fn orders_with_users(&self) -> Result<Vec<OrderWithUser>, InventoryError> {
        let users = self.all_users()?;
        let mut orders: Vec<Order> = self
            .store
            .find::<Order>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let user = users.get(&order.user_id);
            if user.is_none() {
                warn!("order {} references missing user {}", order.id, order.user_id);
            }
            views.push(OrderWithUser {
                order_id: order.id,
                username: user.map(|u| u.username.clone()),
                email: user.map(|u| u.email.clone()),
                order_date: order.order_date,
                status: order.status,
                total_amount: order.total_amount,
            });
        }
        Ok(views)
    }

    /// All items with their category names, sorted by item name.
    pub fn items_with_categories(&self) -> Result<Vec<ItemWithCategory>, InventoryError> {
        let categories = self.all_categories()?;
        let mut items: Vec<Item> = self
            .store
            .find::<Item>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        items.sort_by(|a, b| a.item_name.cmp(&b.item_name));

        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let category = categories.get(&item.category_id);
            if category.is_none() {
                warn!(
                    "item {} references missing category {}",
                    item.id, item.category_id
                );
            }
            views.push(ItemWithCategory {
                item_id: item.id,
                item_name: item.item_name,
                category_name: category.map(|c| c.category_name.clone()),
                quantity: item.quantity,
                price: item.price,
                size: item.size,
            });
        }
        Ok(views)
    }

    /// All orders fully expanded: the user plus, per line, the current item
    /// and its category. Lines always render from their snapshot even when
    /// the item has since been deleted.
    pub fn order_details(&self) -> Result<Vec<OrderDetails>, InventoryError> {
        let users = self.all_users()?;
        let items = self.all_items()?;
        let categories = self.all_categories()?;

        let mut orders: Vec<Order> = self
            .store
            .find::<Order>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let user = users.get(&order.user_id);
            if user.is_none() {
                warn!("order {} references missing user {}", order.id, order.user_id);
            }

            let mut lines = Vec::with_capacity(order.items.len());
            for line in order.items {
                let item = items.get(&line.item_id);
                if item.is_none() {
                    warn!(
                        "order {} line references missing item {}",
                        order.id, line.item_id
                    );
                }
                let category = item.and_then(|item| {
                    let category = categories.get(&item.category_id);
                    if category.is_none() {
                        warn!(
                            "item {} references missing category {}",
                            item.id, item.category_id
                        );
                    }
                    category
                });
                lines.push(OrderLineDetails {
                    line,
                    item: item.cloned(),
                    category: category.cloned(),
                });
            }

            views.push(OrderDetails {
                order_id: order.id,
                username: user.map(|u| u.username.clone()),
                order_date: order.order_date,
                status: order.status,
                total_amount: order.total_amount,
                lines,
            });
        }
        Ok(views)
    }

    /// All stock movements with actor, item and category context, newest
    /// first.
    pub fn logs_with_context(&self) -> Result<Vec<LogWithContext>, InventoryError> {
        let users = self.all_users()?;
        let items = self.all_items()?;
        let categories = self.all_categories()?;

        let mut logs: Vec<InventoryLog> = self
            .store
            .find::<InventoryLog>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut views = Vec::with_capacity(logs.len());
        for log in logs {
            let user = users.get(&log.user_id);
            if user.is_none() {
                warn!("log {} references missing user {}", log.id, log.user_id);
            }
            let item = items.get(&log.item_id);
            if item.is_none() {
                warn!("log {} references missing item {}", log.id, log.item_id);
            }
            let category = item.and_then(|item| {
                let category = categories.get(&item.category_id);
                if category.is_none() {
                    warn!(
                        "item {} references missing category {}",
                        item.id, item.category_id
                    );
                }
                category
            });

            views.push(LogWithContext {
                log_id: log.id,
                username: user.map(|u| u.username.clone()),
                item_name: item.map(|i| i.item_name.clone()),
                category_name: category.map(|c| c.category_name.clone()),
                change_amount: log.change_amount,
                change_type: log.change_type,
                timestamp: log.timestamp,
                notes: log.notes,
            });
        }
        Ok(views)
    }

    /// Units sold and revenue per category, derived from negative Sale
    /// movements at current item prices. Every category gets a row; no
    /// sales means zeros, not absence.
    pub fn sales_by_category(&self) -> Result<Vec<CategorySales>, InventoryError> {
        let items = self.all_items()?;
        let mut categories: Vec<Category> = self
            .store
            .find::<Category>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        categories.sort_by(|a, b| a.category_name.cmp(&b.category_name));

        let mut sold_per_item: HashMap<Uuid, u64> = HashMap::new();
        let sales = self.store.find::<InventoryLog>(&|log| {
            log.change_type == ChangeType::Sale && log.change_amount < 0
        })?;
        for sale in sales {
            *sold_per_item.entry(sale.data.item_id).or_insert(0) +=
                sale.data.change_amount.unsigned_abs();
        }

        let mut totals: HashMap<Uuid, (u64, Decimal)> = categories
            .iter()
            .map(|category| (category.id, (0, Decimal::ZERO)))
            .collect();
        for (item_id, sold) in sold_per_item {
            let item = match items.get(&item_id) {
                Some(item) => item,
                None => {
                    warn!("sale log references missing item {}", item_id);
                    continue;
                }
            };
            match totals.get_mut(&item.category_id) {
                Some((count, revenue)) => {
                    *count += sold;
                    *revenue += item.price * Decimal::from(sold);
                }
                None => warn!(
                    "item {} references missing category {}",
                    item.id, item.category_id
                ),
            }
        }

        Ok(categories
            .into_iter()
            .map(|category| {
                let (total_items_sold, total_revenue) = totals
                    .get(&category.id)
                    .copied()
                    .unwrap_or((0, Decimal::ZERO));
                CategorySales {
                    category_name: category.category_name,
                    total_items_sold,
                    total_revenue,
                }
            })
            .collect())
    }
}
