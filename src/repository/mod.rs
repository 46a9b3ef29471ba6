//! Typed repositories over the document store, one per collection.

mod categories;
mod inventory_logs;
mod items;
mod orders;
mod users;

pub use categories::Categories;
pub use inventory_logs::InventoryLogs;
pub use items::Items;
pub use orders::Orders;
pub use users::Users;

/// What an orchestrated cascade delete actually removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub orders_removed: usize,
    pub logs_removed: usize,
}
