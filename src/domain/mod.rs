//! Domain entities stored in the inventory database.

mod category;
mod inventory_log;
mod item;
mod order;
mod user;

pub use category::{Category, CategoryPatch, NewCategory};
pub use inventory_log::{ChangeType, InventoryLog};
pub use item::{Item, ItemPatch, NewItem};
pub use order::{NewOrder, NewOrderLine, Order, OrderLine, OrderStatus};
pub use user::{NewUser, Role, User, UserPatch};
