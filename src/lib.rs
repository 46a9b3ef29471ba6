mod catalog;
mod clock;
mod domain;
mod error;
mod ledger;
mod query;
mod repository;
mod seed;
mod stockroom;
mod store;

pub use catalog::{spec_for, CollectionSpec, IndexSpec, SortOrder, CATALOG};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Category, CategoryPatch, ChangeType, InventoryLog, Item, ItemPatch, NewCategory, NewItem,
    NewOrder, NewOrderLine, NewUser, Order, OrderLine, OrderStatus, Role, User, UserPatch,
};
pub use error::InventoryError;
pub use ledger::{Ledger, Reconciliation};
pub use query::{
    CategorySales, ItemWithCategory, LogWithContext, OrderDetails, OrderLineDetails,
    OrderWithUser, Queries,
};
pub use repository::{CascadeReport, Categories, InventoryLogs, Items, Orders, Users};
pub use seed::{seed_demo_data, SeedIds};
pub use stockroom::Stockroom;
pub use store::{Document, DocumentStore, InMemoryStore, StoreError, Versioned, WriteBatch};
