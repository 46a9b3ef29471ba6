//! Collection catalog - names, uniqueness constraints, and lookup indexes.

/// Sort direction of an index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A lookup index over one or more fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub fields: &'static [(&'static str, SortOrder)],
}

/// Static description of one collection: its name, the fields whose values
/// must be globally unique, and the lookup indexes the storage layer serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub unique: &'static [&'static str],
    pub indexes: &'static [IndexSpec],
}

pub const USERS: CollectionSpec = CollectionSpec {
    name: "users",
    unique: &["email", "username"],
    indexes: &[],
};

pub const CATEGORIES: CollectionSpec = CollectionSpec {
    name: "categories",
    unique: &["category_name"],
    indexes: &[],
};

pub const ITEMS: CollectionSpec = CollectionSpec {
    name: "items",
    unique: &["item_name"],
    indexes: &[],
};

pub const ORDERS: CollectionSpec = CollectionSpec {
    name: "orders",
    unique: &[],
    indexes: &[
        IndexSpec {
            fields: &[("user_id", SortOrder::Asc)],
        },
        IndexSpec {
            fields: &[("order_date", SortOrder::Desc)],
        },
    ],
};

pub const INVENTORY_LOGS: CollectionSpec = CollectionSpec {
    name: "inventory_logs",
    unique: &[],
    indexes: &[IndexSpec {
        fields: &[("item_id", SortOrder::Asc), ("timestamp", SortOrder::Desc)],
    }],
};

/// Every collection this crate manages.
pub const CATALOG: &[CollectionSpec] = &[USERS, CATEGORIES, ITEMS, ORDERS, INVENTORY_LOGS];

/// Look up a collection spec by name.
pub fn spec_for(name: &str) -> Option<&'static CollectionSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}
