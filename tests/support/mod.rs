//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use stockroom::{
    Category, FixedClock, Item, NewCategory, NewItem, NewUser, Role, Stockroom, User,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique suffix for fields under a unique constraint.
pub fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A fresh in-memory database on a fixed clock starting at
/// 2024-01-01 00:00:00 UTC.
pub fn stockroom() -> (Stockroom, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let db = Stockroom::in_memory_with_clock(clock.clone());
    (db, clock)
}

pub fn register_user(db: &Stockroom, role: Role) -> User {
    let n = next_id();
    db.users()
        .create(NewUser {
            username: format!("user{}", n),
            email: format!("user{}@example.com", n),
            password_hash: "secret".into(),
            role,
        })
        .unwrap()
}

pub fn make_category(db: &Stockroom) -> Category {
    let n = next_id();
    db.categories()
        .create(NewCategory {
            category_name: format!("category{}", n),
            description: "test category".into(),
        })
        .unwrap()
}

pub fn make_item(db: &Stockroom, category_id: Uuid, price: Decimal) -> Item {
    let n = next_id();
    db.items()
        .create(NewItem {
            item_name: format!("item{}", n),
            category_id,
            price,
            size: "M".into(),
            description: "test item".into(),
        })
        .unwrap()
}
