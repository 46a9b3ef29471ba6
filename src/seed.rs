//! Demo dataset for examples and integration tests.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    ChangeType, NewCategory, NewItem, NewOrder, NewOrderLine, NewUser, OrderStatus, Role,
};
use crate::error::InventoryError;
use crate::stockroom::Stockroom;
use crate::store::DocumentStore;

/// Ids of everything [`seed_demo_data`] creates.
#[derive(Clone, Copy, Debug)]
pub struct SeedIds {
    pub admin: Uuid,
    pub ghali: Uuid,
    pub john: Uuid,
    pub electronics: Uuid,
    pub clothing: Uuid,
    pub books: Uuid,
    pub smartphone: Uuid,
    pub jeans: Uuid,
    pub novel: Uuid,
    pub smartphone_order: Uuid,
    pub jeans_order: Uuid,
}

/// Load the demo dataset: three users, three categories, three items
/// stocked through the ledger, and two orders, one of them already
/// shipped and one with its unit sold.
///
/// All stock enters through restocks, so every item reconciles after
/// seeding. Final quantities: Smartphone 49, Jeans 100, Novel 200.
pub fn seed_demo_data<S: DocumentStore>(db: &Stockroom<S>) -> Result<SeedIds, InventoryError> {
    let users = db.users();
    let categories = db.categories();
    let items = db.items();
    let orders = db.orders();
    let ledger = db.ledger();

    let admin = users.create(NewUser {
        username: "admin".into(),
        email: "admin@example.com".into(),
        password_hash: "admin123@".into(),
        role: Role::Admin,
    })?;
    let ghali = users.create(NewUser {
        username: "ghali_user".into(),
        email: "mahmudghali01@gmail.com".into(),
        password_hash: "mahmudghali123@".into(),
        role: Role::User,
    })?;
    let john = users.create(NewUser {
        username: "john_doe".into(),
        email: "john@example.com".into(),
        password_hash: "john123@".into(),
        role: Role::User,
    })?;

    let electronics = categories.create(NewCategory {
        category_name: "Electronics".into(),
        description: "Electronic gadgets and devices".into(),
    })?;
    let clothing = categories.create(NewCategory {
        category_name: "Clothing".into(),
        description: "Apparel and accessories".into(),
    })?;
    let books = categories.create(NewCategory {
        category_name: "Books".into(),
        description: "Various genres of books".into(),
    })?;

    let smartphone = items.create(NewItem {
        item_name: "Smartphone".into(),
        category_id: electronics.id,
        price: Decimal::new(35_000_000, 2),
        size: "Medium".into(),
        description: "Latest model smartphone with advanced features".into(),
    })?;
    let jeans = items.create(NewItem {
        item_name: "Jeans".into(),
        category_id: clothing.id,
        price: Decimal::new(2_500_000, 2),
        size: "Large".into(),
        description: "Comfortable denim jeans".into(),
    })?;
    let novel = items.create(NewItem {
        item_name: "Novel".into(),
        category_id: books.id,
        price: Decimal::new(850_000, 2),
        size: "Small".into(),
        description: "Bestselling fiction novel".into(),
    })?;

    ledger.apply_change(
        smartphone.id,
        admin.id,
        50,
        ChangeType::Restock,
        "Initial stock added",
    )?;
    ledger.apply_change(
        jeans.id,
        admin.id,
        100,
        ChangeType::Restock,
        "Initial stock added",
    )?;
    ledger.apply_change(
        novel.id,
        admin.id,
        200,
        ChangeType::Restock,
        "Initial stock added",
    )?;

    let smartphone_order = orders.create(NewOrder {
        user_id: ghali.id,
        lines: vec![NewOrderLine {
            item_id: smartphone.id,
            qty: 1,
        }],
    })?;
    ledger.apply_change(smartphone.id, ghali.id, -1, ChangeType::Sale, "Sold via order")?;

    let jeans_order = orders.create(NewOrder {
        user_id: john.id,
        lines: vec![NewOrderLine {
            item_id: jeans.id,
            qty: 2,
        }],
    })?;
    orders.update_status(jeans_order.id, OrderStatus::Shipped)?;

    Ok(SeedIds {
        admin: admin.id,
        ghali: ghali.id,
        john: john.id,
        electronics: electronics.id,
        clothing: clothing.id,
        books: books.id,
        smartphone: smartphone.id,
        jeans: jeans.id,
        novel: novel.id,
        smartphone_order: smartphone_order.id,
        jeans_order: jeans_order.id,
    })
}
