mod support;

use std::thread;

use chrono::Duration;
use rust_decimal::Decimal;
use uuid::Uuid;

use stockroom::{ChangeType, InventoryError, InventoryLog, Role};

use support::{make_category, make_item, register_user, stockroom};

#[test]
fn restock_then_sell_then_overdraw() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let shopper = register_user(&db, Role::User);
    let category = make_category(&db);
    let phone = make_item(&db, category.id, Decimal::new(35_000_000, 2));

    db.ledger()
        .apply_change(phone.id, admin.id, 50, ChangeType::Restock, "Initial stock added")
        .unwrap();
    assert_eq!(db.items().get(phone.id).unwrap().quantity, 50);

    let sale = db
        .ledger()
        .apply_change(phone.id, shopper.id, -1, ChangeType::Sale, "Sold via order")
        .unwrap();
    assert_eq!(sale.change_amount, -1);
    assert_eq!(sale.change_type, ChangeType::Sale);
    assert_eq!(db.items().get(phone.id).unwrap().quantity, 49);

    let err = db
        .ledger()
        .apply_change(phone.id, shopper.id, -100, ChangeType::Sale, "Oversell")
        .unwrap_err();
    assert_eq!(
        err,
        InventoryError::InsufficientStock {
            item_id: phone.id,
            available: 49,
            requested: 100,
        }
    );

    // The rejected sale left nothing behind.
    assert_eq!(db.items().get(phone.id).unwrap().quantity, 49);
    assert_eq!(db.inventory_logs().history(phone.id).unwrap().len(), 2);
    assert!(db.ledger().reconcile(phone.id).unwrap().is_consistent());
}

#[test]
fn zero_change_is_rejected() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));

    let err = db
        .ledger()
        .apply_change(item.id, admin.id, 0, ChangeType::Adjustment, "noop")
        .unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));
    assert!(db.inventory_logs().history(item.id).unwrap().is_empty());
}

#[test]
fn unknown_item_is_not_found() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);

    let err = db
        .ledger()
        .apply_change(Uuid::new_v4(), admin.id, 5, ChangeType::Restock, "ghost")
        .unwrap_err();
    assert!(matches!(
        err,
        InventoryError::NotFound {
            collection: "items",
            ..
        }
    ));
}

#[test]
fn unknown_actor_is_a_referential_integrity_error() {
    let (db, _clock) = stockroom();
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));
    let ghost = Uuid::new_v4();

    let err = db
        .ledger()
        .apply_change(item.id, ghost, 5, ChangeType::Restock, "ghost actor")
        .unwrap_err();
    assert_eq!(
        err,
        InventoryError::ReferentialIntegrity {
            collection: "inventory_logs",
            field: "user_id",
            id: ghost,
        }
    );
    assert_eq!(db.items().get(item.id).unwrap().quantity, 0);
    assert!(db.inventory_logs().history(item.id).unwrap().is_empty());
}

#[test]
fn draining_to_zero_is_fine_but_no_further() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));

    db.ledger()
        .apply_change(item.id, admin.id, 3, ChangeType::Restock, "Initial stock added")
        .unwrap();
    db.ledger()
        .apply_change(item.id, admin.id, -3, ChangeType::Sale, "Sold out")
        .unwrap();
    assert_eq!(db.items().get(item.id).unwrap().quantity, 0);

    let err = db
        .ledger()
        .apply_change(item.id, admin.id, -1, ChangeType::Sale, "One too many")
        .unwrap_err();
    assert_eq!(
        err,
        InventoryError::InsufficientStock {
            item_id: item.id,
            available: 0,
            requested: 1,
        }
    );
}

#[test]
fn mixed_movements_reconcile() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let shopper = register_user(&db, Role::User);
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));

    db.ledger()
        .apply_change(item.id, admin.id, 10, ChangeType::Restock, "Initial stock added")
        .unwrap();
    db.ledger()
        .apply_change(item.id, shopper.id, -3, ChangeType::Sale, "Sold via order")
        .unwrap();
    db.ledger()
        .apply_change(item.id, admin.id, -2, ChangeType::Adjustment, "Shrinkage")
        .unwrap();
    db.ledger()
        .apply_change(item.id, shopper.id, 1, ChangeType::Return, "Returned unit")
        .unwrap();

    assert_eq!(db.items().get(item.id).unwrap().quantity, 6);

    let report = db.ledger().reconcile(item.id).unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.recorded_quantity, 6);
    assert_eq!(report.ledger_sum, 6);
    assert_eq!(report.drift(), 0);
    assert_eq!(db.inventory_logs().history(item.id).unwrap().len(), 4);
}

#[test]
fn history_is_newest_first() {
    let (db, clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));

    db.ledger()
        .apply_change(item.id, admin.id, 5, ChangeType::Restock, "first")
        .unwrap();
    clock.advance(Duration::hours(1));
    db.ledger()
        .apply_change(item.id, admin.id, -2, ChangeType::Adjustment, "second")
        .unwrap();
    clock.advance(Duration::hours(1));
    db.ledger()
        .apply_change(item.id, admin.id, 4, ChangeType::Return, "third")
        .unwrap();

    let history = db.inventory_logs().history(item.id).unwrap();
    let notes: Vec<&str> = history.iter().map(|log| log.notes.as_str()).collect();
    assert_eq!(notes, ["third", "second", "first"]);
    assert!(history
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));
}

#[test]
fn concurrent_restocks_lose_no_update() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = db.clone();
        let item_id = item.id;
        let admin_id = admin.id;
        handles.push(thread::spawn(move || {
            let mut applied = 0u64;
            for _ in 0..25 {
                if db
                    .ledger()
                    .apply_change(item_id, admin_id, 1, ChangeType::Restock, "concurrent")
                    .is_ok()
                {
                    applied += 1;
                }
            }
            applied
        }));
    }

    let applied: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert!(applied > 0);

    // Every accepted restock is reflected exactly once.
    assert_eq!(db.items().get(item.id).unwrap().quantity, applied);
    assert_eq!(
        db.inventory_logs().history(item.id).unwrap().len(),
        applied as usize
    );
    assert!(db.ledger().reconcile(item.id).unwrap().is_consistent());
}

#[test]
fn concurrent_sales_never_oversell() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));

    db.ledger()
        .apply_change(item.id, admin.id, 10, ChangeType::Restock, "Initial stock added")
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let db = db.clone();
        let item_id = item.id;
        let admin_id = admin.id;
        handles.push(thread::spawn(
            move || -> Result<InventoryLog, InventoryError> {
                db.ledger()
                    .apply_change(item_id, admin_id, -1, ChangeType::Sale, "concurrent sale")
            },
        ));
    }

    let results: Vec<Result<InventoryLog, InventoryError>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let sold = results.iter().filter(|r| r.is_ok()).count() as u64;
    assert!(sold <= 10);
    assert_eq!(db.items().get(item.id).unwrap().quantity, 10 - sold);

    for failure in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            failure,
            InventoryError::InsufficientStock { .. } | InventoryError::Conflict { .. }
        ));
    }
    assert!(db.ledger().reconcile(item.id).unwrap().is_consistent());
}

#[test]
fn removing_a_log_surfaces_drift() {
    let (db, _clock) = stockroom();
    let admin = register_user(&db, Role::Admin);
    let category = make_category(&db);
    let item = make_item(&db, category.id, Decimal::new(100_000, 2));

    let restock = db
        .ledger()
        .apply_change(item.id, admin.id, 5, ChangeType::Restock, "Initial stock added")
        .unwrap();

    assert!(db.ledger().reconcile(item.id).unwrap().is_consistent());

    db.inventory_logs().delete(restock.id).unwrap();

    let report = db.ledger().reconcile(item.id).unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.recorded_quantity, 5);
    assert_eq!(report.ledger_sum, 0);
    assert_eq!(report.drift(), 5);
}
