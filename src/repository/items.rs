use log::debug;
use uuid::Uuid;

use crate::domain::{Category, InventoryLog, Item, ItemPatch, NewItem};
use crate::error::InventoryError;
use crate::store::{Document, DocumentStore, WriteBatch};

use super::CascadeReport;

/// Repository for stocked items.
pub struct Items<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> Items<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Items { store }
    }

    /// Create an item holding zero stock. Initial stock is a ledger
    /// movement, not a creation argument.
    pub fn create(&self, new: NewItem) -> Result<Item, InventoryError> {
        if new.item_name.trim().is_empty() {
            return Err(InventoryError::Validation(
                "item name must not be empty".into(),
            ));
        }
        if new.price.is_sign_negative() {
            return Err(InventoryError::Validation(
                "price must not be negative".into(),
            ));
        }
        if self.store.get::<Category>(new.category_id)?.is_none() {
            return Err(InventoryError::ReferentialIntegrity {
                collection: Item::COLLECTION,
                field: "category_id",
                id: new.category_id,
            });
        }

        let item = Item {
            id: Uuid::new_v4(),
            item_name: new.item_name,
            category_id: new.category_id,
            price: new.price,
            size: new.size,
            quantity: 0,
            description: new.description,
        };
        self.store.insert(&item)?;
        Ok(item)
    }

    pub fn get(&self, id: Uuid) -> Result<Item, InventoryError> {
        match self.store.get::<Item>(id)? {
            Some(found) => Ok(found.data),
            None => Err(InventoryError::NotFound {
                collection: Item::COLLECTION,
                id,
            }),
        }
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Item>, InventoryError> {
        Ok(self
            .store
            .find_by_unique::<Item>("item_name", name)?
            .map(|found| found.data))
    }

    pub fn for_category(&self, category_id: Uuid) -> Result<Vec<Item>, InventoryError> {
        let mut items: Vec<Item> = self
            .store
            .find::<Item>(&|item| item.category_id == category_id)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        items.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(items)
    }

    pub fn find(&self, predicate: &dyn Fn(&Item) -> bool) -> Result<Vec<Item>, InventoryError> {
        Ok(self
            .store
            .find::<Item>(predicate)?
            .into_iter()
            .map(|found| found.data)
            .collect())
    }

    pub fn list(&self) -> Result<Vec<Item>, InventoryError> {
        let mut items: Vec<Item> = self
            .store
            .find::<Item>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        items.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(items)
    }

    /// Patch item fields. Quantity is not patchable here; stock moves only
    /// through the ledger.
    pub fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Item, InventoryError> {
        let current = self
            .store
            .get::<Item>(id)?
            .ok_or(InventoryError::NotFound {
                collection: Item::COLLECTION,
                id,
            })?;

        let mut item = current.data;
        if let Some(item_name) = patch.item_name {
            if item_name.trim().is_empty() {
                return Err(InventoryError::Validation(
                    "item name must not be empty".into(),
                ));
            }
            item.item_name = item_name;
        }
        if let Some(category_id) = patch.category_id {
            if self.store.get::<Category>(category_id)?.is_none() {
                return Err(InventoryError::ReferentialIntegrity {
                    collection: Item::COLLECTION,
                    field: "category_id",
                    id: category_id,
                });
            }
            item.category_id = category_id;
        }
        if let Some(price) = patch.price {
            if price.is_sign_negative() {
                return Err(InventoryError::Validation(
                    "price must not be negative".into(),
                ));
            }
            item.price = price;
        }
        if let Some(size) = patch.size {
            item.size = size;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }

        self.store.update(&item, current.version)?;
        Ok(item)
    }

    /// Remove an item together with its movement history, in one atomic
    /// batch. Order lines keep their snapshot of the item.
    pub fn delete(&self, id: Uuid) -> Result<CascadeReport, InventoryError> {
        if self.store.get::<Item>(id)?.is_none() {
            return Err(InventoryError::NotFound {
                collection: Item::COLLECTION,
                id,
            });
        }

        let logs = self.store.find::<InventoryLog>(&|log| log.item_id == id)?;

        let mut batch = WriteBatch::new();
        batch.delete::<Item>(id);
        for log in &logs {
            batch.delete::<InventoryLog>(log.data.id);
        }
        self.store.commit(batch)?;

        debug!("removed item {} with {} logs", id, logs.len());

        Ok(CascadeReport {
            orders_removed: 0,
            logs_removed: logs.len(),
        })
    }
}
