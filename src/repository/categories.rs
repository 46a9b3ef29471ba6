use log::warn;
use uuid::Uuid;

use crate::domain::{Category, CategoryPatch, Item, NewCategory};
use crate::error::InventoryError;
use crate::store::{Document, DocumentStore};

/// Repository for product categories.
pub struct Categories<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> Categories<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Categories { store }
    }

    pub fn create(&self, new: NewCategory) -> Result<Category, InventoryError> {
        if new.category_name.trim().is_empty() {
            return Err(InventoryError::Validation(
                "category name must not be empty".into(),
            ));
        }

        let category = Category {
            id: Uuid::new_v4(),
            category_name: new.category_name,
            description: new.description,
        };
        self.store.insert(&category)?;
        Ok(category)
    }

    pub fn get(&self, id: Uuid) -> Result<Category, InventoryError> {
        match self.store.get::<Category>(id)? {
            Some(found) => Ok(found.data),
            None => Err(InventoryError::NotFound {
                collection: Category::COLLECTION,
                id,
            }),
        }
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Category>, InventoryError> {
        Ok(self
            .store
            .find_by_unique::<Category>("category_name", name)?
            .map(|found| found.data))
    }

    pub fn find(
        &self,
        predicate: &dyn Fn(&Category) -> bool,
    ) -> Result<Vec<Category>, InventoryError> {
        Ok(self
            .store
            .find::<Category>(predicate)?
            .into_iter()
            .map(|found| found.data)
            .collect())
    }

    pub fn list(&self) -> Result<Vec<Category>, InventoryError> {
        let mut categories: Vec<Category> = self
            .store
            .find::<Category>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        categories.sort_by(|a, b| a.category_name.cmp(&b.category_name));
        Ok(categories)
    }

    pub fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category, InventoryError> {
        let current = self
            .store
            .get::<Category>(id)?
            .ok_or(InventoryError::NotFound {
                collection: Category::COLLECTION,
                id,
            })?;

        let mut category = current.data;
        if let Some(category_name) = patch.category_name {
            if category_name.trim().is_empty() {
                return Err(InventoryError::Validation(
                    "category name must not be empty".into(),
                ));
            }
            category.category_name = category_name;
        }
        if let Some(description) = patch.description {
            category.description = description;
        }

        self.store.update(&category, current.version)?;
        Ok(category)
    }

    /// Remove a category. Items keep their now-dangling `category_id`;
    /// queries degrade per row instead of failing.
    pub fn delete(&self, id: Uuid) -> Result<(), InventoryError> {
        if !self.store.delete::<Category>(id)? {
            return Err(InventoryError::NotFound {
                collection: Category::COLLECTION,
                id,
            });
        }

        let still_referenced = self.store.find::<Item>(&|item| item.category_id == id)?.len();
        if still_referenced > 0 {
            warn!(
                "deleted category {} still referenced by {} items",
                id, still_referenced
            );
        }
        Ok(())
    }
}
