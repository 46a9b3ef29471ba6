use log::debug;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::{InventoryLog, NewUser, Order, User, UserPatch};
use crate::error::InventoryError;
use crate::store::{Document, DocumentStore, WriteBatch};

use super::CascadeReport;

/// Repository for user accounts.
pub struct Users<'a, S: DocumentStore> {
    store: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: DocumentStore> Users<'a, S> {
    pub fn new(store: &'a S, clock: &'a dyn Clock) -> Self {
        Users { store, clock }
    }

    pub fn create(&self, new: NewUser) -> Result<User, InventoryError> {
        if new.username.trim().is_empty() {
            return Err(InventoryError::Validation(
                "username must not be empty".into(),
            ));
        }
        if new.email.trim().is_empty() {
            return Err(InventoryError::Validation("email must not be empty".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            created_at: self.clock.now(),
        };
        self.store.insert(&user)?;
        Ok(user)
    }

    pub fn get(&self, id: Uuid) -> Result<User, InventoryError> {
        match self.store.get::<User>(id)? {
            Some(found) => Ok(found.data),
            None => Err(InventoryError::NotFound {
                collection: User::COLLECTION,
                id,
            }),
        }
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, InventoryError> {
        Ok(self
            .store
            .find_by_unique::<User>("username", username)?
            .map(|found| found.data))
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, InventoryError> {
        Ok(self
            .store
            .find_by_unique::<User>("email", email)?
            .map(|found| found.data))
    }

    pub fn find(&self, predicate: &dyn Fn(&User) -> bool) -> Result<Vec<User>, InventoryError> {
        Ok(self
            .store
            .find::<User>(predicate)?
            .into_iter()
            .map(|found| found.data)
            .collect())
    }

    pub fn list(&self) -> Result<Vec<User>, InventoryError> {
        let mut users: Vec<User> = self
            .store
            .find::<User>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    pub fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, InventoryError> {
        let current = self
            .store
            .get::<User>(id)?
            .ok_or(InventoryError::NotFound {
                collection: User::COLLECTION,
                id,
            })?;

        let mut user = current.data;
        if let Some(username) = patch.username {
            if username.trim().is_empty() {
                return Err(InventoryError::Validation(
                    "username must not be empty".into(),
                ));
            }
            user.username = username;
        }
        if let Some(email) = patch.email {
            if email.trim().is_empty() {
                return Err(InventoryError::Validation("email must not be empty".into()));
            }
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }

        self.store.update(&user, current.version)?;
        Ok(user)
    }

    /// Remove a user together with their orders and inventory logs, in one
    /// atomic batch.
    pub fn delete(&self, id: Uuid) -> Result<CascadeReport, InventoryError> {
        if self.store.get::<User>(id)?.is_none() {
            return Err(InventoryError::NotFound {
                collection: User::COLLECTION,
                id,
            });
        }

        let orders = self.store.find::<Order>(&|order| order.user_id == id)?;
        let logs = self
            .store
            .find::<InventoryLog>(&|log| log.user_id == id)?;

        let mut batch = WriteBatch::new();
        for order in &orders {
            batch.delete::<Order>(order.data.id);
        }
        for log in &logs {
            batch.delete::<InventoryLog>(log.data.id);
        }
        batch.delete::<User>(id);
        self.store.commit(batch)?;

        debug!(
            "removed user {} with {} orders and {} logs",
            id,
            orders.len(),
            logs.len()
        );

        Ok(CascadeReport {
            orders_removed: orders.len(),
            logs_removed: logs.len(),
        })
    }
}
