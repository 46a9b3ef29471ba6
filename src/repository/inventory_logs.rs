use uuid::Uuid;

use crate::domain::InventoryLog;
use crate::error::InventoryError;
use crate::store::{Document, DocumentStore};

/// Read-side repository for stock movement logs.
///
/// There is deliberately no `create` here. Logs are written only by the
/// ledger, in the same atomic batch as the quantity change they record.
pub struct InventoryLogs<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> InventoryLogs<'a, S> {
    pub fn new(store: &'a S) -> Self {
        InventoryLogs { store }
    }

    pub fn get(&self, id: Uuid) -> Result<InventoryLog, InventoryError> {
        match self.store.get::<InventoryLog>(id)? {
            Some(found) => Ok(found.data),
            None => Err(InventoryError::NotFound {
                collection: InventoryLog::COLLECTION,
                id,
            }),
        }
    }

    /// Movements of one item, newest first.
    pub fn history(&self, item_id: Uuid) -> Result<Vec<InventoryLog>, InventoryError> {
        let mut logs: Vec<InventoryLog> = self
            .store
            .find::<InventoryLog>(&|log| log.item_id == item_id)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(logs)
    }

    /// Movements recorded by one user, newest first.
    pub fn for_user(&self, user_id: Uuid) -> Result<Vec<InventoryLog>, InventoryError> {
        let mut logs: Vec<InventoryLog> = self
            .store
            .find::<InventoryLog>(&|log| log.user_id == user_id)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(logs)
    }

    pub fn find(
        &self,
        predicate: &dyn Fn(&InventoryLog) -> bool,
    ) -> Result<Vec<InventoryLog>, InventoryError> {
        Ok(self
            .store
            .find::<InventoryLog>(predicate)?
            .into_iter()
            .map(|found| found.data)
            .collect())
    }

    pub fn list(&self) -> Result<Vec<InventoryLog>, InventoryError> {
        let mut logs: Vec<InventoryLog> = self
            .store
            .find::<InventoryLog>(&|_| true)?
            .into_iter()
            .map(|found| found.data)
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(logs)
    }

    /// Remove a single log row. The movement it recorded stays applied to
    /// the item, so reconciliation reports drift afterwards.
    pub fn delete(&self, id: Uuid) -> Result<(), InventoryError> {
        if !self.store.delete::<InventoryLog>(id)? {
            return Err(InventoryError::NotFound {
                collection: InventoryLog::COLLECTION,
                id,
            });
        }
        Ok(())
    }
}
