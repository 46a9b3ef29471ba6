//! InMemoryStore - HashMap-backed document store for testing and embedding.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use uuid::Uuid;

use crate::catalog::{self, CollectionSpec};

use super::{Document, DocumentStore, StoreError, Versioned, WriteBatch, WriteOp};

/// Internal stored representation of a document.
struct StoredDocument {
    bytes: Vec<u8>,
    version: u64,
}

/// Effect of an already-validated batch operation on a key, used while the
/// remaining operations of the same batch are checked.
enum StagedDoc<'a> {
    Written { version: u64, bytes: &'a [u8] },
    Deleted,
}

/// Fully validated operation, ready to apply.
struct PlannedOp {
    key: String,
    new_version: u64,
    releases: Vec<String>,
    claims: Vec<String>,
}

#[derive(Default)]
struct Shelves {
    /// Storage key is `"collection:id"`.
    documents: HashMap<String, StoredDocument>,
    /// Unique index key is `"collection.field=value"`, mapping to the owning id.
    unique: HashMap<String, Uuid>,
}

/// In-memory document store backed by HashMaps.
///
/// Unique constraints come from the collection catalog the store is built
/// over. Clone-friendly via Arc; clones share storage.
#[derive(Clone)]
pub struct InMemoryStore {
    catalog: &'static [CollectionSpec],
    shelves: Arc<RwLock<Shelves>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store over this crate's collection catalog.
    pub fn new() -> Self {
        Self::with_catalog(catalog::CATALOG)
    }

    /// Create an empty store over a custom catalog.
    pub fn with_catalog(catalog: &'static [CollectionSpec]) -> Self {
        InMemoryStore {
            catalog,
            shelves: Arc::new(RwLock::new(Shelves::default())),
        }
    }

    fn make_key(collection: &str, id: Uuid) -> String {
        format!("{}:{}", collection, id)
    }

    fn unique_key(collection: &str, field: &str, value: &str) -> String {
        format!("{}.{}={}", collection, field, value)
    }

    fn unique_fields(&self, collection: &str) -> &'static [&'static str] {
        self.catalog
            .iter()
            .find(|spec| spec.name == collection)
            .map(|spec| spec.unique)
            .unwrap_or(&[])
    }

    /// Extract a document's declared unique values as `(field, rendered value)`.
    fn unique_entries(
        &self,
        collection: &str,
        bytes: &[u8],
    ) -> Result<Vec<(&'static str, String)>, StoreError> {
        let fields = self.unique_fields(collection);
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let doc: Value =
            serde_json::from_slice(bytes).map_err(|e| StoreError::Serde(e.to_string()))?;

        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            match doc.get(*field) {
                Some(Value::String(s)) => entries.push((*field, s.clone())),
                Some(Value::Null) | None => {}
                Some(other) => entries.push((*field, other.to_string())),
            }
        }
        Ok(entries)
    }
}

impl DocumentStore for InMemoryStore {
    fn get<D: Document>(&self, id: Uuid) -> Result<Option<Versioned<D>>, StoreError> {
        let key = Self::make_key(D::COLLECTION, id);
        let shelves = self
            .shelves
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        match shelves.documents.get(&key) {
            Some(stored) => {
                let data: D = serde_json::from_slice(&stored.bytes)
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn insert<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError> {
        let mut batch = WriteBatch::new();
        batch.insert(doc)?;
        self.commit(batch)?;
        Ok(Versioned {
            data: doc.clone(),
            version: 1,
        })
    }

    fn update<D: Document>(
        &self,
        doc: &D,
        expected_version: u64,
    ) -> Result<Versioned<D>, StoreError> {
        let mut batch = WriteBatch::new();
        batch.update(doc, expected_version)?;
        self.commit(batch)?;
        Ok(Versioned {
            data: doc.clone(),
            version: expected_version + 1,
        })
    }

    fn delete<D: Document>(&self, id: Uuid) -> Result<bool, StoreError> {
        let key = Self::make_key(D::COLLECTION, id);
        let mut shelves = self
            .shelves
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let entries = match shelves.documents.get(&key) {
            Some(stored) => self.unique_entries(D::COLLECTION, &stored.bytes)?,
            None => return Ok(false),
        };

        shelves.documents.remove(&key);
        for (field, value) in entries {
            shelves
                .unique
                .remove(&Self::unique_key(D::COLLECTION, field, &value));
        }
        Ok(true)
    }

    fn find<D: Document>(
        &self,
        predicate: &dyn Fn(&D) -> bool,
    ) -> Result<Vec<Versioned<D>>, StoreError> {
        let shelves = self
            .shelves
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}:", D::COLLECTION);
        let mut results = Vec::new();

        for (key, stored) in shelves.documents.iter() {
            if key.starts_with(&prefix) {
                if let Ok(data) = serde_json::from_slice::<D>(&stored.bytes) {
                    if predicate(&data) {
                        results.push(Versioned {
                            data,
                            version: stored.version,
                        });
                    }
                }
            }
        }

        Ok(results)
    }

    fn find_by_unique<D: Document>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Versioned<D>>, StoreError> {
        if !self.unique_fields(D::COLLECTION).contains(&field) {
            return Err(StoreError::Storage(format!(
                "no unique constraint on {}.{}",
                D::COLLECTION,
                field
            )));
        }

        let shelves = self
            .shelves
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let id = match shelves
            .unique
            .get(&Self::unique_key(D::COLLECTION, field, value))
        {
            Some(id) => *id,
            None => return Ok(None),
        };

        match shelves.documents.get(&Self::make_key(D::COLLECTION, id)) {
            Some(stored) => {
                let data: D = serde_json::from_slice(&stored.bytes)
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut shelves = self
            .shelves
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        // Validation pass: each operation is checked against the store plus
        // the effects of the operations staged before it in the same batch.
        // Nothing is mutated until every operation has passed.
        let plan = {
            let mut staged: HashMap<String, StagedDoc> = HashMap::new();
            let mut staged_unique: HashMap<String, Option<Uuid>> = HashMap::new();
            let mut plan: Vec<PlannedOp> = Vec::with_capacity(batch.ops.len());

            for op in &batch.ops {
                match op {
                    &WriteOp::Insert {
                        collection,
                        id,
                        ref bytes,
                    } => {
                        let key = Self::make_key(collection, id);
                        let existing = match staged.get(&key) {
                            Some(StagedDoc::Written { version, .. }) => Some(*version),
                            Some(StagedDoc::Deleted) => None,
                            None => shelves.documents.get(&key).map(|s| s.version),
                        };
                        if let Some(actual) = existing {
                            return Err(StoreError::ConcurrencyConflict {
                                collection,
                                id,
                                expected: 0,
                                actual,
                            });
                        }

                        let mut claims = Vec::new();
                        for (field, value) in self.unique_entries(collection, bytes)? {
                            let ukey = Self::unique_key(collection, field, &value);
                            let owner = match staged_unique.get(&ukey) {
                                Some(staged_owner) => *staged_owner,
                                None => shelves.unique.get(&ukey).copied(),
                            };
                            if let Some(owner) = owner {
                                if owner != id {
                                    return Err(StoreError::DuplicateKey {
                                        collection,
                                        field,
                                        value,
                                    });
                                }
                            }
                            staged_unique.insert(ukey.clone(), Some(id));
                            claims.push(ukey);
                        }

                        staged.insert(key.clone(), StagedDoc::Written { version: 1, bytes });
                        plan.push(PlannedOp {
                            key,
                            new_version: 1,
                            releases: Vec::new(),
                            claims,
                        });
                    }
                    &WriteOp::Update {
                        collection,
                        id,
                        ref bytes,
                        expected_version,
                    } => {
                        let key = Self::make_key(collection, id);
                        let (actual, old_bytes): (Option<u64>, Option<&[u8]>) =
                            match staged.get(&key) {
                                Some(StagedDoc::Written { version, bytes }) => {
                                    (Some(*version), Some(*bytes))
                                }
                                Some(StagedDoc::Deleted) => (None, None),
                                None => match shelves.documents.get(&key) {
                                    Some(stored) => {
                                        (Some(stored.version), Some(stored.bytes.as_slice()))
                                    }
                                    None => (None, None),
                                },
                            };
                        let actual = actual.ok_or(StoreError::NotFound { collection, id })?;
                        if actual != expected_version {
                            return Err(StoreError::ConcurrencyConflict {
                                collection,
                                id,
                                expected: expected_version,
                                actual,
                            });
                        }

                        let mut releases = Vec::new();
                        if let Some(old_bytes) = old_bytes {
                            for (field, value) in self.unique_entries(collection, old_bytes)? {
                                let ukey = Self::unique_key(collection, field, &value);
                                staged_unique.insert(ukey.clone(), None);
                                releases.push(ukey);
                            }
                        }

                        let mut claims = Vec::new();
                        for (field, value) in self.unique_entries(collection, bytes)? {
                            let ukey = Self::unique_key(collection, field, &value);
                            let owner = match staged_unique.get(&ukey) {
                                Some(staged_owner) => *staged_owner,
                                None => shelves.unique.get(&ukey).copied(),
                            };
                            if let Some(owner) = owner {
                                if owner != id {
                                    return Err(StoreError::DuplicateKey {
                                        collection,
                                        field,
                                        value,
                                    });
                                }
                            }
                            staged_unique.insert(ukey.clone(), Some(id));
                            claims.push(ukey);
                        }

                        let new_version = expected_version + 1;
                        staged.insert(
                            key.clone(),
                            StagedDoc::Written {
                                version: new_version,
                                bytes,
                            },
                        );
                        plan.push(PlannedOp {
                            key,
                            new_version,
                            releases,
                            claims,
                        });
                    }
                    &WriteOp::Delete { collection, id } => {
                        let key = Self::make_key(collection, id);
                        let old_bytes: Option<&[u8]> = match staged.get(&key) {
                            Some(StagedDoc::Written { bytes, .. }) => Some(*bytes),
                            Some(StagedDoc::Deleted) => None,
                            None => shelves.documents.get(&key).map(|s| s.bytes.as_slice()),
                        };

                        let mut releases = Vec::new();
                        if let Some(old_bytes) = old_bytes {
                            for (field, value) in self.unique_entries(collection, old_bytes)? {
                                let ukey = Self::unique_key(collection, field, &value);
                                staged_unique.insert(ukey.clone(), None);
                                releases.push(ukey);
                            }
                        }

                        staged.insert(key.clone(), StagedDoc::Deleted);
                        plan.push(PlannedOp {
                            key,
                            new_version: 0,
                            releases,
                            claims: Vec::new(),
                        });
                    }
                }
            }

            plan
        };

        // Apply pass: every operation validated, mutate for real.
        for (planned, op) in plan.into_iter().zip(batch.ops.into_iter()) {
            match op {
                WriteOp::Insert { id, bytes, .. } | WriteOp::Update { id, bytes, .. } => {
                    for ukey in planned.releases {
                        shelves.unique.remove(&ukey);
                    }
                    shelves.documents.insert(
                        planned.key,
                        StoredDocument {
                            bytes,
                            version: planned.new_version,
                        },
                    );
                    for ukey in planned.claims {
                        shelves.unique.insert(ukey, id);
                    }
                }
                WriteOp::Delete { .. } => {
                    shelves.documents.remove(&planned.key);
                    for ukey in planned.releases {
                        shelves.unique.remove(&ukey);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Gadget {
        id: Uuid,
        serial: String,
        watts: i32,
    }

    impl Document for Gadget {
        const COLLECTION: &'static str = "gadgets";
        fn id(&self) -> Uuid {
            self.id
        }
    }

    static TEST_CATALOG: &[CollectionSpec] = &[CollectionSpec {
        name: "gadgets",
        unique: &["serial"],
        indexes: &[],
    }];

    fn store() -> InMemoryStore {
        InMemoryStore::with_catalog(TEST_CATALOG)
    }

    fn gadget(serial: &str, watts: i32) -> Gadget {
        Gadget {
            id: Uuid::new_v4(),
            serial: serial.into(),
            watts,
        }
    }

    #[test]
    fn insert_and_get() {
        let store = store();
        let g = gadget("S-1", 40);

        let saved = store.insert(&g).unwrap();
        assert_eq!(saved.version, 1);

        let loaded = store.get::<Gadget>(g.id).unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.data, g);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = store();
        assert!(store.get::<Gadget>(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn insert_existing_id_conflicts() {
        let store = store();
        let g = gadget("S-1", 40);

        store.insert(&g).unwrap();
        let mut again = g.clone();
        again.serial = "S-2".into();
        let err = store.insert(&again).unwrap_err();
        assert!(matches!(err, StoreError::ConcurrencyConflict { .. }));
    }

    #[test]
    fn duplicate_unique_value_rejected() {
        let store = store();
        store.insert(&gadget("S-1", 40)).unwrap();

        let err = store.insert(&gadget("S-1", 60)).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                collection: "gadgets",
                field: "serial",
                value: "S-1".into(),
            }
        );
    }

    #[test]
    fn update_with_correct_version() {
        let store = store();
        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();

        let mut changed = g.clone();
        changed.watts = 60;
        let updated = store.update(&changed, 1).unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(store.get::<Gadget>(g.id).unwrap().unwrap().data.watts, 60);
    }

    #[test]
    fn update_with_wrong_version_fails() {
        let store = store();
        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();

        let err = store.update(&g, 99).unwrap_err();
        assert!(matches!(err, StoreError::ConcurrencyConflict { .. }));
    }

    #[test]
    fn update_missing_not_found() {
        let store = store();
        let err = store.update(&gadget("S-1", 40), 1).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn update_can_move_unique_value() {
        let store = store();
        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();

        let mut renamed = g.clone();
        renamed.serial = "S-2".into();
        store.update(&renamed, 1).unwrap();

        // Old value is free again, new value resolves to the document.
        store.insert(&gadget("S-1", 80)).unwrap();
        let found = store
            .find_by_unique::<Gadget>("serial", "S-2")
            .unwrap()
            .unwrap();
        assert_eq!(found.data.id, g.id);
    }

    #[test]
    fn update_to_taken_unique_value_rejected() {
        let store = store();
        let g1 = gadget("S-1", 40);
        let g2 = gadget("S-2", 60);
        store.insert(&g1).unwrap();
        store.insert(&g2).unwrap();

        let mut clash = g2.clone();
        clash.serial = "S-1".into();
        let err = store.update(&clash, 1).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "serial", .. }));
    }

    #[test]
    fn delete_releases_unique_value() {
        let store = store();
        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();

        assert!(store.delete::<Gadget>(g.id).unwrap());
        assert!(store.get::<Gadget>(g.id).unwrap().is_none());
        assert!(store
            .find_by_unique::<Gadget>("serial", "S-1")
            .unwrap()
            .is_none());

        store.insert(&gadget("S-1", 80)).unwrap();
    }

    #[test]
    fn delete_missing_returns_false() {
        let store = store();
        assert!(!store.delete::<Gadget>(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn find_with_predicate() {
        let store = store();
        store.insert(&gadget("S-1", 10)).unwrap();
        store.insert(&gadget("S-2", 20)).unwrap();
        store.insert(&gadget("S-3", 5)).unwrap();

        let results = store.find::<Gadget>(&|g| g.watts > 8).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn find_by_unique_point_lookup() {
        let store = store();
        let g = gadget("S-7", 40);
        store.insert(&g).unwrap();

        let found = store
            .find_by_unique::<Gadget>("serial", "S-7")
            .unwrap()
            .unwrap();
        assert_eq!(found.data.id, g.id);
        assert!(store
            .find_by_unique::<Gadget>("serial", "S-8")
            .unwrap()
            .is_none());
    }

    #[test]
    fn find_by_unique_undeclared_field_is_error() {
        let store = store();
        let err = store.find_by_unique::<Gadget>("watts", "40").unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[test]
    fn commit_is_all_or_nothing() {
        let store = store();
        store.insert(&gadget("S-1", 40)).unwrap();

        let fresh = gadget("S-2", 60);
        let clash = gadget("S-1", 80);

        let mut batch = WriteBatch::new();
        batch.insert(&fresh).unwrap();
        batch.insert(&clash).unwrap();

        let err = store.commit(batch).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        // The valid first op must not have been applied.
        assert!(store.get::<Gadget>(fresh.id).unwrap().is_none());
        assert_eq!(store.find::<Gadget>(&|_| true).unwrap().len(), 1);
    }

    #[test]
    fn commit_applies_insert_and_update_together() {
        let store = store();
        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();

        let mut adjusted = g.clone();
        adjusted.watts = 35;
        let extra = gadget("S-2", 60);

        let mut batch = WriteBatch::new();
        batch.insert(&extra).unwrap();
        batch.update(&adjusted, 1).unwrap();
        store.commit(batch).unwrap();

        assert_eq!(store.get::<Gadget>(g.id).unwrap().unwrap().version, 2);
        assert_eq!(store.get::<Gadget>(g.id).unwrap().unwrap().data.watts, 35);
        assert!(store.get::<Gadget>(extra.id).unwrap().is_some());
    }

    #[test]
    fn commit_stale_update_rejects_whole_batch() {
        let store = store();
        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();
        let mut newer = g.clone();
        newer.watts = 50;
        store.update(&newer, 1).unwrap();

        let extra = gadget("S-2", 60);
        let mut stale = g.clone();
        stale.watts = 45;

        let mut batch = WriteBatch::new();
        batch.insert(&extra).unwrap();
        batch.update(&stale, 1).unwrap();

        let err = store.commit(batch).unwrap_err();
        assert!(matches!(err, StoreError::ConcurrencyConflict { .. }));
        assert!(store.get::<Gadget>(extra.id).unwrap().is_none());
        assert_eq!(store.get::<Gadget>(g.id).unwrap().unwrap().data.watts, 50);
    }

    #[test]
    fn batch_delete_is_idempotent() {
        let store = store();
        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();

        let mut batch = WriteBatch::new();
        batch.delete::<Gadget>(g.id);
        batch.delete::<Gadget>(Uuid::new_v4());
        store.commit(batch).unwrap();

        assert!(store.get::<Gadget>(g.id).unwrap().is_none());
    }

    #[test]
    fn clone_shares_storage() {
        let store = store();
        let clone = store.clone();

        let g = gadget("S-1", 40);
        store.insert(&g).unwrap();

        let loaded = clone.get::<Gadget>(g.id).unwrap().unwrap();
        assert_eq!(loaded.data.serial, "S-1");
    }
}
