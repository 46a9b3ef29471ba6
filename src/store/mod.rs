//! Documents - typed records stored in catalog-declared collections.
//!
//! A `DocumentStore` provides CRUD over serialized documents with
//! catalog-enforced unique keys, plus an all-or-nothing `commit` for
//! multi-record writes.
//!
//! ## Example
//!
//! ```ignore
//! use stockroom::{Document, DocumentStore, InMemoryStore, Versioned};
//!
//! let store = InMemoryStore::new();
//! store.insert(&user)?;
//! let loaded: Versioned<User> = store.get(user.id)?.unwrap();
//! store.update(&changed, loaded.version)?;
//! ```

mod in_memory;

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// Trait for types persisted as documents.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection this document type lives in. Must name a
    /// `CollectionSpec` known to the store's catalog.
    const COLLECTION: &'static str;

    /// Returns the unique identifier for this document.
    fn id(&self) -> Uuid;
}

/// A versioned wrapper around document data for optimistic concurrency control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A declared unique field already holds this value.
    DuplicateKey {
        collection: &'static str,
        field: &'static str,
        value: String,
    },
    /// Optimistic concurrency conflict.
    ConcurrencyConflict {
        collection: &'static str,
        id: Uuid,
        expected: u64,
        actual: u64,
    },
    /// Document not found.
    NotFound { collection: &'static str, id: Uuid },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey {
                collection,
                field,
                value,
            } => write!(f, "duplicate key {}.{} = {}", collection, field, value),
            StoreError::ConcurrencyConflict {
                collection,
                id,
                expected,
                actual,
            } => write!(
                f,
                "concurrency conflict on {}:{} (expected version {}, actual {})",
                collection, id, expected, actual
            ),
            StoreError::NotFound { collection, id } => {
                write!(f, "document not found: {}:{}", collection, id)
            }
            StoreError::Serde(msg) => write!(f, "document serialization error: {}", msg),
            StoreError::Storage(msg) => write!(f, "document storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// One staged write inside a `WriteBatch`.
enum WriteOp {
    Insert {
        collection: &'static str,
        id: Uuid,
        bytes: Vec<u8>,
    },
    Update {
        collection: &'static str,
        id: Uuid,
        bytes: Vec<u8>,
        expected_version: u64,
    },
    Delete {
        collection: &'static str,
        id: Uuid,
    },
}

/// A set of writes applied as one atomic unit.
///
/// `DocumentStore::commit` validates every staged operation against the
/// store (and the effects of the operations staged before it) before any of
/// them is applied; a batch either lands whole or not at all.
#[derive(Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch { ops: Vec::new() }
    }

    /// Stage an insert of a new document.
    pub fn insert<D: Document>(&mut self, doc: &D) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(doc).map_err(|e| StoreError::Serde(e.to_string()))?;
        self.ops.push(WriteOp::Insert {
            collection: D::COLLECTION,
            id: doc.id(),
            bytes,
        });
        Ok(())
    }

    /// Stage an update of an existing document at a known version.
    pub fn update<D: Document>(&mut self, doc: &D, expected_version: u64) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(doc).map_err(|e| StoreError::Serde(e.to_string()))?;
        self.ops.push(WriteOp::Update {
            collection: D::COLLECTION,
            id: doc.id(),
            bytes,
            expected_version,
        });
        Ok(())
    }

    /// Stage a delete. Deleting an absent document is a no-op at apply time.
    pub fn delete<D: Document>(&mut self, id: Uuid) {
        self.ops.push(WriteOp::Delete {
            collection: D::COLLECTION,
            id,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// Abstract CRUD storage for documents with catalog-enforced unique keys.
pub trait DocumentStore: Send + Sync {
    /// Get a document by id. Returns None if not found.
    fn get<D: Document>(&self, id: Uuid) -> Result<Option<Versioned<D>>, StoreError>;

    /// Insert a new document. Fails if the id exists or a unique field is taken.
    fn insert<D: Document>(&self, doc: &D) -> Result<Versioned<D>, StoreError>;

    /// Update an existing document with optimistic concurrency control.
    fn update<D: Document>(&self, doc: &D, expected_version: u64)
        -> Result<Versioned<D>, StoreError>;

    /// Delete a document by id. Returns true if it existed.
    fn delete<D: Document>(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Find documents matching a predicate.
    fn find<D: Document>(&self, predicate: &dyn Fn(&D) -> bool)
        -> Result<Vec<Versioned<D>>, StoreError>;

    /// Point lookup through a declared unique constraint.
    fn find_by_unique<D: Document>(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<Versioned<D>>, StoreError>;

    /// Apply a batch of writes atomically: all validated, then all applied.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

pub use in_memory::InMemoryStore;
