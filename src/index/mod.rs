//! Index store module
//!
//! This module provides the downstream stores for both pipelines: the
//! searchable index that change events are projected into, and the document
//! store that crawled posts are persisted to. The search index is exposed
//! through the narrow [`IndexStore`] trait so the projector can be exercised
//! against an in-memory fake without network or disk access.

mod database;
pub mod error;
mod schema;

pub use database::Database;
pub use error::{DbError, IndexError};

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A keyed document index.
///
/// Implementations must be idempotent: `upsert` replaces any existing
/// document under the same id, and `remove` of an absent id is a no-op,
/// not an error. This is what lets a caller safely retry the same change
/// event after a transient failure.
#[allow(async_fn_in_trait)]
pub trait IndexStore {
    /// Insert or replace the document stored under `id`.
    async fn upsert(&self, id: &str, document: &Value) -> Result<(), IndexError>;

    /// Remove the document stored under `id`, if present.
    async fn remove(&self, id: &str) -> Result<(), IndexError>;
}

/// In-memory index keyed by document id.
///
/// Used as a test double for the projector and for local dry runs. Clones
/// share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    documents: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the document stored under `id`, if any
    pub fn get(&self, id: &str) -> Option<Value> {
        self.documents
            .read()
            .expect("index lock poisoned")
            .get(id)
            .cloned()
    }

    /// Number of documents currently held
    pub fn len(&self) -> usize {
        self.documents.read().expect("index lock poisoned").len()
    }

    /// Whether the index holds no documents
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IndexStore for MemoryIndex {
    async fn upsert(&self, id: &str, document: &Value) -> Result<(), IndexError> {
        self.documents
            .write()
            .expect("index lock poisoned")
            .insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), IndexError> {
        // Absence is not an error; removing a missing key converges to the
        // same state as removing a present one.
        self.documents
            .write()
            .expect("index lock poisoned")
            .remove(id);
        Ok(())
    }
}
