//! In-process native clients
//!
//! Stand-ins for real cache, relational and document drivers. Clones share
//! the same storage, so a test can keep a handle while the harness owns the
//! adapter.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{CacheClient, Document, DocumentClient, RelationalClient, Statement};
use crate::error::BackendError;

// =============================================================================
// Cache
// =============================================================================

/// Hash map behind a lock
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheClient for MemoryCache {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.entries.read().get(key).cloned())
    }
}

// =============================================================================
// Relational
// =============================================================================

type Row = HashMap<String, Vec<u8>>;

/// Tables of rows indexed by their key column
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    tables: Arc<RwLock<HashMap<String, HashMap<Vec<u8>, Row>>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, |rows| rows.len())
    }
}

impl RelationalClient for MemoryTable {
    fn execute(&mut self, statement: &Statement) -> Result<u64, BackendError> {
        match statement {
            Statement::Upsert {
                table,
                key_column,
                value_column,
                key,
                value,
            } => {
                let mut tables = self.tables.write();
                let row = tables
                    .entry(table.clone())
                    .or_default()
                    .entry(key.clone())
                    .or_default();
                row.insert(key_column.clone(), key.clone());
                // MySQL counts an updated row twice
                let affected = if row.insert(value_column.clone(), value.clone()).is_some() {
                    2
                } else {
                    1
                };
                Ok(affected)
            }
            Statement::SelectOne { .. } => Err(BackendError::new(
                "memory-table",
                format!("execute() called with a query: {}", statement),
            )),
        }
    }

    fn query_one(&mut self, statement: &Statement) -> Result<Option<Vec<u8>>, BackendError> {
        match statement {
            Statement::SelectOne {
                table,
                value_column,
                key,
                ..
            } => Ok(self
                .tables
                .read()
                .get(table)
                .and_then(|rows| rows.get(key))
                .and_then(|row| row.get(value_column))
                .cloned()),
            Statement::Upsert { .. } => Err(BackendError::new(
                "memory-table",
                format!("query_one() called with a write: {}", statement),
            )),
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// Collections of bincode-encoded documents
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    collections: Arc<RwLock<HashMap<String, HashMap<Vec<u8>, Vec<u8>>>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |docs| docs.len())
    }
}

impl DocumentClient for MemoryCollection {
    fn replace_one(
        &mut self,
        collection: &str,
        document: Document,
        upsert: bool,
    ) -> Result<(), BackendError> {
        let encoded =
            bincode::serialize(&document).map_err(|e| BackendError::new("memory-collection", e))?;

        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        if !upsert && !docs.contains_key(&document.id) {
            return Ok(());
        }
        docs.insert(document.id, encoded);
        Ok(())
    }

    fn find_one(&mut self, collection: &str, id: &[u8]) -> Result<Option<Document>, BackendError> {
        let collections = self.collections.read();
        let Some(encoded) = collections.get(collection).and_then(|docs| docs.get(id)) else {
            return Ok(None);
        };
        let document: Document = bincode::deserialize(encoded)
            .map_err(|e| BackendError::new("memory-collection", e))?;
        Ok(Some(document))
    }
}
