//! Document backend
//!
//! PUT replaces the document whose `_id` is the key (inserting it when
//! absent), GET finds it by id.

use serde::{Deserialize, Serialize};

use super::Backend;
use crate::error::BackendError;

/// A stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document id (`_id`)
    pub id: Vec<u8>,

    /// Document body
    pub data: Vec<u8>,
}

/// The calls a document driver must offer
pub trait DocumentClient {
    /// Replace the document with the same id; insert it if `upsert` and absent
    fn replace_one(
        &mut self,
        collection: &str,
        document: Document,
        upsert: bool,
    ) -> Result<(), BackendError>;

    fn find_one(&mut self, collection: &str, id: &[u8]) -> Result<Option<Document>, BackendError>;
}

/// Adapter from a document driver to `Backend`
pub struct DocumentBackend<C> {
    name: String,
    client: C,
    collection: String,
}

impl<C: DocumentClient> DocumentBackend<C> {
    pub fn new(name: impl Into<String>, client: C, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client,
            collection: collection.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: DocumentClient> Backend for DocumentBackend<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        let document = Document {
            id: key.to_vec(),
            data: value.to_vec(),
        };
        self.client.replace_one(&self.collection, document, true)
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self
            .client
            .find_one(&self.collection, key)?
            .map(|document| document.data))
    }
}
