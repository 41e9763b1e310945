//! Cache-style backend
//!
//! Memcache/Redis shaped stores: `set` and `get` map one to one.

use super::Backend;
use crate::error::BackendError;

/// The calls a cache driver must offer
pub trait CacheClient {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError>;

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError>;
}

/// Adapter from a cache driver to `Backend`
pub struct CacheBackend<C> {
    name: String,
    client: C,
}

impl<C: CacheClient> CacheBackend<C> {
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: CacheClient> Backend for CacheBackend<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        self.client.set(key, value)
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        self.client.get(key)
    }
}
