//! Backend Module
//!
//! The narrow interface the harness drives, and adapters that fit
//! alternative stores into it.
//!
//! ## Layout
//! ```text
//!   Harness ──► Backend ──┬─► StoreClient          (wire protocol)
//!                         ├─► CacheBackend<C>      ──► CacheClient
//!                         ├─► RelationalBackend<C> ──► RelationalClient
//!                         └─► DocumentBackend<C>   ──► DocumentClient
//! ```
//!
//! Each `*Client` trait is the slice of a real driver an adapter needs.
//! `memory` has in-process implementations of all three.

mod cache;
mod relational;
mod document;
pub mod memory;

pub use cache::{CacheBackend, CacheClient};
pub use relational::{RelationalBackend, RelationalClient, Statement};
pub use document::{Document, DocumentBackend, DocumentClient};

use crate::error::BackendError;
use crate::harness::PhaseKind;

/// Uniform put/get capability driven by the harness
///
/// Backend-specific options (transactions, indexes) stay behind the
/// adapter.
pub trait Backend {
    /// Name used in results and logs
    fn name(&self) -> &str;

    /// Store a value
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError>;

    /// Fetch a value
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError>;

    /// Store a value and wait until it is durable
    ///
    /// Backends without a separate durable write treat this as `put`.
    fn put_sync(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        self.put(key, value)
    }

    /// Remove a key
    fn delete(&mut self, _key: &[u8]) -> Result<(), BackendError> {
        Err(BackendError::unsupported(self.name(), "delete"))
    }

    /// Whether a phase of this kind can run against the backend
    fn supports(&self, kind: PhaseKind) -> bool {
        kind != PhaseKind::Delete
    }

    /// Called before the first operation of a phase
    fn begin_phase(&mut self, _kind: PhaseKind) {}

    /// Called after the last operation of a phase; release anything the
    /// phase acquired
    fn end_phase(&mut self) {}
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        (**self).put(key, value)
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).get(key)
    }

    fn put_sync(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        (**self).put_sync(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), BackendError> {
        (**self).delete(key)
    }

    fn supports(&self, kind: PhaseKind) -> bool {
        (**self).supports(kind)
    }

    fn begin_phase(&mut self, kind: PhaseKind) {
        (**self).begin_phase(kind)
    }

    fn end_phase(&mut self) {
        (**self).end_phase()
    }
}
