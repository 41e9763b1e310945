//! Network Module
//!
//! TCP connections to the target store.
//!
//! ## Connection Modes
//! - Per call: a `Connection` lives for one operation
//! - Shared: one `Connection` is reused for a whole batch

mod connection;

pub use connection::Connection;
