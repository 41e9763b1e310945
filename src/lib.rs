//! # finebench
//!
//! Benchmark client for the FineDB key-value store, with:
//! - A codec for FineDB's binary wire protocol (both opcode layouts)
//! - A store client with per-call or phase-scoped shared connections
//! - Cache, relational and document adapters behind one `Backend` trait
//! - A harness that times identical workloads across backends
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Harness                                 │
//! │          (phases × backends, sequential)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Backend
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ StoreClient │          │  Adapters   │
//!   │             │          │ cache / sql │
//!   └──────┬──────┘          │  / document │
//!          │                 └─────────────┘
//!          ▼
//!   ┌─────────────┐
//!   │  Protocol   │
//!   │   codec     │
//!   └──────┬──────┘
//!          ▼
//!      TCP socket
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;
pub mod backend;
pub mod harness;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BackendError, BenchError, CodecError, HarnessError, Result, StoreError};
pub use config::{BenchConfig, ClientConfig};
pub use client::{ConnectionMode, StoreClient};
pub use backend::Backend;
pub use harness::{BenchmarkResult, Harness, Phase, PhaseKind, Workload};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of finebench
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
