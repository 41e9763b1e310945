//! Configuration for finebench
//!
//! Plain structs handed to constructors; the CLI fills them from its
//! arguments. Nothing here is read from files or the environment.

use crate::harness::PhaseKind;
use crate::protocol::ProtocolVersion;

/// Configuration for a store client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Target
    // -------------------------------------------------------------------------
    /// Target store address (host:port)
    pub addr: String,

    /// Opcode and status tables in effect
    pub protocol: ProtocolVersion,

    // -------------------------------------------------------------------------
    // Timeouts (milliseconds, 0 = none)
    // -------------------------------------------------------------------------
    /// Connect timeout
    pub connect_timeout_ms: u64,

    /// Connection read timeout
    pub read_timeout_ms: u64,

    /// Connection write timeout
    pub write_timeout_ms: u64,

    /// How long response data may pause before it is considered complete.
    /// 0 takes only the bytes that have already arrived.
    pub drain_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:11138".to_string(),
            protocol: ProtocolVersion::default(),
            connect_timeout_ms: 1000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            drain_timeout_ms: 10,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the target store address
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the protocol version
    pub fn protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the pause that ends response data (in milliseconds)
    pub fn drain_timeout_ms(mut self, ms: u64) -> Self {
        self.config.drain_timeout_ms = ms;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration for a benchmark run
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// How many times the workload is replayed per phase
    pub repeat_count: usize,

    /// Open a fresh connection for every store operation
    pub per_call_connection: bool,

    /// Phases that reuse one connection even when `per_call_connection` is set
    pub shared_phases: Vec<PhaseKind>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            repeat_count: 45,
            per_call_connection: true,
            shared_phases: Vec::new(),
        }
    }
}
