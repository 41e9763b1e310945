//! Store Client
//!
//! Typed PUT/GET/DEL calls against the target store. Each call is one
//! encode → send → receive → decode round trip; nothing is retried.

use std::collections::HashMap;

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::{BackendError, StoreError};
use crate::harness::PhaseKind;
use crate::network::Connection;
use crate::protocol::{encode_request, Command, Op, ProtocolVersion, Response, Status};

/// How the client obtains its connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// Open and close a connection for every operation
    #[default]
    PerCall,

    /// Reuse one connection until the phase ends or `release` is called
    Shared,
}

/// Acknowledgment of a successful PUT or DEL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub status: Status,
}

/// Client for the target store
///
/// In shared mode the connection is opened by the first call and kept
/// until `release`, the end of a harness phase, or a failed round trip.
pub struct StoreClient {
    config: ClientConfig,

    /// Mode outside of phases and for phases without an override
    mode: ConnectionMode,

    /// Per-phase overrides
    phase_modes: HashMap<PhaseKind, ConnectionMode>,

    /// Mode of the current phase
    active: ConnectionMode,

    /// Held connection in shared mode
    connection: Option<Connection>,
}

impl StoreClient {
    pub fn new(config: ClientConfig, mode: ConnectionMode) -> Self {
        Self {
            config,
            mode,
            phase_modes: HashMap::new(),
            active: mode,
            connection: None,
        }
    }

    /// Client that opens a connection per operation
    pub fn per_call(config: ClientConfig) -> Self {
        Self::new(config, ConnectionMode::PerCall)
    }

    /// Client that reuses one connection per phase
    pub fn shared(config: ClientConfig) -> Self {
        Self::new(config, ConnectionMode::Shared)
    }

    /// Use `mode` for phases of `kind`
    pub fn with_phase_mode(mut self, kind: PhaseKind, mode: ConnectionMode) -> Self {
        self.phase_modes.insert(kind, mode);
        self
    }

    /// Reuse a caller-supplied connection for shared calls until it is
    /// released
    pub fn attach(&mut self, connection: Connection) {
        self.connection = Some(connection);
    }

    /// Close the held connection, if any
    pub fn release(&mut self) {
        if let Some(connection) = self.connection.take() {
            tracing::trace!("Releasing connection to {}", connection.peer_addr());
        }
    }

    /// Protocol version in effect
    pub fn protocol(&self) -> ProtocolVersion {
        self.config.protocol
    }

    /// Whether calls currently reuse a connection
    pub fn is_shared(&self) -> bool {
        self.active == ConnectionMode::Shared
    }

    /// Whether a connection is currently held
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Store a value
    pub fn put(
        &mut self,
        key: &[u8],
        value: &[u8],
        synchronous: bool,
        compressed: bool,
    ) -> Result<Ack, StoreError> {
        let op = Op::put().synchronous(synchronous).compressed(compressed);
        let response = self.execute(op, key, Some(value))?;
        Ok(Ack {
            status: response.status,
        })
    }

    /// Fetch a value; `None` when the store has no data for the key
    pub fn get(&mut self, key: &[u8], compressed: bool) -> Result<Option<Vec<u8>>, StoreError> {
        let response = self.execute(Op::get().compressed(compressed), key, None)?;
        match response.status {
            Status::NoData => Ok(None),
            _ => Ok(Some(response.data.unwrap_or_default())),
        }
    }

    /// Delete a key
    pub fn del(&mut self, key: &[u8]) -> Result<Ack, StoreError> {
        if !self.config.protocol.opcodes().supports(Command::Del) {
            return Err(StoreError::Unsupported(format!(
                "DEL under {}",
                self.config.protocol
            )));
        }
        let response = self.execute(Op::del(), key, None)?;
        Ok(Ack {
            status: response.status,
        })
    }

    /// Run one round trip for an arbitrary op
    ///
    /// Error statuses become `StoreError::Protocol`.
    pub fn execute(
        &mut self,
        op: Op,
        key: &[u8],
        value: Option<&[u8]>,
    ) -> Result<Response, StoreError> {
        let version = self.config.protocol;
        let frame = encode_request(version, op, key, value)?;

        let response = match self.active {
            ConnectionMode::Shared => {
                let mut connection = match self.connection.take() {
                    Some(connection) => connection,
                    None => Connection::open(&self.config)?,
                };
                let result = connection.round_trip(&frame, version);
                // A failed round trip may leave the stream mid-frame
                if result.is_ok() {
                    self.connection = Some(connection);
                }
                result?
            }
            ConnectionMode::PerCall => {
                let mut connection = Connection::open(&self.config)?;
                connection.round_trip(&frame, version)?
            }
        };

        tracing::debug!(
            "{} {} -> {:?}{}",
            op,
            String::from_utf8_lossy(key),
            response.status,
            if response.has_data { " +data" } else { "" }
        );

        if response.status.is_error() {
            return Err(StoreError::Protocol {
                status: response.status,
                code: response.code,
            });
        }
        Ok(response)
    }
}

// =============================================================================
// Backend Interface
// =============================================================================

impl Backend for StoreClient {
    fn name(&self) -> &str {
        "finedb"
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        StoreClient::put(self, key, value, false, false)?;
        Ok(())
    }

    fn put_sync(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        StoreClient::put(self, key, value, true, false)?;
        Ok(())
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(StoreClient::get(self, key, false)?)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), BackendError> {
        StoreClient::del(self, key)?;
        Ok(())
    }

    fn begin_phase(&mut self, kind: PhaseKind) {
        self.release();
        self.active = self.phase_modes.get(&kind).copied().unwrap_or(self.mode);
    }

    fn end_phase(&mut self) {
        self.release();
        self.active = self.mode;
    }

    fn supports(&self, kind: PhaseKind) -> bool {
        let opcodes = self.config.protocol.opcodes();
        match kind {
            PhaseKind::PutAsync => opcodes.contains(Op::put()),
            PhaseKind::PutSync => opcodes.contains(Op::put().synchronous(true)),
            PhaseKind::Get => opcodes.contains(Op::get()),
            PhaseKind::Delete => opcodes.contains(Op::del()),
        }
    }
}
