//! Connection to the target store
//!
//! A buffered TCP stream that runs one request/response round trip at a
//! time. Dropping the value closes the socket.
//!
//! Response data has no length field. After the status byte the connection
//! waits (under the read timeout) for the first data byte, then switches the
//! socket to a short drain window and takes bytes until the server goes
//! quiet. A drain window of zero makes the socket non-blocking for that
//! step, so only bytes that have already arrived are taken.

use std::io::{BufRead, BufReader, BufWriter, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::protocol::{
    decode_response, read_available, write_request, ProtocolVersion, Response, DATA_FOLLOWS,
    READ_CHUNK_SIZE,
};

/// A client connection to the target store
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Read timeout restored after each drain
    read_timeout: Option<Duration>,

    /// Pause that ends response data; `None` drains non-blocking
    drain_timeout: Option<Duration>,
}

impl Connection {
    /// Connect to the store and apply the configured timeouts
    pub fn open(config: &ClientConfig) -> Result<Self, StoreError> {
        let stream = connect(&config.addr, config.connect_timeout_ms)?;
        let mut connection = Self::new(stream)?;
        connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
        connection.set_drain_timeout(config.drain_timeout_ms);
        Ok(connection)
    }

    /// Wrap an already connected stream
    pub fn new(stream: TcpStream) -> Result<Self, StoreError> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::with_capacity(READ_CHUNK_SIZE, read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            read_timeout: None,
            drain_timeout: None,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<(), StoreError> {
        if read_ms > 0 {
            let timeout = Some(Duration::from_millis(read_ms));
            self.reader.get_ref().set_read_timeout(timeout)?;
            self.read_timeout = timeout;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Set the pause that ends response data (0 = take what has arrived)
    pub fn set_drain_timeout(&mut self, ms: u64) {
        self.drain_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }

    /// Send one encoded request and wait for its response
    pub fn round_trip(
        &mut self,
        frame: &[u8],
        version: ProtocolVersion,
    ) -> Result<Response, StoreError> {
        write_request(&mut self.writer, frame)?;

        let mut status = [0u8; 1];
        self.reader.read_exact(&mut status)?;

        let mut bytes = vec![status[0]];
        if status[0] & DATA_FOLLOWS != 0 {
            // At least one data byte is owed; wait for it like any other read
            let owed = !self.reader.fill_buf()?.is_empty();
            if owed {
                bytes.extend(self.drain()?);
            }
        }
        let response = decode_response(&bytes, version)?;

        tracing::trace!(
            "{} -> {} bytes, status {:?}, {} bytes back",
            self.peer_addr,
            frame.len(),
            response.status,
            bytes.len()
        );

        Ok(response)
    }

    /// Take response data until the server goes quiet
    fn drain(&mut self) -> Result<Vec<u8>, StoreError> {
        self.set_draining(true)?;
        let data = read_available(&mut self.reader);
        self.set_draining(false)?;
        Ok(data?)
    }

    fn set_draining(&self, draining: bool) -> Result<(), StoreError> {
        let stream = self.reader.get_ref();
        match self.drain_timeout {
            None => stream.set_nonblocking(draining)?,
            Some(window) => {
                let timeout = if draining { Some(window) } else { self.read_timeout };
                stream.set_read_timeout(timeout)?;
            }
        }
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Resolve `addr` and connect to the first address that accepts
fn connect(addr: &str, timeout_ms: u64) -> Result<TcpStream, StoreError> {
    if timeout_ms == 0 {
        return Ok(TcpStream::connect(addr)?);
    }

    let timeout = Duration::from_millis(timeout_ms);
    let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();

    let mut last_err = None;
    for candidate in addrs {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(StoreError::Transport(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("{} resolved to no address", addr),
        )
    })))
}
