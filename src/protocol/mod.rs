//! Protocol Module
//!
//! The FineDB binary wire protocol, client side.
//!
//! ## Request Format
//! ```text
//! ┌──────────┬─────────────┬──────────┬───────────────┬──────────┐
//! │Opcode (1)│ KeyLen (2)  │   Key    │ DataLen (4)   │   Data   │
//! └──────────┴─────────────┴──────────┴───────────────┴──────────┘
//!                                      └──── PUT only ──────────┘
//! ```
//!
//! ## Response Format
//! ```text
//! ┌──────────┬──────────────────────────────┐
//! │Status(1) │ Data (remaining bytes)       │
//! └──────────┴──────────────────────────────┘
//! ```
//!
//! Length fields are big-endian. Bit `0x40` of the status byte says data
//! follows; the low bits carry the status code, whose width depends on the
//! protocol version. With no length field, response data ends when the
//! server has nothing more to send.
//!
//! ## Versions
//! Two incompatible opcode layouts exist. `ProtocolVersion` picks one
//! opcode table and one status table at construction time:
//! - `FlagsInHighBits`: GET `0x00`, PUT `0x21`, sync `+0x08`,
//!   compressed `+0x40`; narrow status codes
//! - `CommandInLowBits`: GET `0x00`, PUT `0x01`, GET `0x02`, DEL `0x03`;
//!   wide status codes

mod command;
mod response;
mod codec;

use std::fmt;
use std::str::FromStr;

pub use command::{Command, Form, Op, OpcodeTable, COMMAND_IN_LOW_BITS, FLAGS_IN_HIGH_BITS};
pub use response::{Response, Status, StatusTable, DATA_FOLLOWS, NARROW_STATUS, WIDE_STATUS};
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_available,
    read_response, write_request, Request, MAX_KEY_LEN, MAX_VALUE_LEN, READ_CHUNK_SIZE,
};

/// Wire protocol version spoken by the target store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// Variant A, with narrow status codes
    #[default]
    FlagsInHighBits,

    /// Variant B, with wide status codes
    CommandInLowBits,
}

impl ProtocolVersion {
    pub fn opcodes(&self) -> &'static OpcodeTable {
        match self {
            ProtocolVersion::FlagsInHighBits => &FLAGS_IN_HIGH_BITS,
            ProtocolVersion::CommandInLowBits => &COMMAND_IN_LOW_BITS,
        }
    }

    pub fn statuses(&self) -> &'static StatusTable {
        match self {
            ProtocolVersion::FlagsInHighBits => &NARROW_STATUS,
            ProtocolVersion::CommandInLowBits => &WIDE_STATUS,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcodes().name)
    }
}

impl FromStr for ProtocolVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "a" | "A" | "flags-in-high-bits" => Ok(ProtocolVersion::FlagsInHighBits),
            "b" | "B" | "command-in-low-bits" => Ok(ProtocolVersion::CommandInLowBits),
            other => Err(format!("unknown protocol version: {}", other)),
        }
    }
}
