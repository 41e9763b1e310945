//! Command definitions
//!
//! Commands, their modifier flags and the opcode tables that map them to
//! the single opcode byte at the head of every request.

use std::fmt;

/// Base commands understood by the target store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Put,
    Get,
    Del,
}

/// Distinguishes opcodes that share a command and flag set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Form {
    /// The opcode regular clients emit
    #[default]
    Canonical,

    /// Plain PUT byte predating the flag bits (`0x01` in variant A)
    Legacy,

    /// One-shot PUT (`0x41` in variant A); semantics not confirmed server-side
    SingleShot,

    /// Second GET byte of variant B (`0x02`)
    Alternate,
}

/// A command plus its modifiers: what one opcode byte stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Op {
    pub command: Command,

    /// Caller blocks until the store acknowledges durability
    pub synchronous: bool,

    /// Payload was compressed before transmission
    pub compressed: bool,

    pub form: Form,
}

impl Op {
    /// Canonical, async, uncompressed op for a command
    pub const fn new(command: Command) -> Self {
        Self {
            command,
            synchronous: false,
            compressed: false,
            form: Form::Canonical,
        }
    }

    pub const fn put() -> Self {
        Self::new(Command::Put)
    }

    pub const fn get() -> Self {
        Self::new(Command::Get)
    }

    pub const fn del() -> Self {
        Self::new(Command::Del)
    }

    pub const fn synchronous(mut self, synchronous: bool) -> Self {
        self.synchronous = synchronous;
        self
    }

    pub const fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub const fn form(mut self, form: Form) -> Self {
        self.form = form;
        self
    }

    /// Whether requests for this op carry a data section
    pub fn has_data(&self) -> bool {
        self.command == Command::Put
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.command)?;
        if self.synchronous {
            write!(f, "+sync")?;
        }
        if self.compressed {
            write!(f, "+compressed")?;
        }
        if self.form != Form::Canonical {
            write!(f, " ({:?})", self.form)?;
        }
        Ok(())
    }
}

// =============================================================================
// Opcode Tables
// =============================================================================

/// Bidirectional mapping between opcode bytes and ops
///
/// Every byte appears once and every op appears once, so encoding and
/// decoding are exact inverses.
#[derive(Debug)]
pub struct OpcodeTable {
    pub name: &'static str,
    pub entries: &'static [(u8, Op)],
}

impl OpcodeTable {
    /// Look up the byte for an op
    pub fn encode(&self, op: Op) -> Option<u8> {
        self.entries
            .iter()
            .find(|(_, entry)| *entry == op)
            .map(|(byte, _)| *byte)
    }

    /// Look up the op for a byte
    pub fn decode(&self, opcode: u8) -> Option<Op> {
        self.entries
            .iter()
            .find(|(byte, _)| *byte == opcode)
            .map(|(_, op)| *op)
    }

    /// Whether the table has any opcode for the command
    pub fn supports(&self, command: Command) -> bool {
        self.entries.iter().any(|(_, op)| op.command == command)
    }

    /// Whether the exact op has an opcode
    pub fn contains(&self, op: Op) -> bool {
        self.encode(op).is_some()
    }
}

/// Variant A: modifier flags live in the high bits
///
/// `0x08` marks a synchronous PUT, `0x40` a compressed payload.
pub const FLAGS_IN_HIGH_BITS: OpcodeTable = OpcodeTable {
    name: "flags-in-high-bits",
    entries: &[
        (0x00, Op::get()),
        (0x40, Op::get().compressed(true)),
        (0x21, Op::put()),
        (0x29, Op::put().synchronous(true)),
        (0x61, Op::put().compressed(true)),
        (0x69, Op::put().synchronous(true).compressed(true)),
        (0x01, Op::put().form(Form::Legacy)),
        (0x41, Op::put().form(Form::SingleShot)),
    ],
};

/// Variant B: the command occupies the low bits, no modifiers
pub const COMMAND_IN_LOW_BITS: OpcodeTable = OpcodeTable {
    name: "command-in-low-bits",
    entries: &[
        (0x00, Op::get()),
        (0x01, Op::put()),
        (0x02, Op::get().form(Form::Alternate)),
        (0x03, Op::del()),
    ],
};
