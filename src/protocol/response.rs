//! Response definitions
//!
//! Status codes and the tables that resolve the low bits of a response's
//! status byte.

/// Response status, normalized across protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    BadCommand,
    ProtocolError,
    ServerError,
    NoData,
    Unknown,
}

impl Status {
    /// Whether the status reports a failed operation
    ///
    /// `NoData` is a regular answer to a GET on a missing key.
    pub fn is_error(&self) -> bool {
        !matches!(self, Status::Ok | Status::NoData)
    }
}

/// Bit `0x40` of the status byte: data follows
pub const DATA_FOLLOWS: u8 = 0x40;

// =============================================================================
// Status Tables
// =============================================================================

/// Maps the masked status code to a `Status`
#[derive(Debug)]
pub struct StatusTable {
    pub name: &'static str,
    pub mask: u8,
    pub codes: &'static [(u8, Status)],
}

impl StatusTable {
    /// Resolve a raw status byte; codes missing from the table are `Unknown`
    pub fn resolve(&self, status_byte: u8) -> Status {
        let code = self.code(status_byte);
        self.codes
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, status)| *status)
            .unwrap_or(Status::Unknown)
    }

    /// The status code carried by the byte under this table's mask
    pub fn code(&self, status_byte: u8) -> u8 {
        status_byte & self.mask
    }

    /// Inverse of `resolve` for listed statuses
    pub fn code_for(&self, status: Status) -> Option<u8> {
        self.codes
            .iter()
            .find(|(_, s)| *s == status)
            .map(|(c, _)| *c)
    }
}

/// 2-bit code, widened to 3 bits so that UNKNOWN_ERR (4) fits
pub const NARROW_STATUS: StatusTable = StatusTable {
    name: "narrow",
    mask: 0x07,
    codes: &[
        (0, Status::Ok),
        (1, Status::ProtocolError),
        (2, Status::ServerError),
        (3, Status::NoData),
        (4, Status::Unknown),
    ],
};

/// 6-bit code
pub const WIDE_STATUS: StatusTable = StatusTable {
    name: "wide",
    mask: 0x3f,
    codes: &[
        (0, Status::Ok),
        (1, Status::BadCommand),
        (2, Status::ProtocolError),
        (3, Status::ServerError),
        (4, Status::Unknown),
    ],
};

// =============================================================================
// Decoded Response
// =============================================================================

/// A decoded response frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Resolved status
    pub status: Status,

    /// Raw status code after masking
    pub code: u8,

    /// Whether the data-follows bit was set
    pub has_data: bool,

    /// Trailing data, present only when `has_data` is set
    pub data: Option<Vec<u8>>,
}
