//! netCDF container error types.

use thiserror::Error;

/// Result type for container parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// netCDF classic container error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The file does not start with the classic `CDF` magic.
    #[error("not a netCDF classic container (bad magic)")]
    InvalidMagic,

    /// The version byte is neither 1 (classic) nor 2 (64-bit offset).
    #[error("unsupported netCDF version byte: {0}")]
    UnsupportedVersion(u8),

    /// A tagged header list carries the wrong tag word.
    #[error("invalid header list tag: expected {expected:#010x}, found {found:#010x}")]
    InvalidTag { expected: u32, found: u32 },

    /// Unknown external type code in the header.
    #[error("unknown external type code: {0}")]
    UnknownType(i32),

    /// The file ends before a required field or data slab.
    #[error("container truncated: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Structurally invalid header content.
    #[error("header parse error: {0}")]
    Parse(String),
}
