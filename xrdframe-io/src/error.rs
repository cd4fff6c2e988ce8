//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid container of the expected format.
    #[error("invalid file format: {0}")]
    Format(#[from] xrdframe_netcdf::Error),

    /// The container is valid but lacks the expected named variable.
    #[error("variable '{0}' not found in container")]
    MissingVariable(String),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] xrdframe_core::Error),
}
