//! Error types for xrdframe-core.

use thiserror::Error;

/// Result type alias for frame-stack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for frame-stack operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Array rank that cannot be normalized to a frame stack.
    #[error("invalid frame array rank: {0} (expected 2 or 3)")]
    InvalidRank(usize),

    /// Sample count does not match the declared shape.
    #[error("sample count {actual} does not match shape ({frames}, {rows}, {cols})")]
    ShapeMismatch {
        frames: usize,
        rows: usize,
        cols: usize,
        actual: usize,
    },

    /// Frame index outside the stack.
    #[error("frame index {index} out of range (stack has {frames} frames)")]
    FrameOutOfRange { index: usize, frames: usize },
}
