//! xrdframe-core: Core frame-stack types for XRD detector data.
//!
//! This crate provides the canonical 3-D frame cube produced by reading
//! detector mapping files, plus per-frame intensity statistics.
//!

pub mod error;
pub mod frame;
pub mod stats;

pub use error::{Error, Result};
pub use frame::{FrameShape, FrameStack};
pub use stats::FrameStats;
