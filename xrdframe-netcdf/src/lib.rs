//! xrdframe-netcdf: netCDF-3 classic container parser.
//!
//! This crate provides parsing for the classic (CDF-1/CDF-2) container
//! format written by EPICS-areaDetector-style acquisition systems: header
//! model, big-endian sample decoding, and a variable-name-keyed registry
//! with fixed-size and record-variable data reads.
//!

pub mod container;
mod decode;
pub mod encode;
pub mod error;
pub mod header;
pub mod types;

pub use container::Container;
pub use encode::{ClassicBuilder, DimId};
pub use error::{Error, Result};
pub use header::{Attribute, Dimension, Header, Variable, Version};
pub use types::{NcType, Values};
