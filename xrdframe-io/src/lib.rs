//! xrdframe-io: Memory-mapped frame-stack reading for XRD mapping files.
//!
//! This crate provides the read boundary between on-disk netCDF mapping
//! files and the canonical in-memory frame cube: memory-mapped access via
//! memmap2, the `array_data` frame-stack read with its cast-and-normalize
//! semantics, the raw variable-registry pass-through, and frame export
//! writers.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{
    read_frame_stack, read_frame_times, read_variables, FrameFileReader, MappedFileReader,
    ARRAY_DATA_VAR, FRAME_TIME_VAR,
};
pub use writer::FrameFileWriter;
