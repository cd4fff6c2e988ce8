//! File writers for exported frame data.

use crate::Result;
use ndarray::ArrayView2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use xrdframe_core::FrameStack;

/// Writer for exported detector frames.
///
/// Writes frames to files as CSV matrices or raw little-endian `u16`
/// samples.
pub struct FrameFileWriter {
    writer: BufWriter<File>,
}

impl FrameFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes one frame as a CSV matrix, one detector row per line.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_frame_csv(&mut self, frame: ArrayView2<'_, u16>) -> Result<()> {
        for row in frame.rows() {
            let mut first = true;
            for &v in row {
                if first {
                    write!(self.writer, "{v}")?;
                    first = false;
                } else {
                    write!(self.writer, ",{v}")?;
                }
            }
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes one frame as raw little-endian `u16` samples, row-major.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_frame_binary(&mut self, frame: ArrayView2<'_, u16>) -> Result<()> {
        for &v in frame.iter() {
            self.writer.write_all(&v.to_le_bytes())?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes every frame of a stack as CSV, frames separated by a blank
    /// line.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_stack_csv(&mut self, stack: &FrameStack) -> Result<()> {
        for (i, frame) in stack.frames().enumerate() {
            if i > 0 {
                writeln!(self.writer)?;
            }
            self.write_frame_csv(frame)?;
        }
        Ok(())
    }

    /// Writes every frame of a stack as raw little-endian `u16` samples.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_stack_binary(&mut self, stack: &FrameStack) -> Result<()> {
        for frame in stack.frames() {
            self.write_frame_binary(frame)?;
        }
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
