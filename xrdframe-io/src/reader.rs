//! Memory-mapped frame-stack readers.
//!

use crate::{Error, Result};
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use xrdframe_core::FrameStack;
use xrdframe_netcdf::{Container, Values};

/// Variable name under which acquisition writes the detector frames.
pub const ARRAY_DATA_VAR: &str = "array_data";

/// Per-frame exposure-time variable written alongside the frame data.
pub const FRAME_TIME_VAR: &str = "Attr_FrameTime";

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without loading the entire file
/// through a copy; the mapping is released on drop.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Path the reader was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A mapping-file reader for XRD frame stacks.
///
/// Each read is a single-shot transform: the container header is parsed
/// per call and the mapping plus all buffers are owned by that call, so
/// concurrent reads of independent paths never alias.
pub struct FrameFileReader {
    reader: MappedFileReader,
}

impl FrameFileReader {
    /// Opens a mapping file for reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = MappedFileReader::open(path)?;
        Ok(Self { reader })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.reader.len()
    }

    /// Parses the container header over the mapped bytes.
    ///
    /// # Errors
    /// Returns a format error if the file is not a classic container.
    pub fn container(&self) -> Result<Container<'_>> {
        Ok(Container::parse(self.reader.as_bytes())?)
    }

    /// Reads the detector frame stack stored under [`ARRAY_DATA_VAR`].
    ///
    /// Samples are narrowed to `u16` (truncating) before the shape is
    /// normalized: a 2-D image becomes a 1-frame stack, a 3-D variable
    /// keeps its shape.
    ///
    /// # Errors
    /// Returns [`Error::Format`] if the file is not a classic container,
    /// [`Error::MissingVariable`] if it lacks the frame variable, and
    /// [`Error::Core`] for a variable of unusable rank.
    pub fn read_frame_stack(&self) -> Result<FrameStack> {
        log::debug!("reading frame stack from {}", self.reader.path().display());

        let container = self.container()?;
        let var = container
            .variable(ARRAY_DATA_VAR)
            .ok_or_else(|| Error::MissingVariable(ARRAY_DATA_VAR.to_string()))?;

        // Cast first, then normalize dimensionality.
        let samples = container.read_variable(var)?.to_u16_truncated();
        let shape = container.variable_shape(var);
        let stack = FrameStack::from_samples(samples, &shape)?;

        log::debug!(
            "frame stack: {} frames of {}x{}",
            stack.frame_count(),
            stack.rows(),
            stack.cols()
        );
        Ok(stack)
    }

    /// Decodes every variable in the container, keyed by name.
    ///
    /// A thin pass-through over the variable registry: no shape
    /// normalization and no casting.
    ///
    /// # Errors
    /// Returns a format error if the file is not a classic container or
    /// a data slab is truncated.
    pub fn read_variables(&self) -> Result<BTreeMap<String, Values>> {
        Ok(self.container()?.read_all()?)
    }

    /// Reads the per-frame exposure times stored under
    /// [`FRAME_TIME_VAR`], widened to `f64`.
    ///
    /// # Errors
    /// Returns [`Error::MissingVariable`] if the acquisition did not
    /// record frame times.
    pub fn read_frame_times(&self) -> Result<Vec<f64>> {
        let container = self.container()?;
        let var = container
            .variable(FRAME_TIME_VAR)
            .ok_or_else(|| Error::MissingVariable(FRAME_TIME_VAR.to_string()))?;
        Ok(container.read_variable(var)?.to_f64())
    }
}

/// Reads the frame stack from a mapping file.
///
/// Convenience wrapper over [`FrameFileReader`]; the mapping is released
/// before this returns, on the success and every error path.
///
/// # Errors
/// See [`FrameFileReader::read_frame_stack`].
pub fn read_frame_stack<P: AsRef<Path>>(path: P) -> Result<FrameStack> {
    FrameFileReader::open(path)?.read_frame_stack()
}

/// Decodes every variable in a mapping file, keyed by name.
///
/// # Errors
/// See [`FrameFileReader::read_variables`].
pub fn read_variables<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Values>> {
    FrameFileReader::open(path)?.read_variables()
}

/// Reads per-frame exposure times from a mapping file.
///
/// # Errors
/// See [`FrameFileReader::read_frame_times`].
pub fn read_frame_times<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    FrameFileReader::open(path)?.read_frame_times()
}
