//! Frame-stack types for detector image data.

use crate::{Error, Result};
use ndarray::{Array3, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shape of a frame stack: frame count and the detector's row/column extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameShape {
    /// Number of frames in the stack.
    pub frames: usize,
    /// Detector rows per frame.
    pub rows: usize,
    /// Detector columns per frame.
    pub cols: usize,
}

impl FrameShape {
    /// Creates a new frame-stack shape.
    #[inline]
    #[must_use]
    pub fn new(frames: usize, rows: usize, cols: usize) -> Self {
        Self { frames, rows, cols }
    }

    /// Total number of samples in the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames * self.rows * self.cols
    }

    /// Returns true if the stack holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A stack of 2-D detector frames, indexed as (frame, row, column).
///
/// The rank is always exactly 3: a source holding a single 2-D image is
/// promoted to a 1-frame stack at construction. Samples are unsigned
/// 16-bit detector counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStack {
    data: Array3<u16>,
}

impl FrameStack {
    /// Wraps an already 3-D array as a frame stack.
    #[must_use]
    pub fn new(data: Array3<u16>) -> Self {
        Self { data }
    }

    /// Builds a frame stack from a flat sample buffer and its stored
    /// dimensionality.
    ///
    /// A 2-D `(rows, cols)` source is reinterpreted as a 1-frame stack;
    /// a 3-D `(frames, rows, cols)` source keeps its shape.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRank`] for any other rank, and
    /// [`Error::ShapeMismatch`] if the buffer length does not match the
    /// declared dimensions.
    pub fn from_samples(samples: Vec<u16>, dims: &[usize]) -> Result<Self> {
        let shape = match *dims {
            [rows, cols] => FrameShape::new(1, rows, cols),
            [frames, rows, cols] => FrameShape::new(frames, rows, cols),
            _ => return Err(Error::InvalidRank(dims.len())),
        };

        if samples.len() != shape.len() {
            return Err(Error::ShapeMismatch {
                frames: shape.frames,
                rows: shape.rows,
                cols: shape.cols,
                actual: samples.len(),
            });
        }

        let data = Array3::from_shape_vec((shape.frames, shape.rows, shape.cols), samples)
            .map_err(|_| Error::ShapeMismatch {
                frames: shape.frames,
                rows: shape.rows,
                cols: shape.cols,
                actual: shape.len(),
            })?;

        Ok(Self { data })
    }

    /// Returns the stack shape.
    #[must_use]
    pub fn shape(&self) -> FrameShape {
        let (frames, rows, cols) = self.data.dim();
        FrameShape::new(frames, rows, cols)
    }

    /// Number of frames in the stack.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.data.dim().0
    }

    /// Detector rows per frame.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.data.dim().1
    }

    /// Detector columns per frame.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.data.dim().2
    }

    /// Returns a view of one frame.
    ///
    /// # Errors
    /// Returns [`Error::FrameOutOfRange`] if `index` is past the last frame.
    pub fn frame(&self, index: usize) -> Result<ArrayView2<'_, u16>> {
        if index >= self.frame_count() {
            return Err(Error::FrameOutOfRange {
                index,
                frames: self.frame_count(),
            });
        }
        Ok(self.data.index_axis(Axis(0), index))
    }

    /// Iterates over the frames in stack order.
    pub fn frames(&self) -> impl Iterator<Item = ArrayView2<'_, u16>> {
        self.data.outer_iter()
    }

    /// Borrows the underlying 3-D array.
    #[must_use]
    pub fn as_array(&self) -> &Array3<u16> {
        &self.data
    }

    /// Consumes the stack, returning the underlying 3-D array.
    #[must_use]
    pub fn into_array(self) -> Array3<u16> {
        self.data
    }
}
