//! Intensity statistics over frames.

use crate::frame::FrameStack;
use crate::Result;
use ndarray::ArrayView2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Intensity statistics for a frame or a whole stack.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameStats {
    /// Smallest sample value.
    pub min: u16,
    /// Largest sample value.
    pub max: u16,
    /// Arithmetic mean of all samples.
    pub mean: f64,
    /// Number of nonzero samples.
    pub nonzero: usize,
}

impl FrameStats {
    /// Computes statistics over a single frame view.
    ///
    /// An empty frame yields all-zero statistics.
    #[must_use]
    pub fn from_view(view: ArrayView2<'_, u16>) -> Self {
        Self::from_samples(view.iter().copied())
    }

    fn from_samples<I: Iterator<Item = u16>>(samples: I) -> Self {
        let mut min = u16::MAX;
        let mut max = u16::MIN;
        let mut sum = 0u64;
        let mut count = 0usize;
        let mut nonzero = 0usize;

        for v in samples {
            min = min.min(v);
            max = max.max(v);
            sum += u64::from(v);
            count += 1;
            if v != 0 {
                nonzero += 1;
            }
        }

        if count == 0 {
            return Self {
                min: 0,
                max: 0,
                mean: 0.0,
                nonzero: 0,
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = sum as f64 / count as f64;
        Self {
            min,
            max,
            mean,
            nonzero,
        }
    }
}

impl FrameStack {
    /// Computes statistics for one frame.
    ///
    /// # Errors
    /// Returns [`crate::Error::FrameOutOfRange`] if `index` is past the
    /// last frame.
    pub fn frame_stats(&self, index: usize) -> Result<FrameStats> {
        Ok(FrameStats::from_view(self.frame(index)?))
    }

    /// Computes statistics over every sample in the stack.
    #[must_use]
    pub fn stack_stats(&self) -> FrameStats {
        FrameStats::from_samples(self.as_array().iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_stats() {
        let stack = FrameStack::from_samples(vec![0, 1, 2, 3], &[1, 2, 2]).unwrap();
        let stats = stack.frame_stats(0).unwrap();
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 3);
        assert_eq!(stats.nonzero, 3);
        assert_relative_eq!(stats.mean, 1.5);
    }

    #[test]
    fn test_stack_stats_spans_frames() {
        let stack = FrameStack::from_samples(vec![10, 10, 0, 20], &[2, 1, 2]).unwrap();
        let stats = stack.stack_stats();
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 20);
        assert_eq!(stats.nonzero, 3);
        assert_relative_eq!(stats.mean, 10.0);
    }

    #[test]
    fn test_empty_frame_stats() {
        let stack = FrameStack::from_samples(vec![], &[0, 4, 4]).unwrap();
        let stats = stack.stack_stats();
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 0);
        assert_eq!(stats.nonzero, 0);
        assert_relative_eq!(stats.mean, 0.0);
    }
}
