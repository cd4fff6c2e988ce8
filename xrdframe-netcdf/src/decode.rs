//! Big-endian sample decoding for header values and data slabs.

use crate::types::{NcType, Values};
use rayon::prelude::*;

/// Below this many samples the parallel path costs more than it saves.
const PARALLEL_MIN_SAMPLES: usize = 1 << 20;

/// Decodes one contiguous block of samples.
///
/// `bytes` must be an exact multiple of the sample size; callers slice
/// the block out of the file with that guarantee.
pub(crate) fn decode_samples(bytes: &[u8], nc_type: NcType) -> Values {
    decode_slabs(&[bytes], nc_type)
}

/// Decodes a sequence of slabs (one per record) into a single vector.
///
/// Large inputs fan out across slabs with rayon; the result is identical
/// to the sequential path.
pub(crate) fn decode_slabs(slabs: &[&[u8]], nc_type: NcType) -> Values {
    match nc_type {
        NcType::Byte => Values::Byte(convert(slabs, 1, |b| i8::from_be_bytes([b[0]]))),
        NcType::Char => Values::Char(slabs.concat()),
        NcType::Short => Values::Short(convert(slabs, 2, |b| {
            i16::from_be_bytes(b.try_into().unwrap())
        })),
        NcType::Int => Values::Int(convert(slabs, 4, |b| {
            i32::from_be_bytes(b.try_into().unwrap())
        })),
        NcType::Float => Values::Float(convert(slabs, 4, |b| {
            f32::from_be_bytes(b.try_into().unwrap())
        })),
        NcType::Double => Values::Double(convert(slabs, 8, |b| {
            f64::from_be_bytes(b.try_into().unwrap())
        })),
    }
}

fn convert<T, F>(slabs: &[&[u8]], width: usize, conv: F) -> Vec<T>
where
    T: Send,
    F: Fn(&[u8]) -> T + Sync,
{
    let total: usize = slabs.iter().map(|s| s.len() / width).sum();
    if total >= PARALLEL_MIN_SAMPLES && slabs.len() > 1 {
        slabs
            .par_iter()
            .flat_map_iter(|slab| slab.chunks_exact(width).map(&conv))
            .collect()
    } else {
        slabs
            .iter()
            .flat_map(|slab| slab.chunks_exact(width).map(&conv))
            .collect()
    }
}
