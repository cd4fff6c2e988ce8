//! Parsed container handle with the variable-name-keyed registry.

use crate::decode::{decode_samples, decode_slabs};
use crate::header::{Header, Variable};
use crate::types::Values;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// A parsed classic container over a borrowed byte image.
///
/// Holds the parsed header plus the file bytes; variable data is decoded
/// on demand. The record count is resolved at parse time, including the
/// streaming sentinel (derived from the file length).
#[derive(Debug)]
pub struct Container<'a> {
    header: Header,
    bytes: &'a [u8],
    num_records: usize,
    record_stride: usize,
}

impl<'a> Container<'a> {
    /// Parses a container from a complete file image.
    ///
    /// # Errors
    /// Returns a format error if the bytes are not a classic netCDF
    /// container.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let header = Header::parse(bytes)?;

        let record_vars: Vec<&Variable> =
            header.variables.iter().filter(|v| v.is_record).collect();
        let record_stride = match record_vars.as_slice() {
            [] => 0,
            // A lone record variable is laid out without per-record padding.
            [only] => only.slab_bytes(&header.dimensions),
            many => many
                .iter()
                .map(|v| pad4(v.slab_bytes(&header.dimensions)))
                .sum(),
        };

        let num_records = if header.num_records == crate::header::STREAMING {
            derive_streaming_records(bytes.len(), &record_vars, record_stride)
        } else {
            header.num_records as usize
        };

        log::debug!(
            "parsed classic container: {} dims, {} vars, {} records",
            header.dimensions.len(),
            header.variables.len(),
            num_records
        );

        Ok(Self {
            header,
            bytes,
            num_records,
            record_stride,
        })
    }

    /// The parsed header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Resolved record count.
    #[must_use]
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// Looks up a variable by exact name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.header.variable(name)
    }

    /// Returns true if the registry holds a variable with this name.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    /// Variable names in header order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.header.variables.iter().map(|v| v.name.as_str())
    }

    /// The stored shape of a variable, with the record dimension resolved
    /// to the record count.
    #[must_use]
    pub fn variable_shape(&self, var: &Variable) -> Vec<usize> {
        var.dims
            .iter()
            .map(|&d| {
                let dim = &self.header.dimensions[d];
                if dim.is_record {
                    self.num_records
                } else {
                    dim.len
                }
            })
            .collect()
    }

    /// Decodes a variable's full contents as a dense sample vector.
    ///
    /// `var` must come from this container's registry.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if the data section ends before the
    /// variable's slabs.
    pub fn read_variable(&self, var: &Variable) -> Result<Values> {
        let begin = usize::try_from(var.begin).map_err(|_| Error::Truncated {
            offset: self.bytes.len(),
            needed: 0,
            available: 0,
        })?;

        if !var.is_record {
            let slab = var.slab_bytes(&self.header.dimensions);
            let data = self.slice(begin, slab)?;
            return Ok(decode_samples(data, var.nc_type));
        }

        let slab = var.slab_bytes(&self.header.dimensions);
        let mut slabs = Vec::with_capacity(self.num_records);
        for record in 0..self.num_records {
            let offset = record
                .checked_mul(self.record_stride)
                .and_then(|o| o.checked_add(begin))
                .ok_or(Error::Truncated {
                    offset: begin,
                    needed: slab,
                    available: 0,
                })?;
            slabs.push(self.slice(offset, slab)?);
        }
        Ok(decode_slabs(&slabs, var.nc_type))
    }

    /// Decodes every variable, keyed by name: the raw registry
    /// pass-through with no shape normalization and no casting.
    ///
    /// # Errors
    /// Returns the first decoding error encountered.
    pub fn read_all(&self) -> Result<BTreeMap<String, Values>> {
        self.header
            .variables
            .iter()
            .map(|v| Ok((v.name.clone(), self.read_variable(v)?)))
            .collect()
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(Error::Truncated {
            offset,
            needed: len,
            available: 0,
        })?;
        self.bytes.get(offset..end).ok_or(Error::Truncated {
            offset,
            needed: len,
            available: self.bytes.len().saturating_sub(offset),
        })
    }
}

/// Streaming-mode files carry no record count; it follows from how many
/// whole records fit between the first record slab and end-of-file.
fn derive_streaming_records(
    file_len: usize,
    record_vars: &[&Variable],
    record_stride: usize,
) -> usize {
    if record_vars.is_empty() || record_stride == 0 {
        return 0;
    }
    let data_start = record_vars
        .iter()
        .map(|v| usize::try_from(v.begin).unwrap_or(usize::MAX))
        .min()
        .unwrap_or(file_len);
    file_len.saturating_sub(data_start) / record_stride
}

fn pad4(n: usize) -> usize {
    n.div_ceil(4) * 4
}
