//! Minimal classic-format encoder.
//!
//! Produces well-formed CDF-1/CDF-2 byte images for round-trip tests and
//! fixture generation. Covers the subset the parser reads: dimensions,
//! global attributes, fixed-size and record variables.

use crate::header::Version;
use crate::types::Values;
use crate::{Error, Result};

/// Identifies a dimension added to a [`ClassicBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimId(usize);

struct BuilderDim {
    name: String,
    len: usize,
    is_record: bool,
}

struct BuilderVar {
    name: String,
    dims: Vec<usize>,
    values: Values,
}

/// Builder for classic container byte images.
pub struct ClassicBuilder {
    version: Version,
    dims: Vec<BuilderDim>,
    attrs: Vec<(String, Values)>,
    vars: Vec<BuilderVar>,
}

impl ClassicBuilder {
    /// Starts a CDF-1 (32-bit offset) container.
    #[must_use]
    pub fn classic() -> Self {
        Self::with_version(Version::Classic)
    }

    /// Starts a CDF-2 (64-bit offset) container.
    #[must_use]
    pub fn offset64() -> Self {
        Self::with_version(Version::Offset64)
    }

    fn with_version(version: Version) -> Self {
        Self {
            version,
            dims: Vec::new(),
            attrs: Vec::new(),
            vars: Vec::new(),
        }
    }

    /// Adds a fixed dimension.
    pub fn dimension(&mut self, name: &str, len: usize) -> DimId {
        self.dims.push(BuilderDim {
            name: name.to_string(),
            len,
            is_record: false,
        });
        DimId(self.dims.len() - 1)
    }

    /// Adds the record (unlimited) dimension.
    pub fn record_dimension(&mut self, name: &str) -> DimId {
        self.dims.push(BuilderDim {
            name: name.to_string(),
            len: 0,
            is_record: true,
        });
        DimId(self.dims.len() - 1)
    }

    /// Adds a global attribute.
    pub fn global_attribute(&mut self, name: &str, values: Values) -> &mut Self {
        self.attrs.push((name.to_string(), values));
        self
    }

    /// Adds a variable with its complete data (all records, for record
    /// variables).
    pub fn variable(&mut self, name: &str, dims: &[DimId], values: Values) -> &mut Self {
        self.vars.push(BuilderVar {
            name: name.to_string(),
            dims: dims.iter().map(|d| d.0).collect(),
            values,
        });
        self
    }

    /// Encodes the container.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] if variable data lengths disagree with
    /// their dimensions or record variables imply different record counts.
    pub fn build(&self) -> Result<Vec<u8>> {
        let num_records = self.resolve_record_count()?;

        // Per-variable layout: samples per record and unpadded slab bytes.
        let layouts: Vec<(bool, usize, usize)> = self
            .vars
            .iter()
            .map(|v| {
                let is_record = v
                    .dims
                    .first()
                    .is_some_and(|&d| self.dims[d].is_record);
                let spr: usize = v
                    .dims
                    .iter()
                    .filter(|&&d| !self.dims[d].is_record)
                    .map(|&d| self.dims[d].len)
                    .product();
                (is_record, spr, spr * v.values.nc_type().sample_size())
            })
            .collect();

        let record_var_count = layouts.iter().filter(|l| l.0).count();

        // Header with zeroed begin fields first, then patch the offsets.
        let mut header = Vec::new();
        header.extend_from_slice(b"CDF");
        header.push(match self.version {
            Version::Classic => 1,
            Version::Offset64 => 2,
        });
        put_u32(&mut header, u32::try_from(num_records).unwrap_or(0));

        self.put_dim_list(&mut header);
        self.put_attr_list(&mut header)?;
        let begin_fields = self.put_var_list(&mut header);

        let mut offset = header.len();
        let mut begins = vec![0u64; self.vars.len()];

        for (i, layout) in layouts.iter().enumerate() {
            if !layout.0 {
                begins[i] = offset as u64;
                offset += pad4(layout.2);
            }
        }
        for (i, layout) in layouts.iter().enumerate() {
            if layout.0 {
                begins[i] = offset as u64;
                offset += if record_var_count == 1 {
                    layout.2
                } else {
                    pad4(layout.2)
                };
            }
        }

        for (i, &field_pos) in begin_fields.iter().enumerate() {
            patch_begin(&mut header, field_pos, begins[i], self.version);
        }

        // Fixed-size data section.
        let mut out = header;
        for (var, layout) in self.vars.iter().zip(&layouts) {
            if !layout.0 {
                let before = out.len();
                put_values(&mut out, &var.values, 0, var.values.len())?;
                pad_to_4(&mut out, before);
            }
        }

        // Record data section: records interleaved across record variables.
        for record in 0..num_records {
            for (var, layout) in self.vars.iter().zip(&layouts) {
                if layout.0 {
                    let before = out.len();
                    put_values(&mut out, &var.values, record * layout.1, layout.1)?;
                    if record_var_count > 1 {
                        pad_to_4(&mut out, before);
                    }
                }
            }
        }

        Ok(out)
    }

    fn resolve_record_count(&self) -> Result<usize> {
        let mut count: Option<usize> = None;
        for var in &self.vars {
            let is_record = var
                .dims
                .first()
                .is_some_and(|&d| self.dims[d].is_record);
            let spr: usize = var
                .dims
                .iter()
                .filter(|&&d| !self.dims[d].is_record)
                .map(|&d| self.dims[d].len)
                .product();

            if is_record {
                if spr == 0 {
                    return Err(Error::Parse(format!(
                        "record variable '{}' has a zero-sized slab",
                        var.name
                    )));
                }
                if !var.values.len().is_multiple_of(spr) {
                    return Err(Error::Parse(format!(
                        "variable '{}' data length {} is not a whole number of records",
                        var.name,
                        var.values.len()
                    )));
                }
                let records = var.values.len() / spr;
                if let Some(expected) = count {
                    if records != expected {
                        return Err(Error::Parse(format!(
                            "variable '{}' implies {records} records, expected {expected}",
                            var.name
                        )));
                    }
                } else {
                    count = Some(records);
                }
            } else if var.values.len() != spr {
                return Err(Error::Parse(format!(
                    "variable '{}' data length {} does not match its dimensions",
                    var.name,
                    var.values.len()
                )));
            }
        }
        Ok(count.unwrap_or(0))
    }

    fn put_dim_list(&self, out: &mut Vec<u8>) {
        if self.dims.is_empty() {
            put_u32(out, 0);
            put_u32(out, 0);
            return;
        }
        put_u32(out, 0x0A);
        put_u32(out, self.dims.len() as u32);
        for dim in &self.dims {
            put_name(out, &dim.name);
            put_u32(out, dim.len as u32);
        }
    }

    fn put_attr_list(&self, out: &mut Vec<u8>) -> Result<()> {
        if self.attrs.is_empty() {
            put_u32(out, 0);
            put_u32(out, 0);
            return Ok(());
        }
        put_u32(out, 0x0C);
        put_u32(out, self.attrs.len() as u32);
        for (name, values) in &self.attrs {
            put_name(out, name);
            put_u32(out, values.nc_type().code() as u32);
            put_u32(out, values.len() as u32);
            let before = out.len();
            put_values(out, values, 0, values.len())?;
            pad_to_4(out, before);
        }
        Ok(())
    }

    /// Writes the variable list; returns the byte position of each
    /// variable's begin field for later patching.
    fn put_var_list(&self, out: &mut Vec<u8>) -> Vec<usize> {
        let mut begin_fields = Vec::with_capacity(self.vars.len());
        if self.vars.is_empty() {
            put_u32(out, 0);
            put_u32(out, 0);
            return begin_fields;
        }
        put_u32(out, 0x0B);
        put_u32(out, self.vars.len() as u32);
        for var in &self.vars {
            put_name(out, &var.name);
            put_u32(out, var.dims.len() as u32);
            for &d in &var.dims {
                put_u32(out, d as u32);
            }
            // No per-variable attributes in fixtures.
            put_u32(out, 0);
            put_u32(out, 0);
            put_u32(out, var.values.nc_type().code() as u32);
            let spr: usize = var
                .dims
                .iter()
                .filter(|&&d| !self.dims[d].is_record)
                .map(|&d| self.dims[d].len)
                .product();
            put_u32(
                out,
                pad4(spr * var.values.nc_type().sample_size()) as u32,
            );
            begin_fields.push(out.len());
            match self.version {
                Version::Classic => put_u32(out, 0),
                Version::Offset64 => out.extend_from_slice(&0u64.to_be_bytes()),
            }
        }
        begin_fields
    }
}

fn pad4(n: usize) -> usize {
    n.div_ceil(4) * 4
}

fn patch_begin(header: &mut [u8], pos: usize, begin: u64, version: Version) {
    match version {
        Version::Classic => {
            let word = u32::try_from(begin).unwrap_or(u32::MAX);
            header[pos..pos + 4].copy_from_slice(&word.to_be_bytes());
        }
        Version::Offset64 => {
            header[pos..pos + 8].copy_from_slice(&begin.to_be_bytes());
        }
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_name(out: &mut Vec<u8>, name: &str) {
    put_u32(out, name.len() as u32);
    let before = out.len();
    out.extend_from_slice(name.as_bytes());
    pad_to_4(out, before);
}

fn pad_to_4(out: &mut Vec<u8>, since: usize) {
    let written = out.len() - since;
    for _ in 0..(4 - written % 4) % 4 {
        out.push(0);
    }
}

fn put_values(out: &mut Vec<u8>, values: &Values, start: usize, count: usize) -> Result<()> {
    let end = start + count;
    if end > values.len() {
        return Err(Error::Parse(format!(
            "sample range {start}..{end} out of bounds ({} samples)",
            values.len()
        )));
    }
    match values {
        Values::Byte(v) => {
            for &s in &v[start..end] {
                out.extend_from_slice(&s.to_be_bytes());
            }
        }
        Values::Char(v) => out.extend_from_slice(&v[start..end]),
        Values::Short(v) => {
            for &s in &v[start..end] {
                out.extend_from_slice(&s.to_be_bytes());
            }
        }
        Values::Int(v) => {
            for &s in &v[start..end] {
                out.extend_from_slice(&s.to_be_bytes());
            }
        }
        Values::Float(v) => {
            for &s in &v[start..end] {
                out.extend_from_slice(&s.to_be_bytes());
            }
        }
        Values::Double(v) => {
            for &s in &v[start..end] {
                out.extend_from_slice(&s.to_be_bytes());
            }
        }
    }
    Ok(())
}
