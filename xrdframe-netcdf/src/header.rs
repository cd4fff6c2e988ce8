//! Classic-format header model and parsing.
//!
//! Layout reference: the netCDF classic file format specification
//! (`magic numrecs dim_list gatt_list var_list`, all words big-endian,
//! names and value blocks padded to 4-byte boundaries).

use crate::types::{NcType, Values};
use crate::{Error, Result};
use serde::Serialize;

/// List tag for the dimension list.
const TAG_DIMENSION: u32 = 0x0A;
/// List tag for attribute lists.
const TAG_ATTRIBUTE: u32 = 0x0C;
/// List tag for the variable list.
const TAG_VARIABLE: u32 = 0x0B;

/// Record-count sentinel for files written in streaming mode.
pub(crate) const STREAMING: u32 = 0xFFFF_FFFF;

/// Container format version, from the byte after the `CDF` magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Version {
    /// CDF-1: 32-bit data offsets.
    Classic,
    /// CDF-2: 64-bit data offsets.
    Offset64,
}

impl Version {
    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(Version::Classic),
            2 => Ok(Version::Offset64),
            _ => Err(Error::UnsupportedVersion(byte)),
        }
    }
}

/// A named dimension; `is_record` marks the single unlimited dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    /// Dimension name.
    pub name: String,
    /// Fixed length; 0 for the record dimension.
    pub len: usize,
    /// True for the record (unlimited) dimension.
    pub is_record: bool,
}

/// A global or per-variable attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Decoded attribute values.
    pub values: Values,
}

/// A variable entry from the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Indices into the header's dimension list, slowest-varying first.
    pub dims: Vec<usize>,
    /// Per-variable attributes.
    pub attributes: Vec<Attribute>,
    /// External sample type.
    pub nc_type: NcType,
    /// True if the leading dimension is the record dimension.
    pub is_record: bool,
    /// Byte offset of the variable's data.
    pub begin: u64,
}

impl Variable {
    /// Samples per record for record variables, or total samples for
    /// fixed-size variables (record dimension excluded either way).
    #[must_use]
    pub fn samples_per_record(&self, dims: &[Dimension]) -> usize {
        self.dims
            .iter()
            .filter(|&&d| !dims[d].is_record)
            .map(|&d| dims[d].len)
            .product()
    }

    /// Unpadded bytes per record slab (or per fixed-size data block).
    #[must_use]
    pub fn slab_bytes(&self, dims: &[Dimension]) -> usize {
        self.samples_per_record(dims) * self.nc_type.sample_size()
    }
}

/// A parsed classic-format header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Container format version.
    pub version: Version,
    /// Record count word; [`STREAMING`] when written in streaming mode.
    pub(crate) num_records: u32,
    /// Dimension list.
    pub dimensions: Vec<Dimension>,
    /// Global attributes.
    pub attributes: Vec<Attribute>,
    /// Variable list.
    pub variables: Vec<Variable>,
}

impl Header {
    /// Parses the header at the start of `bytes`.
    ///
    /// # Errors
    /// Returns a format error for bad magic, unsupported versions,
    /// malformed lists, or truncation.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let magic = cursor.take(3)?;
        if magic != b"CDF" {
            return Err(Error::InvalidMagic);
        }
        let version = Version::from_byte(cursor.take(1)?[0])?;
        let num_records = cursor.read_u32()?;

        let dimensions = parse_dimensions(&mut cursor)?;
        if dimensions.iter().filter(|d| d.is_record).count() > 1 {
            return Err(Error::Parse("more than one record dimension".to_string()));
        }

        let attributes = parse_attributes(&mut cursor)?;
        let variables = parse_variables(&mut cursor, version, &dimensions)?;

        Ok(Self {
            version,
            num_records,
            dimensions,
            attributes,
            variables,
        })
    }

    /// Looks up a variable by exact name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

fn parse_dimensions(cursor: &mut Cursor<'_>) -> Result<Vec<Dimension>> {
    let count = cursor.read_list_header(TAG_DIMENSION)?;
    let mut dims = Vec::with_capacity(count);
    for _ in 0..count {
        let name = cursor.read_name()?;
        let len = cursor.read_non_negative("dimension length")?;
        dims.push(Dimension {
            name,
            len,
            is_record: len == 0,
        });
    }
    Ok(dims)
}

fn parse_attributes(cursor: &mut Cursor<'_>) -> Result<Vec<Attribute>> {
    let count = cursor.read_list_header(TAG_ATTRIBUTE)?;
    let mut attrs = Vec::with_capacity(count);
    for _ in 0..count {
        let name = cursor.read_name()?;
        let nc_type = NcType::from_code(cursor.read_i32()?)?;
        let nelems = cursor.read_non_negative("attribute length")?;
        let raw = cursor.take_padded(nelems * nc_type.sample_size())?;
        let values = crate::decode::decode_samples(raw, nc_type);
        attrs.push(Attribute { name, values });
    }
    Ok(attrs)
}

fn parse_variables(
    cursor: &mut Cursor<'_>,
    version: Version,
    dims: &[Dimension],
) -> Result<Vec<Variable>> {
    let count = cursor.read_list_header(TAG_VARIABLE)?;
    let mut vars = Vec::with_capacity(count);
    for _ in 0..count {
        let name = cursor.read_name()?;
        let ndims = cursor.read_non_negative("dimension count")?;
        let mut dim_ids = Vec::with_capacity(ndims);
        for _ in 0..ndims {
            let id = cursor.read_non_negative("dimension id")?;
            if id >= dims.len() {
                return Err(Error::Parse(format!(
                    "variable '{name}' references unknown dimension {id}"
                )));
            }
            dim_ids.push(id);
        }
        let attributes = parse_attributes(cursor)?;
        let nc_type = NcType::from_code(cursor.read_i32()?)?;
        // Stored vsize is advisory (and wrong for some writers); slab
        // sizes are recomputed from the dimensions instead.
        let _vsize = cursor.read_u32()?;
        let begin = match version {
            Version::Classic => u64::from(cursor.read_u32()?),
            Version::Offset64 => cursor.read_u64()?,
        };

        let is_record = dim_ids.first().is_some_and(|&d| dims[d].is_record);
        if dim_ids.iter().skip(1).any(|&d| dims[d].is_record) {
            return Err(Error::Parse(format!(
                "variable '{name}' uses the record dimension past position 0"
            )));
        }

        vars.push(Variable {
            name,
            dims: dim_ids,
            attributes,
            nc_type,
            is_record,
            begin,
        });
    }
    Ok(vars)
}

/// Big-endian word cursor over the header bytes.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.data.len().saturating_sub(self.pos);
        if available < n {
            return Err(Error::Truncated {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Takes `n` bytes plus the zero padding up to the next 4-byte boundary.
    fn take_padded(&mut self, n: usize) -> Result<&'a [u8]> {
        let slice = self.take(n)?;
        let pad = (4 - n % 4) % 4;
        self.take(pad)?;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_non_negative(&mut self, what: &str) -> Result<usize> {
        let v = self.read_i32()?;
        usize::try_from(v).map_err(|_| Error::Parse(format!("negative {what}: {v}")))
    }

    /// Reads a list header: either `ABSENT` (two zero words, yielding an
    /// empty list) or the expected tag followed by the element count.
    fn read_list_header(&mut self, expected: u32) -> Result<usize> {
        let tag = self.read_u32()?;
        let count = self.read_non_negative("list length")?;
        if tag == 0 {
            if count != 0 {
                return Err(Error::Parse(format!(
                    "untagged list with nonzero length {count}"
                )));
            }
            return Ok(0);
        }
        if tag != expected {
            return Err(Error::InvalidTag {
                expected,
                found: tag,
            });
        }
        Ok(count)
    }

    fn read_name(&mut self) -> Result<String> {
        let len = self.read_non_negative("name length")?;
        let raw = self.take_padded(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| Error::Parse("name is not valid UTF-8".to_string()))
    }
}
