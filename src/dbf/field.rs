use super::{header::HEADER_SIZE, Result, DESCRIPTOR_SIZE, TERMINATOR};
use crate::{utils, Error};
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::trace;

pub const MAX_NAME_LEN: usize = 10;
const NAME_SIZE: usize = MAX_NAME_LEN + 1;
const TYPE_OFFSET: usize = 11;
const LENGTH_OFFSET: usize = 16;
const STORAGE_OFFSET: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Character,
    Numeric,
    Logical,
    Date,
}

impl FieldType {
    pub fn new(code: u8) -> Option<Self> {
        match code {
            b'C' => Some(Self::Character),
            b'N' => Some(Self::Numeric),
            b'L' => Some(Self::Logical),
            b'D' => Some(Self::Date),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Character => b'C',
            Self::Numeric => b'N',
            Self::Logical => b'L',
            Self::Date => b'D',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Numeric => "numeric",
            Self::Logical => "logical",
            Self::Date => "date",
        }
    }

    /// Widths a field of this type may declare.
    pub fn lengths(&self) -> RangeInclusive<u8> {
        match self {
            Self::Character => 1..=254,
            Self::Numeric => 1..=20,
            Self::Logical => 1..=1,
            Self::Date => 8..=8,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code() as char)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    r#type: FieldType,
    length: u8,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, r#type: FieldType, length: u8) -> Result<Self> {
        let field = Self {
            name: name.into(),
            r#type,
            length,
        };
        field.validate()?;
        Ok(field)
    }

    pub fn character(name: impl Into<String>, length: u8) -> Result<Self> {
        Self::new(name, FieldType::Character, length)
    }

    pub fn numeric(name: impl Into<String>, length: u8) -> Result<Self> {
        Self::new(name, FieldType::Numeric, length)
    }

    pub fn logical(name: impl Into<String>) -> Result<Self> {
        Self::new(name, FieldType::Logical, 1)
    }

    pub fn date(name: impl Into<String>) -> Result<Self> {
        Self::new(name, FieldType::Date, 8)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn r#type(&self) -> FieldType {
        self.r#type
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    /// Bytes this field occupies in every record.
    pub fn storage_size(&self) -> usize {
        self.length as usize
    }

    /// Decodes the 32-byte descriptor starting at `offset`.
    pub fn decode(buf: &[u8], offset: usize) -> Result<Self> {
        let block = utils::take_32_bytes(buf, offset)
            .ok_or(Error::TruncatedDescriptorArray { offset: buf.len() })?;

        let raw_name = &block[..NAME_SIZE];
        let name_end = raw_name.iter().position(|&b| b == 0).unwrap_or(NAME_SIZE);
        let name = utils::latin1_to_string(utils::trim_fill(&raw_name[..name_end]));

        let code = block[TYPE_OFFSET];
        let r#type = FieldType::new(code).ok_or(Error::UnknownFieldType {
            code,
            offset: offset + TYPE_OFFSET,
        })?;

        Self::new(name, r#type, block[LENGTH_OFFSET])
    }

    pub fn encode(&self) -> Result<[u8; DESCRIPTOR_SIZE]> {
        self.validate()?;

        let mut out = [0u8; DESCRIPTOR_SIZE];
        out[..self.name.len()].copy_from_slice(self.name.as_bytes());
        out[TYPE_OFFSET] = self.r#type.code();
        out[LENGTH_OFFSET] = self.length;
        out[STORAGE_OFFSET] = self.storage_size() as u8;
        Ok(out)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason| Error::InvalidFieldName {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if !self.name.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(invalid("name must be printable ASCII without spaces"));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(Error::FieldNameTooLong {
                name: self.name.clone(),
            });
        }
        if !self.r#type.lengths().contains(&self.length) {
            return Err(Error::InvalidFieldLength {
                name: self.name.clone(),
                length: self.length,
            });
        }
        Ok(())
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}({})", self.name, self.r#type, self.length)
    }
}

/// Reads descriptors from the end of the fixed header up to the terminator byte.
pub fn decode_descriptors(buf: &[u8]) -> Result<Vec<FieldDescriptor>> {
    let mut fields = vec![];
    let mut offset = HEADER_SIZE;

    loop {
        match buf.get(offset) {
            None => return Err(Error::TruncatedDescriptorArray { offset: buf.len() }),
            Some(&TERMINATOR) => break,
            Some(_) => {
                let field = FieldDescriptor::decode(buf, offset)?;
                trace!(offset, %field, "decoded field descriptor");
                fields.push(field);
                offset += DESCRIPTOR_SIZE;
            }
        }
    }

    check_unique(&fields)?;
    Ok(fields)
}

/// Descriptors in table order followed by the terminator.
pub fn encode_descriptors(fields: &[FieldDescriptor]) -> Result<Bytes> {
    check_unique(fields)?;

    let mut buf = BytesMut::with_capacity(DESCRIPTOR_SIZE * fields.len() + 1);
    for field in fields {
        buf.put_slice(&field.encode()?);
    }
    buf.put_u8(TERMINATOR);
    Ok(buf.freeze())
}

pub(super) fn check_unique(fields: &[FieldDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    match fields.iter().find(|f| !seen.insert(f.name())) {
        Some(dup) => Err(Error::DuplicateFieldName {
            name: dup.name.clone(),
        }),
        None => Ok(()),
    }
}
