//! dBase III style `.dbf` tables: fixed 32-byte header, 32-byte field descriptors
//! closed by `0x0D`, fixed-width records, `0x1A` at the end of the file.
//!
//! [`decode`] and [`encode`] work on in-memory buffers only and never read the clock.
//! [`read_path`] and [`write_path`] are the thin file-system wrappers.

pub mod field;
pub mod header;
pub mod record;
mod table;
mod value;

use super::{Error, Result};
use bytes::Bytes;
use chrono::{Local, NaiveDate};
use std::{fs, path::Path};
use tracing::info;

pub use field::{FieldDescriptor, FieldType};
pub use header::Header;
pub use record::Record;
pub use table::Table;
pub use value::Value;

pub(crate) const DESCRIPTOR_SIZE: usize = 32;
pub(crate) const TERMINATOR: u8 = 0x0D;
pub(crate) const TERMINATOR_SIZE: usize = 1;
pub(crate) const EOF_MARKER: u8 = 0x1A;

/// What a numeric field holding only blanks decodes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlankNumeric {
    /// Zero, as most producers intend.
    #[default]
    Zero,
    /// `InvalidNumericField`.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub blank_numeric: BlankNumeric,
}

impl DecodeOptions {
    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            blank_numeric: BlankNumeric::Reject,
        }
    }
}

pub fn decode(buf: &[u8]) -> Result<Table> {
    decode_with(buf, &DecodeOptions::default())
}

pub fn decode_with(buf: &[u8], options: &DecodeOptions) -> Result<Table> {
    Table::decode(buf, options)
}

pub fn encode(table: &Table, last_updated: NaiveDate) -> Result<Bytes> {
    table.encode(last_updated)
}

pub fn read_path<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Table> {
    let buf = fs::read(path.as_ref())?;
    info!(path = %path.as_ref().display(), bytes = buf.len(), "read dbf file");
    decode_with(&buf, options)
}

/// Encodes with today's local date as the last-update date. Nothing is written when
/// encoding fails.
pub fn write_path<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    write_path_dated(table, path, Local::now().date_naive())
}

pub fn write_path_dated<P: AsRef<Path>>(
    table: &Table,
    path: P,
    last_updated: NaiveDate,
) -> Result<()> {
    let bytes = encode(table, last_updated)?;
    fs::write(path.as_ref(), &bytes).map_err(Error::from)?;
    info!(path = %path.as_ref().display(), bytes = bytes.len(), "wrote dbf file");
    Ok(())
}
