use super::{field::FieldDescriptor, Result, DESCRIPTOR_SIZE, TERMINATOR_SIZE};
use crate::{err, malformed, Error};
use bytes::{Buf, BufMut};
use chrono::{Datelike, NaiveDate};
use tracing::warn;

pub const HEADER_SIZE: usize = 32;

/// dBase III without memo.
pub const DEFAULT_VERSION: u8 = 0x03;

pub(crate) const MEMO_FLAG: u8 = 0x80;
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = MIN_YEAR + u8::MAX as i32;

/// The fixed 32-byte block at the start of every `.dbf` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    /// `None` when the stored bytes are not a calendar date (some producers write zeros).
    pub last_updated: Option<NaiveDate>,
    pub record_count: u32,
    pub header_length: u16,
    pub record_length: u16,
}

impl Header {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let block = buf
            .get(..HEADER_SIZE)
            .ok_or_else(|| malformed!(buf.len(), "expected {HEADER_SIZE} bytes"))?;

        let mut cursor = block;
        let version = cursor.get_u8();
        let (year, month, day) = (cursor.get_u8(), cursor.get_u8(), cursor.get_u8());
        let record_count = cursor.get_u32_le();
        let header_length = cursor.get_u16_le();
        let record_length = cursor.get_u16_le();

        let last_updated =
            NaiveDate::from_ymd_opt(MIN_YEAR + year as i32, month as u32, day as u32);
        if last_updated.is_none() {
            warn!(year, month, day, "header carries no valid last-update date");
        }
        if version & MEMO_FLAG != 0 {
            warn!(version, "memo flag set; memo fields are not supported");
        }

        let min_header_length = HEADER_SIZE + TERMINATOR_SIZE;
        if (header_length as usize) < min_header_length {
            return Err(malformed!(
                8,
                "header length {header_length} is below {min_header_length}"
            ));
        }
        if record_length == 0 {
            return Err(malformed!(10, "record length is zero"));
        }

        Ok(Self {
            version,
            last_updated,
            record_count,
            header_length,
            record_length,
        })
    }

    /// Derives a header from the table layout. Nothing is copied from a previously
    /// decoded header except what the caller passes in.
    pub fn for_table(
        version: u8,
        last_updated: NaiveDate,
        fields: &[FieldDescriptor],
        record_count: usize,
    ) -> Result<Self> {
        check_year(last_updated)?;

        let record_count = u32::try_from(record_count)
            .map_err(|_| err!("{record_count} records do not fit in a dbf header"))?;
        let header_length = u16::try_from(header_length_for(fields))
            .map_err(|_| err!("{} fields do not fit in a dbf header", fields.len()))?;
        let record_length = u16::try_from(record_length_for(fields))
            .map_err(|_| err!("record length exceeds {} bytes", u16::MAX))?;

        Ok(Self {
            version,
            last_updated: Some(last_updated),
            record_count,
            header_length,
            record_length,
        })
    }

    pub fn encode(&self) -> Result<[u8; HEADER_SIZE]> {
        let (year, month, day) = match self.last_updated {
            Some(date) => {
                check_year(date)?;
                ((date.year() - MIN_YEAR) as u8, date.month() as u8, date.day() as u8)
            }
            None => (0, 0, 0),
        };

        let mut out = [0u8; HEADER_SIZE];
        let mut w = &mut out[..];
        w.put_u8(self.version);
        w.put_u8(year);
        w.put_u8(month);
        w.put_u8(day);
        w.put_u32_le(self.record_count);
        w.put_u16_le(self.header_length);
        w.put_u16_le(self.record_length);
        // 12..32 stay zero
        Ok(out)
    }
}

pub fn header_length_for(fields: &[FieldDescriptor]) -> usize {
    HEADER_SIZE + DESCRIPTOR_SIZE * fields.len() + TERMINATOR_SIZE
}

pub fn record_length_for(fields: &[FieldDescriptor]) -> usize {
    1 + fields.iter().map(FieldDescriptor::storage_size).sum::<usize>()
}

fn check_year(date: NaiveDate) -> Result<()> {
    let year = date.year();
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(Error::UnrepresentableYear(year))
    }
}
