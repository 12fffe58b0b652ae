use super::{header::record_length_for, DecodeOptions, FieldDescriptor, Header, Result, Value};
use crate::{err, malformed, utils, Error};
use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

pub const ACTIVE: u8 = b' ';
pub const DELETED: u8 = b'*';

/// Field values keyed by name, kept in table order once the record belongs to a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    deleted: bool,
    values: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn deleted(self) -> Self {
        Self {
            deleted: true,
            ..self
        }
    }

    /// Returns the previous value when `name` was already present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.values.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks that the keys are exactly the field names and every value has its field's
    /// type, then puts the values in field order.
    pub(super) fn conform(self, fields: &[FieldDescriptor], index: usize) -> Result<Self> {
        self.check(fields, index)?;

        let Self { deleted, mut values } = self;
        let mut ordered = Vec::with_capacity(fields.len());
        for field in fields {
            let pos = values
                .iter()
                .position(|(n, _)| n == field.name())
                .ok_or_else(|| missing(field, index))?;
            ordered.push(values.swap_remove(pos));
        }
        Ok(Self {
            deleted,
            values: ordered,
        })
    }

    fn check(&self, fields: &[FieldDescriptor], index: usize) -> Result<()> {
        if let Some((name, _)) = self
            .values
            .iter()
            .find(|(n, _)| !fields.iter().any(|f| f.name() == n))
        {
            return Err(Error::RecordFieldMismatch {
                record: index,
                reason: format!("unknown field {name:?}"),
            });
        }

        for field in fields {
            let value = self.get(field.name()).ok_or_else(|| missing(field, index))?;
            if value.r#type() != field.r#type() {
                return Err(Error::TypeMismatch {
                    record: index,
                    field: field.name().to_string(),
                    expected: field.r#type().name(),
                });
            }
            // padding is stripped on decode, so it cannot be part of a value
            if value.as_str().is_some_and(|s| !utils::is_trimmed(s)) {
                return Err(Error::UntrimmedCharacter {
                    record: index,
                    field: field.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn decode(
        fields: &[FieldDescriptor],
        window: &[u8],
        offset: usize,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let deleted = match window[0] {
            ACTIVE => false,
            DELETED => true,
            byte => return Err(Error::InvalidDeletionFlag { byte, offset }),
        };

        let mut values = Vec::with_capacity(fields.len());
        let mut pos = 1;
        for field in fields {
            let width = field.storage_size();
            let value = Value::decode(field, &window[pos..pos + width], offset + pos, options)?;
            values.push((field.name().to_string(), value));
            pos += width;
        }

        Ok(Self { deleted, values })
    }

    fn encode(&self, fields: &[FieldDescriptor], index: usize, out: &mut BytesMut) -> Result<()> {
        out.put_u8(if self.deleted { DELETED } else { ACTIVE });
        for field in fields {
            let value = self.get(field.name()).ok_or_else(|| missing(field, index))?;
            value.encode(field, index, out)?;
        }
        Ok(())
    }
}

fn missing(field: &FieldDescriptor, index: usize) -> Error {
    Error::RecordFieldMismatch {
        record: index,
        reason: format!("missing field {:?}", field.name()),
    }
}

/// Reads `header.record_count` records starting at `header.header_length`.
pub fn decode_records(
    buf: &[u8],
    fields: &[FieldDescriptor],
    header: &Header,
    options: &DecodeOptions,
) -> Result<Vec<Record>> {
    let record_length = header.record_length as usize;
    let needed = record_length_for(fields);
    if record_length < needed {
        return Err(malformed!(
            10,
            "record length {record_length} is below the {needed} bytes the fields need"
        ));
    }

    let start = header.header_length as usize;
    let count = header.record_count as usize;
    count
        .checked_mul(record_length)
        .and_then(|len| len.checked_add(start))
        .ok_or_else(|| err!("record area of {count} x {record_length} bytes overflows"))?;

    debug!(count, record_length, start, "decoding records");

    // the declared count is untrusted until the bytes are there
    let mut records = Vec::with_capacity(count.min(buf.len() / record_length));
    for i in 0..count {
        let offset = start + i * record_length;
        let window = utils::take_n_bytes(buf, offset, record_length)
            .ok_or(Error::TruncatedRecordArea { offset: buf.len() })?;
        let record = Record::decode(fields, window, offset, options)?;
        trace!(index = i, deleted = record.deleted, "decoded record");
        records.push(record);
    }
    Ok(records)
}

/// Every record is fully encoded before the buffer is handed back.
pub fn encode_records(records: &[Record], fields: &[FieldDescriptor]) -> Result<BytesMut> {
    let record_length = record_length_for(fields);
    let mut out = BytesMut::with_capacity(record_length * records.len());

    for (index, record) in records.iter().enumerate() {
        record.check(fields, index)?;
        record.encode(fields, index, &mut out)?;
    }

    debug!(count = records.len(), record_length, "encoded records");
    Ok(out)
}
