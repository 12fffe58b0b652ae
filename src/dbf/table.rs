use super::{
    field::{self, check_unique},
    header::{Header, DEFAULT_VERSION, MEMO_FLAG},
    record, DecodeOptions, FieldDescriptor, Record, Result, EOF_MARKER,
};
use bytes::{BufMut, Bytes, BytesMut};
use chrono::NaiveDate;
use tracing::debug;

/// An in-memory dBase table. The header written on encode is always derived from
/// the fields and records.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    version: u8,
    fields: Vec<FieldDescriptor>,
    records: Vec<Record>,
    decoded_header: Option<Header>,
}

impl Table {
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        check_unique(&fields)?;
        Ok(Self {
            version: DEFAULT_VERSION,
            fields,
            records: vec![],
            decoded_header: None,
        })
    }

    /// The memo flag is cleared: memo fields cannot be written.
    pub fn with_version(self, version: u8) -> Self {
        Self {
            version: version & !MEMO_FLAG,
            ..self
        }
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Result<Self> {
        for record in records {
            self.push(record)?;
        }
        Ok(self)
    }

    pub fn push(&mut self, record: Record) -> Result<()> {
        let record = record.conform(&self.fields, self.records.len())?;
        self.records.push(record);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<Record> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Values may be changed in place; `encode` checks them again.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn active_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| !r.is_deleted())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The header this table was decoded from, for inspection only.
    pub fn decoded_header(&self) -> Option<&Header> {
        self.decoded_header.as_ref()
    }

    pub fn header(&self, last_updated: NaiveDate) -> Result<Header> {
        Header::for_table(self.version, last_updated, &self.fields, self.records.len())
    }

    pub fn decode(buf: &[u8], options: &DecodeOptions) -> Result<Self> {
        let header = Header::decode(buf)?;
        debug!(?header, len = buf.len(), "decoded header");

        let header_end = buf.len().min(header.header_length as usize);
        let fields = field::decode_descriptors(&buf[..header_end])?;
        let records = record::decode_records(buf, &fields, &header, options)?;

        Ok(Self {
            version: header.version & !MEMO_FLAG,
            fields,
            records,
            decoded_header: Some(header),
        })
    }

    pub fn encode(&self, last_updated: NaiveDate) -> Result<Bytes> {
        let header = self.header(last_updated)?;
        let header_bytes = header.encode()?;
        let descriptors = field::encode_descriptors(&self.fields)?;
        let records = record::encode_records(&self.records, &self.fields)?;

        let mut out =
            BytesMut::with_capacity(header_bytes.len() + descriptors.len() + records.len() + 1);
        out.put_slice(&header_bytes);
        out.put_slice(&descriptors);
        out.put_slice(&records);
        out.put_u8(EOF_MARKER);

        debug!(
            fields = self.fields.len(),
            records = self.records.len(),
            bytes = out.len(),
            "encoded table"
        );
        Ok(out.freeze())
    }
}
