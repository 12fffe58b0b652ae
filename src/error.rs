use std::io;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("ERR - malformed header at byte {offset}: {reason}")]
    MalformedHeader { offset: usize, reason: String },

    #[error("ERR - field descriptor array has no terminator (buffer ends at byte {offset})")]
    TruncatedDescriptorArray { offset: usize },

    #[error("ERR - unknown field type {code:#04x} at byte {offset}")]
    UnknownFieldType { code: u8, offset: usize },

    #[error("ERR - field name {name:?} is longer than 10 bytes")]
    FieldNameTooLong { name: String },

    #[error("ERR - invalid field name {name:?}: {reason}")]
    InvalidFieldName { name: String, reason: &'static str },

    #[error("ERR - duplicate field name {name:?}")]
    DuplicateFieldName { name: String },

    #[error("ERR - field {name:?} cannot have length {length}")]
    InvalidFieldLength { name: String, length: u8 },

    #[error("ERR - invalid deletion flag {byte:#04x} at byte {offset}")]
    InvalidDeletionFlag { byte: u8, offset: usize },

    #[error("ERR - invalid numeric field {text:?} at byte {offset}")]
    InvalidNumericField { text: String, offset: usize },

    #[error("ERR - invalid logical field {byte:#04x} at byte {offset}")]
    InvalidLogicalField { byte: u8, offset: usize },

    #[error("ERR - invalid date field {text:?} at byte {offset}")]
    InvalidDateField { text: String, offset: usize },

    #[error("ERR - record area truncated at byte {offset}")]
    TruncatedRecordArea { offset: usize },

    #[error("ERR - record {record}, field {field:?}: {len} bytes do not fit in {max}")]
    ValueTooLong {
        record: usize,
        field: String,
        len: usize,
        max: usize,
    },

    #[error("ERR - record {record}, field {field:?}: {ch:?} is not a single-byte character")]
    UnencodableCharacter {
        record: usize,
        field: String,
        ch: char,
    },

    #[error("ERR - record {record}, field {field:?}: number {text} does not fit in {width} bytes")]
    NumberDoesNotFit {
        record: usize,
        field: String,
        text: String,
        width: usize,
    },

    #[error("ERR - record {record} does not match field list: {reason}")]
    RecordFieldMismatch { record: usize, reason: String },

    #[error("ERR - record {record}, field {field:?}: value is not a {expected}")]
    TypeMismatch {
        record: usize,
        field: String,
        expected: &'static str,
    },

    #[error("ERR - record {record}, field {field:?}: value has surrounding whitespace")]
    UntrimmedCharacter { record: usize, field: String },

    #[error("ERR - year {0} cannot be stored")]
    UnrepresentableYear(i32),

    #[error("ERR - record {record}, field {field:?}: year {year} cannot be stored")]
    UnrepresentableDate {
        record: usize,
        field: String,
        year: i32,
    },

    #[error("ERR - io: {0}")]
    Io(#[from] io::Error),

    #[error("ERR - other: {0}")]
    Other(#[from] anyhow::Error),
}
