use super::{field::FieldType, BlankNumeric, DecodeOptions, FieldDescriptor, Result};
use crate::{utils, Error};
use bytes::{BufMut, BytesMut};
use chrono::{Datelike, NaiveDate};
use std::fmt;

const FILL: u8 = b' ';
const DATE_WIDTH: usize = 8;
const DATE_FORMAT: &str = "%Y%m%d";

/// A field value, tagged by the field type it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Character(String),
    Numeric(f64),
    Logical(Option<bool>),
    Date(Option<NaiveDate>),
}

impl Value {
    pub fn r#type(&self) -> FieldType {
        match self {
            Self::Character(_) => FieldType::Character,
            Self::Numeric(_) => FieldType::Numeric,
            Self::Logical(_) => FieldType::Logical,
            Self::Date(_) => FieldType::Date,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Character(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => *b,
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => *d,
            _ => None,
        }
    }

    /// Decodes one field window. `offset` is the window's absolute position, used in errors.
    pub(super) fn decode(
        field: &FieldDescriptor,
        window: &[u8],
        offset: usize,
        options: &DecodeOptions,
    ) -> Result<Self> {
        match field.r#type() {
            FieldType::Character => {
                let text = utils::latin1_to_string(utils::trim_fill(window));
                Ok(Self::Character(utils::trim_ascii(&text).to_string()))
            }
            FieldType::Numeric => decode_numeric(window, offset, options).map(Self::Numeric),
            FieldType::Logical => match window[0] {
                b'T' | b't' | b'Y' | b'y' => Ok(Self::Logical(Some(true))),
                b'F' | b'f' | b'N' | b'n' => Ok(Self::Logical(Some(false))),
                b' ' | b'?' => Ok(Self::Logical(None)),
                byte => Err(Error::InvalidLogicalField { byte, offset }),
            },
            FieldType::Date => decode_date(window, offset).map(Self::Date),
        }
    }

    /// Appends exactly `field.storage_size()` bytes. Dispatches on the field's declared
    /// type; a value of another type is rejected.
    pub(super) fn encode(
        &self,
        field: &FieldDescriptor,
        record: usize,
        out: &mut BytesMut,
    ) -> Result<()> {
        let width = field.storage_size();
        match (field.r#type(), self) {
            (FieldType::Character, Self::Character(s)) => {
                let bytes = s
                    .chars()
                    .map(|ch| {
                        u8::try_from(ch).map_err(|_| Error::UnencodableCharacter {
                            record,
                            field: field.name().to_string(),
                            ch,
                        })
                    })
                    .collect::<Result<Vec<u8>>>()?;
                if bytes.len() > width {
                    return Err(Error::ValueTooLong {
                        record,
                        field: field.name().to_string(),
                        len: bytes.len(),
                        max: width,
                    });
                }
                out.put_slice(&bytes);
                out.put_bytes(FILL, width - bytes.len());
            }
            (FieldType::Numeric, Self::Numeric(n)) => {
                let text = format_numeric(*n, width).ok_or_else(|| Error::NumberDoesNotFit {
                    record,
                    field: field.name().to_string(),
                    text: n.to_string(),
                    width,
                })?;
                out.put_slice(text.as_bytes());
            }
            (FieldType::Logical, Self::Logical(b)) => out.put_u8(match b {
                Some(true) => b'T',
                Some(false) => b'F',
                None => b'?',
            }),
            (FieldType::Date, Self::Date(Some(date))) => {
                let year = date.year();
                if !(0..=9999).contains(&year) {
                    return Err(Error::UnrepresentableDate {
                        record,
                        field: field.name().to_string(),
                        year,
                    });
                }
                out.put_slice(date.format(DATE_FORMAT).to_string().as_bytes());
            }
            (FieldType::Date, Self::Date(None)) => out.put_bytes(FILL, DATE_WIDTH),
            (expected, _) => {
                return Err(Error::TypeMismatch {
                    record,
                    field: field.name().to_string(),
                    expected: expected.name(),
                })
            }
        }
        Ok(())
    }
}

fn decode_numeric(window: &[u8], offset: usize, options: &DecodeOptions) -> Result<f64> {
    let text = utils::latin1_to_string(utils::trim_fill(window));
    let text = utils::trim_ascii(&text);
    let invalid = || Error::InvalidNumericField {
        text: text.to_string(),
        offset,
    };

    if text.is_empty() {
        return match options.blank_numeric {
            BlankNumeric::Zero => Ok(0.0),
            BlankNumeric::Reject => Err(invalid()),
        };
    }
    if !is_decimal(text) {
        return Err(invalid());
    }
    text.parse::<f64>().map_err(|_| invalid())
}

/// Optional sign, digits, at most one point, at least one digit.
fn is_decimal(text: &str) -> bool {
    let digits = text.strip_prefix(&['-', '+'][..]).unwrap_or(text);
    let mut points = 0;
    let mut seen_digit = false;
    for ch in digits.chars() {
        match ch {
            '0'..='9' => seen_digit = true,
            '.' => points += 1,
            _ => return false,
        }
    }
    seen_digit && points <= 1
}

/// Sign-aware zero padding: `42` in 3 bytes is `042`, `-4.5` in 6 is `-004.5`.
fn format_numeric(n: f64, width: usize) -> Option<String> {
    if !n.is_finite() {
        return None;
    }
    // -0.0 would print a sign
    let n = if n == 0.0 { 0.0 } else { n };
    let text = format!("{n:0width$}");
    (text.len() <= width).then_some(text)
}

fn decode_date(window: &[u8], offset: usize) -> Result<Option<NaiveDate>> {
    let text = utils::latin1_to_string(window);
    let invalid = || Error::InvalidDateField {
        text: text.clone(),
        offset,
    };

    if window.iter().all(|&b| b == b' ' || b == 0x00) {
        return Ok(None);
    }
    // chrono alone would accept signs and short years
    let digits = utils::take_8_bytes(window, 0).ok_or_else(invalid)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map(Some)
        .map_err(|_| invalid())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(s) => write!(f, "{s}"),
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Logical(Some(true)) => write!(f, "T"),
            Self::Logical(Some(false)) => write!(f, "F"),
            Self::Date(Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Logical(None) | Self::Date(None) => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Character(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Character(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Numeric(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Numeric(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Logical(Some(b))
    }
}

impl From<Option<bool>> for Value {
    fn from(b: Option<bool>) -> Self {
        Self::Logical(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(Some(d))
    }
}

impl From<Option<NaiveDate>> for Value {
    fn from(d: Option<NaiveDate>) -> Self {
        Self::Date(d)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn encode(field: &FieldDescriptor, value: Value) -> Result<Vec<u8>> {
        let mut out = BytesMut::new();
        value.encode(field, 0, &mut out)?;
        Ok(out.to_vec())
    }

    fn decode(field: &FieldDescriptor, window: &[u8]) -> Result<Value> {
        Value::decode(field, window, 100, &DecodeOptions::default())
    }

    #[test]
    fn it_zero_pads_numbers() -> TestResult {
        let age = FieldDescriptor::numeric("AGE", 3)?;
        assert_eq!(encode(&age, 42.into())?, b"042");
        assert_eq!(decode(&age, b"042")?, Value::Numeric(42.0));

        let balance = FieldDescriptor::numeric("BALANCE", 6)?;
        assert_eq!(encode(&balance, Value::Numeric(-4.5))?, b"-004.5");
        assert_eq!(decode(&balance, b"-004.5")?, Value::Numeric(-4.5));
        assert_eq!(encode(&balance, Value::Numeric(-0.0))?, b"000000");
        Ok(())
    }

    #[test]
    fn it_refuses_numbers_that_do_not_fit() -> TestResult {
        let age = FieldDescriptor::numeric("AGE", 3)?;
        assert!(matches!(
            encode(&age, 1000.into()).unwrap_err(),
            Error::NumberDoesNotFit { width: 3, .. }
        ));
        assert!(matches!(
            encode(&age, Value::Numeric(-100.0)).unwrap_err(),
            Error::NumberDoesNotFit { .. }
        ));
        assert!(matches!(
            encode(&age, Value::Numeric(f64::NAN)).unwrap_err(),
            Error::NumberDoesNotFit { .. }
        ));
        assert_eq!(encode(&age, Value::Numeric(-99.0))?, b"-99");
        Ok(())
    }

    #[test]
    fn it_reads_space_padded_numbers() -> TestResult {
        let n = FieldDescriptor::numeric("N", 8)?;
        assert_eq!(decode(&n, b"  123.25")?, Value::Numeric(123.25));
        assert_eq!(decode(&n, b"+7\0\0\0\0\0\0")?, Value::Numeric(7.0));
        Ok(())
    }

    #[test]
    fn it_rejects_non_decimal_text() -> TestResult {
        let n = FieldDescriptor::numeric("N", 5)?;
        for text in [
            &b"  abc"[..],
            b"1e5  ",
            b"  inf",
            b"1.2.3",
            b"*****",
            b"   - ",
            b"\xa012  ",
        ] {
            assert!(
                matches!(
                    decode(&n, text).unwrap_err(),
                    Error::InvalidNumericField { offset: 100, .. }
                ),
                "{text:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn it_applies_the_blank_numeric_mode() -> TestResult {
        let n = FieldDescriptor::numeric("N", 4)?;
        assert_eq!(decode(&n, b"    ")?, Value::Numeric(0.0));
        assert_eq!(decode(&n, b"\0\0\0\0")?, Value::Numeric(0.0));

        let strict = DecodeOptions::strict();
        assert!(matches!(
            Value::decode(&n, b"    ", 5, &strict).unwrap_err(),
            Error::InvalidNumericField { offset: 5, .. }
        ));
        Ok(())
    }

    #[test]
    fn it_pads_characters_with_fill_bytes() -> TestResult {
        let name = FieldDescriptor::character("NAME", 5)?;
        assert_eq!(encode(&name, "Al".into())?, b"Al   ");
        assert_eq!(decode(&name, b"Al   ")?, "Al");
        assert_eq!(decode(&name, b"Al\0\0\0")?, "Al");
        assert_eq!(decode(&name, b"     ")?, "");
        Ok(())
    }

    #[test]
    fn it_keeps_latin1_spaces_as_data() -> TestResult {
        let name = FieldDescriptor::character("NAME", 5)?;
        let value = Value::from("Al\u{a0}");
        let bytes = encode(&name, value.clone())?;
        assert_eq!(bytes, b"Al\xa0  ");
        assert_eq!(decode(&name, &bytes)?, value);
        assert_eq!(decode(&name, b"\x85Al  ")?, "\u{85}Al");
        Ok(())
    }

    #[test]
    fn it_refuses_to_truncate_characters() -> TestResult {
        let name = FieldDescriptor::character("NAME", 5)?;
        assert!(matches!(
            encode(&name, "Alberta".into()).unwrap_err(),
            Error::ValueTooLong { len: 7, max: 5, .. }
        ));
        assert!(matches!(
            encode(&name, "日本".into()).unwrap_err(),
            Error::UnencodableCharacter { ch: '日', .. }
        ));
        assert_eq!(encode(&name, "café".into())?, b"caf\xe9 ");
        Ok(())
    }

    #[test]
    fn it_maps_logical_bytes() -> TestResult {
        let flag = FieldDescriptor::logical("FLAG")?;
        for (byte, expected) in [
            (b'T', Some(true)),
            (b'y', Some(true)),
            (b'f', Some(false)),
            (b'N', Some(false)),
            (b' ', None),
            (b'?', None),
        ] {
            assert_eq!(decode(&flag, &[byte])?, Value::Logical(expected));
        }
        assert!(matches!(
            decode(&flag, b"X").unwrap_err(),
            Error::InvalidLogicalField { byte: b'X', .. }
        ));
        assert_eq!(encode(&flag, None::<bool>.into())?, b"?");
        assert_eq!(encode(&flag, false.into())?, b"F");
        Ok(())
    }

    #[test]
    fn it_reads_and_writes_dates() -> TestResult {
        let born = FieldDescriptor::date("BORN")?;
        let date = NaiveDate::from_ymd_opt(1987, 6, 5).ok_or("bad date")?;
        assert_eq!(encode(&born, date.into())?, b"19870605");
        assert_eq!(decode(&born, b"19870605")?, Value::Date(Some(date)));
        assert_eq!(encode(&born, None::<NaiveDate>.into())?, b"        ");
        assert_eq!(decode(&born, b"        ")?, Value::Date(None));

        let early = NaiveDate::from_ymd_opt(812, 1, 9).ok_or("bad date")?;
        assert_eq!(encode(&born, early.into())?, b"08120109");
        assert_eq!(decode(&born, b"08120109")?, Value::Date(Some(early)));
        Ok(())
    }

    #[test]
    fn it_rejects_invalid_dates() -> TestResult {
        let born = FieldDescriptor::date("BORN")?;
        for text in [b"19870230", b"1987-6-5", b"abcdefgh", b"+1987061"] {
            assert!(matches!(
                decode(&born, text).unwrap_err(),
                Error::InvalidDateField { offset: 100, .. }
            ));
        }
        Ok(())
    }

    #[test]
    fn it_names_the_field_of_an_unwritable_year() -> TestResult {
        let born = FieldDescriptor::date("BORN")?;
        for year in [-5, 10000] {
            let date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or("bad date")?;
            let mut out = BytesMut::new();
            let err = Value::from(date).encode(&born, 4, &mut out).unwrap_err();
            assert!(
                matches!(
                    &err,
                    Error::UnrepresentableDate { record: 4, field, year: y }
                        if field == "BORN" && *y == year
                ),
                "{err}"
            );
        }
        Ok(())
    }

    #[test]
    fn it_dispatches_on_the_declared_type() -> TestResult {
        let age = FieldDescriptor::numeric("AGE", 3)?;
        assert!(matches!(
            encode(&age, "42".into()).unwrap_err(),
            Error::TypeMismatch {
                expected: "numeric",
                ..
            }
        ));
        Ok(())
    }
}
