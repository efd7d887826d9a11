//! Declarative parsing of fixed-layout records.
//!
//! A layout is an ordered list of [`FieldSpec`]s. Each record is parsed by
//! applying every field in turn to the bytes that follow the previous one;
//! parsing repeats record after record until the window is exhausted.

use alloc::{borrow::Cow, collections::BTreeMap, vec::Vec};

use crate::{ByteBuffer, error::BufferError, varint};

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FieldValue {
    Tag(u8),
    Number(u64),
    Bytes(ByteBuffer),
}

/// How a field turns bytes into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDecoder {
    /// The field must start with these exact bytes. Records no value.
    Literal(Vec<u8>),
    /// Consumes everything up to and including the first `\n` within
    /// `max_len` bytes. Records no value.
    LineEnd,
    /// A single byte drawn from the listed set.
    Tag(Vec<u8>),
    /// Exactly `max_len` ASCII digits.
    Decimal,
    /// Exactly `max_len` raw bytes.
    Bytes,
    /// A varint length and its payload, together at most `max_len` bytes.
    LengthPrefixed,
    /// Consumes nothing and records the given value.
    Default(FieldValue),
}

/// One field of a record layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: Cow<'static, str>,
    /// Upper bound on the bytes the decoder may inspect.
    pub max_len: usize,
    pub decoder: FieldDecoder,
}

impl FieldSpec {
    pub fn new(name: impl Into<Cow<'static, str>>, max_len: usize, decoder: FieldDecoder) -> Self {
        Self {
            name: name.into(),
            max_len,
            decoder,
        }
    }
}

/// A parsed record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Record {
    pub fields: BTreeMap<Cow<'static, str>, FieldValue>,
    /// Bytes consumed by the record.
    pub structure_length: usize,
}

impl Record {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Applies `decoder` to `input`, returning the bytes consumed and the value
/// to record, or `None` when the input does not fit the field.
fn decode_field(
    decoder: &FieldDecoder,
    max_len: usize,
    input: &[u8],
) -> Option<(usize, Option<FieldValue>)> {
    let bounded = &input[..max_len.min(input.len())];
    match decoder {
        FieldDecoder::Literal(bytes) => bounded
            .starts_with(bytes)
            .then_some((bytes.len(), None)),
        FieldDecoder::LineEnd => bounded
            .iter()
            .position(|&b| b == b'\n')
            .map(|at| (at + 1, None)),
        FieldDecoder::Tag(allowed) => {
            let &byte = bounded.first()?;
            allowed
                .contains(&byte)
                .then_some((1, Some(FieldValue::Tag(byte))))
        }
        FieldDecoder::Decimal => {
            if max_len == 0 || bounded.len() < max_len {
                return None;
            }
            let number = bounded.iter().try_fold(0u64, |acc, &b| {
                if !b.is_ascii_digit() {
                    return None;
                }
                acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
            })?;
            Some((max_len, Some(FieldValue::Number(number))))
        }
        FieldDecoder::Bytes => (bounded.len() == max_len)
            .then(|| (max_len, Some(FieldValue::Bytes(ByteBuffer::from(bounded))))),
        FieldDecoder::LengthPrefixed => {
            let &first = bounded.first()?;
            let prefix = if first & 0x80 == 0 { 1 } else { 2 };
            let len = usize::from(varint::decode(bounded.get(..prefix)?).ok()?);
            let payload = bounded.get(prefix..prefix + len)?;
            Some((
                prefix + len,
                Some(FieldValue::Bytes(ByteBuffer::from(payload))),
            ))
        }
        FieldDecoder::Default(value) => Some((0, Some(value.clone()))),
    }
}

/// Parses up to `record_count` records from the window of `buffer` starting
/// at `start` and spanning `length` bytes.
///
/// A record whose field fails to decode is dropped and parsing stops; the
/// records completed so far are returned. Parsing also stops when a record
/// consumes no bytes.
///
/// ```rust
/// use bytestream::{ByteBuffer, FieldDecoder, FieldSpec, FieldValue, parse_byte_map};
///
/// let table = ByteBuffer::from(&b"0000000017 n\n0000000042 f\n"[..]);
/// let layout = [
///     FieldSpec::new("offset", 10, FieldDecoder::Decimal),
///     FieldSpec::new("space", 1, FieldDecoder::Literal(b" ".to_vec())),
///     FieldSpec::new("kind", 1, FieldDecoder::Tag(b"nf".to_vec())),
///     FieldSpec::new("eol", 2, FieldDecoder::LineEnd),
/// ];
/// let records = parse_byte_map(&table, &layout, 10, None, None).unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].get("offset"), Some(&FieldValue::Number(42)));
/// assert_eq!(records[1].structure_length, 13);
/// ```
///
/// # Errors
///
/// [`BufferError::StartOutOfRange`] when `start` is not an offset inside the
/// buffer.
pub fn parse_byte_map(
    buffer: &ByteBuffer,
    specs: &[FieldSpec],
    record_count: usize,
    start: Option<usize>,
    length: Option<usize>,
) -> Result<Vec<Record>, BufferError> {
    let start = start.unwrap_or(0);
    if start >= buffer.len() {
        return Err(BufferError::StartOutOfRange {
            start,
            len: buffer.len(),
        });
    }
    let available = buffer.len() - start;
    let length = length.unwrap_or(available).min(available);
    let data = &buffer.as_bytes()[start..start + length];

    let mut records = Vec::new();
    let mut offset = 0;
    'records: while offset < data.len() && records.len() < record_count {
        let mut record = Record::default();
        for spec in specs {
            let Some((consumed, value)) = decode_field(&spec.decoder, spec.max_len, &data[offset..])
            else {
                tracing::debug!(
                    field = %spec.name,
                    offset = start + offset,
                    "byte map record aborted"
                );
                break 'records;
            };
            if let Some(value) = value {
                record.fields.insert(spec.name.clone(), value);
            }
            offset += consumed;
            record.structure_length += consumed;
        }
        if record.structure_length == 0 {
            break;
        }
        records.push(record);
    }
    Ok(records)
}
