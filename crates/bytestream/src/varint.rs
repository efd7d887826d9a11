//! Restricted one- or two-byte varints.
//!
//! Values up to 127 take a single byte. Values up to [`MAX_VARINT`] take two:
//! the low seven bits with the continuation bit set, then the remaining high
//! bits. Anything larger has no encoding.

use crate::error::VarintError;

/// Largest value with a two-byte encoding.
pub const MAX_VARINT: usize = 16_383;

/// An encoded varint of one or two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Varint {
    bytes: [u8; 2],
    len: u8,
}

impl Varint {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for Varint {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Encodes `value`.
///
/// ```rust
/// use bytestream::varint;
///
/// assert_eq!(varint::encode(127).unwrap().as_bytes(), &[0x7F]);
/// assert_eq!(varint::encode(128).unwrap().as_bytes(), &[0x80, 0x01]);
/// assert!(varint::encode(16_384).is_err());
/// ```
///
/// # Errors
///
/// [`VarintError::TooLarge`] when `value` exceeds [`MAX_VARINT`].
#[allow(clippy::cast_possible_truncation)]
pub fn encode(value: usize) -> Result<Varint, VarintError> {
    match value {
        0..=127 => Ok(Varint {
            bytes: [value as u8, 0],
            len: 1,
        }),
        128..=MAX_VARINT => Ok(Varint {
            bytes: [0x80 | (value & 0x7F) as u8, (value >> 7) as u8],
            len: 2,
        }),
        _ => Err(VarintError::TooLarge(value)),
    }
}

/// Decodes a complete one- or two-byte varint.
///
/// A lone byte decodes to its own value, continuation bit included.
///
/// # Errors
///
/// [`VarintError::InvalidLength`] for inputs that are not one or two bytes
/// long, [`VarintError::MissingContinuation`] for a two-byte input whose
/// first byte is below `0x80`.
pub fn decode(bytes: &[u8]) -> Result<u16, VarintError> {
    match *bytes {
        [b] => Ok(u16::from(b)),
        [lo, hi] if lo & 0x80 != 0 => Ok((u16::from(hi) << 7) + u16::from(lo - 0x80)),
        [lo, _] => Err(VarintError::MissingContinuation(lo)),
        _ => Err(VarintError::InvalidLength(bytes.len())),
    }
}
