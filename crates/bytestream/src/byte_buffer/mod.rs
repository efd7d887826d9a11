//! Owned, growable byte storage with pattern search and splicing.
//!
//! Offsets reported by forward searches point just past the matched bytes;
//! offsets reported by backward searches point at the first matched byte.
//! Either way the returned offset is where a scan in the same direction
//! would continue.

mod search;


use alloc::{string::String, vec::Vec};
use core::fmt;

use bstr::BStr;

use crate::error::BufferError;

pub use search::{Boundary, Match, NotInMatch, Pair, Replacement, SequenceMatch};

/// A contiguous, owned sequence of bytes.
///
/// Every mutating operation builds the new contents completely before
/// replacing the old ones, so a failed call leaves the buffer untouched.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteBuffer")
            .field(&BStr::new(&self.data))
            .finish()
    }
}

impl ByteBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero-filled buffer of `len` bytes.
    #[must_use]
    pub fn with_length(len: usize) -> Self {
        Self::filled(len, 0)
    }

    #[must_use]
    pub fn filled(len: usize, byte: u8) -> Self {
        Self {
            data: alloc::vec![byte; len],
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }

    /// One byte per UTF-16 code unit of `text`, keeping the low eight bits.
    ///
    /// Text made of code points below U+0100 round-trips through
    /// [`to_char_string`](Self::to_char_string).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_char_codes(text: &str) -> Self {
        Self {
            data: text.encode_utf16().map(|unit| unit as u8).collect(),
        }
    }

    /// Decodes a hexadecimal string, in either case.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidHex`] for odd-length input or non-hex digits.
    pub fn from_hex(text: &str) -> Result<Self, BufferError> {
        hex::decode(text)
            .map(|data| Self { data })
            .map_err(BufferError::InvalidHex)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Uppercase hexadecimal rendering.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        hex::encode_upper(&self.data)
    }

    /// Renders every byte as the character with the same code point.
    #[must_use]
    pub fn to_char_string(&self) -> String {
        self.data.iter().copied().map(char::from).collect()
    }

    #[must_use]
    pub fn is_equal_view(&self, view: &[u8]) -> bool {
        self.data == view
    }

    fn check_start(&self, start: usize) -> Result<(), BufferError> {
        if start >= self.data.len() {
            return Err(BufferError::StartOutOfRange {
                start,
                len: self.data.len(),
            });
        }
        Ok(())
    }

    /// Copies up to `length` bytes starting at `start`.
    ///
    /// # Errors
    ///
    /// [`BufferError::StartOutOfRange`] when `start` is not an offset inside
    /// the buffer. Copying from offset 0 of an empty buffer yields an empty
    /// buffer.
    pub fn copy(&self, start: usize, length: Option<usize>) -> Result<Self, BufferError> {
        if start == 0 && self.data.is_empty() {
            return Ok(Self::new());
        }
        self.check_start(start)?;
        let available = self.data.len() - start;
        let length = length.unwrap_or(available).min(available);
        Ok(Self::from_bytes(&self.data[start..start + length]))
    }

    /// Copies the half-open range `start..end`, clamping `end` to the buffer.
    ///
    /// # Errors
    ///
    /// Same as [`copy`](Self::copy).
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self, BufferError> {
        if start == 0 && self.data.is_empty() {
            return Ok(Self::new());
        }
        self.check_start(start)?;
        let end = end.unwrap_or(self.data.len()).clamp(start, self.data.len());
        Ok(Self::from_bytes(&self.data[start..end]))
    }

    /// Truncates or zero-extends the buffer to `size` bytes.
    pub fn realloc(&mut self, size: usize) {
        tracing::trace!(from = self.data.len(), to = size, "reallocating byte buffer");
        self.data.resize(size, 0);
    }

    pub fn append(&mut self, other: &[u8]) {
        self.data.extend_from_slice(other);
    }

    /// Overwrites bytes starting at `start` with the head of `other`.
    ///
    /// The buffer never grows: the write is clamped to `length`, to the
    /// space left after `start` and to the length of `other`. Returns the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// [`BufferError::StartOutOfRange`] when `start` is not an offset inside
    /// the buffer.
    pub fn insert(
        &mut self,
        other: &[u8],
        start: usize,
        length: Option<usize>,
    ) -> Result<usize, BufferError> {
        self.check_start(start)?;
        let available = self.data.len() - start;
        let length = length
            .unwrap_or(available)
            .min(available)
            .min(other.len());
        self.data[start..start + length].copy_from_slice(&other[..length]);
        Ok(length)
    }

    pub(crate) fn replace_contents(&mut self, data: Vec<u8>) {
        self.data = data;
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl<const N: usize> From<&[u8; N]> for ByteBuffer {
    fn from(bytes: &[u8; N]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<ByteBuffer> for Vec<u8> {
    fn from(buffer: ByteBuffer) -> Self {
        buffer.data
    }
}

impl PartialEq<[u8]> for ByteBuffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.data == other
    }
}

impl PartialEq<&[u8]> for ByteBuffer {
    fn eq(&self, other: &&[u8]) -> bool {
        self.data == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteBuffer {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.data == other[..]
    }
}
