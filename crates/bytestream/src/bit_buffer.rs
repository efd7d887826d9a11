//! Bit sequences stored right-aligned in bytes.
//!
//! A [`BitBuffer`] holding `n` bits keeps them in the low `n` bits of its
//! byte vector: the high-order bits of the first byte are zero padding.
//! Bit offsets count significant bits from the most significant one, so
//! offset 0 is the first significant bit and `bits_count() - 1` the last.
//!
//! Pattern searches work on the textual form of the bits: both the buffer
//! and the patterns are rendered as `'0'`/`'1'` bytes and searched with the
//! [`ByteBuffer`] operations. Positions are therefore bit offsets, and any
//! matched values come back as bit strings.

use alloc::{string::String, vec, vec::Vec};
use core::fmt;

use crate::{
    ByteBuffer, Match, NotInMatch, Pair, Replacement, SequenceMatch, error::BitError,
    options::SearchWindow,
};

/// A sequence of bits.
#[derive(Clone, Default)]
pub struct BitBuffer {
    data: Vec<u8>,
    bits_count: usize,
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BitBuffer").field(&self.to_bit_string()).finish()
    }
}

/// Two buffers are equal when they hold the same bits, whatever padding
/// bytes precede them.
impl PartialEq for BitBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.bits_count == other.bits_count && self.bits().eq(other.bits())
    }
}

impl Eq for BitBuffer {}

fn bit_patterns(patterns: &[BitBuffer]) -> Vec<ByteBuffer> {
    patterns.iter().map(BitBuffer::to_bit_bytes).collect()
}

impl BitBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every bit of `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            bits_count: bytes.len() * 8,
        }
    }

    #[must_use]
    pub fn from_byte_buffer(buffer: &ByteBuffer) -> Self {
        Self::from_bytes(buffer.as_bytes())
    }

    /// The 32 bits of `value`, most significant first.
    #[must_use]
    pub fn from_u32(value: u32) -> Self {
        Self::from_bytes(&value.to_be_bytes())
    }

    /// The low `bits_count` bits of `bytes`.
    ///
    /// # Errors
    ///
    /// [`BitError::BitsCountTooLarge`] when `bytes` holds fewer bits.
    pub fn with_bits_count(bytes: &[u8], bits_count: usize) -> Result<Self, BitError> {
        let capacity = bytes.len() * 8;
        if bits_count > capacity {
            return Err(BitError::BitsCountTooLarge {
                bits: bits_count,
                capacity,
            });
        }
        let mut buffer = Self::from_bytes(bytes);
        buffer.keep_low_bits(bits_count);
        Ok(buffer)
    }

    /// Parses a string of `'0'` and `'1'` characters.
    ///
    /// ```rust
    /// use bytestream::BitBuffer;
    ///
    /// let bits = BitBuffer::from_bit_string("1011").unwrap();
    /// assert_eq!(bits.as_bytes(), &[0b1011]);
    /// assert_eq!(bits.bits_count(), 4);
    /// assert!(BitBuffer::from_bit_string("10x1").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// [`BitError::InvalidBitChar`] for any other character.
    pub fn from_bit_string(text: &str) -> Result<Self, BitError> {
        let bits = text
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(BitError::InvalidBitChar(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_bit_iter(bits.into_iter()))
    }

    fn from_bit_iter(bits: impl ExactSizeIterator<Item = bool>) -> Self {
        let bits_count = bits.len();
        let len = bits_count.div_ceil(8);
        let pad = len * 8 - bits_count;
        let mut data = vec![0; len];
        for (i, bit) in bits.enumerate() {
            if bit {
                let at = pad + i;
                data[at / 8] |= 0x80 >> (at % 8);
            }
        }
        Self { data, bits_count }
    }

    /// Replaces the contents with `bits`.
    fn assign(&mut self, bits: Vec<bool>) {
        *self = Self::from_bit_iter(bits.into_iter());
    }

    /// Drops the `count` least significant bits, moving the others down.
    fn drop_low_bits(&mut self, count: usize) {
        self.data.truncate(self.data.len() - count / 8);
        let shift = count % 8;
        if shift != 0 {
            for i in (0..self.data.len()).rev() {
                let carry = if i == 0 { 0 } else { self.data[i - 1] << (8 - shift) };
                self.data[i] = (self.data[i] >> shift) | carry;
            }
        }
        self.bits_count -= count;
    }

    /// Keeps the `count` least significant bits in as few bytes as they
    /// need.
    fn keep_low_bits(&mut self, count: usize) {
        self.bits_count = count;
        if count == 0 {
            self.data.clear();
            return;
        }
        self.shrink();
        let partial = count % 8;
        if partial != 0 {
            self.data[0] &= 0xFF >> (8 - partial);
        }
    }

    /// Prepends zero bytes until the storage is `len` bytes long.
    fn pad_to(&mut self, len: usize) {
        if self.data.len() < len {
            let mut padded = vec![0; len - self.data.len()];
            padded.append(&mut self.data);
            self.data = padded;
        }
    }

    #[must_use]
    pub fn bits_count(&self) -> usize {
        self.bits_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits_count == 0
    }

    /// The backing bytes, padding included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.bits_count = 0;
    }

    fn bit(&self, index: usize) -> bool {
        let at = self.data.len() * 8 - self.bits_count + index;
        (self.data[at / 8] >> (7 - at % 8)) & 1 == 1
    }

    /// The significant bits, most significant first.
    pub fn bits(&self) -> impl DoubleEndedIterator<Item = bool> + ExactSizeIterator + '_ {
        (0..self.bits_count).map(|i| self.bit(i))
    }

    #[must_use]
    pub fn to_bit_string(&self) -> String {
        self.bits().map(|bit| if bit { '1' } else { '0' }).collect()
    }

    /// The bits rendered as `'0'`/`'1'` bytes, the form searches run on.
    #[must_use]
    pub fn to_bit_bytes(&self) -> ByteBuffer {
        ByteBuffer::from(
            self.bits()
                .map(|bit| if bit { b'1' } else { b'0' })
                .collect::<Vec<_>>(),
        )
    }

    fn check_shift(&self, shift: u32) -> Result<(), BitError> {
        if shift > 8 {
            return Err(BitError::ShiftOutOfRange { shift });
        }
        if shift as usize > self.bits_count {
            return Err(BitError::ShiftExceedsBits {
                shift,
                bits: self.bits_count,
            });
        }
        Ok(())
    }

    /// Drops the `shift` least significant bits. With `shrink` the storage
    /// is trimmed to the remaining bits, otherwise its length is kept.
    ///
    /// # Errors
    ///
    /// [`BitError::ShiftOutOfRange`] for shifts above 8 and
    /// [`BitError::ShiftExceedsBits`] for shifts above the bit count. The
    /// buffer is left unchanged on error.
    pub fn shift_right(&mut self, shift: u32, shrink: bool) -> Result<(), BitError> {
        self.check_shift(shift)?;
        if shift == 0 || self.data.is_empty() {
            return Ok(());
        }
        let len = self.data.len();
        self.drop_low_bits(shift as usize);
        if self.bits_count == 0 {
            self.data.clear();
        } else if shrink {
            self.shrink();
        } else {
            self.pad_to(len);
        }
        Ok(())
    }

    /// Drops the `shift` most significant bits.
    ///
    /// # Errors
    ///
    /// Same as [`shift_right`](Self::shift_right).
    pub fn shift_left(&mut self, shift: u32) -> Result<(), BitError> {
        self.check_shift(shift)?;
        if shift == 0 || self.data.is_empty() {
            return Ok(());
        }
        self.keep_low_bits(self.bits_count - shift as usize);
        Ok(())
    }

    /// The bits from `start` to `end`, both inclusive.
    ///
    /// # Errors
    ///
    /// [`BitError::RangeOutOfBounds`] unless `start <= end < bits_count()`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Self, BitError> {
        if start > end || end >= self.bits_count {
            return Err(BitError::RangeOutOfBounds {
                start,
                end,
                bits: self.bits_count,
            });
        }
        let mut out = self.clone();
        out.drop_low_bits(self.bits_count - 1 - end);
        out.keep_low_bits(end + 1 - start);
        Ok(out)
    }

    /// `length` bits starting at `start`, or everything from `start` on.
    ///
    /// # Errors
    ///
    /// [`BitError::RangeOutOfBounds`] when the range does not fit.
    pub fn copy(&self, start: usize, length: Option<usize>) -> Result<Self, BitError> {
        let length = length.unwrap_or(self.bits_count.saturating_sub(start));
        if length == 0 && start <= self.bits_count {
            return Ok(Self::new());
        }
        let end = (start + length).saturating_sub(1);
        self.slice(start, end)
    }

    /// Drops storage bytes holding only padding.
    pub fn shrink(&mut self) {
        let needed = self.bits_count.div_ceil(8);
        if needed < self.data.len() {
            self.data.drain(..self.data.len() - needed);
        }
    }

    /// Reverses the bit order inside every byte. A partial leading byte is
    /// reversed within its significant bits.
    pub fn reverse_bytes(&mut self) {
        for byte in &mut self.data {
            *byte = byte.reverse_bits();
        }
        let partial = self.bits_count % 8;
        if partial != 0 {
            let first = self.data.len() - self.bits_count.div_ceil(8);
            self.data[first] >>= 8 - partial;
        }
    }

    /// Reverses the whole bit sequence, keeping the storage length.
    pub fn reverse_value(&mut self) {
        if self.bits_count == 0 {
            return;
        }
        let len = self.data.len();
        let padding = len * 8 - self.bits_count;
        self.data.reverse();
        for byte in &mut self.data {
            *byte = byte.reverse_bits();
        }
        self.bits_count = len * 8;
        self.drop_low_bits(padding);
        self.pad_to(len);
    }

    /// The bits as an unsigned integer, or `None` when the storage is
    /// longer than four bytes. Padding bytes left by
    /// [`shift_right`](Self::shift_right) without `shrink` count towards
    /// that limit.
    #[must_use]
    pub fn get_number_value(&self) -> Option<u32> {
        if self.data.len() > 4 {
            return None;
        }
        Some(self.bits().fold(0, |acc, bit| (acc << 1) | u32::from(bit)))
    }

    /// Appends the bits of `other` after the last bit of `self`.
    pub fn append(&mut self, other: &BitBuffer) {
        let bits = self.bits().chain(other.bits()).collect();
        self.assign(bits);
    }

    #[must_use]
    pub fn find_pattern(&self, pattern: &BitBuffer, window: SearchWindow) -> Option<usize> {
        self.to_bit_bytes()
            .find_pattern(pattern.to_bit_bytes(), window)
    }

    #[must_use]
    pub fn find_first_in(&self, patterns: &[BitBuffer], window: SearchWindow) -> Option<Match> {
        self.to_bit_bytes()
            .find_first_in(&bit_patterns(patterns), window)
    }

    #[must_use]
    pub fn find_all_in(&self, patterns: &[BitBuffer], window: SearchWindow) -> Vec<Match> {
        self.to_bit_bytes()
            .find_all_in(&bit_patterns(patterns), window)
    }

    #[must_use]
    pub fn find_all_pattern_in(&self, pattern: &BitBuffer, window: SearchWindow) -> Vec<usize> {
        self.to_bit_bytes()
            .find_all_pattern_in(pattern.to_bit_bytes(), window)
    }

    /// See [`ByteBuffer::find_first_not_in`]; the span value is a bit
    /// string.
    #[must_use]
    pub fn find_first_not_in(&self, patterns: &[BitBuffer], window: SearchWindow) -> NotInMatch {
        self.to_bit_bytes()
            .find_first_not_in(&bit_patterns(patterns), window)
    }

    #[must_use]
    pub fn find_all_not_in(&self, patterns: &[BitBuffer], window: SearchWindow) -> Vec<NotInMatch> {
        self.to_bit_bytes()
            .find_all_not_in(&bit_patterns(patterns), window)
    }

    #[must_use]
    pub fn find_first_sequence(
        &self,
        patterns: &[BitBuffer],
        window: SearchWindow,
    ) -> Option<SequenceMatch> {
        self.to_bit_bytes()
            .find_first_sequence(&bit_patterns(patterns), window)
    }

    #[must_use]
    pub fn find_all_sequences(
        &self,
        patterns: &[BitBuffer],
        window: SearchWindow,
    ) -> Vec<SequenceMatch> {
        self.to_bit_bytes()
            .find_all_sequences(&bit_patterns(patterns), window)
    }

    #[must_use]
    pub fn find_paired_patterns(
        &self,
        left: &BitBuffer,
        right: &BitBuffer,
        window: SearchWindow,
    ) -> Vec<Pair<usize>> {
        self.to_bit_bytes()
            .find_paired_patterns(left.to_bit_bytes(), right.to_bit_bytes(), window)
    }

    #[must_use]
    pub fn find_paired_arrays(
        &self,
        lefts: &[BitBuffer],
        rights: &[BitBuffer],
        window: SearchWindow,
    ) -> Vec<Pair<Match>> {
        self.to_bit_bytes()
            .find_paired_arrays(&bit_patterns(lefts), &bit_patterns(rights), window)
    }

    /// Replaces every occurrence of the `search` bits with the `replace`
    /// bits. Returns `None`, leaving the buffer untouched, when `search`
    /// does not occur.
    pub fn replace_pattern(
        &mut self,
        search: &BitBuffer,
        replace: &BitBuffer,
        window: SearchWindow,
    ) -> Option<Replacement> {
        let mut text = self.to_bit_bytes();
        let outcome = text.replace_pattern(search.to_bit_bytes(), replace.to_bit_bytes(), window)?;
        let bits = text.as_bytes().iter().map(|&b| b == b'1').collect();
        self.assign(bits);
        Some(outcome)
    }

    #[must_use]
    pub fn skip_patterns(&self, patterns: &[BitBuffer], window: SearchWindow) -> usize {
        self.to_bit_bytes()
            .skip_patterns(&bit_patterns(patterns), window)
    }

    #[must_use]
    pub fn skip_not_patterns(&self, patterns: &[BitBuffer], window: SearchWindow) -> Option<usize> {
        self.to_bit_bytes()
            .skip_not_patterns(&bit_patterns(patterns), window)
    }
}

impl From<&ByteBuffer> for BitBuffer {
    fn from(buffer: &ByteBuffer) -> Self {
        Self::from_byte_buffer(buffer)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn bits(text: &str) -> BitBuffer {
        BitBuffer::from_bit_string(text).unwrap()
    }

    #[test]
    fn bit_strings_are_right_aligned() {
        let b = bits("110000000011");
        assert_eq!(b.as_bytes(), &[0b1100, 0b0000_0011]);
        assert_eq!(b.bits_count(), 12);
        assert_eq!(b.to_bit_string(), "110000000011");
        assert_eq!(
            BitBuffer::from_bit_string("12"),
            Err(BitError::InvalidBitChar('2'))
        );
        assert!(bits("").is_empty());
    }

    #[test]
    fn with_bits_count_masks_padding() {
        let b = BitBuffer::with_bits_count(&[0xFF, 0xFF, 0xFF], 10).unwrap();
        assert_eq!(b.as_bytes(), &[0b11, 0xFF]);
        assert_eq!(
            BitBuffer::with_bits_count(&[0xFF], 9),
            Err(BitError::BitsCountTooLarge {
                bits: 9,
                capacity: 8
            })
        );
    }

    #[rstest]
    #[case(1, true, "10110010", 1)]
    #[case(3, false, "101100", 2)]
    #[case(8, true, "1", 1)]
    fn shift_right_drops_low_bits(
        #[case] shift: u32,
        #[case] shrink: bool,
        #[case] expected: &str,
        #[case] storage: usize,
    ) {
        let mut b = bits("101100101");
        b.shift_right(shift, shrink).unwrap();
        assert_eq!(b.to_bit_string(), expected);
        assert_eq!(b.as_bytes().len(), storage);
    }

    #[test]
    fn shift_right_carries_between_bytes() {
        let mut b = BitBuffer::from_bytes(&[0b1000_0001, 0b1000_0000, 0b0000_0001]);
        b.shift_right(1, false).unwrap();
        assert_eq!(b.as_bytes(), &[0b0100_0000, 0b1100_0000, 0b0000_0000]);
        assert_eq!(b.bits_count(), 23);
        b.shift_right(8, false).unwrap();
        assert_eq!(b.as_bytes(), &[0, 0b0100_0000, 0b1100_0000]);
        assert_eq!(b.to_bit_string(), "100000011000000");
    }

    #[test]
    fn shifts_reject_bad_amounts() {
        let mut b = bits("101");
        assert_eq!(
            b.shift_right(9, true),
            Err(BitError::ShiftOutOfRange { shift: 9 })
        );
        assert_eq!(
            b.shift_left(4),
            Err(BitError::ShiftExceedsBits { shift: 4, bits: 3 })
        );
        assert_eq!(b.to_bit_string(), "101");
        b.shift_right(3, true).unwrap();
        assert!(b.is_empty());
        assert!(b.as_bytes().is_empty());
    }

    #[test]
    fn shift_left_drops_high_bits() {
        let mut b = bits("101100101");
        b.shift_left(2).unwrap();
        assert_eq!(b.to_bit_string(), "1100101");
        assert_eq!(b.as_bytes(), &[0b0110_0101]);
        b.shift_left(3).unwrap();
        assert_eq!(b.to_bit_string(), "0101");
        assert_eq!(b.as_bytes(), &[0b0101]);
    }

    #[test]
    fn slice_and_copy_select_bit_ranges() {
        let b = bits("1100101011");
        assert_eq!(b.slice(0, 9).unwrap(), b);
        assert_eq!(b.slice(2, 5).unwrap().to_bit_string(), "0010");
        assert_eq!(b.copy(6, None).unwrap().to_bit_string(), "1011");
        assert_eq!(b.copy(1, Some(3)).unwrap().to_bit_string(), "100");
        assert_eq!(b.slice(9, 9).unwrap().to_bit_string(), "1");

        let wide = BitBuffer::from_bytes(&[0x0F, 0xF0, 0x3C]);
        let middle = wide.slice(4, 17).unwrap();
        assert_eq!(middle.to_bit_string(), "11111111000000");
        assert_eq!(middle.as_bytes(), &[0b11_1111, 0b1100_0000]);
        assert!(b.copy(10, None).unwrap().is_empty());
        assert_eq!(
            b.slice(3, 10),
            Err(BitError::RangeOutOfBounds {
                start: 3,
                end: 10,
                bits: 10
            })
        );
    }

    #[test]
    fn reversal() {
        let mut b = bits("1100000001");
        b.reverse_bytes();
        assert_eq!(b.to_bit_string(), "1110000000");

        let mut v = bits("1100000001");
        v.reverse_value();
        assert_eq!(v.to_bit_string(), "1000000011");

        let mut padded = BitBuffer::from_bytes(&[0x03, 0x01, 0x80]);
        padded.shift_right(8, false).unwrap();
        padded.shift_right(8, false).unwrap();
        assert_eq!(padded.as_bytes(), &[0, 0, 0x03]);
        padded.reverse_value();
        assert_eq!(padded.to_bit_string(), "11000000");
        assert_eq!(padded.as_bytes(), &[0, 0, 0xC0]);
    }

    #[test]
    fn number_values() {
        assert_eq!(bits("101").get_number_value(), Some(5));
        assert_eq!(BitBuffer::from_u32(0xDEAD_BEEF).get_number_value(), Some(0xDEAD_BEEF));
        assert_eq!(BitBuffer::from_bytes(&[1, 2, 3, 4, 5]).get_number_value(), None);
        assert_eq!(BitBuffer::new().get_number_value(), Some(0));
    }

    #[test]
    fn number_value_counts_padding_bytes() {
        let mut b = BitBuffer::from_bytes(&[0, 0, 0, 1, 0xFF]);
        b.shift_right(8, false).unwrap();
        assert_eq!(b.bits_count(), 32);
        assert_eq!(b.as_bytes().len(), 5);
        assert_eq!(b.get_number_value(), None);
        b.shrink();
        assert_eq!(b.get_number_value(), Some(1));
    }

    #[test]
    fn append_concatenates_bits() {
        let mut b = bits("101");
        b.append(&bits("0011"));
        assert_eq!(b.to_bit_string(), "1010011");
        assert_eq!(b.as_bytes(), &[0b101_0011]);
    }

    #[test]
    fn searches_report_bit_offsets() {
        let b = BitBuffer::from_bytes(&[0b0001_0010, 0b0011_0100]);
        let one = bits("1");
        assert_eq!(b.find_pattern(&one, SearchWindow::default()), Some(4));
        assert_eq!(b.find_pattern(&one, SearchWindow::default().backward()), Some(13));
        assert_eq!(b.find_all_pattern_in(&one, SearchWindow::default()), [4, 7, 11, 12, 14]);
        assert_eq!(b.skip_patterns(&[bits("0")], SearchWindow::default()), 3);
        assert_eq!(b.skip_not_patterns(&[bits("11")], SearchWindow::default()), Some(10));

        let gap = b.find_first_not_in(&[bits("0")], SearchWindow::default());
        assert_eq!(gap.value, b"1");
        let run = b.find_first_sequence(&[bits("1")], SearchWindow::from(8)).unwrap();
        assert_eq!(run.value, b"11");
    }

    #[test]
    fn replace_rewrites_bits() {
        let mut b = bits("100100");
        let outcome = b
            .replace_pattern(&bits("1"), &bits("11"), SearchWindow::default())
            .unwrap();
        assert_eq!(b.to_bit_string(), "11001100");
        assert_eq!(outcome.replace_positions, [0, 4]);
        assert!(b.replace_pattern(&bits("111"), &bits("0"), SearchWindow::default()).is_none());
    }
}
