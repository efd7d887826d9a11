//! Sequential bit reads over a borrowed [`BitBuffer`].

use alloc::string::String;

use crate::{
    BitBuffer, CursorState,
    error::BitError,
    options::{CursorOptions, Direction},
};

/// A read position over the bits of a [`BitBuffer`].
///
/// Positions and lengths count bits, using the same significant-bit
/// offsets as [`BitBuffer::slice`].
///
/// ```rust
/// use bytestream::{BitBuffer, BitCursor, CursorOptions};
///
/// let bits = BitBuffer::from_bytes(&[0b1010_0110]);
/// let mut cursor = BitCursor::new(&bits, CursorOptions::default());
/// assert_eq!(cursor.get_bits_string(3), "101");
/// assert_eq!(cursor.get_bits(2).get_number_value(), Some(0));
/// assert_eq!(cursor.to_bit_string(), "110");
/// ```
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    buffer: &'a BitBuffer,
    start: usize,
    remaining: isize,
    direction: Direction,
    prev_start: usize,
    prev_remaining: isize,
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

impl<'a> BitCursor<'a> {
    /// `options.append_block` has no meaning for a read-only cursor and is
    /// ignored.
    #[must_use]
    pub fn new(buffer: &'a BitBuffer, options: CursorOptions) -> Self {
        let bits = buffer.bits_count();
        let start = options
            .start
            .unwrap_or(if options.direction.is_backward() { bits } else { 0 })
            .min(bits);
        let remaining = signed(options.length.unwrap_or(bits));
        Self {
            buffer,
            start,
            remaining,
            direction: options.direction,
            prev_start: start,
            prev_remaining: remaining,
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &'a BitBuffer {
        self.buffer
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn remaining(&self) -> isize {
        self.remaining
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        CursorState {
            start: self.start,
            remaining: self.remaining,
        }
    }

    fn move_to(&mut self, position: usize) {
        self.prev_start = self.start;
        self.prev_remaining = self.remaining;
        let travelled = if self.direction.is_backward() {
            signed(self.start) - signed(position)
        } else {
            signed(position) - signed(self.start)
        };
        self.remaining -= travelled;
        self.start = position;
    }

    /// Moves to an absolute bit offset.
    ///
    /// # Errors
    ///
    /// [`BitError::RangeOutOfBounds`] when `position` lies past the last
    /// bit; the cursor does not move.
    pub fn seek(&mut self, position: usize) -> Result<CursorState, BitError> {
        let bits = self.buffer.bits_count();
        if position > bits {
            return Err(BitError::RangeOutOfBounds {
                start: position,
                end: position,
                bits,
            });
        }
        self.move_to(position);
        Ok(self.state())
    }

    /// Moves `count` bits in scan direction.
    ///
    /// # Errors
    ///
    /// Same as [`seek`](Self::seek).
    pub fn advance(&mut self, count: usize) -> Result<CursorState, BitError> {
        let target = if self.direction.is_backward() {
            self.start.checked_sub(count)
        } else {
            self.start.checked_add(count)
        };
        match target {
            Some(target) => self.seek(target),
            None => Err(BitError::RangeOutOfBounds {
                start: self.start,
                end: self.start,
                bits: self.buffer.bits_count(),
            }),
        }
    }

    /// Undoes the last move.
    pub fn reset_position(&mut self) {
        self.start = self.prev_start;
        self.remaining = self.prev_remaining;
    }

    /// Offsets of the next `count` bits, clamped to the buffer.
    fn span(&self, count: usize) -> (usize, usize) {
        if self.direction.is_backward() {
            let count = count.min(self.start);
            (self.start - count, count)
        } else {
            let count = count.min(self.buffer.bits_count() - self.start);
            (self.start, count)
        }
    }

    fn consume(&mut self, count: usize) {
        let next = if self.direction.is_backward() {
            self.start - count
        } else {
            self.start + count
        };
        self.move_to(next);
    }

    /// Reads up to `count` bits and moves past them. Fewer bits come back
    /// when the buffer ends first. Backward reads return the bits in buffer
    /// order.
    pub fn get_bits(&mut self, count: usize) -> BitBuffer {
        let (at, count) = self.span(count);
        let bits = self.buffer.copy(at, Some(count)).unwrap_or_default();
        self.consume(count);
        bits
    }

    /// [`get_bits`](Self::get_bits) rendered as `'0'`/`'1'` characters.
    pub fn get_bits_string(&mut self, count: usize) -> String {
        self.get_bits(count).to_bit_string()
    }

    /// Reads up to `count` bits and returns them as a number with the bit
    /// order reversed, so the first bit read is the least significant.
    ///
    /// Returns `None` without moving when `count` exceeds 32.
    ///
    /// ```rust
    /// use bytestream::{BitBuffer, BitCursor, CursorOptions};
    ///
    /// let bits = BitBuffer::from_bit_string("110100").unwrap();
    /// let mut cursor = BitCursor::new(&bits, CursorOptions::default());
    /// assert_eq!(cursor.get_bits_reversed_value(4), Some(0b1011));
    /// assert_eq!(cursor.get_bits_reversed_value(33), None);
    /// assert_eq!(cursor.position(), 4);
    /// ```
    pub fn get_bits_reversed_value(&mut self, count: usize) -> Option<u32> {
        if count > 32 {
            return None;
        }
        let bits = self.get_bits(count);
        let value = bits
            .bits()
            .rev()
            .fold(0, |acc, bit| (acc << 1) | u32::from(bit));
        Some(value)
    }

    /// The bits left in the window, in buffer order.
    #[must_use]
    pub fn to_bit_string(&self) -> String {
        let bits = self.buffer.bits_count();
        let len = usize::try_from(self.remaining).unwrap_or(0);
        let (low, high) = if self.direction.is_backward() {
            (self.start.saturating_sub(len), self.start)
        } else {
            (self.start, (self.start + len).min(bits))
        };
        if low >= high {
            return String::new();
        }
        self.buffer
            .slice(low, high - 1)
            .map(|window| window.to_bit_string())
            .unwrap_or_default()
    }
}
