//! Sequential reading, writing and searching over a borrowed [`ByteBuffer`].

use alloc::vec::Vec;

use crate::{
    ByteBuffer, Match, NotInMatch, Pair, Replacement, SequenceMatch,
    error::BufferError,
    options::{CursorOptions, Direction, SearchWindow},
};

/// Minimum growth step for appends that do not fit.
const DEFAULT_APPEND_BLOCK: usize = 1000;

/// Position of a cursor: where it stands and how many bytes are left in its
/// scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub start: usize,
    pub remaining: isize,
}

/// A stateful position over a [`ByteBuffer`].
///
/// Searches run from the current position over the remaining bytes and,
/// when they succeed, move the cursor to the reported offset. A single
/// previous position is remembered so the last move can be undone with
/// [`reset_position`](Self::reset_position).
///
/// ```rust
/// use bytestream::{ByteBuffer, CursorOptions, SeqCursor};
///
/// let mut buf = ByteBuffer::from(&b"GET /index HTTP/1.1"[..]);
/// let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
/// assert_eq!(cursor.find_pattern(b" ", None), Some(4));
/// let path = cursor.find_first_not_in(&[b" "], None).unwrap();
/// assert_eq!(path.value, b"/index");
/// assert_eq!(cursor.position(), 11);
/// ```
#[derive(Debug)]
pub struct SeqCursor<'a> {
    buffer: &'a mut ByteBuffer,
    start: usize,
    remaining: isize,
    direction: Direction,
    append_block: usize,
    prev_start: usize,
    prev_remaining: isize,
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

impl<'a> SeqCursor<'a> {
    pub fn new(buffer: &'a mut ByteBuffer, options: CursorOptions) -> Self {
        let len = buffer.len();
        let start = options
            .start
            .unwrap_or(if options.direction.is_backward() { len } else { 0 })
            .min(len);
        let remaining = signed(options.length.unwrap_or(len));
        Self {
            buffer,
            start,
            remaining,
            direction: options.direction,
            append_block: options.append_block,
            prev_start: start,
            prev_remaining: remaining,
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &ByteBuffer {
        &*self.buffer
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn remaining(&self) -> isize {
        self.remaining
    }

    /// Remaining length, or the bytes written so far for a writer cursor
    /// (one with a non-zero append block).
    #[must_use]
    pub fn length(&self) -> usize {
        if self.append_block != 0 {
            self.start
        } else {
            self.window_len()
        }
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        CursorState {
            start: self.start,
            remaining: self.remaining,
        }
    }

    /// Bytes in front of the cursor, i.e. everything a forward writer has
    /// produced.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.buffer.as_bytes()[..self.start]
    }

    fn window_len(&self) -> usize {
        usize::try_from(self.remaining).unwrap_or(0)
    }

    fn window(&self) -> SearchWindow {
        SearchWindow::new(self.start, self.window_len(), self.direction)
    }

    /// The window rebased to a forward start, for searches that always
    /// scan forward.
    fn forward_window(&self) -> SearchWindow {
        let len = self.window_len();
        let start = if self.direction.is_backward() {
            self.start.saturating_sub(len)
        } else {
            self.start
        };
        SearchWindow::new(start, len, Direction::Forward)
    }

    fn gap(&self, gap: Option<usize>) -> usize {
        let len = self.window_len();
        gap.unwrap_or(len).min(len)
    }

    fn snapshot(&mut self) {
        self.prev_start = self.start;
        self.prev_remaining = self.remaining;
    }

    /// Moves to `position`, shrinking or growing the remaining length by the
    /// distance travelled in scan direction.
    fn move_to(&mut self, position: usize) {
        self.snapshot();
        let travelled = if self.direction.is_backward() {
            signed(self.start) - signed(position)
        } else {
            signed(position) - signed(self.start)
        };
        self.remaining -= travelled;
        self.start = position;
    }

    /// Moves to an absolute offset.
    ///
    /// # Errors
    ///
    /// [`BufferError::StartOutOfRange`] when `position` lies past the end of
    /// the buffer; the cursor does not move.
    pub fn seek(&mut self, position: usize) -> Result<CursorState, BufferError> {
        if position > self.buffer.len() {
            return Err(BufferError::StartOutOfRange {
                start: position,
                len: self.buffer.len(),
            });
        }
        self.move_to(position);
        Ok(self.state())
    }

    /// Moves `count` bytes in scan direction.
    ///
    /// # Errors
    ///
    /// Same as [`seek`](Self::seek), also when a backward move would pass
    /// offset 0.
    pub fn advance(&mut self, count: usize) -> Result<CursorState, BufferError> {
        let target = if self.direction.is_backward() {
            self.start.checked_sub(count)
        } else {
            self.start.checked_add(count)
        };
        let target = target.ok_or(BufferError::StartOutOfRange {
            start: self.start,
            len: self.buffer.len(),
        })?;
        self.seek(target)
    }

    pub fn set_remaining(&mut self, remaining: isize) {
        self.snapshot();
        self.remaining = remaining;
    }

    /// Rebinds the cursor to another buffer and rewinds it.
    pub fn attach(&mut self, buffer: &'a mut ByteBuffer) {
        self.snapshot();
        self.buffer = buffer;
        self.remaining = signed(self.buffer.len());
        self.start = if self.direction.is_backward() {
            self.buffer.len()
        } else {
            0
        };
    }

    /// Undoes the last move.
    pub fn reset_position(&mut self) {
        self.start = self.prev_start.min(self.buffer.len());
        self.remaining = self.prev_remaining;
    }

    /// Finds `pattern` no farther than `gap` bytes from the cursor and moves
    /// to it.
    pub fn find_pattern(&mut self, pattern: impl AsRef<[u8]>, gap: Option<usize>) -> Option<usize> {
        let pattern = pattern.as_ref();
        let gap = self.gap(gap);
        let found = self.buffer.find_pattern(pattern, self.window())?;
        if !self.within_gap(found, pattern.len(), gap) {
            return None;
        }
        self.move_to(found);
        Some(found)
    }

    fn within_gap(&self, found: usize, len: usize, gap: usize) -> bool {
        if self.direction.is_backward() {
            found + len + gap >= self.start
        } else {
            found <= self.start + len + gap
        }
    }

    pub fn find_first_in<P: AsRef<[u8]>>(
        &mut self,
        patterns: &[P],
        gap: Option<usize>,
    ) -> Option<Match> {
        let gap = self.gap(gap);
        let found = self.buffer.find_first_in(patterns, self.window())?;
        if !self.within_gap(found.position, patterns[found.id].as_ref().len(), gap) {
            return None;
        }
        self.move_to(found.position);
        Some(found)
    }

    #[must_use]
    pub fn find_all_in<P: AsRef<[u8]>>(&self, patterns: &[P]) -> Vec<Match> {
        self.buffer.find_all_in(patterns, self.forward_window())
    }

    /// Finds the next uncovered span and moves past it.
    ///
    /// Returns `None` without moving when the skipped run of patterns ends
    /// farther than `gap` bytes from the cursor.
    pub fn find_first_not_in<P: AsRef<[u8]>>(
        &mut self,
        patterns: &[P],
        gap: Option<usize>,
    ) -> Option<NotInMatch> {
        let gap = self.gap(gap);
        let found = self.buffer.find_first_not_in(patterns, self.window());
        let len_of = |id: usize| patterns[id].as_ref().len();
        if self.direction.is_backward() {
            if let Some(id) = found.right.id {
                if !self.within_gap(found.right.position, len_of(id), gap) {
                    return None;
                }
            }
            let low = self.start.saturating_sub(self.window_len());
            self.move_to(found.left.id.map_or(low, |_| found.left.position));
        } else {
            if let Some(id) = found.left.id {
                if !self.within_gap(found.left.position, len_of(id), gap) {
                    return None;
                }
            }
            let high = self.start + self.window_len();
            self.move_to(found.right.id.map_or(high, |_| found.right.position));
        }
        Some(found)
    }

    #[must_use]
    pub fn find_all_not_in<P: AsRef<[u8]>>(&self, patterns: &[P]) -> Vec<NotInMatch> {
        self.buffer.find_all_not_in(patterns, self.forward_window())
    }

    /// Finds the next run of `patterns` within `length` bytes and moves past
    /// it.
    pub fn find_first_sequence<P: AsRef<[u8]>>(
        &mut self,
        patterns: &[P],
        length: Option<usize>,
        gap: Option<usize>,
    ) -> Option<SequenceMatch> {
        let length = length.unwrap_or(self.window_len()).min(self.window_len());
        let gap = gap.unwrap_or(length).min(length);
        let window = SearchWindow::new(self.start, length, self.direction);
        let found = self.buffer.find_first_sequence(patterns, window)?;
        if !self.within_gap(found.position, found.value.len(), gap) {
            return None;
        }
        self.move_to(found.position);
        Some(found)
    }

    #[must_use]
    pub fn find_all_sequences<P: AsRef<[u8]>>(&self, patterns: &[P]) -> Vec<SequenceMatch> {
        self.buffer.find_all_sequences(patterns, self.forward_window())
    }

    /// Paired delimiters in the remaining window; empty when the first pair
    /// lies farther than `gap` bytes from the cursor.
    #[must_use]
    pub fn find_paired_patterns(
        &self,
        left: impl AsRef<[u8]>,
        right: impl AsRef<[u8]>,
        gap: Option<usize>,
    ) -> Vec<Pair<usize>> {
        let (left, right) = (left.as_ref(), right.as_ref());
        let gap = self.gap(gap);
        let pairs = self
            .buffer
            .find_paired_patterns(left, right, self.forward_window());
        let too_far = pairs
            .first()
            .is_some_and(|first| !self.pair_within_gap(first, left.len(), right.len(), gap));
        if too_far { Vec::new() } else { pairs }
    }

    #[must_use]
    pub fn find_paired_arrays<L: AsRef<[u8]>, R: AsRef<[u8]>>(
        &self,
        lefts: &[L],
        rights: &[R],
        gap: Option<usize>,
    ) -> Vec<Pair<Match>> {
        let gap = self.gap(gap);
        let pairs = self
            .buffer
            .find_paired_arrays(lefts, rights, self.forward_window());
        let too_far = pairs.first().is_some_and(|first| {
            let positions = Pair {
                left: first.left.position,
                right: first.right.position,
            };
            let left_len = lefts[first.left.id].as_ref().len();
            let right_len = rights[first.right.id].as_ref().len();
            !self.pair_within_gap(&positions, left_len, right_len, gap)
        });
        if too_far { Vec::new() } else { pairs }
    }

    fn pair_within_gap(&self, pair: &Pair<usize>, left_len: usize, right_len: usize, gap: usize) -> bool {
        if self.direction.is_backward() {
            pair.right + right_len + gap >= self.start
        } else {
            pair.left <= self.start + left_len + gap
        }
    }

    /// Replaces `search` in the remaining window. The window follows the
    /// change in length so it keeps covering the same bytes.
    pub fn replace_pattern(
        &mut self,
        search: impl AsRef<[u8]>,
        replace: impl AsRef<[u8]>,
    ) -> Option<Replacement> {
        let before = signed(self.buffer.len());
        let outcome = self
            .buffer
            .replace_pattern(search, replace, self.forward_window())?;
        let delta = signed(self.buffer.len()) - before;
        self.remaining += delta;
        if self.direction.is_backward() {
            self.start = self.start.saturating_add_signed(delta);
        }
        self.start = self.start.min(self.buffer.len());
        Some(outcome)
    }

    pub fn skip_patterns<P: AsRef<[u8]>>(&mut self, patterns: &[P]) -> usize {
        let position = self.buffer.skip_patterns(patterns, self.window());
        self.move_to(position);
        position
    }

    pub fn skip_not_patterns<P: AsRef<[u8]>>(&mut self, patterns: &[P]) -> Option<usize> {
        let position = self.buffer.skip_not_patterns(patterns, self.window())?;
        self.move_to(position);
        Some(position)
    }

    /// Grows the backing buffer when `count` bytes do not fit after the
    /// cursor. Blobs larger than the current block widen it to their own
    /// size plus the default block.
    fn reserve(&mut self, count: usize, blob: bool) {
        if self.start + count <= self.buffer.len() {
            return;
        }
        if count > self.append_block {
            self.append_block = if blob {
                count + DEFAULT_APPEND_BLOCK
            } else {
                DEFAULT_APPEND_BLOCK
            };
        }
        tracing::trace!(
            position = self.start,
            count,
            block = self.append_block,
            "growing cursor buffer"
        );
        let len = self.buffer.len();
        self.buffer.realloc(len + self.append_block);
    }

    fn write(&mut self, bytes: &[u8], blob: bool) {
        self.reserve(bytes.len(), blob);
        let at = self.start;
        self.buffer.as_bytes_mut()[at..at + bytes.len()].copy_from_slice(bytes);
        self.snapshot();
        self.start += bytes.len();
        self.remaining += signed(bytes.len());
    }

    pub fn append(&mut self, other: &ByteBuffer) {
        self.write(other.as_bytes(), true);
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.write(bytes, true);
    }

    pub fn append_char(&mut self, byte: u8) {
        self.write(&[byte], false);
    }

    pub fn append_u16(&mut self, value: u16) {
        self.write(&value.to_be_bytes(), false);
    }

    /// Appends the low 24 bits of `value`, big-endian.
    pub fn append_u24(&mut self, value: u32) {
        self.write(&value.to_be_bytes()[1..], false);
    }

    pub fn append_u32(&mut self, value: u32) {
        self.write(&value.to_be_bytes(), false);
    }

    /// Reads up to `size` bytes in scan direction. Backward reads come back
    /// in reverse order, nearest byte first.
    pub fn get_block(&mut self, size: usize, advance: bool) -> Vec<u8> {
        if self.remaining <= 0 {
            return Vec::new();
        }
        let size = size.min(self.window_len());
        let (block, next) = if self.direction.is_backward() {
            let size = size.min(self.start);
            let from = self.start - size;
            let mut block = self.buffer.as_bytes()[from..self.start].to_vec();
            block.reverse();
            (block, from)
        } else {
            let to = (self.start + size).min(self.buffer.len());
            (self.buffer.as_bytes()[self.start..to].to_vec(), to)
        };
        if advance {
            self.move_to(next);
        }
        block
    }

    fn get_uint(&mut self, width: usize, advance: bool) -> u32 {
        let block = self.get_block(width, advance);
        if block.len() < width {
            return 0;
        }
        block
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
    }

    /// A big-endian `u16`, or 0 when fewer than two bytes remain.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_u16(&mut self, advance: bool) -> u16 {
        self.get_uint(2, advance) as u16
    }

    pub fn get_u24(&mut self, advance: bool) -> u32 {
        self.get_uint(3, advance)
    }

    pub fn get_u32(&mut self, advance: bool) -> u32 {
        self.get_uint(4, advance)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn backward() -> CursorOptions {
        CursorOptions {
            direction: Direction::Backward,
            ..Default::default()
        }
    }

    #[test]
    fn seek_tracks_remaining_length() {
        let mut buf = ByteBuffer::from(&b"0123456789"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        assert_eq!(
            cursor.seek(4),
            Ok(CursorState {
                start: 4,
                remaining: 6
            })
        );
        assert_eq!(
            cursor.seek(11),
            Err(BufferError::StartOutOfRange { start: 11, len: 10 })
        );
        assert_eq!(cursor.position(), 4);
        cursor.advance(3).unwrap();
        assert_eq!(cursor.state(), CursorState { start: 7, remaining: 3 });
        cursor.reset_position();
        assert_eq!(cursor.state(), CursorState { start: 4, remaining: 6 });
    }

    #[test]
    fn backward_cursor_starts_at_the_end() {
        let mut buf = ByteBuffer::from(&b"0123456789"[..]);
        let mut cursor = SeqCursor::new(&mut buf, backward());
        assert_eq!(cursor.position(), 10);
        cursor.advance(4).unwrap();
        assert_eq!(cursor.state(), CursorState { start: 6, remaining: 6 });
        assert!(cursor.advance(7).is_err());
    }

    #[test]
    fn find_pattern_moves_the_cursor() {
        let mut buf = ByteBuffer::from(&b"a=1;b=2;"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        assert_eq!(cursor.find_pattern(b";", None), Some(4));
        assert_eq!(cursor.find_pattern(b";", None), Some(8));
        assert_eq!(cursor.find_pattern(b";", None), None);
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn gap_limits_how_far_a_search_reaches() {
        let mut buf = ByteBuffer::from(&b"....;"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        assert_eq!(cursor.find_pattern(b";", Some(2)), None);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.find_pattern(b";", Some(4)), Some(5));

        let mut buf = ByteBuffer::from(&b";...."[..]);
        let mut cursor = SeqCursor::new(&mut buf, backward());
        assert_eq!(cursor.find_pattern(b";", Some(3)), None);
        assert_eq!(cursor.find_pattern(b";", Some(4)), Some(0));
    }

    #[test]
    fn find_first_in_and_not_in_walk_a_record() {
        let mut buf = ByteBuffer::from(&b"name: value\r\n"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        let colon = cursor.find_first_in(&[&b":"[..], &b"\r\n"[..]], None).unwrap();
        assert_eq!(colon, Match { id: 0, position: 5 });
        let value = cursor.find_first_not_in(&[b" "], None).unwrap();
        assert_eq!(value.value, b"value\r\n");
        assert_eq!(cursor.position(), 13);
    }

    #[test]
    fn backward_not_in_moves_to_the_lower_boundary() {
        let mut buf = ByteBuffer::from(&b"a key  "[..]);
        let mut cursor = SeqCursor::new(&mut buf, backward());
        let found = cursor.find_first_not_in(&[b" "], None).unwrap();
        assert_eq!(found.value, b"key");
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn sequences_and_skips_move_the_cursor() {
        let mut buf = ByteBuffer::from(&b"ab   cd"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        let run = cursor.find_first_sequence(&[b" "], None, None).unwrap();
        assert_eq!(run.position, 5);
        assert_eq!(cursor.position(), 5);

        cursor.seek(0).unwrap();
        assert_eq!(cursor.skip_not_patterns(&[b" "]), Some(2));
        assert_eq!(cursor.skip_patterns(&[b" "]), 5);
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn collection_searches_use_the_remaining_window() {
        let mut buf = ByteBuffer::from(&b"x,y,(z)"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        cursor.seek(2).unwrap();
        assert_eq!(cursor.find_all_in(&[b","]), vec![Match { id: 0, position: 4 }]);
        assert_eq!(cursor.find_all_not_in(&[b","]).len(), 2);
        assert_eq!(
            cursor.find_paired_patterns(b"(", b")", None),
            [Pair { left: 5, right: 7 }]
        );
        assert!(cursor.find_paired_patterns(b"(", b")", Some(0)).is_empty());
        assert_eq!(cursor.find_all_sequences(&[b","]).len(), 1);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn replace_keeps_the_window_aligned() {
        let mut buf = ByteBuffer::from(&b"a-b-c"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        cursor.seek(1).unwrap();
        let outcome = cursor.replace_pattern(b"-", b"::").unwrap();
        assert_eq!(outcome.replace_positions, [1, 4]);
        assert_eq!(cursor.remaining(), 6);
        assert_eq!(cursor.buffer(), &ByteBuffer::from(&b"a::b::c"[..]));
    }

    #[test]
    fn writer_grows_in_blocks() {
        let mut buf = ByteBuffer::new();
        let mut cursor = SeqCursor::new(
            &mut buf,
            CursorOptions {
                append_block: 16,
                ..Default::default()
            },
        );
        cursor.append_char(b'!');
        cursor.append_u16(0x0102);
        cursor.append_u24(0x0003_0405);
        cursor.append_u32(0x0607_0809);
        assert_eq!(cursor.length(), 10);
        assert_eq!(cursor.buffer().len(), 16);
        assert_eq!(cursor.written(), b"!\x01\x02\x03\x04\x05\x06\x07\x08\x09");

        cursor.append_bytes(&[0xAA; 20]);
        assert_eq!(cursor.length(), 30);
        assert_eq!(cursor.buffer().len(), 16 + 20 + DEFAULT_APPEND_BLOCK);
    }

    #[test]
    fn fixed_width_appends_pick_a_default_block() {
        let mut buf = ByteBuffer::new();
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        cursor.append(&ByteBuffer::from(&b"hi"[..]));
        assert_eq!(cursor.buffer().len(), 2 + DEFAULT_APPEND_BLOCK);
        cursor.append_u32(7);
        assert_eq!(cursor.written(), b"hi\0\0\0\x07");
    }

    #[test]
    fn reads_integers_in_scan_direction() {
        let mut buf = ByteBuffer::from(&b"\x00\x01\x02\x03\x04\x05\x06\x07\x08"[..]);
        let mut cursor = SeqCursor::new(&mut buf, CursorOptions::default());
        assert_eq!(cursor.get_u16(false), 0x0001);
        assert_eq!(cursor.get_u16(true), 0x0001);
        assert_eq!(cursor.get_u24(true), 0x0002_0304);
        assert_eq!(cursor.get_u32(true), 0x0506_0708);
        assert_eq!(cursor.get_u32(true), 0);

        let mut buf = ByteBuffer::from(&b"\x00\x01\x02\x03"[..]);
        let mut cursor = SeqCursor::new(&mut buf, backward());
        assert_eq!(cursor.get_block(3, true), vec![3, 2, 1]);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.get_u16(true), 0);
    }

    #[test]
    fn attach_rewinds_and_reset_restores() {
        let mut first = ByteBuffer::from(&b"abcdef"[..]);
        let mut second = ByteBuffer::from(&b"xy"[..]);
        let mut cursor = SeqCursor::new(&mut first, CursorOptions::default());
        cursor.seek(3).unwrap();
        cursor.attach(&mut second);
        assert_eq!(cursor.state(), CursorState { start: 0, remaining: 2 });
        cursor.reset_position();
        assert_eq!(cursor.position(), 2);
    }
}
