/// Direction in which a search or cursor scans its buffer.
///
/// # Default
///
/// [`Direction::Forward`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Direction {
    /// Scan towards higher offsets.
    #[default]
    Forward,
    /// Scan towards lower offsets.
    Backward,
}

impl Direction {
    #[must_use]
    pub fn is_backward(self) -> bool {
        matches!(self, Direction::Backward)
    }
}

/// The region of a buffer a search operates on.
///
/// A forward window covers `[start, start + length)`, a backward window
/// covers `[start - length, start)`. Out-of-range values are clamped, so a
/// window never reaches past the buffer.
///
/// # Examples
///
/// ```rust
/// use bytestream::{ByteBuffer, SearchWindow};
///
/// let buf = ByteBuffer::from(&b"key=value;key=other"[..]);
/// let window = SearchWindow::from(4).with_length(8);
/// assert_eq!(buf.find_pattern(b";", window), Some(10));
/// assert_eq!(buf.find_pattern(b"key", SearchWindow::default().backward()), Some(10));
/// ```
///
/// # Default
///
/// The whole buffer, scanned forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchWindow {
    /// Offset the scan starts from.
    ///
    /// # Default
    ///
    /// `0` for forward scans, the buffer length for backward scans.
    pub start: Option<usize>,

    /// Number of bytes the scan may cover.
    ///
    /// # Default
    ///
    /// Everything between `start` and the buffer edge in scan direction.
    pub length: Option<usize>,

    /// Scan direction.
    ///
    /// # Default
    ///
    /// [`Direction::Forward`]
    pub direction: Direction,
}

impl SearchWindow {
    #[must_use]
    pub fn new(start: usize, length: usize, direction: Direction) -> Self {
        Self {
            start: Some(start),
            length: Some(length),
            direction,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn backward(mut self) -> Self {
        self.direction = Direction::Backward;
        self
    }

    /// Clamps the window against a buffer of `len` bytes.
    pub(crate) fn resolve(self, len: usize) -> Resolved {
        let backward = self.direction.is_backward();
        let start = self
            .start
            .unwrap_or(if backward { len } else { 0 })
            .min(len);
        let limit = if backward { start } else { len - start };
        let length = self.length.unwrap_or(limit).min(limit);
        Resolved {
            start,
            length,
            backward,
        }
    }

    /// Clamps a forward-only window, as used by the `find_all_*` family.
    ///
    /// Returns `None` when the start lies at or past the end of the buffer.
    pub(crate) fn resolve_forward(self, len: usize) -> Option<Resolved> {
        let start = self.start.unwrap_or(0);
        if start >= len {
            return None;
        }
        let limit = len - start;
        Some(Resolved {
            start,
            length: self.length.unwrap_or(limit).min(limit),
            backward: false,
        })
    }
}

impl From<usize> for SearchWindow {
    fn from(start: usize) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }
}

/// A window after clamping against a concrete buffer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub start: usize,
    pub length: usize,
    pub backward: bool,
}

impl Resolved {
    /// Lowest offset covered by the window.
    pub fn low(self) -> usize {
        if self.backward {
            self.start - self.length
        } else {
            self.start
        }
    }

    /// One past the highest offset covered by the window.
    pub fn high(self) -> usize {
        if self.backward {
            self.start
        } else {
            self.start + self.length
        }
    }
}

/// Configuration for [`SeqCursor`](crate::SeqCursor) and
/// [`BitCursor`](crate::BitCursor).
///
/// # Examples
///
/// ```rust
/// use bytestream::{ByteBuffer, CursorOptions, Direction, SeqCursor};
///
/// let mut buf = ByteBuffer::from(&b"\x00\x01\x02\x03"[..]);
/// let mut cursor = SeqCursor::new(
///     &mut buf,
///     CursorOptions {
///         direction: Direction::Backward,
///         ..Default::default()
///     },
/// );
/// assert_eq!(cursor.get_u16(true), 0x0302);
/// ```
///
/// # Default
///
/// A forward cursor over the whole buffer that does not grow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorOptions {
    /// Scan direction of the cursor.
    ///
    /// # Default
    ///
    /// [`Direction::Forward`]
    pub direction: Direction,

    /// Initial position.
    ///
    /// # Default
    ///
    /// `0` for forward cursors, the end of the buffer for backward cursors.
    pub start: Option<usize>,

    /// Initial remaining length.
    ///
    /// # Default
    ///
    /// The buffer length.
    pub length: Option<usize>,

    /// Number of bytes the backing buffer grows by when an append does not
    /// fit. A non-zero block also marks the cursor as a writer, whose
    /// [`length`](crate::SeqCursor::length) reports the bytes written so far.
    ///
    /// # Default
    ///
    /// `0`
    pub append_block: usize,
}
