use alloc::vec::Vec;

use bstr::ByteSlice;

use super::ByteBuffer;
use crate::{
    error::BufferError,
    options::{Resolved, SearchWindow},
};

/// A pattern occurrence found by a multi-pattern search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Match {
    /// Index of the matching pattern in the input slice.
    pub id: usize,
    /// Offset after the match for forward scans, of the match for backward
    /// scans.
    pub position: usize,
}

/// One side of the span returned by
/// [`find_first_not_in`](ByteBuffer::find_first_not_in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Boundary {
    /// Pattern bounding the span on this side, `None` when the span runs to
    /// the edge of the window.
    pub id: Option<usize>,
    pub position: usize,
}

/// A span not covered by any of the searched patterns.
///
/// `left` is always the boundary at the lower offset, whatever the scan
/// direction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NotInMatch {
    pub left: Boundary,
    pub right: Boundary,
    pub value: ByteBuffer,
}

/// A maximal run of back-to-back pattern occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SequenceMatch {
    /// Where the run ends in scan direction.
    pub position: usize,
    pub value: ByteBuffer,
}

/// An opening delimiter matched with its closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Pair<T> {
    pub left: T,
    pub right: T,
}

/// Outcome of a successful replacement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Replacement {
    /// End offsets of the replaced occurrences in the original buffer.
    pub search_positions: Vec<usize>,
    /// Start offsets of the substituted bytes in the rewritten buffer.
    pub replace_positions: Vec<usize>,
}

trait Positioned {
    fn position(&self) -> usize;
}

impl Positioned for usize {
    fn position(&self) -> usize {
        *self
    }
}

impl Positioned for Match {
    fn position(&self) -> usize {
        self.position
    }
}

fn matches_at(data: &[u8], at: usize, pattern: &[u8]) -> bool {
    data.get(at..at + pattern.len()) == Some(pattern)
}

pub(crate) fn find_in(data: &[u8], pattern: &[u8], w: Resolved) -> Option<usize> {
    if pattern.len() > w.length {
        return None;
    }
    let haystack = &data[w.low()..w.high()];
    if w.backward {
        haystack.rfind(pattern).map(|at| w.low() + at)
    } else {
        haystack
            .find(pattern)
            .map(|at| w.start + at + pattern.len())
    }
}

fn first_in<P: AsRef<[u8]>>(data: &[u8], patterns: &[P], w: Resolved) -> Option<Match> {
    let mut best: Option<(usize, Match)> = None;
    for (id, pattern) in patterns.iter().enumerate() {
        let pattern = pattern.as_ref();
        if pattern.is_empty() {
            continue;
        }
        let Some(position) = find_in(data, pattern, w) else {
            continue;
        };
        // Distance from the scan origin to the near edge of the match.
        let distance = if w.backward {
            w.start - (position + pattern.len())
        } else {
            position - pattern.len() - w.start
        };
        if best.is_none_or(|(nearest, _)| distance < nearest) {
            best = Some((distance, Match { id, position }));
        }
    }
    best.map(|(_, found)| found)
}

fn all_in<P: AsRef<[u8]>>(data: &[u8], patterns: &[P], w: Resolved) -> Vec<Match> {
    let mut found = Vec::new();
    let (mut start, mut length) = (w.start, w.length);
    while let Some(m) = first_in(
        data,
        patterns,
        Resolved {
            start,
            length,
            backward: false,
        },
    ) {
        length -= m.position - start;
        start = m.position;
        found.push(m);
    }
    found
}

fn all_pattern_in(data: &[u8], pattern: &[u8], w: Resolved) -> Vec<usize> {
    if pattern.is_empty() || pattern.len() > w.length {
        return Vec::new();
    }
    data[w.start..w.high()]
        .find_iter(pattern)
        .map(|at| w.start + at + pattern.len())
        .collect()
}

fn first_not_in<P: AsRef<[u8]>>(data: &[u8], patterns: &[P], w: Resolved) -> NotInMatch {
    let far = if w.backward { w.low() } else { w.high() };
    let mut left = Boundary {
        id: None,
        position: w.start,
    };
    let mut right = Boundary {
        id: None,
        position: far,
    };
    let mut remaining = w.length;
    let mut span = None;

    while remaining > 0 {
        let consumed = w.length - remaining;
        let sub = Resolved {
            start: if w.backward {
                w.start - consumed
            } else {
                w.start + consumed
            },
            length: remaining,
            backward: w.backward,
        };
        let Some(m) = first_in(data, patterns, sub) else {
            break;
        };
        let len = patterns[m.id].as_ref().len();
        right = Boundary {
            id: Some(m.id),
            position: m.position,
        };
        let adjacent = if w.backward {
            m.position + len == left.position
        } else {
            m.position == left.position + len
        };
        if !adjacent {
            span = Some(if w.backward {
                m.position + len..left.position
            } else {
                left.position..m.position - len
            });
            break;
        }
        left = right;
        remaining -= len;
    }

    let span = span.unwrap_or_else(|| {
        right = Boundary {
            id: None,
            position: far,
        };
        if w.backward {
            far..left.position
        } else {
            left.position..far
        }
    });
    let value = ByteBuffer::from_bytes(&data[span]);
    if w.backward {
        core::mem::swap(&mut left, &mut right);
    }
    NotInMatch { left, right, value }
}

fn skip<P: AsRef<[u8]>>(data: &[u8], patterns: &[P], w: Resolved) -> usize {
    let (low, high) = (w.low(), w.high());
    let mut position = w.start;
    'restart: loop {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                continue;
            }
            if w.backward {
                if position - low >= pattern.len()
                    && matches_at(data, position - pattern.len(), pattern)
                {
                    position -= pattern.len();
                    if position <= low {
                        return position;
                    }
                    continue 'restart;
                }
            } else if high - position >= pattern.len() && matches_at(data, position, pattern) {
                position += pattern.len();
                if position >= high {
                    return position;
                }
                continue 'restart;
            }
        }
        return position;
    }
}

fn skip_not<P: AsRef<[u8]>>(data: &[u8], patterns: &[P], w: Resolved) -> Option<usize> {
    let (low, high) = (w.low(), w.high());
    for i in 0..w.length {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                continue;
            }
            if w.backward {
                let end = w.start - i;
                if end - low >= pattern.len() && matches_at(data, end - pattern.len(), pattern) {
                    return Some(end);
                }
            } else {
                let at = w.start + i;
                if high - at >= pattern.len() && matches_at(data, at, pattern) {
                    return Some(at);
                }
            }
        }
    }
    None
}

fn first_sequence<P: AsRef<[u8]>>(
    data: &[u8],
    patterns: &[P],
    w: Resolved,
) -> Option<SequenceMatch> {
    let first = skip_not(data, patterns, w)?;
    let consumed = first.abs_diff(w.start);
    let end = skip(
        data,
        patterns,
        Resolved {
            start: first,
            length: w.length - consumed,
            backward: w.backward,
        },
    );
    let span = if w.backward { end..first } else { first..end };
    Some(SequenceMatch {
        position: end,
        value: ByteBuffer::from_bytes(&data[span]),
    })
}

/// Pairs every closing position with the nearest unpaired opening position
/// before it.
fn pair_up<T: Positioned>(mut lefts: Vec<T>, mut rights: Vec<T>) -> Vec<Pair<T>> {
    let mut pairs = Vec::new();
    while !lefts.is_empty() && !rights.is_empty() {
        let close = rights[0].position();
        // One delimiter may be a suffix of the other ("stream"/"endstream"),
        // in which case both are reported at the same offset.
        if lefts[0].position() == close {
            pairs.push(Pair {
                left: lefts.remove(0),
                right: rights.remove(0),
            });
            continue;
        }
        if lefts[0].position() > close {
            break;
        }
        let open = lefts.partition_point(|left| left.position() < close);
        pairs.push(Pair {
            left: lefts.remove(open - 1),
            right: rights.remove(0),
        });
    }
    pairs.sort_by_key(|pair| pair.left.position());
    pairs
}

impl ByteBuffer {
    /// Finds the first occurrence of `pattern` in scan direction.
    ///
    /// ```rust
    /// use bytestream::{ByteBuffer, SearchWindow};
    ///
    /// let buf = ByteBuffer::from(&b"abcabc"[..]);
    /// assert_eq!(buf.find_pattern(b"ab", SearchWindow::default()), Some(2));
    /// assert_eq!(buf.find_pattern(b"ab", SearchWindow::default().backward()), Some(3));
    /// assert_eq!(buf.find_pattern(b"bd", SearchWindow::default()), None);
    /// ```
    #[must_use]
    pub fn find_pattern(&self, pattern: impl AsRef<[u8]>, window: SearchWindow) -> Option<usize> {
        find_in(&self.data, pattern.as_ref(), window.resolve(self.len()))
    }

    /// Finds the occurrence of any of `patterns` nearest to the window start.
    ///
    /// When several patterns are equally near, the one listed first wins.
    /// Empty patterns never match.
    #[must_use]
    pub fn find_first_in<P: AsRef<[u8]>>(
        &self,
        patterns: &[P],
        window: SearchWindow,
    ) -> Option<Match> {
        first_in(&self.data, patterns, window.resolve(self.len()))
    }

    /// All occurrences of any of `patterns`, scanning forward and resuming
    /// after each match.
    #[must_use]
    pub fn find_all_in<P: AsRef<[u8]>>(&self, patterns: &[P], window: SearchWindow) -> Vec<Match> {
        match window.resolve_forward(self.len()) {
            Some(w) => all_in(&self.data, patterns, w),
            None => Vec::new(),
        }
    }

    /// End offsets of all non-overlapping occurrences of `pattern`.
    #[must_use]
    pub fn find_all_pattern_in(&self, pattern: impl AsRef<[u8]>, window: SearchWindow) -> Vec<usize> {
        match window.resolve_forward(self.len()) {
            Some(w) => all_pattern_in(&self.data, pattern.as_ref(), w),
            None => Vec::new(),
        }
    }

    /// Skips occurrences of `patterns` adjacent to the window start and
    /// returns the following span that none of them covers.
    ///
    /// ```rust
    /// use bytestream::{ByteBuffer, SearchWindow};
    ///
    /// let buf = ByteBuffer::from(&b"  key  "[..]);
    /// let found = buf.find_first_not_in(&[b" "], SearchWindow::default());
    /// assert_eq!(found.value, b"key");
    /// assert_eq!((found.left.position, found.right.position), (2, 6));
    /// ```
    #[must_use]
    pub fn find_first_not_in<P: AsRef<[u8]>>(
        &self,
        patterns: &[P],
        window: SearchWindow,
    ) -> NotInMatch {
        first_not_in(&self.data, patterns, window.resolve(self.len()))
    }

    /// Every uncovered span, scanning forward until a span reaches the end
    /// of the window.
    #[must_use]
    pub fn find_all_not_in<P: AsRef<[u8]>>(
        &self,
        patterns: &[P],
        window: SearchWindow,
    ) -> Vec<NotInMatch> {
        let mut spans = Vec::new();
        let Some(w) = window.resolve_forward(self.len()) else {
            return spans;
        };
        let (mut start, mut length) = (w.start, w.length);
        loop {
            let found = first_not_in(
                &self.data,
                patterns,
                Resolved {
                    start,
                    length,
                    backward: false,
                },
            );
            let next = found.right.position;
            let last = found.right.id.is_none();
            length = length.saturating_sub(next - start);
            start = next;
            spans.push(found);
            if last {
                return spans;
            }
        }
    }

    /// Finds the next run of back-to-back occurrences of `patterns`.
    #[must_use]
    pub fn find_first_sequence<P: AsRef<[u8]>>(
        &self,
        patterns: &[P],
        window: SearchWindow,
    ) -> Option<SequenceMatch> {
        first_sequence(&self.data, patterns, window.resolve(self.len()))
    }

    #[must_use]
    pub fn find_all_sequences<P: AsRef<[u8]>>(
        &self,
        patterns: &[P],
        window: SearchWindow,
    ) -> Vec<SequenceMatch> {
        let mut runs = Vec::new();
        let Some(w) = window.resolve_forward(self.len()) else {
            return runs;
        };
        let (mut start, mut length) = (w.start, w.length);
        while let Some(run) = first_sequence(
            &self.data,
            patterns,
            Resolved {
                start,
                length,
                backward: false,
            },
        ) {
            length -= run.position - start;
            start = run.position;
            runs.push(run);
        }
        runs
    }

    /// Matches opening and closing delimiters, innermost first, and returns
    /// the pairs ordered by opening offset.
    ///
    /// Positions are end offsets as reported by
    /// [`find_all_pattern_in`](Self::find_all_pattern_in). Identical
    /// delimiters cannot be paired and yield nothing.
    ///
    /// ```rust
    /// use bytestream::{ByteBuffer, Pair, SearchWindow};
    ///
    /// let buf = ByteBuffer::from(&b"<a><a></a></a>"[..]);
    /// let pairs = buf.find_paired_patterns(b"<a>", b"</a>", SearchWindow::default());
    /// assert_eq!(pairs, [Pair { left: 3, right: 14 }, Pair { left: 6, right: 10 }]);
    /// ```
    #[must_use]
    pub fn find_paired_patterns(
        &self,
        left: impl AsRef<[u8]>,
        right: impl AsRef<[u8]>,
        window: SearchWindow,
    ) -> Vec<Pair<usize>> {
        let (left, right) = (left.as_ref(), right.as_ref());
        if left == right {
            return Vec::new();
        }
        let Some(w) = window.resolve_forward(self.len()) else {
            return Vec::new();
        };
        pair_up(
            all_pattern_in(&self.data, left, w),
            all_pattern_in(&self.data, right, w),
        )
    }

    /// [`find_paired_patterns`](Self::find_paired_patterns) over sets of
    /// opening and closing delimiters.
    #[must_use]
    pub fn find_paired_arrays<L: AsRef<[u8]>, R: AsRef<[u8]>>(
        &self,
        lefts: &[L],
        rights: &[R],
        window: SearchWindow,
    ) -> Vec<Pair<Match>> {
        let Some(w) = window.resolve_forward(self.len()) else {
            return Vec::new();
        };
        pair_up(
            all_in(&self.data, lefts, w),
            all_in(&self.data, rights, w),
        )
    }

    /// Replaces every occurrence of `search` inside the window with
    /// `replace`, rebuilding the buffer in a single pass.
    ///
    /// Returns `None`, leaving the buffer untouched, when `search` does not
    /// occur.
    pub fn replace_pattern(
        &mut self,
        search: impl AsRef<[u8]>,
        replace: impl AsRef<[u8]>,
        window: SearchWindow,
    ) -> Option<Replacement> {
        let search = search.as_ref();
        let w = window.resolve_forward(self.len())?;
        let ends = all_pattern_in(&self.data, search, w);
        if ends.is_empty() {
            return None;
        }
        Some(self.rewrite(search, replace.as_ref(), ends))
    }

    /// Like [`replace_pattern`](Self::replace_pattern), over matches found
    /// earlier with [`find_all_in`](Self::find_all_in).
    ///
    /// # Errors
    ///
    /// [`BufferError::StartOutOfRange`] when `start` lies outside the buffer,
    /// [`BufferError::InvalidMatch`] when a match does not end an occurrence
    /// of `search` at or after `start` or overlaps its predecessor. Nothing
    /// is modified on error.
    pub fn replace_matches(
        &mut self,
        search: impl AsRef<[u8]>,
        replace: impl AsRef<[u8]>,
        start: usize,
        matches: &[Match],
    ) -> Result<Option<Replacement>, BufferError> {
        self.check_start(start)?;
        let search = search.as_ref();
        if matches.is_empty() {
            return Ok(None);
        }
        let mut floor = start;
        for m in matches {
            let valid = !search.is_empty()
                && m.position >= floor + search.len()
                && matches_at(&self.data, m.position - search.len(), search);
            if !valid {
                return Err(BufferError::InvalidMatch {
                    position: m.position,
                });
            }
            floor = m.position;
        }
        let ends = matches.iter().map(|m| m.position).collect();
        Ok(Some(self.rewrite(search, replace.as_ref(), ends)))
    }

    fn rewrite(&mut self, search: &[u8], replace: &[u8], ends: Vec<usize>) -> Replacement {
        let mut out =
            Vec::with_capacity(self.len() - ends.len() * search.len() + ends.len() * replace.len());
        let mut replace_positions = Vec::with_capacity(ends.len());
        let mut copied = 0;
        for &end in &ends {
            out.extend_from_slice(&self.data[copied..end - search.len()]);
            replace_positions.push(out.len());
            out.extend_from_slice(replace);
            copied = end;
        }
        out.extend_from_slice(&self.data[copied..]);
        tracing::trace!(
            occurrences = ends.len(),
            from = self.len(),
            to = out.len(),
            "rewrote byte buffer"
        );
        self.replace_contents(out);
        Replacement {
            search_positions: ends,
            replace_positions,
        }
    }

    /// Steps over a run of back-to-back `patterns` and returns the offset
    /// where the run stops, never leaving the window.
    #[must_use]
    pub fn skip_patterns<P: AsRef<[u8]>>(&self, patterns: &[P], window: SearchWindow) -> usize {
        skip(&self.data, patterns, window.resolve(self.len()))
    }

    /// Scans byte by byte for the first offset where any of `patterns`
    /// occurs: the match start for forward scans, the match end for backward
    /// scans.
    #[must_use]
    pub fn skip_not_patterns<P: AsRef<[u8]>>(
        &self,
        patterns: &[P],
        window: SearchWindow,
    ) -> Option<usize> {
        skip_not(&self.data, patterns, window.resolve(self.len()))
    }
}
