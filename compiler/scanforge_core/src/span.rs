//! Source location spans.
//!
//! Positions are byte offsets into the caller's UTF-8 source. The engine
//! never sees the source itself, only `(symbol, offset)` pairs, so a span is
//! the only link between a token and its text.

use std::fmt;

/// Half-open byte range `start..end`.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset of the first symbol
/// - end: u32 - byte offset one past the last symbol
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create a point span (zero-length).
    ///
    /// Only control tokens carry point spans.
    #[inline]
    pub const fn point(offset: u32) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Span of a single symbol starting at `pos`.
    #[inline]
    pub fn of_symbol(symbol: char, pos: u32) -> Self {
        Span::new(pos, symbol_end(symbol, pos))
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Convert to a `std::ops::Range` for slicing the source.
    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Byte offset just past `symbol` when it starts at `pos`.
///
/// Saturates at `u32::MAX`.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    reason = "a UTF-8 encoded scalar is at most 4 bytes"
)]
pub fn symbol_end(symbol: char, pos: u32) -> u32 {
    pos.saturating_add(symbol.len_utf8() as u32)
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
