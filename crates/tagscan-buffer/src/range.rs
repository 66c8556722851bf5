//! Text ranges.
//!
//! Ranges are half-open like Rust's `Range<T>`: `start` is inclusive and
//! `end` exclusive, so a zero-width range is simply `start == end`.

use crate::Position;
use serde::{Deserialize, Serialize};

/// A span of text between two positions.
///
/// The start is always before or equal to the end (normalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl TextRange {
    /// Creates a new range, swapping the ends if given in reverse.
    pub fn new(start: Position, end: Position) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a range within a single line.
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self::new(
            Position::new(line, start_column),
            Position::new(line, end_column),
        )
    }

    /// Returns true if the range is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if a position lies on the range, either end included.
    ///
    /// A cursor left just after a selected tag still touches it.
    pub fn touches(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
