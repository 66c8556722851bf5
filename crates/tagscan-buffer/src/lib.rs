//! # tagscan Buffer
//!
//! Text storage and coordinates for documents being scanned for tags.
//!
//! ## Key Concepts
//!
//! - `TextBuffer` owns a rope and hands out lines without their line terminator
//! - `Position` is a zero-based line/column pair, columns counted in characters
//! - `TextRange` is a half-open `start..end` span between two positions
//!
//! Scanners only ever borrow buffers, so the same buffer can be edited by the
//! host and rescanned as often as needed.

mod buffer;
mod position;
mod range;

pub use buffer::TextBuffer;
pub use position::Position;
pub use range::TextRange;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
