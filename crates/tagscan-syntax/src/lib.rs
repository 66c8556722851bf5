//! # tagscan Syntax
//!
//! Lexical comment detection for tag scanning.
//!
//! ## Why not a parser?
//!
//! Tags only need to be found inside comments, and comments are delimited by a
//! handful of literal markers per language. A table of markers plus a small
//! line-by-line state machine covers every language the same way:
//! - **Cheap**: one pass over each line, no allocation
//! - **Uniform**: adding a language is adding a table row
//! - **Heuristic**: a marker inside a string literal still opens a comment
//!
//! The table lives in [`language`], the state machine in [`locator`].

pub mod language;
pub mod locator;

pub use language::{BlockDelimiters, CommentSyntax, CommentSyntaxTable};
pub use locator::{BlockState, CommentLocator, CommentSpan};

/// Errors that can occur while building comment syntax descriptors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Empty comment marker for language: {0}")]
    EmptyMarker(String),

    #[error("Block comment for language {0} needs both a start and an end marker")]
    IncompleteBlock(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javascript_comments() {
        let table = CommentSyntaxTable::new();
        let syntax = table.get("javascript").unwrap();
        let mut locator = CommentLocator::new(syntax);

        let span = locator.next_line("let a = 1; // TODO: rename").unwrap();
        assert_eq!(span.text, " TODO: rename");
        assert_eq!(span.offset, 13);
        assert!(locator.next_line("let b = 2;").is_none());
    }

    #[test]
    fn test_unknown_language() {
        let table = CommentSyntaxTable::new();
        assert!(table.get("unknown_lang").is_none());
    }
}
