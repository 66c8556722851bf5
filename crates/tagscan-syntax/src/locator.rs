//! Line-by-line comment location.
//!
//! For each line the locator returns the part of the line that lies inside a
//! comment and where that part starts. Block comments that are not closed on
//! their opening line are carried over to the following lines through
//! [`BlockState`], which lives only as long as one pass over a document.
//!
//! Per line, in order:
//! 1. Inside a block: everything up to the end marker (or the whole line).
//! 2. Otherwise the earliest of block start and line marker wins; on a tie the
//!    line marker wins.
//! 3. Otherwise there is no comment on the line.
//!
//! Text after a block end on the same line is never inspected.

use crate::language::CommentSyntax;

/// Running block-comment state carried from one line to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockState<'s> {
    pending_end: Option<&'s str>,
}

impl BlockState<'_> {
    /// Returns true while an unterminated block comment is open.
    pub fn in_block(&self) -> bool {
        self.pending_end.is_some()
    }
}

/// The commented part of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSpan<'a> {
    /// Comment text, markers excluded
    pub text: &'a str,
    /// Byte offset of `text` within the full line
    pub offset: usize,
}

impl<'a> CommentSpan<'a> {
    fn from_range(line: &'a str, start: usize, end: usize) -> Self {
        Self {
            text: &line[start..end],
            offset: start,
        }
    }
}

/// Finds the comment part of `line` and updates `state`.
pub fn locate<'a, 's>(
    line: &'a str,
    syntax: &'s CommentSyntax,
    state: &mut BlockState<'s>,
) -> Option<CommentSpan<'a>> {
    if let Some(end_marker) = state.pending_end {
        return Some(match line.find(end_marker) {
            Some(end) => {
                state.pending_end = None;
                CommentSpan::from_range(line, 0, end)
            }
            None => CommentSpan::from_range(line, 0, line.len()),
        });
    }

    let line_marker = syntax.line();
    let line_idx = line_marker.and_then(|marker| line.find(marker));

    if let Some(block) = syntax.block() {
        if let Some(start) = line.find(&*block.start) {
            if line_idx.is_none_or(|l| start < l) {
                let body = start + block.start.len();
                return Some(match line[body..].find(&*block.end) {
                    Some(rel_end) => CommentSpan::from_range(line, body, body + rel_end),
                    None => {
                        state.pending_end = Some(&*block.end);
                        CommentSpan::from_range(line, body, line.len())
                    }
                });
            }
        }
    }

    match (line_marker, line_idx) {
        (Some(marker), Some(idx)) => {
            Some(CommentSpan::from_range(line, idx + marker.len(), line.len()))
        }
        _ => None,
    }
}

/// Stateful comment locator over the consecutive lines of one document.
///
/// Create a fresh locator for every pass over a document.
#[derive(Debug, Clone)]
pub struct CommentLocator<'s> {
    syntax: &'s CommentSyntax,
    state: BlockState<'s>,
}

impl<'s> CommentLocator<'s> {
    /// Creates a locator positioned before the first line.
    pub fn new(syntax: &'s CommentSyntax) -> Self {
        Self {
            syntax,
            state: BlockState::default(),
        }
    }

    /// Locates the comment part of the next line.
    pub fn next_line<'a>(&mut self, line: &'a str) -> Option<CommentSpan<'a>> {
        locate(line, self.syntax, &mut self.state)
    }

    /// Returns the current block state.
    pub fn state(&self) -> BlockState<'s> {
        self.state
    }
}
