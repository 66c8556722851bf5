//! Jumping between tags of a document.
//!
//! A cursor touching a tag (its end included) counts as sitting on it, so
//! the jump goes to that tag's neighbour. Both directions wrap around at the
//! ends of the document.

use tagscan_buffer::Position;

use crate::scanner::FoundTag;

fn by_start(tags: &[FoundTag]) -> Vec<&FoundTag> {
    let mut sorted: Vec<&FoundTag> = tags.iter().collect();
    sorted.sort_by_key(|t| t.range.start);
    sorted
}

/// The tag after the one under `pos`, else the first tag starting after
/// `pos`, else the first tag of the document.
pub fn next_tag(tags: &[FoundTag], pos: Position) -> Option<&FoundTag> {
    let sorted = by_start(tags);
    let first = *sorted.first()?;

    if let Some(idx) = sorted.iter().position(|t| t.range.touches(pos)) {
        return Some(sorted[(idx + 1) % sorted.len()]);
    }
    Some(sorted.into_iter().find(|t| t.range.start > pos).unwrap_or(first))
}

/// The tag before the one under `pos`, else the last tag starting before
/// `pos`, else the last tag of the document.
pub fn previous_tag(tags: &[FoundTag], pos: Position) -> Option<&FoundTag> {
    let sorted = by_start(tags);
    let last = *sorted.last()?;

    if let Some(idx) = sorted.iter().position(|t| t.range.touches(pos)) {
        return Some(sorted[(idx + sorted.len() - 1) % sorted.len()]);
    }
    Some(sorted.into_iter().rev().find(|t| t.range.start < pos).unwrap_or(last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentId;
    use tagscan_buffer::TextRange;

    fn at(line: usize, column: usize) -> FoundTag {
        FoundTag {
            document_id: DocumentId::new("a.rs"),
            range: TextRange::on_line(line, column, column + 4),
            line_text: String::new(),
            tag: "TODO".to_string(),
            tag_text: String::new(),
            line,
        }
    }

    #[test]
    fn test_next_wraps() {
        let tags = [at(2, 3), at(7, 0), at(7, 10)];
        assert_eq!(next_tag(&tags, Position::new(0, 0)), Some(&tags[0]));
        assert_eq!(next_tag(&tags, Position::new(2, 3)), Some(&tags[1]));
        assert_eq!(next_tag(&tags, Position::new(7, 5)), Some(&tags[2]));
        assert_eq!(next_tag(&tags, Position::new(9, 0)), Some(&tags[0]));
    }

    #[test]
    fn test_previous_wraps() {
        let tags = [at(2, 3), at(7, 0)];
        assert_eq!(previous_tag(&tags, Position::new(7, 0)), Some(&tags[0]));
        assert_eq!(previous_tag(&tags, Position::new(8, 0)), Some(&tags[1]));
        assert_eq!(previous_tag(&tags, Position::new(1, 0)), Some(&tags[1]));
    }

    #[test]
    fn test_cursor_at_tag_end_counts_as_on_tag() {
        let tags = [at(2, 3), at(7, 0), at(9, 2)];
        assert_eq!(previous_tag(&tags, tags[1].range.end), Some(&tags[0]));
        assert_eq!(previous_tag(&tags, tags[0].range.end), Some(&tags[2]));
        assert_eq!(next_tag(&tags, tags[1].range.end), Some(&tags[2]));
        assert_eq!(next_tag(&tags, tags[2].range.end), Some(&tags[0]));
    }

    #[test]
    fn test_unsorted_input() {
        let tags = [at(7, 0), at(2, 3)];
        assert_eq!(next_tag(&tags, Position::new(2, 5)), Some(&tags[0]));
        assert_eq!(previous_tag(&tags, Position::new(7, 1)), Some(&tags[1]));
    }

    #[test]
    fn test_no_tags() {
        assert!(next_tag(&[], Position::ZERO).is_none());
        assert!(previous_tag(&[], Position::ZERO).is_none());
    }
}
