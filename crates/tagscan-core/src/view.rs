//! Grouped list view of cached tags.
//!
//! One group per file, sorted by label, each holding that file's tags in
//! line order. Labels, descriptions and tooltips are preformatted so a host
//! only has to render strings.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::cache::ScanCache;
use crate::document::DocumentId;
use crate::scanner::FoundTag;

/// Longest preview shown in an item label, in characters.
pub const PREVIEW_CHARS: usize = 80;

/// One tag row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagItem {
    /// `TAG: preview`
    pub label: String,
    /// `:line`, one-based
    pub description: String,
    /// `path:line` then the trimmed line text
    pub tooltip: String,
    /// The tag itself, for navigation
    pub tag: FoundTag,
}

impl TagItem {
    fn new(tag: &FoundTag) -> Self {
        let line_text = tag.line_text.trim();
        let preview = if tag.tag_text.is_empty() {
            line_text
        } else {
            tag.tag_text.as_str()
        };

        Self {
            label: format!("{}: {}", tag.tag, truncate(preview, PREVIEW_CHARS)),
            description: format!(":{}", tag.line + 1),
            tooltip: format!("{}:{}\n{}", tag.document_id, tag.line + 1, line_text),
            tag: tag.clone(),
        }
    }
}

/// All tags of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileGroup {
    /// Path relative to the root when possible
    pub label: String,
    /// Tag count, `(n)`
    pub description: String,
    pub document_id: DocumentId,
    pub items: Vec<TagItem>,
}

/// The grouped view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagTree {
    pub groups: Vec<FileGroup>,
}

impl TagTree {
    /// Builds the view from the cache. Files without tags are left out.
    pub fn build(cache: &ScanCache, root: Option<&Path>) -> Self {
        Self::from_tags(&cache.all_merged(), root)
    }

    /// Builds the view from any tag list.
    pub fn from_tags(tags: &[FoundTag], root: Option<&Path>) -> Self {
        let mut by_file: BTreeMap<&DocumentId, Vec<&FoundTag>> = BTreeMap::new();
        for tag in tags {
            by_file.entry(&tag.document_id).or_default().push(tag);
        }

        let mut groups: Vec<FileGroup> = by_file
            .into_iter()
            .map(|(id, mut tags)| {
                tags.sort_by_key(|t| t.range.start);
                FileGroup {
                    label: relative_label(id, root),
                    description: format!("({})", tags.len()),
                    document_id: id.clone(),
                    items: tags.into_iter().map(TagItem::new).collect(),
                }
            })
            .collect();

        groups.sort_by(|a, b| a.label.cmp(&b.label));
        Self { groups }
    }

    /// Total number of tags.
    pub fn tag_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl std::fmt::Display for TagTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for group in &self.groups {
            writeln!(f, "{} {}", group.label, group.description)?;
            for item in &group.items {
                writeln!(f, "  {} {}", item.label, item.description)?;
            }
        }
        Ok(())
    }
}

fn relative_label(id: &DocumentId, root: Option<&Path>) -> String {
    let path = Path::new(id.as_str());
    root.and_then(|root| path.strip_prefix(root).ok())
        .map_or_else(|| id.to_string(), |rel| rel.display().to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
