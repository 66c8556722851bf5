//! Most recent scan result per document.

use std::collections::HashMap;

use crate::document::DocumentId;
use crate::scanner::FoundTag;

/// Document identity to the tags found by its latest scan.
///
/// Entries are replaced whole; a lookup miss is an empty slice.
#[derive(Debug, Clone, Default)]
pub struct ScanCache {
    entries: HashMap<DocumentId, Vec<FoundTag>>,
}

impl ScanCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entry of a document.
    pub fn put(&mut self, id: DocumentId, tags: Vec<FoundTag>) {
        self.entries.insert(id, tags);
    }

    /// Returns the entry of a document, empty if there is none.
    pub fn get(&self, id: &DocumentId) -> &[FoundTag] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true if the document has an entry, even an empty one.
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.entries.contains_key(id)
    }

    /// Drops one entry, or all of them when `id` is `None`.
    pub fn invalidate(&mut self, id: Option<&DocumentId>) {
        match id {
            Some(id) => {
                self.entries.remove(id);
            }
            None => self.entries.clear(),
        }
    }

    /// All entries concatenated, in no particular document order.
    pub fn all_merged(&self) -> Vec<FoundTag> {
        self.entries.values().flatten().cloned().collect()
    }

    /// All entries ordered by document, then line, then column.
    pub fn all_sorted(&self) -> Vec<FoundTag> {
        let mut tags = self.all_merged();
        tags.sort_by(|a, b| {
            a.document_id
                .cmp(&b.document_id)
                .then(a.range.start.cmp(&b.range.start))
        });
        tags
    }

    /// Ids of the cached documents, sorted.
    pub fn documents(&self) -> Vec<&DocumentId> {
        let mut ids: Vec<_> = self.entries.keys().collect();
        ids.sort();
        ids
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagscan_buffer::TextRange;

    fn tag(doc: &str, line: usize) -> FoundTag {
        FoundTag {
            document_id: DocumentId::new(doc),
            range: TextRange::on_line(line, 3, 7),
            line_text: "// TODO".to_string(),
            tag: "TODO".to_string(),
            tag_text: String::new(),
            line,
        }
    }

    #[test]
    fn test_miss_is_empty() {
        let mut cache = ScanCache::new();
        assert!(cache.get(&DocumentId::new("nope")).is_empty());
        assert!(!cache.contains(&DocumentId::new("nope")));

        cache.put(DocumentId::new("clean.rs"), Vec::new());
        assert!(cache.contains(&DocumentId::new("clean.rs")));
    }

    #[test]
    fn test_put_replaces() {
        let mut cache = ScanCache::new();
        let id = DocumentId::new("a.rs");
        cache.put(id.clone(), vec![tag("a.rs", 1), tag("a.rs", 2)]);
        cache.put(id.clone(), vec![tag("a.rs", 9)]);

        assert_eq!(cache.get(&id), &[tag("a.rs", 9)]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate() {
        let mut cache = ScanCache::new();
        cache.put(DocumentId::new("a.rs"), vec![tag("a.rs", 1)]);
        cache.put(DocumentId::new("b.rs"), vec![tag("b.rs", 1)]);

        cache.invalidate(Some(&DocumentId::new("a.rs")));
        assert_eq!(cache.documents(), vec![&DocumentId::new("b.rs")]);

        cache.invalidate(None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sorted_view() {
        let mut cache = ScanCache::new();
        cache.put(DocumentId::new("b.rs"), vec![tag("b.rs", 0)]);
        cache.put(DocumentId::new("a.rs"), vec![tag("a.rs", 4), tag("a.rs", 2)]);

        assert_eq!(cache.all_merged().len(), 3);
        let sorted: Vec<_> = cache
            .all_sorted()
            .into_iter()
            .map(|t| (t.document_id.to_string(), t.line))
            .collect();
        assert_eq!(
            sorted,
            [("a.rs".to_string(), 2), ("a.rs".to_string(), 4), ("b.rs".to_string(), 0)]
        );
    }
}
