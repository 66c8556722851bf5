//! The scan orchestrator.
//!
//! A [`Scanner`] owns the compiled tags, the comment syntax table and the
//! result cache. Scanning a document runs the comment locator and the tag
//! matcher over every line in order and replaces that document's cache entry.
//!
//! ## Batch scans
//!
//! `scan_many` enumerates files through a [`FileProvider`] and scans them one
//! at a time, yielding to the runtime between files. A file that cannot be
//! opened, or a directory entry the enumeration could not read, is recorded
//! in [`BatchScan::skipped`] and the batch carries on.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;

use tagscan_buffer::TextRange;
use tagscan_syntax::{CommentLocator, CommentSyntaxTable};

use crate::cache::ScanCache;
use crate::config::Config;
use crate::document::{DocumentId, TextSource};
use crate::event::{EventBus, ScanEvent};
use crate::tag::{TagConfig, TagError, TagSet};
use crate::workspace::FileProvider;
use crate::CoreResult;

/// One tag occurrence.
///
/// Serializes as
/// `{documentId, range: {startLine, startCol, endLine, endCol}, lineText, tag, tagText, line}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundTag {
    /// Document the tag was found in
    pub document_id: DocumentId,
    /// Span of the matched text, in character columns
    #[serde(with = "wire_range")]
    pub range: TextRange,
    /// Full text of the line
    pub line_text: String,
    /// Configured name of the matching tag
    pub tag: String,
    /// Trimmed text following the tag
    pub tag_text: String,
    /// Zero-based line number
    pub line: usize,
}

mod wire_range {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use tagscan_buffer::{Position, TextRange};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct WireRange {
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    }

    pub fn serialize<S: Serializer>(range: &TextRange, serializer: S) -> Result<S::Ok, S::Error> {
        WireRange {
            start_line: range.start.line,
            start_col: range.start.column,
            end_line: range.end.line,
            end_col: range.end.column,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TextRange, D::Error> {
        let wire = WireRange::deserialize(deserializer)?;
        Ok(TextRange::new(
            Position::new(wire.start_line, wire.start_col),
            Position::new(wire.end_line, wire.end_col),
        ))
    }
}

/// A file left out of a batch scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchScan {
    /// Tags of every scanned file, file by file
    pub tags: Vec<FoundTag>,
    /// Number of files opened and scanned
    pub scanned: usize,
    /// Files that could not be opened, and directories that could not be read
    pub skipped: Vec<SkippedFile>,
}

/// Scans documents for tags and caches the results.
#[derive(Debug)]
pub struct Scanner {
    tags: TagSet,
    syntaxes: CommentSyntaxTable,
    cache: ScanCache,
    events: EventBus,
}

impl Scanner {
    /// Creates a scanner with the default tags and built-in languages.
    pub fn new() -> Self {
        Self::with_syntaxes(CommentSyntaxTable::new())
    }

    /// Creates a scanner with the default tags and the given languages.
    pub fn with_syntaxes(syntaxes: CommentSyntaxTable) -> Self {
        let (tags, _) = TagSet::compile(&TagConfig::defaults());
        Self {
            tags,
            syntaxes,
            cache: ScanCache::new(),
            events: EventBus::new(),
        }
    }

    /// Creates a scanner from a config, failing on invalid tags or languages.
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let mut scanner = Self::with_syntaxes(config.comment_syntaxes()?);
        scanner.configure(&config.tags)?;
        Ok(scanner)
    }

    /// Replaces the active tags.
    ///
    /// Every valid tag is installed even when some are rejected; the
    /// rejected ones are returned in the error. Cached results are left as
    /// they are until their documents are rescanned.
    pub fn configure(&mut self, tags: &[TagConfig]) -> Result<(), TagError> {
        let (set, invalid) = TagSet::compile(tags);
        for tag in &invalid {
            tracing::warn!("Ignoring {}", tag);
        }

        tracing::debug!("Configured {} tags", set.len());
        self.events.emit(ScanEvent::TagsConfigured {
            active: set.len(),
            rejected: invalid.len(),
        });
        self.tags = set;

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(TagError::Invalid(invalid))
        }
    }

    /// Scans one document and replaces its cache entry.
    ///
    /// Unscannable documents yield nothing and leave the cache alone. If the
    /// document disappears mid-scan, the tags found so far are returned and
    /// the cache is not touched.
    pub fn scan_document<S: TextSource + ?Sized>(&mut self, doc: &S) -> Vec<FoundTag> {
        let id = doc.id();
        if !doc.is_scannable() {
            tracing::debug!("Skipping non-text document {}", id);
            return Vec::new();
        }

        let mut found = Vec::new();

        if let Some(syntax) = self.syntaxes.get(doc.language()) {
            let mut locator = CommentLocator::new(syntax);

            for line_no in 0..doc.line_count() {
                let Some(line) = doc.line_text(line_no) else {
                    tracing::debug!(
                        "{} went away at line {}, returning {} partial results",
                        id,
                        line_no,
                        found.len()
                    );
                    return found;
                };

                let Some(span) = locator.next_line(&line) else {
                    continue;
                };

                if let Some(m) = self.tags.find(&line, &span) {
                    found.push(FoundTag {
                        document_id: id.clone(),
                        range: TextRange::on_line(line_no, m.start_column, m.end_column),
                        line_text: line.to_string(),
                        tag: m.tag.to_string(),
                        tag_text: m.annotation,
                        line: line_no,
                    });
                }
            }
        } else {
            tracing::trace!("No comment syntax for language {:?}", doc.language());
        }

        tracing::debug!("Scanned {}: {} tags", id, found.len());
        self.cache.put(id.clone(), found.clone());
        self.events.emit(ScanEvent::DocumentScanned {
            id: id.clone(),
            count: found.len(),
        });
        found
    }

    /// Scans every file the provider lists for `include` minus `exclude`.
    ///
    /// Fails only if the files cannot be enumerated.
    pub async fn scan_many<P: FileProvider + ?Sized>(
        &mut self,
        provider: &P,
        include: &str,
        exclude: Option<&str>,
    ) -> CoreResult<BatchScan> {
        let listing = provider.find_files(include, exclude)?;
        tracing::debug!("Batch scan of {} files", listing.files.len());

        let mut batch = BatchScan::default();
        for skipped in listing.unreadable {
            self.skip(&mut batch, skipped);
        }

        for path in listing.files {
            match provider.open(&path) {
                Ok(doc) => {
                    let tags = self.scan_document(&doc);
                    batch.tags.extend(tags);
                    batch.scanned += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    let reason = e.to_string();
                    self.skip(&mut batch, SkippedFile { path, reason });
                }
            }

            tokio::task::yield_now().await;
        }

        tracing::info!(
            "Scanned {} files, {} tags, {} skipped",
            batch.scanned,
            batch.tags.len(),
            batch.skipped.len()
        );
        self.events.emit(ScanEvent::BatchFinished {
            scanned: batch.scanned,
            skipped: batch.skipped.len(),
        });

        Ok(batch)
    }

    fn skip(&self, batch: &mut BatchScan, skipped: SkippedFile) {
        self.events.emit(ScanEvent::FileSkipped {
            path: skipped.path.clone(),
            reason: skipped.reason.clone(),
        });
        batch.skipped.push(skipped);
    }

    // ==================== Cache Access ====================

    /// Returns the cached tags of a document, empty if never scanned.
    pub fn cached(&self, id: &DocumentId) -> &[FoundTag] {
        self.cache.get(id)
    }

    /// Returns every cached tag, in no particular document order.
    pub fn all_cached(&self) -> Vec<FoundTag> {
        self.cache.all_merged()
    }

    /// Returns every cached tag ordered by document, line and column.
    pub fn all_cached_sorted(&self) -> Vec<FoundTag> {
        self.cache.all_sorted()
    }

    /// Drops one cache entry, or all of them.
    pub fn invalidate(&mut self, id: Option<&DocumentId>) {
        self.cache.invalidate(id);
        self.events.emit(match id {
            Some(id) => ScanEvent::CacheInvalidated(id.clone()),
            None => ScanEvent::CacheCleared,
        });
    }

    /// Read-only view of the cache.
    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// The active tags.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// The comment syntax table.
    pub fn syntaxes(&self) -> &CommentSyntaxTable {
        &self.syntaxes
    }

    /// Subscribes to scan events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}
