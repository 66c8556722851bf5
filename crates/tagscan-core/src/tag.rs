//! Tag configuration and matching.
//!
//! Every configured tag compiles to a case-insensitive pattern of the shape
//! `(name or custom pattern)(":" or whitespace)?(annotation)$`. Tags are tried
//! in configuration order and the first one that matches a comment wins the
//! line.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tagscan_syntax::CommentSpan;

/// A tag to look for, as configured by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    /// Tag name, matched case-insensitively (e.g. "TODO")
    pub name: String,

    /// Custom pattern replacing the escaped name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Highlight color, e.g. "#ff0000"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Display ordering hint; not used for matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Icon name for list views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl TagConfig {
    /// Creates a tag matching its own name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: None,
            color: None,
            priority: None,
            icon: None,
        }
    }

    /// Sets a custom pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the highlight color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// The default tag set: TODO, FIXME and NOTE.
    pub fn defaults() -> Vec<TagConfig> {
        vec![Self::new("TODO"), Self::new("FIXME"), Self::new("NOTE")]
    }
}

/// A tag that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tag #{index} ({name:?}): {reason}")]
pub struct InvalidTag {
    /// Position in the configured list
    pub index: usize,
    /// Configured name
    pub name: String,
    /// Why it was rejected
    pub reason: String,
}

/// Errors reported when configuring tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("{} tag(s) rejected: {}", .0.len(), join_invalid(.0))]
    Invalid(Vec<InvalidTag>),
}

fn join_invalid(invalid: &[InvalidTag]) -> String {
    invalid
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A tag compiled for matching.
#[derive(Debug, Clone)]
struct CompiledTag {
    config: TagConfig,
    /// Full pattern with the annotation capture
    matcher: Regex,
    /// Case-insensitive literal name, used to recover the column
    name: Regex,
}

impl CompiledTag {
    fn compile(config: &TagConfig) -> Result<Self, String> {
        if config.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }

        let escaped = regex::escape(&config.name);
        let pattern = match &config.pattern {
            Some(custom) => {
                // Compiled on its own first so an unbalanced group can't
                // leak into the wrapper.
                Regex::new(custom).map_err(|e| format!("invalid pattern: {e}"))?;
                custom.as_str()
            }
            None => escaped.as_str(),
        };

        let matcher = Regex::new(&format!(r"(?i)(?:{pattern})(?::|\s)?(?P<annotation>.*)$"))
            .map_err(|e| format!("invalid pattern: {e}"))?;
        let name = Regex::new(&format!("(?i){escaped}")).map_err(|e| e.to_string())?;

        Ok(Self {
            config: config.clone(),
            matcher,
            name,
        })
    }

    /// Byte index in the line where the match starts.
    ///
    /// Searches the comment text for the literal name, then for the matched
    /// text, then falls back to the comment offset.
    fn resolve_start(&self, span: &CommentSpan<'_>, matched: &str) -> usize {
        self.name
            .find(span.text)
            .map(|m| m.start())
            .or_else(|| span.text.find(matched))
            .map_or(span.offset, |idx| span.offset + idx)
    }
}

/// A tag found on one line, in full-line character columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch<'t> {
    /// Configured name of the matching tag
    pub tag: &'t str,
    /// Trimmed text following the tag
    pub annotation: String,
    /// Start column (inclusive)
    pub start_column: usize,
    /// End column (exclusive)
    pub end_column: usize,
}

/// The active, compiled tag list.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    tags: Vec<CompiledTag>,
}

impl TagSet {
    /// Compiles a tag list, keeping every valid tag.
    ///
    /// Returns the compiled set together with the tags that were rejected.
    pub fn compile(configs: &[TagConfig]) -> (Self, Vec<InvalidTag>) {
        let mut tags = Vec::with_capacity(configs.len());
        let mut invalid = Vec::new();

        for (index, config) in configs.iter().enumerate() {
            match CompiledTag::compile(config) {
                Ok(tag) => {
                    if tags
                        .iter()
                        .any(|t: &CompiledTag| t.config.name.eq_ignore_ascii_case(&config.name))
                    {
                        tracing::warn!(
                            "Duplicate tag {:?} at #{}; the earlier entry matches first",
                            config.name,
                            index
                        );
                    }
                    tags.push(tag);
                }
                Err(reason) => invalid.push(InvalidTag {
                    index,
                    name: config.name.clone(),
                    reason,
                }),
            }
        }

        (Self { tags }, invalid)
    }

    /// Compiles a tag list, failing if any tag is invalid.
    pub fn new(configs: &[TagConfig]) -> Result<Self, TagError> {
        let (set, invalid) = Self::compile(configs);
        if invalid.is_empty() {
            Ok(set)
        } else {
            Err(TagError::Invalid(invalid))
        }
    }

    /// Finds the first configured tag matching the comment part of `line`.
    ///
    /// `span` must have been located in `line`; a span whose text is not
    /// found at its offset matches nothing.
    pub fn find(&self, line: &str, span: &CommentSpan<'_>) -> Option<TagMatch<'_>> {
        let in_line = span
            .offset
            .checked_add(span.text.len())
            .and_then(|end| line.get(span.offset..end));
        if in_line != Some(span.text) {
            tracing::trace!("Comment span at byte {} is not part of the line", span.offset);
            return None;
        }

        self.tags.iter().find_map(|tag| {
            let captures = tag.matcher.captures(span.text)?;
            let matched = captures.get(0)?.as_str().trim();
            let annotation = captures
                .name("annotation")
                .map_or("", |m| m.as_str())
                .trim()
                .to_string();

            let start = tag.resolve_start(span, matched);
            let start_column = line[..start].chars().count();
            let line_columns = line.chars().count();
            let end_column = (start_column + matched.chars().count()).min(line_columns);

            Some(TagMatch {
                tag: &tag.config.name,
                annotation,
                start_column,
                end_column,
            })
        })
    }

    /// Returns the configured tags in matching order.
    pub fn configs(&self) -> impl Iterator<Item = &TagConfig> {
        self.tags.iter().map(|t| &t.config)
    }

    /// Returns the number of active tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if no tags are active.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
