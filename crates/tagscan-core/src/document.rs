//! Document management.
//!
//! ## Identity
//!
//! `DocumentId` is a newtype around the document's location string. It is
//! stable across edits and rescans, which is what makes it usable as a
//! cache key: a rescan of the same file replaces the earlier result.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tagscan_buffer::{Position, TextBuffer};

use crate::CoreResult;

/// Language id for documents whose content is not text.
pub const BINARY_LANGUAGE: &str = "binary";

/// Language id for documents with no better guess.
pub const PLAIN_TEXT_LANGUAGE: &str = "plaintext";

/// Stable identifier for a document, derived from its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates an id from an arbitrary location string.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Creates the id of a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().display().to_string())
    }

    /// Creates the id of an unsaved document.
    pub fn untitled(name: &str) -> Self {
        Self(format!("untitled:{name}"))
    }

    /// Returns the location string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the scanner needs from a document.
///
/// Hosts can implement this for their own document handles. `line_text`
/// returning `None` for a line below `line_count` means the document went
/// away while it was being read.
pub trait TextSource {
    /// Stable identity used as the cache key.
    fn id(&self) -> &DocumentId;

    /// Language identifier, e.g. "javascript".
    fn language(&self) -> &str;

    /// Number of lines.
    fn line_count(&self) -> usize;

    /// Text of one line without its terminator.
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;

    /// False for binary, closed or otherwise unscannable documents.
    fn is_scannable(&self) -> bool;
}

/// A text document: a buffer plus where it came from and what language it is.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable identifier
    id: DocumentId,

    /// The underlying text buffer
    buffer: TextBuffer,

    /// File path (None for untitled documents)
    path: Option<PathBuf>,

    /// Language identifier
    language: String,

    /// Set once the host closed the document
    closed: bool,
}

impl Document {
    /// Creates an untitled document from text.
    pub fn untitled(name: &str, language: &str, text: &str) -> Self {
        Self {
            id: DocumentId::untitled(name),
            buffer: TextBuffer::from(text),
            path: None,
            language: language.to_string(),
            closed: false,
        }
    }

    /// Creates a document with an explicit identity, as hosts with their own
    /// URIs do.
    pub fn from_text(id: DocumentId, language: &str, text: &str) -> Self {
        Self {
            id,
            buffer: TextBuffer::from(text),
            path: None,
            language: language.to_string(),
            closed: false,
        }
    }

    /// Opens a document from a file, detecting its language from its name.
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::from_file_with(path, &HashMap::new())
    }

    /// Opens a document from a file, consulting `extensions` (extension to
    /// language id) before the built-in mapping.
    pub fn from_file_with(
        path: impl AsRef<Path>,
        extensions: &HashMap<String, String>,
    ) -> CoreResult<Self> {
        let path = path.as_ref();
        let buffer = TextBuffer::from_file(path)?;

        let language = if buffer.contains_nul() {
            BINARY_LANGUAGE.to_string()
        } else {
            Self::detect_language(path, extensions)
        };

        Ok(Self {
            id: DocumentId::from_path(path),
            buffer,
            path: Some(path.to_path_buf()),
            language,
            closed: false,
        })
    }

    /// Detects the language of a path from its extension or file name.
    pub fn detect_language(path: &Path, extensions: &HashMap<String, String>) -> String {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match file_name.as_str() {
            "dockerfile" => return "dockerfile".to_string(),
            "makefile" | "gnumakefile" => return "makefile".to_string(),
            _ => {}
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return PLAIN_TEXT_LANGUAGE.to_string();
        };
        let ext = ext.to_lowercase();

        if let Some(language) = extensions.get(&ext) {
            return language.clone();
        }
        Self::language_from_extension(&ext)
    }

    /// Maps a file extension to a language identifier.
    fn language_from_extension(ext: &str) -> String {
        match ext {
            "rs" => "rust",
            "py" | "pyw" => "python",
            "js" | "mjs" | "cjs" => "javascript",
            "jsx" => "javascriptreact",
            "ts" | "mts" | "cts" => "typescript",
            "tsx" => "typescriptreact",
            "html" | "htm" => "html",
            "xml" | "xsd" | "svg" => "xml",
            "css" => "css",
            "scss" => "scss",
            "less" => "less",
            "json" => "json",
            "jsonc" => "jsonc",
            "yaml" | "yml" => "yaml",
            "toml" => "toml",
            "ini" | "cfg" => "ini",
            "md" | "markdown" => "markdown",
            "c" | "h" => "c",
            "cpp" | "hpp" | "cc" | "cxx" | "hh" => "cpp",
            "cs" => "csharp",
            "go" => "go",
            "java" => "java",
            "kt" | "kts" => "kotlin",
            "scala" => "scala",
            "swift" => "swift",
            "dart" => "dart",
            "php" => "php",
            "rb" => "ruby",
            "pl" | "pm" => "perl",
            "r" => "r",
            "ex" | "exs" => "elixir",
            "lua" => "lua",
            "hs" => "haskell",
            "sql" => "sql",
            "ps1" | "psm1" => "powershell",
            "sh" | "bash" | "zsh" => "shellscript",
            "vue" => "vue",
            "svelte" => "svelte",
            "txt" | "text" => PLAIN_TEXT_LANGUAGE,
            _ => ext,
        }
        .to_string()
    }

    // ==================== Getters ====================

    /// Returns the document ID.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Returns the language identifier.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Overrides the language identifier.
    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    /// Marks the document closed; it stops being scannable.
    pub fn close(&mut self) {
        self.closed = true;
    }

    // ==================== Text Editing ====================

    /// Inserts text at a position.
    pub fn insert(&mut self, pos: Position, text: &str) -> CoreResult<()> {
        self.buffer.insert_at(pos, text)?;
        Ok(())
    }

    /// Deletes the text between two positions.
    pub fn delete(&mut self, start: Position, end: Position) -> CoreResult<String> {
        let start = self.buffer.position_to_char_idx(start)?;
        let end = self.buffer.position_to_char_idx(end)?;
        Ok(self.buffer.delete(start..end)?)
    }

    /// Replaces the text of one line.
    pub fn replace_line(&mut self, line: usize, text: &str) -> CoreResult<String> {
        Ok(self.buffer.replace_line(line, text)?)
    }
}

impl TextSource for Document {
    fn id(&self) -> &DocumentId {
        &self.id
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        if self.closed {
            return None;
        }
        self.buffer.line_text(line).ok()
    }

    /// Untitled documents are scannable as long as they hold text.
    fn is_scannable(&self) -> bool {
        !self.closed
            && self.language != BINARY_LANGUAGE
            && !(self.path.is_none() && self.buffer.is_empty())
            && !self.buffer.contains_nul()
    }
}
