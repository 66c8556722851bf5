//! # tagscan Core
//!
//! Tag scanning engine and the state a host keeps around it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Scanner                            │
//! │  ┌─────────────┐ ┌──────────────────┐ ┌────────────────┐  │
//! │  │   TagSet    │ │ CommentSyntax    │ │   ScanCache    │  │
//! │  │ (compiled)  │ │ Table            │ │ id -> [tags]   │  │
//! │  └─────────────┘ └──────────────────┘ └────────────────┘  │
//! │         ▲                  ▲                   │          │
//! └─────────┼──────────────────┼───────────────────┼──────────┘
//!           │                  │                   ▼
//!     TextSource          FileProvider      TagTree / HighlightPalette /
//!     (documents)         (workspace)       navigation (read-only views)
//! ```
//!
//! The host feeds documents to the [`Scanner`] on open, edit or workspace
//! scan, then reads the cache to drive its views.

pub mod cache;
pub mod config;
pub mod document;
pub mod event;
pub mod highlight;
pub mod navigation;
pub mod scanner;
pub mod tag;
pub mod view;
pub mod workspace;

pub use cache::ScanCache;
pub use config::{Config, ConfigError, HighlightConfig, LanguageConfig, ScanConfig};
pub use document::{Document, DocumentId, TextSource};
pub use event::{EventBus, EventHandler, ScanEvent};
pub use highlight::{HighlightPalette, TagHighlight};
pub use navigation::{next_tag, previous_tag};
pub use scanner::{BatchScan, FoundTag, Scanner, SkippedFile};
pub use tag::{InvalidTag, TagConfig, TagError, TagMatch, TagSet};
pub use view::{FileGroup, TagItem, TagTree};
pub use workspace::{FileChange, FileList, FileProvider, Workspace};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File too large: {path} ({size} bytes, limit {limit})")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] tagscan_buffer::BufferError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] tagscan_syntax::SyntaxError),

    #[error("Tag error: {0}")]
    Tag(#[from] TagError),

    #[error("Invalid glob: {0}")]
    Glob(#[from] globset::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}
