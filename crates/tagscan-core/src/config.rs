//! Scanner configuration.
//!
//! Loaded from TOML; every section is `#[serde(default)]` so a config file
//! only needs the keys it changes.
//!
//! ```toml
//! [[tags]]
//! name = "FIXME"
//! color = "#ff0000"
//!
//! [scan]
//! exclude = ["**/vendor/**"]
//!
//! [languages.zig]
//! line = "//"
//! extensions = ["zig"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tagscan_syntax::{CommentSyntax, CommentSyntaxTable, SyntaxError};

use crate::tag::TagConfig;

/// Per-project config file name, looked up in the scanned root.
pub const PROJECT_CONFIG_FILE: &str = ".tagscan.toml";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tags to look for, in matching order
    pub tags: Vec<TagConfig>,

    /// File enumeration settings
    pub scan: ScanConfig,

    /// Highlight colors
    pub highlight: HighlightConfig,

    /// User comment syntaxes, keyed by language id
    pub languages: HashMap<String, LanguageConfig>,
}

impl Config {
    /// Loads the config that applies to `root`.
    ///
    /// Tries `root/.tagscan.toml`, then the user config file, then falls back
    /// to defaults. Parse errors are reported, missing files are not.
    pub fn load_for_root(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let project = root.as_ref().join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            tracing::debug!("Loading project config {}", project.display());
            return Self::load_from(&project);
        }

        match Self::default_path() {
            Ok(path) if path.is_file() => {
                tracing::debug!("Loading user config {}", path.display());
                Self::load_from(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Returns the user config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tagscan").join("config.toml"))
    }

    /// Saves the config to the user config path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to a file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Builds the comment syntax table: built-ins plus `languages`.
    pub fn comment_syntaxes(&self) -> Result<CommentSyntaxTable, ConfigError> {
        let overrides = self
            .languages
            .iter()
            .map(|(lang, cfg)| Ok((lang.clone(), cfg.syntax(lang)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(CommentSyntaxTable::with_overrides(overrides))
    }

    /// Maps file extensions (lowercase, no dot) to configured language ids.
    pub fn extension_map(&self) -> HashMap<String, String> {
        self.languages
            .iter()
            .flat_map(|(lang, cfg)| {
                cfg.extensions
                    .iter()
                    .map(move |ext| (ext.trim_start_matches('.').to_lowercase(), lang.clone()))
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tags: TagConfig::defaults(),
            scan: ScanConfig::default(),
            highlight: HighlightConfig::default(),
            languages: HashMap::new(),
        }
    }
}

/// File enumeration configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Glob of files to scan, relative to the root
    pub include: String,

    /// Globs of files to leave out
    pub exclude: Vec<String>,

    /// Quiet period before rescanning in watch mode (ms)
    pub debounce_ms: u64,

    /// Largest file to read (KiB)
    pub max_file_size: u64,

    /// Skip hidden files and directories
    pub hidden: bool,

    /// Respect .gitignore and friends
    pub git_ignore: bool,

    /// Descend into symlinked directories
    pub follow_links: bool,
}

impl ScanConfig {
    /// Maximum file size in bytes.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size.saturating_mul(1024)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include: "**/*".to_string(),
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
                "**/target/**".to_string(),
            ],
            debounce_ms: 300,
            max_file_size: 1024,
            hidden: true,
            git_ignore: true,
            follow_links: false,
        }
    }
}

/// Highlight colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Color for tags without their own
    pub default_color: String,

    /// Hex alpha appended to a tag color for its background
    pub background_alpha: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            default_color: "#ffd700".to_string(),
            background_alpha: "20".to_string(),
        }
    }
}

/// Comment syntax of a user-defined language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Line comment marker
    pub line: Option<String>,

    /// Block comment opener
    pub block_start: Option<String>,

    /// Block comment closer
    pub block_end: Option<String>,

    /// File extensions mapped to this language
    pub extensions: Vec<String>,
}

impl LanguageConfig {
    /// Validates the markers into a comment syntax.
    pub fn syntax(&self, language: &str) -> Result<CommentSyntax, SyntaxError> {
        CommentSyntax::custom(
            language,
            self.line.as_deref(),
            self.block_start.as_deref(),
            self.block_end.as_deref(),
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Language error: {0}")]
    Language(#[from] SyntaxError),
}
