//! Per-language comment delimiters.
//!
//! The table maps a language identifier (the same ids editors use, such as
//! `javascript` or `shellscript`) to a [`CommentSyntax`]. It is plain data:
//! built once, then only read.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::SyntaxError;

/// Start and end markers of a block comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDelimiters {
    /// Opening marker, e.g. `/*`
    pub start: Cow<'static, str>,
    /// Closing marker, e.g. `*/`
    pub end: Cow<'static, str>,
}

/// Comment markers of one language.
///
/// Either marker may be absent. A syntax with neither never yields a
/// comment region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentSyntax {
    line: Option<Cow<'static, str>>,
    block: Option<BlockDelimiters>,
}

impl CommentSyntax {
    /// A syntax with no comment markers at all.
    pub fn none() -> Self {
        Self::default()
    }

    fn builtin(line: Option<&'static str>, block: Option<(&'static str, &'static str)>) -> Self {
        Self {
            line: line.map(Cow::Borrowed),
            block: block.map(|(start, end)| BlockDelimiters {
                start: Cow::Borrowed(start),
                end: Cow::Borrowed(end),
            }),
        }
    }

    /// Builds a user-supplied syntax, validating its markers.
    pub fn custom(
        language: &str,
        line: Option<&str>,
        block_start: Option<&str>,
        block_end: Option<&str>,
    ) -> Result<Self, SyntaxError> {
        let non_empty = |marker: &str| {
            if marker.is_empty() {
                Err(SyntaxError::EmptyMarker(language.to_string()))
            } else {
                Ok(Cow::Owned(marker.to_string()))
            }
        };

        let line = line.map(non_empty).transpose()?;
        let block = match (block_start, block_end) {
            (Some(start), Some(end)) => Some(BlockDelimiters {
                start: non_empty(start)?,
                end: non_empty(end)?,
            }),
            (None, None) => None,
            _ => return Err(SyntaxError::IncompleteBlock(language.to_string())),
        };

        Ok(Self { line, block })
    }

    /// Returns the line comment marker.
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Returns the block comment markers.
    pub fn block(&self) -> Option<&BlockDelimiters> {
        self.block.as_ref()
    }

    /// Returns true if the syntax has no markers.
    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.block.is_none()
    }
}

fn c_style() -> CommentSyntax {
    CommentSyntax::builtin(Some("//"), Some(("/*", "*/")))
}

fn hash() -> CommentSyntax {
    CommentSyntax::builtin(Some("#"), None)
}

fn markup() -> CommentSyntax {
    CommentSyntax::builtin(None, Some(("<!--", "-->")))
}

/// Built-in language table.
fn builtin_syntaxes() -> Vec<(&'static str, CommentSyntax)> {
    let mut table = Vec::new();

    // C-like
    for lang in [
        "javascript",
        "javascriptreact",
        "typescript",
        "typescriptreact",
        "java",
        "c",
        "cpp",
        "csharp",
        "go",
        "rust",
        "swift",
        "kotlin",
        "scala",
        "dart",
        "php",
        "scss",
        "less",
        "jsonc",
    ] {
        table.push((lang, c_style()));
    }

    // Shell, scripting and config formats
    for lang in [
        "python",
        "shellscript",
        "sh",
        "bash",
        "zsh",
        "ruby",
        "perl",
        "r",
        "yaml",
        "toml",
        "dockerfile",
        "makefile",
        "elixir",
    ] {
        table.push((lang, hash()));
    }

    // Markup
    for lang in ["html", "xml", "markdown", "vue", "svelte"] {
        table.push((lang, markup()));
    }

    table.push(("css", CommentSyntax::builtin(None, Some(("/*", "*/")))));
    table.push(("sql", CommentSyntax::builtin(Some("--"), Some(("/*", "*/")))));
    table.push(("lua", CommentSyntax::builtin(Some("--"), None)));
    table.push(("haskell", CommentSyntax::builtin(Some("--"), Some(("{-", "-}")))));
    table.push(("powershell", CommentSyntax::builtin(Some("#"), Some(("<#", "#>")))));
    table.push(("ini", CommentSyntax::builtin(Some(";"), None)));

    table
}

/// Lookup table from language identifier to comment syntax.
///
/// Identifiers are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct CommentSyntaxTable {
    syntaxes: HashMap<String, CommentSyntax>,
}

impl CommentSyntaxTable {
    /// Creates a table holding the built-in languages.
    pub fn new() -> Self {
        let syntaxes = builtin_syntaxes()
            .into_iter()
            .map(|(lang, syntax)| (lang.to_string(), syntax))
            .collect();
        Self { syntaxes }
    }

    /// Creates a table with the built-ins plus user entries.
    ///
    /// User entries replace built-ins of the same name.
    pub fn with_overrides(overrides: impl IntoIterator<Item = (String, CommentSyntax)>) -> Self {
        let mut table = Self::new();
        for (lang, syntax) in overrides {
            tracing::debug!("Registering comment syntax for {}", lang);
            table.syntaxes.insert(lang.to_lowercase(), syntax);
        }
        table
    }

    /// Returns the syntax for a language, if known.
    pub fn get(&self, language: &str) -> Option<&CommentSyntax> {
        self.syntaxes
            .get(language)
            .or_else(|| self.syntaxes.get(&language.to_lowercase()))
    }

    /// Returns true if the language is known.
    pub fn contains(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    /// Returns all known language identifiers, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.syntaxes.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }
}

impl Default for CommentSyntaxTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_markers() {
        let table = CommentSyntaxTable::new();

        let js = table.get("javascript").unwrap();
        assert_eq!(js.line(), Some("//"));
        assert_eq!(js.block().unwrap().start, "/*");

        let py = table.get("python").unwrap();
        assert_eq!(py.line(), Some("#"));
        assert!(py.block().is_none());

        let html = table.get("html").unwrap();
        assert!(html.line().is_none());
        assert_eq!(html.block().unwrap().end, "-->");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = CommentSyntaxTable::new();
        assert!(table.contains("SQL"));
        assert!(!table.contains("brainfuck"));
    }

    #[test]
    fn test_overrides_replace_builtins() {
        let custom = CommentSyntax::custom("Lua", Some("--"), Some("--[["), Some("]]")).unwrap();
        let table = CommentSyntaxTable::with_overrides([("Lua".to_string(), custom.clone())]);
        assert_eq!(table.get("lua"), Some(&custom));
        assert!(table.languages().contains(&"lua"));
    }

    #[test]
    fn test_custom_validation() {
        assert_eq!(
            CommentSyntax::custom("x", Some(""), None, None),
            Err(SyntaxError::EmptyMarker("x".to_string()))
        );
        assert_eq!(
            CommentSyntax::custom("x", None, Some("(*"), None),
            Err(SyntaxError::IncompleteBlock("x".to_string()))
        );
        assert!(CommentSyntax::custom("x", None, None, None).unwrap().is_empty());
    }
}
