//! Workspace files: enumeration, opening and change watching.
//!
//! Enumeration walks the root with `ignore`, so hidden files and
//! `.gitignore`d paths can be left out the same way git does, then filters
//! the relative paths through the include glob and the exclude globs.

use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::config::{Config, ScanConfig};
use crate::document::Document;
use crate::scanner::SkippedFile;
use crate::{CoreError, CoreResult};

/// Result of enumerating files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    /// Files to scan, sorted
    pub files: Vec<PathBuf>,
    /// Entries the enumeration could not read
    pub unreadable: Vec<SkippedFile>,
}

/// Source of files for batch scans.
pub trait FileProvider {
    /// Lists files matching `include` and not matching `exclude`.
    ///
    /// Fails only on malformed globs; unreadable entries are listed in
    /// [`FileList::unreadable`].
    fn find_files(&self, include: &str, exclude: Option<&str>) -> CoreResult<FileList>;

    /// Opens one listed file.
    fn open(&self, path: &Path) -> CoreResult<Document>;
}

/// Include/exclude globs applied to root-relative paths.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobMatcher,
    exclude: GlobSet,
}

impl FileFilter {
    /// Builds a filter; any malformed glob is an error.
    pub fn new<'a>(include: &str, excludes: impl IntoIterator<Item = &'a str>) -> CoreResult<Self> {
        let include = Glob::new(include)?.compile_matcher();

        let mut builder = GlobSetBuilder::new();
        for pattern in excludes {
            builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            include,
            exclude: builder.build()?,
        })
    }

    /// Returns true if a relative path passes the filter.
    pub fn is_match(&self, relative: &Path) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

/// A scanned folder.
pub struct Workspace {
    /// Root directory of the workspace
    root: PathBuf,

    /// Enumeration settings
    scan: ScanConfig,

    /// Extension to language overrides from the config
    extensions: HashMap<String, String>,

    /// File watcher, kept alive while watching
    watcher: Option<RecommendedWatcher>,
}

impl Workspace {
    /// Opens a workspace from a directory.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> CoreResult<Self> {
        let root = path.as_ref().canonicalize()?;

        if !root.is_dir() {
            return Err(CoreError::FileNotFound(root.display().to_string()));
        }

        Ok(Self {
            root,
            scan: config.scan.clone(),
            extensions: config.extension_map(),
            watcher: None,
        })
    }

    /// Starts watching the root for file changes.
    pub fn start_watching(&mut self) -> CoreResult<mpsc::Receiver<FileChange>> {
        let (tx, rx) = mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Watch error: {}", e);
                    return;
                }
            };
            for path in event.paths {
                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path),
                    notify::EventKind::Modify(_) => FileChange::Modified(path),
                    notify::EventKind::Remove(_) => FileChange::Deleted(path),
                    _ => continue,
                };
                let _ = tx.blocking_send(change);
            }
        })?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        tracing::info!("Watching {}", self.root.display());
        self.watcher = Some(watcher);

        Ok(rx)
    }

    /// Returns the workspace root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the relative path from the workspace root.
    pub fn relative(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        path.as_ref().strip_prefix(&self.root).ok().map(PathBuf::from)
    }

    /// Builds the filter for `include`, the configured excludes and `exclude`.
    fn filter(&self, include: &str, exclude: Option<&str>) -> CoreResult<FileFilter> {
        FileFilter::new(
            include,
            self.scan.exclude.iter().map(String::as_str).chain(exclude),
        )
    }

    /// Known binary formats are never listed.
    fn is_text_candidate(path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return true;
        };

        !matches!(
            ext.to_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "ico" | "webp" | "tiff"
                | "mp3" | "mp4" | "wav" | "avi" | "mov" | "ogg" | "webm"
                | "zip" | "tar" | "gz" | "bz2" | "xz" | "7z" | "rar"
                | "exe" | "dll" | "so" | "dylib" | "bin" | "o" | "a" | "lib" | "rlib"
                | "pdf" | "ttf" | "otf" | "woff" | "woff2"
                | "db" | "sqlite" | "class" | "pyc" | "wasm"
        )
    }
}

impl FileProvider for Workspace {
    fn find_files(&self, include: &str, exclude: Option<&str>) -> CoreResult<FileList> {
        let filter = self.filter(include, exclude)?;

        let walker = WalkBuilder::new(&self.root)
            .hidden(self.scan.hidden)
            .git_ignore(self.scan.git_ignore)
            .git_global(self.scan.git_ignore)
            .git_exclude(self.scan.git_ignore)
            .follow_links(self.scan.follow_links)
            .build();

        let mut list = FileList::default();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = walk_error_path(&e).unwrap_or(&self.root).to_path_buf();
                    tracing::warn!("Cannot read {}: {}", path.display(), e);
                    list.unreadable.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            let listed = path
                .strip_prefix(&self.root)
                .is_ok_and(|relative| filter.is_match(relative));
            if listed && Self::is_text_candidate(&path) {
                list.files.push(path);
            }
        }

        list.files.sort();
        tracing::debug!(
            "{} files match {:?} in {}",
            list.files.len(),
            include,
            self.root.display()
        );
        Ok(list)
    }

    fn open(&self, path: &Path) -> CoreResult<Document> {
        let size = std::fs::metadata(path)?.len();
        let limit = self.scan.max_file_bytes();
        if size > limit {
            return Err(CoreError::FileTooLarge {
                path: path.display().to_string(),
                size,
                limit,
            });
        }

        Document::from_file_with(path, &self.extensions)
    }
}

/// The path an enumeration error is about, if it names one.
fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(walk_error_path),
        _ => None,
    }
}

/// File change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl FileChange {
    /// The path that changed.
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Modified(path) | Self::Deleted(path) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn relative_names(ws: &Workspace, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| ws.relative(p).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_workspace_open() {
        let dir = tempdir().unwrap();
        write(dir.path(), "test.txt", b"hello");

        let ws = Workspace::open(dir.path(), &Config::default()).unwrap();
        assert_eq!(ws.relative(ws.root().join("test.txt")), Some(PathBuf::from("test.txt")));
        assert!(Workspace::open(dir.path().join("test.txt"), &Config::default()).is_err());
    }

    #[test]
    fn test_find_files_filters() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/main.rs", b"// TODO");
        write(dir.path(), "src/lib.rs", b"");
        write(dir.path(), "node_modules/pkg/index.js", b"// TODO");
        write(dir.path(), "docs/readme.md", b"");
        write(dir.path(), "logo.png", b"\x89PNG");
        write(dir.path(), ".hidden/secret.rs", b"// TODO");

        let ws = Workspace::open(dir.path(), &Config::default()).unwrap();

        let all = ws.find_files("**/*", None).unwrap();
        assert_eq!(
            relative_names(&ws, &all.files),
            ["docs/readme.md", "src/lib.rs", "src/main.rs"]
        );
        assert!(all.unreadable.is_empty());

        let rust = ws.find_files("**/*.rs", Some("**/lib.rs")).unwrap();
        assert_eq!(relative_names(&ws, &rust.files), ["src/main.rs"]);
    }

    #[test]
    fn test_invalid_glob() {
        let dir = tempdir().unwrap();
        let ws = Workspace::open(dir.path(), &Config::default()).unwrap();
        assert!(matches!(ws.find_files("src/[", None), Err(CoreError::Glob(_))));
    }

    #[test]
    fn test_open_rejects_large_and_non_utf8_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "big.js", &vec![b'a'; 2048]);
        write(dir.path(), "latin1.js", b"// caf\xe9");

        let mut config = Config::default();
        config.scan.max_file_size = 1;
        let ws = Workspace::open(dir.path(), &config).unwrap();

        assert!(matches!(
            ws.open(&ws.root().join("big.js")),
            Err(CoreError::FileTooLarge { size: 2048, limit: 1024, .. })
        ));
        assert!(ws.open(&ws.root().join("latin1.js")).is_err());
    }

    #[test]
    fn test_configured_extensions() {
        let dir = tempdir().unwrap();
        write(dir.path(), "build.zig", b"// NOTE: zig");

        let config: Config = toml::from_str(
            r#"
            [languages.zig]
            line = "//"
            extensions = ["zig"]
            "#,
        )
        .unwrap();
        let ws = Workspace::open(dir.path(), &config).unwrap();
        let doc = ws.open(&ws.root().join("build.zig")).unwrap();
        assert_eq!(doc.language(), "zig");
    }

    #[tokio::test]
    async fn test_scan_many_over_workspace() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.py", b"# TODO: one\n");
        write(dir.path(), "b.js", b"// caf\xe9 FIXME");
        write(dir.path(), "c.rs", b"fn main() {} // NOTE: three\n");

        let ws = Workspace::open(dir.path(), &Config::default()).unwrap();
        let mut scanner = Scanner::new();
        let batch = scanner.scan_many(&ws, "**/*", None).await.unwrap();

        let tags: Vec<_> = batch.tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(tags, ["TODO", "NOTE"]);
        assert_eq!(batch.scanned, 2);
        assert_eq!(batch.skipped.len(), 1);
        assert!(batch.skipped[0].path.ends_with("b.js"));
    }

    #[test]
    fn test_walk_error_path() {
        let io = || Box::new(ignore::Error::Io(std::io::Error::other("denied")));
        let nested = ignore::Error::WithDepth {
            depth: 2,
            err: Box::new(ignore::Error::WithPath {
                path: PathBuf::from("src/locked"),
                err: io(),
            }),
        };
        assert_eq!(walk_error_path(&nested), Some(Path::new("src/locked")));

        let looped = ignore::Error::Loop {
            ancestor: PathBuf::from("a"),
            child: PathBuf::from("a/b/link"),
        };
        assert_eq!(walk_error_path(&looped), Some(Path::new("a/b/link")));
        assert_eq!(walk_error_path(&io()), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_reported() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/a.rs", b"// TODO");
        std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("src/again")).unwrap();

        let mut config = Config::default();
        config.scan.follow_links = true;
        let ws = Workspace::open(dir.path(), &config).unwrap();
        let list = ws.find_files("**/*", None).unwrap();

        assert_eq!(relative_names(&ws, &list.files), ["src/a.rs"]);
        assert_eq!(list.unreadable.len(), 1);
        assert!(list.unreadable[0].path.ends_with("again"));
    }

    #[test]
    fn test_file_change_path() {
        let change = FileChange::Deleted(PathBuf::from("x.rs"));
        assert_eq!(change.path(), Path::new("x.rs"));
    }
}
