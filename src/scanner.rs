//! Fixture scanner: find fixture files under a suite root.
//!
//! The scan is a read-only walk. A file is a fixture when its base name matches the suite pattern
//! and neither its name nor its relative path is excluded. Hidden entries (leading `.`) are never
//! visited.
//!
//! Unreadable entries are errors, never skipped: the completeness guard must see every fixture.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

use fixtura_core::ScanResult;
use fixtura_core::fixture::normalize_relative;

/// Default fixture pattern: Kotlin sources and scripts.
pub const DEFAULT_PATTERN: &str = r"^(.+)\.(kt|kts)$";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("fixture root '{}' does not exist or is not a directory", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file name under '{}' is not valid UTF-8", .0.display())]
    NonUtf8Name(PathBuf),

    #[error("invalid fixture pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Scan `root` for fixture files.
///
/// ## Parameters
/// - `root`: suite root; must exist and be a directory.
/// - `pattern`: regular expression matched against file base names.
/// - `excluded`: base names or relative paths to skip. An excluded directory is not descended into.
/// - `recursive`: whether to walk subdirectories.
///
/// ## Returns
/// - The set of matching paths relative to `root`, `/`-separated.
///
/// ## Errors
/// - [`ScanError::NotFound`] if `root` is missing or not a directory.
/// - [`ScanError::Io`] for any directory or entry that cannot be read.
/// - [`ScanError::InvalidPattern`] if `pattern` is not a valid regex.
#[tracing::instrument(skip_all, fields(root = %root.display(), recursive = recursive))]
pub fn scan(root: &Path, pattern: &str, excluded: &BTreeSet<String>, recursive: bool) -> Result<ScanResult, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    let regex = Regex::new(pattern).map_err(|source| ScanError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut result = ScanResult::new();
    let mut pending: Vec<PathBuf> = vec![PathBuf::new()];

    while let Some(rel_dir) = pending.pop() {
        let dir = root.join(&rel_dir);
        let entries = fs::read_dir(&dir).map_err(|source| ScanError::Io {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| ScanError::Io {
                path: dir.clone(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                return Err(ScanError::NonUtf8Name(dir.clone()));
            };
            if name.starts_with('.') {
                continue;
            }

            let rel_path = rel_dir.join(name);
            let rel = normalize_relative(&rel_path.to_string_lossy());
            if excluded.contains(name) || excluded.contains(&rel) {
                tracing::debug!(path = %rel, "excluded");
                continue;
            }

            let entry_path = entry.path();
            // `metadata` follows symlinks, so a linked fixture counts as a file.
            let metadata = fs::metadata(&entry_path).map_err(|source| ScanError::Io {
                path: entry_path.clone(),
                source,
            })?;

            if metadata.is_dir() {
                if recursive {
                    pending.push(rel_path);
                }
            } else if metadata.is_file() && regex.is_match(name) {
                result.insert(rel);
            }
        }
    }

    tracing::debug!(fixtures = result.len(), "scan complete");
    Ok(result)
}

/// Scanner settings for one suite, built with builder methods.
#[derive(Debug, Clone)]
pub struct FixtureScanner {
    /// Suite root directory
    pub root: PathBuf,
    /// Regex matched against file base names
    pub pattern: String,
    /// Base names or relative paths to skip
    pub excluded: BTreeSet<String>,
    /// Whether subdirectories are walked
    pub recursive: bool,
}

impl FixtureScanner {
    /// Create a recursive scanner for `root` using [`DEFAULT_PATTERN`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: DEFAULT_PATTERN.to_string(),
            excluded: BTreeSet::new(),
            recursive: true,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Add a name or relative path to skip.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        scan(&self.root, &self.pattern, &self.excluded, self.recursive)
    }
}

impl Default for FixtureScanner {
    /// Scan the current directory.
    fn default() -> Self {
        Self::new(".")
    }
}
