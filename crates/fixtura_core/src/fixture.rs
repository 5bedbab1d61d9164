//! Fixture identity and scan results.

use std::collections::BTreeSet;
use std::fmt;

/// A fixture file discovered under a suite root.
///
/// Identity is the relative path; two fixtures with the same relative path are the same fixture.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixture {
    relative_path: String,
}

impl Fixture {
    /// Create a fixture from a relative path, normalizing `\` separators to `/`.
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: normalize_relative(&relative_path.into()),
        }
    }

    /// The `/`-separated path relative to the suite root.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// The final path segment, e.g. `coroutines.kt` for `nested/coroutines.kt`.
    pub fn base_name(&self) -> &str {
        self.relative_path.rsplit('/').next().unwrap_or(&self.relative_path)
    }

    /// The directory part of the relative path, empty for top-level fixtures.
    pub fn directory(&self) -> &str {
        match self.relative_path.rfind('/') {
            Some(idx) => &self.relative_path[..idx],
            None => "",
        }
    }

    /// The extension without the leading dot, if any.
    ///
    /// Dotfiles such as `.hidden` have no extension.
    pub fn extension(&self) -> Option<&str> {
        let base = self.base_name();
        match base.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&base[idx + 1..]),
        }
    }

    /// The base name with its extension removed.
    pub fn stem(&self) -> &str {
        let base = self.base_name();
        match base.rfind('.') {
            Some(0) | None => base,
            Some(idx) => &base[..idx],
        }
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_path)
    }
}

/// Normalize a relative path to `/` separators with no leading `./` or `/`.
pub fn normalize_relative(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_start_matches("./").trim_start_matches('/');
    trimmed
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// The set of fixture relative paths found by one scan.
///
/// Backed by a `BTreeSet` so iteration is deterministic; the order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    paths: BTreeSet<String>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fixture path. Returns `false` if it was already present.
    pub fn insert(&mut self, relative_path: impl Into<String>) -> bool {
        self.paths.insert(normalize_relative(&relative_path.into()))
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.paths.contains(relative_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Materialize every path as a [`Fixture`].
    pub fn fixtures(&self) -> Vec<Fixture> {
        self.paths.iter().map(Fixture::new).collect()
    }

    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.paths
    }
}

impl<S: Into<String>> FromIterator<S> for ScanResult {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut result = ScanResult::new();
        for path in iter {
            result.insert(path);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_attributes() {
        let fixture = Fixture::new("nested/deeper/coroutines.kt");
        assert_eq!(fixture.relative_path(), "nested/deeper/coroutines.kt");
        assert_eq!(fixture.base_name(), "coroutines.kt");
        assert_eq!(fixture.directory(), "nested/deeper");
        assert_eq!(fixture.extension(), Some("kt"));
        assert_eq!(fixture.stem(), "coroutines");
    }

    #[test]
    fn test_fixture_top_level_has_empty_directory() {
        let fixture = Fixture::new("script.kts");
        assert_eq!(fixture.directory(), "");
        assert_eq!(fixture.extension(), Some("kts"));
    }

    #[test]
    fn test_fixture_without_extension() {
        let fixture = Fixture::new("README");
        assert_eq!(fixture.extension(), None);
        assert_eq!(fixture.stem(), "README");

        let dotfile = Fixture::new(".hidden");
        assert_eq!(dotfile.extension(), None);
        assert_eq!(dotfile.stem(), ".hidden");
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("a\\b\\c.kt"), "a/b/c.kt");
        assert_eq!(normalize_relative("./a.kt"), "a.kt");
        assert_eq!(normalize_relative("/a//b/./c.kt"), "a/b/c.kt");
    }

    #[test]
    fn test_fixture_identity_is_normalized_path() {
        assert_eq!(Fixture::new("a\\b.kt"), Fixture::new("a/b.kt"));
    }

    #[test]
    fn test_scan_result_deduplicates() {
        let mut scan = ScanResult::new();
        assert!(scan.insert("a.kt"));
        assert!(!scan.insert("./a.kt"));
        assert_eq!(scan.len(), 1);
        assert!(scan.contains("a.kt"));
    }

    #[test]
    fn test_scan_result_collect_is_order_independent() {
        let forward: ScanResult = ["a.kt", "b.kt", "c.kt"].into_iter().collect();
        let backward: ScanResult = ["c.kt", "b.kt", "a.kt"].into_iter().collect();
        assert_eq!(forward, backward);
    }
}
