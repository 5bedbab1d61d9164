//! Suite manifest (`fixtura.toml`).
//!
//! The manifest holds the scanner settings, the optional command executor, and the Known-Case
//! Registry as `[[case]]` entries:
//!
//! ```toml
//! [suite]
//! root = "fixtures"
//! pattern = '^(.+)\.(kt|kts)$'
//! exclude = ["excluded.kt"]
//! recursive = true
//!
//! [executor]
//! command = ["kotlinc", "-script"]
//! expected_extension = "txt"
//!
//! [[case]]
//! name = "testCoroutines"
//! path = "coroutines.kt"
//! ```
//!
//! Relative paths in the manifest (`root`) are resolved against the manifest's own directory.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fixtura_core::{KnownCase, Registry};

use crate::executor::CommandExecutor;
use crate::scanner::{DEFAULT_PATTERN, FixtureScanner};

/// Default manifest file name looked up by the CLI.
pub const MANIFEST_FILE: &str = "fixtura.toml";

/// Environment variable that overrides manifest discovery.
pub const MANIFEST_ENV: &str = "FIXTURA_MANIFEST";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no fixtura.toml found in '{}' or any parent directory", .0.display())]
    NotFound(PathBuf),

    #[error("[executor] command must name a program")]
    EmptyCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub suite: SuiteSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<ExecutorSection>,
    #[serde(default, rename = "case")]
    pub cases: Vec<CaseEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSection {
    /// Fixture root, relative to the manifest directory
    pub root: String,
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorSection {
    /// Program followed by its leading arguments; the fixture path is appended.
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEntry {
    pub name: String,
    pub path: String,
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_recursive() -> bool {
    true
}

impl SuiteSection {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pattern: default_pattern(),
            exclude: Vec::new(),
            recursive: default_recursive(),
        }
    }
}

impl Manifest {
    /// Parse manifest text. `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if let Some(executor) = &self.executor {
            if executor.command.first().is_none_or(|program| program.trim().is_empty()) {
                return Err(ManifestError::EmptyCommand);
            }
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string(self)?)
    }

    /// Fixture root resolved against `base_dir`.
    pub fn root(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.suite.root)
    }

    pub fn scanner(&self, base_dir: &Path) -> FixtureScanner {
        let mut scanner = FixtureScanner::new(self.root(base_dir))
            .with_pattern(self.suite.pattern.clone())
            .with_recursive(self.suite.recursive);
        for name in &self.suite.exclude {
            scanner = scanner.exclude(name.clone());
        }
        scanner
    }

    pub fn registry(&self) -> Registry {
        self.cases.iter().map(|c| KnownCase::new(c.name.clone(), c.path.clone())).collect()
    }

    /// Replace the `[[case]]` entries with `registry`.
    pub fn set_registry(&mut self, registry: &Registry) {
        self.cases = registry
            .cases()
            .iter()
            .map(|c| CaseEntry {
                name: c.name.clone(),
                path: c.path.clone(),
            })
            .collect();
    }

    /// Command executor for this suite, running from `base_dir`.
    pub fn executor(&self, base_dir: &Path) -> Option<CommandExecutor> {
        let section = self.executor.as_ref()?;
        let (program, args) = section.command.split_first()?;
        let mut executor = CommandExecutor::new(program.clone())
            .with_args(args.iter().cloned())
            .with_working_dir(base_dir);
        if let Some(ext) = &section.expected_extension {
            executor = executor.with_expected_extension(ext.clone());
        }
        Some(executor)
    }
}

/// Directory that relative manifest paths are resolved against.
pub fn base_dir(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Locate the suite manifest.
///
/// Lookup order: the explicit path, then `FIXTURA_MANIFEST`, then the first `fixtura.toml` found
/// walking up from `start`.
pub fn find_manifest(explicit: Option<&Path>, start: &Path) -> Result<PathBuf, ManifestError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env::var_os(MANIFEST_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    discover(start)
}

/// Walk up from `start` looking for `fixtura.toml`.
pub fn discover(start: &Path) -> Result<PathBuf, ManifestError> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ManifestError::NotFound(start.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[suite]
root = "fixtures"
exclude = ["excluded.kt"]

[executor]
command = ["kotlinc", "-script"]
expected_extension = "txt"

[[case]]
name = "testCoroutines"
path = "coroutines.kt"

[[case]]
name = "testImportAliases"
path = "importAliases.kt"
"#;

    #[test]
    fn test_parse_with_defaults() {
        let manifest = Manifest::parse(SAMPLE, Path::new("fixtura.toml")).unwrap();
        assert_eq!(manifest.suite.root, "fixtures");
        assert_eq!(manifest.suite.pattern, DEFAULT_PATTERN);
        assert!(manifest.suite.recursive);
        assert_eq!(manifest.suite.exclude, vec!["excluded.kt".to_string()]);
        assert_eq!(manifest.cases.len(), 2);
    }

    #[test]
    fn test_registry_keeps_case_order() {
        let manifest = Manifest::parse(SAMPLE, Path::new("fixtura.toml")).unwrap();
        let registry = manifest.registry();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["testCoroutines", "testImportAliases"]);
    }

    #[test]
    fn test_scanner_from_manifest() {
        let manifest = Manifest::parse(SAMPLE, Path::new("fixtura.toml")).unwrap();
        let scanner = manifest.scanner(Path::new("suite"));
        assert_eq!(scanner.root, PathBuf::from("suite/fixtures"));
        assert!(scanner.excluded.contains("excluded.kt"));
    }

    #[test]
    fn test_executor_from_manifest() {
        let manifest = Manifest::parse(SAMPLE, Path::new("fixtura.toml")).unwrap();
        let executor = manifest.executor(Path::new("suite")).unwrap();
        assert_eq!(executor.program, "kotlinc");
        assert_eq!(executor.args, vec!["-script".to_string()]);
        assert_eq!(executor.expected_extension.as_deref(), Some("txt"));
        assert_eq!(executor.working_dir, Some(PathBuf::from("suite")));
    }

    #[test]
    fn test_missing_suite_is_parse_error() {
        let err = Manifest::parse("[[case]]\nname = \"a\"\npath = \"a.kt\"\n", Path::new("m.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_empty_command_rejected() {
        let text = "[suite]\nroot = \"f\"\n\n[executor]\ncommand = []\n";
        let err = Manifest::parse(text, Path::new("m.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::EmptyCommand));
    }

    #[test]
    fn test_serialized_manifest_parses_back() {
        let manifest = Manifest::parse(SAMPLE, Path::new("fixtura.toml")).unwrap();
        let text = manifest.to_toml_string().unwrap();
        assert!(text.contains("[[case]]"));
        assert_eq!(Manifest::parse(&text, Path::new("fixtura.toml")).unwrap(), manifest);
    }

    #[test]
    fn test_base_dir() {
        assert_eq!(base_dir(Path::new("fixtura.toml")), PathBuf::from("."));
        assert_eq!(base_dir(Path::new("suite/fixtura.toml")), PathBuf::from("suite"));
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "[suite]\nroot = \"f\"\n").unwrap();

        assert_eq!(discover(&nested).unwrap(), dir.path().join(MANIFEST_FILE));
    }

    #[test]
    fn test_discover_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(discover(dir.path()), Err(ManifestError::NotFound(_))));
    }

    #[test]
    fn test_explicit_manifest_wins() {
        let path = find_manifest(Some(Path::new("custom.toml")), Path::new("/nonexistent")).unwrap();
        assert_eq!(path, PathBuf::from("custom.toml"));
    }
}
