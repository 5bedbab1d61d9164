//! The Known-Case Registry: an ordered list of `(logical name, fixture path)` pairs.
//!
//! A registry is authored or generated once and is read-only at run time. It is the statically
//! enumerated half of the bijection the completeness guard checks.
//!
//! ## Notes
//! - Entries keep their authored order; nothing downstream depends on it.
//! - A registry is *well-formed* when no logical name and no fixture path appears twice. See
//!   [`Registry::validate`].

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::fixture::normalize_relative;

/// A single registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KnownCase {
    /// Logical test name, e.g. `testCoroutines`.
    pub name: String,
    /// Fixture path relative to the suite root, e.g. `coroutines.kt`.
    pub path: String,
}

impl KnownCase {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: normalize_relative(&path.into()),
        }
    }
}

impl fmt::Display for KnownCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.path)
    }
}

/// Duplicate entries found while validating a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct RegistryConflict {
    /// Logical names used by more than one entry, with every path they map to.
    pub duplicate_names: Vec<(String, Vec<String>)>,
    /// Fixture paths claimed by more than one entry, with every name claiming them.
    pub duplicate_paths: Vec<(String, Vec<String>)>,
}

impl fmt::Display for RegistryConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "registry has conflicting entries")?;
        for (name, paths) in &self.duplicate_names {
            writeln!(f, "  name `{}` is used for: {}", name, paths.join(", "))?;
        }
        for (path, names) in &self.duplicate_paths {
            writeln!(f, "  fixture `{}` is claimed by: {}", path, names.join(", "))?;
        }
        Ok(())
    }
}

/// The authoritative list mapping logical test names to fixture paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    cases: Vec<KnownCase>,
}

impl Registry {
    pub fn new(cases: Vec<KnownCase>) -> Self {
        Self { cases }
    }

    /// Build a registry from a static table, typically one emitted by the registry generator.
    ///
    /// ## Examples
    /// ```rust
    /// use fixtura_core::Registry;
    ///
    /// const KNOWN_CASES: &[(&str, &str)] = &[("testCoroutines", "coroutines.kt")];
    /// let registry = Registry::from_static(KNOWN_CASES);
    /// assert_eq!(registry.get("testCoroutines").map(|c| c.path.as_str()), Some("coroutines.kt"));
    /// ```
    pub fn from_static(table: &[(&str, &str)]) -> Self {
        Self::new(table.iter().map(|(name, path)| KnownCase::new(*name, *path)).collect())
    }

    pub fn cases(&self) -> &[KnownCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Look up an entry by logical name. First match wins for malformed registries.
    pub fn get(&self, name: &str) -> Option<&KnownCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Fixture paths of every entry, in registry order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.path.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.name.as_str())
    }

    /// Check that names and paths are each unique.
    ///
    /// ## Errors
    /// - [`RegistryConflict`] listing every duplicated name and path, sorted.
    pub fn validate(&self) -> Result<(), RegistryConflict> {
        let mut by_name: HashMap<&str, Vec<String>> = HashMap::new();
        let mut by_path: HashMap<&str, Vec<String>> = HashMap::new();
        for case in &self.cases {
            by_name.entry(case.name.as_str()).or_default().push(case.path.clone());
            by_path.entry(case.path.as_str()).or_default().push(case.name.clone());
        }

        let mut duplicate_names: Vec<(String, Vec<String>)> = by_name
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(name, paths)| (name.to_string(), paths))
            .collect();
        let mut duplicate_paths: Vec<(String, Vec<String>)> = by_path
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(path, names)| (path.to_string(), names))
            .collect();

        if duplicate_names.is_empty() && duplicate_paths.is_empty() {
            return Ok(());
        }
        duplicate_names.sort();
        duplicate_paths.sort();
        Err(RegistryConflict {
            duplicate_names,
            duplicate_paths,
        })
    }
}

impl FromIterator<KnownCase> for Registry {
    fn from_iter<I: IntoIterator<Item = KnownCase>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a KnownCase;
    type IntoIter = std::slice::Iter<'a, KnownCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}
