//! Completeness guard: fixtures on disk and registry entries must be in bijection.
//!
//! The check is a pure set difference. A fixture on disk with no registry entry means the registry
//! generator needs to be rerun; a registry entry whose fixture is gone is a stale case.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::fixture::{ScanResult, normalize_relative};

/// The registry and the fixture directory disagree.
///
/// Both sets are sorted so the message is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct MissingCoverage {
    /// Fixtures present on disk but absent from the registry.
    pub extra_fixtures: BTreeSet<String>,
    /// Registry entries whose fixture no longer exists on disk.
    pub extra_known: BTreeSet<String>,
}

impl fmt::Display for MissingCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "fixtures and registry are out of sync ({} without a case, {} stale)",
            self.extra_fixtures.len(),
            self.extra_known.len()
        )?;
        if !self.extra_fixtures.is_empty() {
            writeln!(f, "fixtures on disk with no registered case (rerun the registry generator):")?;
            for path in &self.extra_fixtures {
                writeln!(f, "  + {}", path)?;
            }
        }
        if !self.extra_known.is_empty() {
            writeln!(f, "registered cases whose fixture is missing (remove them or restore the file):")?;
            for path in &self.extra_known {
                writeln!(f, "  - {}", path)?;
            }
        }
        Ok(())
    }
}

/// Compare a scan against the registry's fixture paths.
///
/// ## Parameters
/// - `scan`: fixture paths found on disk.
/// - `known_paths`: fixture paths of every registry entry.
///
/// ## Returns
/// - `Ok(())` iff the two sets are equal.
///
/// ## Errors
/// - [`MissingCoverage`] carrying both difference sets. Either set may be empty, never both.
///
/// ## Examples
/// ```rust
/// use fixtura_core::{verify_complete, ScanResult};
///
/// let scan: ScanResult = ["a.kt", "b.kt", "c.kt"].into_iter().collect();
/// let err = verify_complete(&scan, ["a.kt", "b.kt"]).unwrap_err();
/// assert!(err.extra_fixtures.contains("c.kt"));
/// assert!(err.extra_known.is_empty());
/// ```
pub fn verify_complete<'a, I>(scan: &ScanResult, known_paths: I) -> Result<(), MissingCoverage>
where
    I: IntoIterator<Item = &'a str>,
{
    let known: BTreeSet<String> = known_paths.into_iter().map(normalize_relative).collect();
    let on_disk = scan.as_set();

    let extra_fixtures: BTreeSet<String> = on_disk.difference(&known).cloned().collect();
    let extra_known: BTreeSet<String> = known.difference(on_disk).cloned().collect();

    if extra_fixtures.is_empty() && extra_known.is_empty() {
        Ok(())
    } else {
        Err(MissingCoverage {
            extra_fixtures,
            extra_known,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(paths: &[&str]) -> ScanResult {
        paths.iter().copied().collect()
    }

    fn set(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_matching_sets_pass() {
        assert!(verify_complete(&scan(&["a.kt", "b.kt"]), ["a.kt", "b.kt"]).is_ok());
    }

    #[test]
    fn test_new_fixture_is_reported() {
        let err = verify_complete(&scan(&["a.kt", "b.kt", "c.kt"]), ["a.kt", "b.kt"]).unwrap_err();
        assert_eq!(err.extra_fixtures, set(&["c.kt"]));
        assert!(err.extra_known.is_empty());
    }

    #[test]
    fn test_stale_case_is_reported() {
        let err = verify_complete(&scan(&["a.kt"]), ["a.kt", "b.kt"]).unwrap_err();
        assert!(err.extra_fixtures.is_empty());
        assert_eq!(err.extra_known, set(&["b.kt"]));
    }

    #[test]
    fn test_both_sides_reported_together() {
        let err = verify_complete(&scan(&["a.kt", "new.kt"]), ["a.kt", "old.kt"]).unwrap_err();
        assert_eq!(err.extra_fixtures, set(&["new.kt"]));
        assert_eq!(err.extra_known, set(&["old.kt"]));
    }

    #[test]
    fn test_empty_sets_pass() {
        assert!(verify_complete(&ScanResult::new(), std::iter::empty()).is_ok());
    }

    #[test]
    fn test_known_paths_are_normalized() {
        assert!(verify_complete(&scan(&["sub/a.kt"]), ["./sub\\a.kt"]).is_ok());
    }

    #[test]
    fn test_message_lists_both_sets() {
        let err = verify_complete(&scan(&["a.kt", "new.kt"]), ["a.kt", "old.kt"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("1 without a case, 1 stale"));
        assert!(msg.contains("  + new.kt"));
        assert!(msg.contains("  - old.kt"));
    }
}
