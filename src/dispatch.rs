//! Dispatch table: one invocable unit per registry entry.
//!
//! `run(name)` resolves a logical name to its fixture path and calls the executor exactly once.
//! The outcome comes back unchanged and nothing is retried.
//!
//! Entries share no mutable state, so they can run in any order or on worker threads. Results are
//! always returned in registry order regardless of how they were scheduled.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use fixtura_core::Registry;

use crate::executor::{FixtureExecutor, Outcome};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no case named `{0}` in the registry")]
    UnknownCase(String),
}

/// A registry entry resolved against the suite root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEntry {
    pub name: String,
    /// Path relative to the suite root, as registered.
    pub relative_path: String,
    /// Path handed to the executor.
    pub fixture_path: PathBuf,
}

/// Outcome of one dispatched case, with timing for reporters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub name: String,
    pub relative_path: String,
    pub outcome: Outcome,
    pub duration: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: Vec<DispatchEntry>,
}

impl DispatchTable {
    /// Resolve every registry entry against `root`.
    pub fn from_registry(root: &Path, registry: &Registry) -> Self {
        let entries = registry
            .cases()
            .iter()
            .map(|case| DispatchEntry {
                name: case.name.clone(),
                relative_path: case.path.clone(),
                fixture_path: root.join(&case.path),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&DispatchEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Keep only entries whose logical name contains `keyword`.
    pub fn filtered(&self, keyword: &str) -> Self {
        Self {
            entries: self.entries.iter().filter(|e| e.name.contains(keyword)).cloned().collect(),
        }
    }

    /// Execute the case registered as `name`.
    ///
    /// ## Errors
    /// - [`DispatchError::UnknownCase`] if no entry has that name. Executor failures are not
    ///   errors here; they come back inside the [`Outcome`].
    pub fn run<E: FixtureExecutor + ?Sized>(&self, name: &str, executor: &E) -> Result<Outcome, DispatchError> {
        let entry = self.get(name).ok_or_else(|| DispatchError::UnknownCase(name.to_string()))?;
        Ok(run_entry(entry, executor).outcome)
    }

    /// Execute every entry in registry order.
    ///
    /// With `stop_on_fail`, execution ends after the first failed case; that case is included.
    pub fn run_all<E: FixtureExecutor + ?Sized>(&self, executor: &E, stop_on_fail: bool) -> Vec<CaseResult> {
        let mut results = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let result = run_entry(entry, executor);
            let failed = !result.outcome.is_passed();
            results.push(result);
            if stop_on_fail && failed {
                break;
            }
        }
        results
    }

    /// Execute every entry on up to `jobs` scoped worker threads.
    ///
    /// `jobs == 0` uses the available parallelism. Every entry runs even if others fail.
    #[tracing::instrument(skip_all, fields(cases = self.entries.len(), jobs = jobs))]
    pub fn run_all_parallel<E: FixtureExecutor + ?Sized>(&self, executor: &E, jobs: usize) -> Vec<CaseResult> {
        let workers = effective_jobs(jobs).min(self.entries.len().max(1));
        if workers <= 1 {
            return self.run_all(executor, false);
        }

        let next = &AtomicUsize::new(0);
        let entries = &self.entries;
        let mut indexed: Vec<(usize, CaseResult)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut local = Vec::new();
                        loop {
                            let idx = next.fetch_add(1, Ordering::Relaxed);
                            let Some(entry) = entries.get(idx) else { break };
                            local.push((idx, run_entry(entry, executor)));
                        }
                        local
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(local) => local,
                    // A panicking executor takes its in-flight case with it; re-raise on this thread.
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        });

        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, result)| result).collect()
    }
}

/// Execute one entry, timing the call.
#[tracing::instrument(skip_all, fields(case = %entry.name))]
pub fn run_entry<E: FixtureExecutor + ?Sized>(entry: &DispatchEntry, executor: &E) -> CaseResult {
    let start = Instant::now();
    let outcome = executor.execute(&entry.fixture_path);
    let duration = start.elapsed();
    tracing::debug!(passed = outcome.is_passed(), ms = duration.as_millis() as u64, "case finished");
    CaseResult {
        name: entry.name.clone(),
        relative_path: entry.relative_path.clone(),
        outcome,
        duration,
    }
}

fn effective_jobs(jobs: usize) -> usize {
    if jobs > 0 {
        return jobs;
    }
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use fixtura_core::KnownCase;

    use super::*;

    fn registry() -> Registry {
        Registry::new(vec![
            KnownCase::new("testCoroutines", "coroutines.kt"),
            KnownCase::new("testImportAliases", "importAliases.kt"),
            KnownCase::new("testInlineOnly", "inlineOnly.kt"),
        ])
    }

    struct Recording {
        calls: Mutex<Vec<PathBuf>>,
        fail_on: Option<&'static str>,
    }

    impl Recording {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on,
            }
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FixtureExecutor for Recording {
        fn execute(&self, fixture: &Path) -> Outcome {
            self.calls.lock().unwrap().push(fixture.to_path_buf());
            match self.fail_on {
                Some(name) if fixture.ends_with(name) => Outcome::failed(format!("{} failed", name)),
                _ => Outcome::Passed,
            }
        }
    }

    #[test]
    fn test_run_calls_executor_once_with_fixture_path() {
        let table = DispatchTable::from_registry(Path::new("fixtures"), &registry());
        let executor = Recording::new(None);

        let outcome = table.run("testCoroutines", &executor).unwrap();
        assert_eq!(outcome, Outcome::Passed);
        assert_eq!(executor.calls(), vec![PathBuf::from("fixtures/coroutines.kt")]);
    }

    #[test]
    fn test_run_returns_failure_unchanged() {
        let table = DispatchTable::from_registry(Path::new("fixtures"), &registry());
        let executor = Recording::new(Some("coroutines.kt"));

        let outcome = table.run("testCoroutines", &executor).unwrap();
        assert_eq!(outcome, Outcome::failed("coroutines.kt failed"));
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn test_run_unknown_case() {
        let table = DispatchTable::from_registry(Path::new("fixtures"), &registry());
        let executor = Recording::new(None);
        assert_eq!(
            table.run("testMissing", &executor),
            Err(DispatchError::UnknownCase("testMissing".to_string()))
        );
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_run_all_in_registry_order() {
        let table = DispatchTable::from_registry(Path::new("r"), &registry());
        let results = table.run_all(&Recording::new(None), false);
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["testCoroutines", "testImportAliases", "testInlineOnly"]);
    }

    #[test]
    fn test_run_all_stop_on_fail() {
        let table = DispatchTable::from_registry(Path::new("r"), &registry());
        let executor = Recording::new(Some("importAliases.kt"));
        let results = table.run_all(&executor, true);
        assert_eq!(results.len(), 2);
        assert!(!results[1].outcome.is_passed());
        assert_eq!(executor.calls().len(), 2);
    }

    #[test]
    fn test_run_all_parallel_matches_sequential() {
        let table = DispatchTable::from_registry(Path::new("r"), &registry());
        let sequential = table.run_all(&Recording::new(Some("inlineOnly.kt")), false);
        let parallel = table.run_all_parallel(&Recording::new(Some("inlineOnly.kt")), 3);

        let strip = |results: &[CaseResult]| -> Vec<(String, Outcome)> {
            results.iter().map(|r| (r.name.clone(), r.outcome.clone())).collect()
        };
        assert_eq!(strip(&sequential), strip(&parallel));
    }

    #[test]
    fn test_run_all_parallel_runs_every_entry_once() {
        let table = DispatchTable::from_registry(Path::new("r"), &registry());
        let executor = Recording::new(Some("coroutines.kt"));
        let results = table.run_all_parallel(&executor, 2);
        assert_eq!(results.len(), 3);

        let mut calls = executor.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                PathBuf::from("r/coroutines.kt"),
                PathBuf::from("r/importAliases.kt"),
                PathBuf::from("r/inlineOnly.kt"),
            ]
        );
    }

    #[test]
    fn test_filtered_by_keyword() {
        let table = DispatchTable::from_registry(Path::new("r"), &registry());
        let filtered = table.filtered("Import");
        assert_eq!(filtered.len(), 1);
        assert!(filtered.get("testImportAliases").is_some());
    }
}
