//! Suite runner: completeness guard, then dispatch, then report.
//!
//! The guard is exposed as a case of its own ([`ALL_FIXTURES_PRESENT`]) so it shows up in the
//! same report as every dispatched case. A missing fixture root still aborts the run: without a
//! scan there is nothing to compare against.

use std::path::Path;
use std::time::Instant;

use fixtura_core::{Registry, verify_complete};

use crate::dispatch::{CaseResult, DispatchTable, run_entry};
use crate::error::{FixturaError, FixturaResult};
use crate::executor::{FixtureExecutor, Outcome};
use crate::manifest::Manifest;
use crate::reporter::{RunSummary, TestReporter};
use crate::scanner::FixtureScanner;

/// Logical name of the completeness-guard case.
pub const ALL_FIXTURES_PRESENT: &str = "testAllFilesPresent";

/// A fixture directory paired with its Known-Case Registry.
#[derive(Debug, Clone)]
pub struct Suite {
    pub scanner: FixtureScanner,
    pub registry: Registry,
}

impl Suite {
    pub fn new(scanner: FixtureScanner, registry: Registry) -> Self {
        Self { scanner, registry }
    }

    pub fn from_manifest(manifest: &Manifest, base_dir: &Path) -> Self {
        Self::new(manifest.scanner(base_dir), manifest.registry())
    }

    pub fn root(&self) -> &Path {
        &self.scanner.root
    }

    /// Validate the registry, scan the fixture root, and check the bijection.
    ///
    /// ## Errors
    /// - [`FixturaError::RegistryConflict`] for duplicate names or paths.
    /// - [`FixturaError::Scan`] if the root is missing or unreadable.
    /// - [`FixturaError::MissingCoverage`] if fixtures and registry disagree.
    #[tracing::instrument(skip_all, fields(root = %self.scanner.root.display(), cases = self.registry.len()))]
    pub fn check_all_fixtures_present(&self) -> FixturaResult<()> {
        self.registry.validate()?;
        let scan = self.scanner.scan()?;
        verify_complete(&scan, self.registry.paths())?;
        tracing::info!(fixtures = scan.len(), "all fixtures registered");
        Ok(())
    }

    pub fn dispatch_table(&self) -> DispatchTable {
        DispatchTable::from_registry(&self.scanner.root, &self.registry)
    }

    /// Run one registered case by logical name.
    pub fn run<E: FixtureExecutor + ?Sized>(&self, name: &str, executor: &E) -> FixturaResult<Outcome> {
        Ok(self.dispatch_table().run(name, executor)?)
    }
}

/// Options for [`run_suite`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop after the first failing case (sequential runs only)
    pub stop_on_fail: bool,
    /// Only dispatch cases whose name contains this keyword
    pub filter: Option<String>,
    /// Worker threads; `1` runs sequentially, `0` uses available parallelism
    pub jobs: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stop_on_fail: false,
            filter: None,
            jobs: 1,
        }
    }
}

/// Run the guard case and every selected registry case, reporting as results arrive.
///
/// ## Errors
/// - Scan failures abort the run before any case is dispatched. Guard mismatches and registry
///   conflicts do not; they are reported as a failed [`ALL_FIXTURES_PRESENT`] case.
pub fn run_suite<E, R>(suite: &Suite, executor: &E, options: &RunOptions, reporter: &mut R) -> FixturaResult<RunSummary>
where
    E: FixtureExecutor + ?Sized,
    R: TestReporter + ?Sized,
{
    let start = Instant::now();
    let mut table = suite.dispatch_table();
    if let Some(keyword) = options.filter.as_deref() {
        table = table.filtered(keyword);
    }

    reporter.on_collection_complete(table.len() + 1);
    let mut summary = RunSummary::default();

    let guard = guard_case(suite)?;
    let guard_failed = !guard.outcome.is_passed();
    reporter.on_case_complete(&guard);
    summary.record(&guard);

    if !(options.stop_on_fail && guard_failed) {
        if options.jobs == 1 {
            for entry in table.entries() {
                reporter.on_case_start(entry);
                let result = run_entry(entry, executor);
                reporter.on_case_complete(&result);
                summary.record(&result);
                if options.stop_on_fail && !result.outcome.is_passed() {
                    break;
                }
            }
        } else {
            if options.stop_on_fail {
                tracing::warn!(jobs = options.jobs, "stop_on_fail is ignored for parallel runs");
            }
            for result in table.run_all_parallel(executor, options.jobs) {
                reporter.on_case_complete(&result);
                summary.record(&result);
            }
        }
    }

    summary.duration = start.elapsed();
    reporter.on_run_complete(&summary);
    tracing::info!(passed = summary.passed, failed = summary.failed, "suite finished");
    Ok(summary)
}

fn guard_case(suite: &Suite) -> FixturaResult<CaseResult> {
    let start = Instant::now();
    let outcome = match suite.check_all_fixtures_present() {
        Ok(()) => Outcome::Passed,
        Err(e @ (FixturaError::MissingCoverage(_) | FixturaError::RegistryConflict(_))) => {
            Outcome::failed(e.to_string())
        }
        Err(e) => return Err(e),
    };
    Ok(CaseResult {
        name: ALL_FIXTURES_PRESENT.to_string(),
        relative_path: suite.root().display().to_string(),
        outcome,
        duration: start.elapsed(),
    })
}
