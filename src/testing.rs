//! Assertion helpers for driving a suite from `cargo test`.
//!
//! A suite needs two tests, not one per fixture:
//!
//! ```rust,ignore
//! const KNOWN_CASES: &[(&str, &str)] = &[("testCoroutines", "coroutines.kt")];
//!
//! fn suite() -> Suite {
//!     Suite::new(FixtureScanner::new("tests/fixtures"), Registry::from_static(KNOWN_CASES))
//! }
//!
//! #[test]
//! fn all_fixtures_present() {
//!     fixtura::testing::assert_all_fixtures_present(&suite());
//! }
//!
//! #[test]
//! fn all_cases_pass() {
//!     fixtura::testing::assert_all_cases_pass(&suite(), &my_executor);
//! }
//! ```

use crate::executor::FixtureExecutor;
use crate::reporter::{RunSummary, render_failure};
use crate::runner::Suite;

/// Assert that the registry is well-formed and in bijection with the fixture directory.
///
/// # Panics
///
/// Panics with both difference sets (or the conflicting entries) when the check fails.
pub fn assert_all_fixtures_present(suite: &Suite) {
    if let Err(e) = suite.check_all_fixtures_present() {
        panic!("{}", e);
    }
}

/// Dispatch every registry case and assert that all of them pass.
///
/// Every case runs; the panic message lists every failure, not just the first.
///
/// # Panics
///
/// Panics if any case fails.
pub fn assert_all_cases_pass<E: FixtureExecutor + ?Sized>(suite: &Suite, executor: &E) {
    let mut summary = RunSummary::default();
    for result in suite.dispatch_table().run_all(executor, false) {
        summary.record(&result);
    }
    if summary.is_success() {
        return;
    }

    let mut msg = format!("{} of {} case(s) failed\n\n", summary.failed, summary.total);
    for failure in &summary.failures {
        msg.push_str(&render_failure(failure));
        msg.push('\n');
    }
    panic!("{msg}");
}
