//! Result reporting (pytest-style console output, or JSON lines).
//!
//! ## TestReporter Trait
//!
//! The runner uses a `TestReporter` trait to separate reporting from execution. Custom output
//! formats implement the trait; the runner never prints on its own.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;

use crate::dispatch::{CaseResult, DispatchEntry};
use crate::executor::Outcome;

/// Colored per-case marker: `.`/`F`, or `PASSED (3ms)`/`FAILED (3ms)` when verbose.
fn status_label(outcome: &Outcome, duration: Duration, verbose: bool) -> String {
    match outcome {
        Outcome::Passed if verbose => format!("\x1b[32mPASSED\x1b[0m ({}ms)", duration.as_millis()),
        Outcome::Passed => "\x1b[32m.\x1b[0m".to_string(),
        Outcome::Failed(_) if verbose => format!("\x1b[31mFAILED\x1b[0m ({}ms)", duration.as_millis()),
        Outcome::Failed(_) => "\x1b[31mF\x1b[0m".to_string(),
    }
}

/// Trait for reporting suite execution results.
pub trait TestReporter {
    /// Called once the cases to run are known (the guard case included)
    fn on_collection_complete(&mut self, case_count: usize);

    /// Called before a case runs. Not called for cases run on worker threads.
    fn on_case_start(&mut self, _entry: &DispatchEntry) {}

    /// Called when a case completes
    fn on_case_complete(&mut self, result: &CaseResult);

    /// Called when all cases have completed
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Summary of a suite run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Failed cases in the order they were reported
    pub failures: Vec<CaseResult>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn record(&mut self, result: &CaseResult) {
        self.total += 1;
        if result.outcome.is_passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.failures.push(result.clone());
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Default console reporter (pytest-style)
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_collection_complete(&mut self, case_count: usize) {
        println!("\x1b[1m=================== test session starts ===================\x1b[0m");
        println!("collected {} item(s)", case_count);
        println!();
    }

    fn on_case_start(&mut self, entry: &DispatchEntry) {
        if self.verbose {
            print!("{} ... ", entry.name);
            let _ = std::io::stdout().flush();
        }
    }

    fn on_case_complete(&mut self, result: &CaseResult) {
        let status = status_label(&result.outcome, result.duration, self.verbose);

        if self.verbose {
            println!("{}", status);
        } else {
            print!("{}", status);
            let _ = std::io::stdout().flush();
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if !self.verbose {
            println!();
        }

        if !summary.failures.is_empty() {
            println!();
            println!("\x1b[1;31m=================== FAILURES ===================\x1b[0m");
            for result in &summary.failures {
                println!();
                print!("{}", render_failure(result));
            }
        }

        println!();
        let color = if summary.is_success() { "\x1b[1;32m" } else { "\x1b[1;31m" };
        println!("{}{}\x1b[0m", color, render_summary_line(summary));
    }
}

/// Failure block for one case: header, message, optional diff, and location.
pub fn render_failure(result: &CaseResult) -> String {
    let mut out = format!("___________ {} ___________\n", result.name);
    if let Outcome::Failed(failure) = &result.outcome {
        out.push('\n');
        for line in failure.message.lines() {
            out.push_str(&format!("    {}\n", line));
        }
        if let Some(diff) = &failure.diff {
            out.push('\n');
            for line in diff.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
    }
    out.push('\n');
    out.push_str(&format!("    {}::{}\n", result.relative_path, result.name));
    out
}

/// Closing line, e.g. `====== 2 passed, 1 failed in 0.12s ======`.
pub fn render_summary_line(summary: &RunSummary) -> String {
    let mut parts = Vec::new();
    if summary.passed > 0 {
        parts.push(format!("{} passed", summary.passed));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed", summary.failed));
    }
    if parts.is_empty() {
        parts.push("no cases ran".to_string());
    }
    format!(
        "=================== {} in {:.2}s ===================",
        parts.join(", "),
        summary.duration.as_secs_f64()
    )
}

/// One JSON object per line: a `case` event per result, then a `summary` event.
pub struct JsonReporter<W: Write> {
    out: W,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum JsonEvent<'a> {
    Case {
        name: &'a str,
        path: &'a str,
        duration_ms: u64,
        #[serde(flatten)]
        outcome: &'a Outcome,
    },
    Summary {
        total: usize,
        passed: usize,
        failed: usize,
        duration_ms: u64,
    },
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &JsonEvent<'_>) {
        match serde_json::to_string(event) {
            Ok(line) => {
                if let Err(e) = writeln!(self.out, "{}", line) {
                    tracing::warn!(error = %e, "failed to write JSON report line");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize JSON report event"),
        }
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_collection_complete(&mut self, _case_count: usize) {}

    fn on_case_complete(&mut self, result: &CaseResult) {
        self.emit(&JsonEvent::Case {
            name: &result.name,
            path: &result.relative_path,
            duration_ms: result.duration.as_millis() as u64,
            outcome: &result.outcome,
        });
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        self.emit(&JsonEvent::Summary {
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            duration_ms: summary.duration.as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Failure;

    fn case(name: &str, outcome: Outcome) -> CaseResult {
        CaseResult {
            name: name.to_string(),
            relative_path: format!("{}.kt", name),
            outcome,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&case("testA", Outcome::Passed));
        summary.record(&case("testB", Outcome::failed("nope")));
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].name, "testB");
        assert!(!summary.is_success());
    }

    #[test]
    fn test_status_label_shows_whole_milliseconds() {
        let duration = Duration::from_micros(12_700);
        assert_eq!(
            status_label(&Outcome::Passed, duration, true),
            "\x1b[32mPASSED\x1b[0m (12ms)"
        );
        assert_eq!(
            status_label(&Outcome::failed("nope"), duration, true),
            "\x1b[31mFAILED\x1b[0m (12ms)"
        );
        assert_eq!(status_label(&Outcome::failed("nope"), duration, false), "\x1b[31mF\x1b[0m");
    }

    #[test]
    fn test_summary_line() {
        let summary = RunSummary {
            total: 3,
            passed: 2,
            failed: 1,
            failures: Vec::new(),
            duration: Duration::from_millis(120),
        };
        assert_eq!(
            render_summary_line(&summary),
            "=================== 2 passed, 1 failed in 0.12s ==================="
        );
    }

    #[test]
    fn test_render_failure_includes_diff_and_location() {
        let result = case(
            "testA",
            Outcome::Failed(Failure::new("output differs").with_diff("-   1 | x\n+   1 | y")),
        );
        let text = render_failure(&result);
        assert!(text.starts_with("___________ testA ___________\n"));
        assert!(text.contains("    output differs\n"));
        assert!(text.contains("    -   1 | x\n    +   1 | y\n"));
        assert!(text.ends_with("    testA.kt::testA\n"));
    }

    #[test]
    fn test_json_reporter_lines() {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.on_case_complete(&case("testA", Outcome::Passed));
        reporter.on_case_complete(&case("testB", Outcome::failed("boom")));
        let mut summary = RunSummary::default();
        summary.total = 2;
        summary.passed = 1;
        summary.failed = 1;
        reporter.on_run_complete(&summary);

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "case");
        assert_eq!(lines[0]["status"], "passed");
        assert_eq!(lines[1]["status"], "failed");
        assert_eq!(lines[1]["message"], "boom");
        assert_eq!(lines[2]["event"], "summary");
        assert_eq!(lines[2]["failed"], 1);
    }
}
