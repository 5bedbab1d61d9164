//! Fixture execution boundary.
//!
//! The suite never interprets fixture contents. Executing a case means handing the fixture path to
//! a [`FixtureExecutor`] and taking back an [`Outcome`]. Anything can sit behind the trait:
//! a compiler test routine, a mock in unit tests, or [`CommandExecutor`], which shells out.

use std::fmt;
use std::fs;
use std::path::{self, Path, PathBuf};
use std::process::Command;

use serde::Serialize;

/// A structured failure reported by an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub message: String,
    /// Line diff between expected and actual output, when the executor compared against one.
    pub diff: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = Some(diff.into());
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(diff) = &self.diff {
            write!(f, "\n{}", diff)?;
        }
        Ok(())
    }
}

/// Result of executing one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed(Failure),
}

impl Outcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Outcome::Failed(Failure::new(message))
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

/// Execute a single fixture.
///
/// Implementations must not rely on state shared with other executions: the dispatch table may call
/// `execute` for different fixtures in any order or concurrently.
pub trait FixtureExecutor: Sync {
    fn execute(&self, fixture: &Path) -> Outcome;
}

impl<F> FixtureExecutor for F
where
    F: Fn(&Path) -> Outcome + Sync,
{
    fn execute(&self, fixture: &Path) -> Outcome {
        self(fixture)
    }
}

/// Run an external command once per fixture.
///
/// The fixture path is appended as the last argument. A non-zero exit is a failure carrying stderr.
/// When `expected_extension` is set and a sibling golden file exists (`a.kt` -> `a.txt`), stdout
/// must match it; a mismatch is a failure with a line diff.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    pub program: String,
    pub args: Vec<String>,
    pub expected_extension: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            expected_extension: None,
            working_dir: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_expected_extension(mut self, extension: impl Into<String>) -> Self {
        self.expected_extension = Some(extension.into().trim_start_matches('.').to_string());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Path of the golden file for `fixture`, if golden comparison is configured.
    pub fn expected_path(&self, fixture: &Path) -> Option<PathBuf> {
        self.expected_extension.as_ref().map(|ext| fixture.with_extension(ext))
    }
}

impl FixtureExecutor for CommandExecutor {
    fn execute(&self, fixture: &Path) -> Outcome {
        // Relative fixture paths are relative to this process, not to `working_dir`.
        let absolute = match path::absolute(fixture) {
            Ok(path) => path,
            Err(e) => return Outcome::failed(format!("cannot resolve '{}': {}", fixture.display(), e)),
        };
        let fixture = absolute.as_path();

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(fixture);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = match command.output() {
            Ok(output) => output,
            Err(e) => return Outcome::failed(format!("failed to run `{}`: {}", self.program, e)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let detail = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
            return Outcome::failed(format!("`{}` exited with {}\n{}", self.program, code, detail));
        }

        let Some(expected_path) = self.expected_path(fixture) else {
            return Outcome::Passed;
        };
        if !expected_path.is_file() {
            return Outcome::Passed;
        }
        let expected = match fs::read_to_string(&expected_path) {
            Ok(s) => s,
            Err(e) => {
                return Outcome::failed(format!(
                    "failed to read expected output '{}': {}",
                    expected_path.display(),
                    e
                ));
            }
        };

        match line_diff(&expected, &stdout) {
            None => Outcome::Passed,
            Some(diff) => Outcome::Failed(
                Failure::new(format!("output differs from '{}'", expected_path.display())).with_diff(diff),
            ),
        }
    }
}

/// Simple line-by-line diff between expected and actual text.
///
/// Trailing whitespace on each line and trailing blank lines are ignored.
pub fn line_diff(expected: &str, actual: &str) -> Option<String> {
    let expected_lines: Vec<&str> = expected.trim_end().lines().map(str::trim_end).collect();
    let actual_lines: Vec<&str> = actual.trim_end().lines().map(str::trim_end).collect();

    if expected_lines == actual_lines {
        return None;
    }

    let mut diff = String::new();
    let max_lines = expected_lines.len().max(actual_lines.len());
    for i in 0..max_lines {
        let exp = expected_lines.get(i).copied();
        let act = actual_lines.get(i).copied();
        if exp != act {
            if let Some(exp) = exp {
                diff.push_str(&format!("-{:4} | {}\n", i + 1, exp));
            }
            if let Some(act) = act {
                diff.push_str(&format!("+{:4} | {}\n", i + 1, act));
            }
        }
    }
    Some(diff)
}
