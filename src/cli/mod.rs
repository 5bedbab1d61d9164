//! CLI module for fixtura
//!
//! ## Commands
//!
//! - `check` - Verify that fixtures on disk and registered cases match one-to-one
//! - `run` - Run the guard plus every registered case (pytest-style output)
//! - `generate` - Regenerate the Known-Case Registry from the fixture directory
//! - `list` - Print the registered cases
//!
//! Every command takes `-m/--manifest`. Without it the manifest comes from `FIXTURA_MANIFEST`, or the
//! first `fixtura.toml` found walking up from the current directory.
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::FixturaError;
use crate::generate::EmitKind;
use crate::version::FIXTURA_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// A case failed, or the fixtures and registry disagree.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The suite could not be set up (manifest, fixture root, generation).
    pub const CONFIG: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create a configuration error (exit code 2).
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::CONFIG)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Render library errors as miette diagnostics.
///
/// Coverage and conflict problems are suite failures; everything else is a setup problem.
impl From<FixturaError> for CliError {
    fn from(err: FixturaError) -> Self {
        let exit_code = match &err {
            FixturaError::MissingCoverage(_) | FixturaError::RegistryConflict(_) => ExitCode::FAILURE,
            _ => ExitCode::CONFIG,
        };
        let report = miette::Report::new(err);
        Self::new(format!("{:?}", report), exit_code)
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Keep a fixture directory and its registered test cases in sync
#[derive(Parser, Debug)]
#[command(name = "fixtura")]
#[command(version = FIXTURA_VERSION)]
#[command(about = "Keep a fixture directory and its registered test cases in sync", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Output format for `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// pytest-style console output
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify that every fixture is registered and every registered case has a fixture
    Check {
        /// Suite manifest (default: discover fixtura.toml)
        #[arg(short, long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },

    /// Run the completeness guard and every registered case
    Run {
        /// Suite manifest (default: discover fixtura.toml)
        #[arg(short, long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Stop on first failure
        #[arg(short = 'x', long = "exitfirst")]
        stop_on_fail: bool,
        /// Only run cases whose name contains EXPR
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
        /// Worker threads (0 = available parallelism)
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        format: ReportFormat,
    },

    /// Regenerate the registry from the fixture directory
    Generate {
        /// Suite manifest (default: discover fixtura.toml)
        #[arg(short, long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// What to emit
        #[arg(long, value_enum, default_value_t = EmitKind::Manifest)]
        emit: EmitKind,
        /// Output file (default: the manifest itself for `manifest`, stdout for `rust`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Fail if the output on disk is out of date instead of writing it
        #[arg(long)]
        check: bool,
    },

    /// List registered cases as `name<TAB>path`
    List {
        /// Suite manifest (default: discover fixtura.toml)
        #[arg(short, long, value_name = "FILE")]
        manifest: Option<PathBuf>,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Check { manifest } => commands::check(manifest.as_deref()),
        Command::Run {
            manifest,
            verbose,
            stop_on_fail,
            filter,
            jobs,
            format,
        } => commands::run_cases(
            manifest.as_deref(),
            &commands::RunArgs {
                verbose,
                stop_on_fail,
                filter,
                jobs,
                format,
            },
        ),
        Command::Generate {
            manifest,
            emit,
            output,
            check,
        } => commands::generate(manifest.as_deref(), emit, output.as_deref(), check),
        Command::List { manifest } => commands::list(manifest.as_deref()),
    }
}

// ============================================================================
// Tests
// ============================================================================
