//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FixturaError;
use crate::generate::{self, EmitKind};
use crate::manifest::{self, Manifest};
use crate::reporter::{ConsoleReporter, JsonReporter, RunSummary};
use crate::runner::{RunOptions, Suite, run_suite};

use super::{CliError, CliResult, ExitCode, ReportFormat};

/// A loaded manifest and the directory its relative paths resolve against.
struct LoadedSuite {
    manifest_path: PathBuf,
    manifest: Manifest,
    base_dir: PathBuf,
}

impl LoadedSuite {
    fn suite(&self) -> Suite {
        Suite::from_manifest(&self.manifest, &self.base_dir)
    }
}

fn load(explicit: Option<&Path>) -> CliResult<LoadedSuite> {
    let cwd = env::current_dir().map_err(|e| CliError::config(format!("Error reading current directory: {}", e)))?;
    let manifest_path = manifest::find_manifest(explicit, &cwd).map_err(FixturaError::from)?;
    let manifest = Manifest::load(&manifest_path).map_err(FixturaError::from)?;
    tracing::debug!(manifest = %manifest_path.display(), cases = manifest.cases.len(), "manifest loaded");
    let base_dir = manifest::base_dir(&manifest_path);
    Ok(LoadedSuite {
        manifest_path,
        manifest,
        base_dir,
    })
}

// ============================================================================
// check
// ============================================================================

pub fn check(manifest: Option<&Path>) -> CliResult<ExitCode> {
    let loaded = load(manifest)?;
    let suite = loaded.suite();
    suite.check_all_fixtures_present()?;
    println!(
        "✓ {} case(s) registered, all fixtures under {} covered",
        suite.registry.len(),
        suite.root().display()
    );
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// run
// ============================================================================

/// Flags of the `run` subcommand.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub verbose: bool,
    pub stop_on_fail: bool,
    pub filter: Option<String>,
    pub jobs: usize,
    pub format: ReportFormat,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            verbose: false,
            stop_on_fail: false,
            filter: None,
            jobs: 1,
            format: ReportFormat::default(),
        }
    }
}

pub fn run_cases(manifest: Option<&Path>, args: &RunArgs) -> CliResult<ExitCode> {
    if args.stop_on_fail && args.jobs != 1 {
        return Err(CliError::config(
            "-x/--exitfirst only applies to sequential runs; drop -j or use -j 1",
        ));
    }
    let loaded = load(manifest)?;
    let Some(executor) = loaded.manifest.executor(&loaded.base_dir) else {
        return Err(CliError::config(format!(
            "{} has no [executor] section; `fixtura run` needs a command to execute fixtures with",
            loaded.manifest_path.display()
        )));
    };

    let suite = loaded.suite();
    let options = RunOptions {
        stop_on_fail: args.stop_on_fail,
        filter: args.filter.clone(),
        jobs: args.jobs,
    };

    let summary: RunSummary = match args.format {
        ReportFormat::Console => {
            let mut reporter = ConsoleReporter::new(args.verbose);
            run_suite(&suite, &executor, &options, &mut reporter)?
        }
        ReportFormat::Json => {
            let mut reporter = JsonReporter::new(io::stdout().lock());
            run_suite(&suite, &executor, &options, &mut reporter)?
        }
    };

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// generate
// ============================================================================

pub fn generate(manifest: Option<&Path>, emit: EmitKind, output: Option<&Path>, check: bool) -> CliResult<ExitCode> {
    let loaded = load(manifest)?;
    let scanner = loaded.manifest.scanner(&loaded.base_dir);
    let registry = generate::generate_registry(&scanner)?;

    let (content, target) = match emit {
        EmitKind::Manifest => {
            let target = output.map(Path::to_path_buf).unwrap_or_else(|| loaded.manifest_path.clone());
            if check {
                generate::check_manifest_cases(&target, &registry)?;
                println!("✓ {} is up to date ({} case(s))", target.display(), registry.len());
                return Ok(ExitCode::SUCCESS);
            }
            let content = generate::render_manifest(&loaded.manifest, &registry)?;
            (content, Some(target))
        }
        EmitKind::Rust => {
            let content =
                generate::render_rust_module(&loaded.manifest.suite.root, &registry).map_err(FixturaError::from)?;
            (content, output.map(Path::to_path_buf))
        }
    };

    match (target, check) {
        (Some(target), true) => {
            generate::check_up_to_date(&target, &content).map_err(FixturaError::from)?;
            println!("✓ {} is up to date ({} case(s))", target.display(), registry.len());
        }
        (Some(target), false) => {
            generate::write_output(&target, &content).map_err(FixturaError::from)?;
            println!("Wrote {} case(s) to {}", registry.len(), target.display());
        }
        (None, true) => {
            return Err(CliError::config("--check needs -o/--output when emitting Rust"));
        }
        (None, false) => print!("{}", content),
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// list
// ============================================================================

pub fn list(manifest: Option<&Path>) -> CliResult<ExitCode> {
    let loaded = load(manifest)?;
    for case in &loaded.manifest.registry() {
        println!("{}\t{}", case.name, case.path);
    }
    Ok(ExitCode::SUCCESS)
}
