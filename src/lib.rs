#![forbid(unsafe_code)]
//! fixtura: keep a directory of test fixtures and the test cases that exercise them in sync.
//!
//! A fixture suite is a directory of input files plus a Known-Case Registry naming one test case per
//! file. This crate scans the directory ([`scanner`]), checks that fixtures and registry are in
//! bijection ([`runner::Suite::check_all_fixtures_present`]), dispatches each case to an external
//! executor exactly once ([`dispatch`]), and regenerates the registry when fixtures are added
//! ([`generate`]). The pure set logic lives in [`fixtura_core`].
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Assertion helpers**: [`testing`] panics on purpose; it is meant to be called from `#[test]` functions.

pub mod cli;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod generate;
pub mod manifest;
pub mod reporter;
pub mod runner;
pub mod scanner;
pub mod testing;
pub mod version;

pub use fixtura_core::{
    Fixture, KnownCase, MissingCoverage, NameCollision, Registry, RegistryConflict, ScanResult, logical_name_for,
    verify_complete,
};

pub use dispatch::{CaseResult, DispatchError, DispatchTable};
pub use error::{FixturaError, FixturaResult};
pub use executor::{CommandExecutor, Failure, FixtureExecutor, Outcome};
pub use manifest::Manifest;
pub use runner::{RunOptions, Suite, run_suite};
pub use scanner::{FixtureScanner, ScanError};
