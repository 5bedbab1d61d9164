//! Library-level error type.
//!
//! Each component keeps its own `thiserror` enum; [`FixturaError`] aggregates them at the crate
//! boundary and attaches `miette` codes and help text for rendering.
//!
//! Nothing here is retried. Every variant describes a configuration or generation defect that a
//! maintainer has to fix.

use miette::Diagnostic;
use thiserror::Error;

use fixtura_core::{MissingCoverage, NameCollision, RegistryConflict};

use crate::dispatch::DispatchError;
use crate::generate::GenerateError;
use crate::manifest::ManifestError;
use crate::scanner::ScanError;

#[derive(Debug, Error, Diagnostic)]
pub enum FixturaError {
    #[error(transparent)]
    #[diagnostic(code(fixtura::scan))]
    Scan(#[from] ScanError),

    #[error(transparent)]
    #[diagnostic(
        code(fixtura::guard::missing_coverage),
        help("run `fixtura generate` to register new fixtures, and delete cases whose fixture was removed")
    )]
    MissingCoverage(#[from] MissingCoverage),

    #[error(transparent)]
    #[diagnostic(
        code(fixtura::registry::conflict),
        help("every logical name and every fixture path may appear in the registry only once")
    )]
    RegistryConflict(#[from] RegistryConflict),

    #[error(transparent)]
    #[diagnostic(
        code(fixtura::registry::name_collision),
        help("rename one of the fixtures; `.kt` and `.kts` files with the same stem derive the same name")
    )]
    NameCollision(#[from] NameCollision),

    #[error(transparent)]
    #[diagnostic(code(fixtura::manifest))]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    #[diagnostic(code(fixtura::dispatch))]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    #[diagnostic(code(fixtura::generate))]
    Generate(#[from] GenerateError),
}

pub type FixturaResult<T> = Result<T, FixturaError>;
