//! Provide the pure data model and checks behind fixture-driven test suites.
//!
//! A fixture directory is the source of truth for a suite. Every fixture file maps to exactly one
//! logical test case in a [`Registry`], and the completeness guard asserts that the fixtures on disk
//! and the registry entries are in bijection.
//!
//! ## Notes
//!
//! - This is a “core” crate: **no IO**, no global state. Scanning the filesystem and executing cases
//!   live in the `fixtura` crate; this crate only sees relative paths as strings.
//! - Relative paths are always `/`-separated, regardless of host platform.
//!
//! ## Examples
//! ```rust
//! use fixtura_core::{verify_complete, KnownCase, Registry, ScanResult};
//!
//! let scan: ScanResult = ["a.kt", "b.kt"].into_iter().collect();
//! let registry = Registry::new(vec![KnownCase::new("testA", "a.kt"), KnownCase::new("testB", "b.kt")]);
//! assert!(verify_complete(&scan, registry.paths()).is_ok());
//! ```

pub mod fixture;
pub mod guard;
pub mod naming;
pub mod registry;

pub use fixture::{Fixture, ScanResult};
pub use guard::{MissingCoverage, verify_complete};
pub use naming::{NameCollision, derive_registry, logical_name_for};
pub use registry::{KnownCase, Registry, RegistryConflict};
