//! fixtura version information.
//!
//! Exposed as a single constant so the CLI and generated-file headers agree on the same value.

/// The fixtura version string (for example, `0.1.0-alpha.1`).
pub const FIXTURA_VERSION: &str = env!("CARGO_PKG_VERSION");
