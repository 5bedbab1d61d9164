//! Registry generation: derive the Known-Case Registry from the fixture directory.
//!
//! This is a build step, not runtime logic. Its output is checked in and treated as a derived
//! artifact, in one of two forms:
//!
//! - a suite manifest whose `[[case]]` entries are rewritten from the scan, or
//! - a Rust module exposing `KNOWN_CASES: &[(&str, &str)]` for `include!`, emitted with `quote!` and
//!   formatted with `prettyplease`.
//!
//! `--check` mode regenerates in memory and compares with the file on disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::quote;
use thiserror::Error;

use fixtura_core::{KnownCase, Registry};
use fixtura_core::naming::derive_registry;

use crate::error::FixturaResult;
use crate::manifest::Manifest;
use crate::scanner::FixtureScanner;
use crate::version::FIXTURA_VERSION;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generated Rust did not parse: {0}")]
    SynParse(String),

    #[error("'{}' is out of date; rerun `fixtura generate`", .0.display())]
    Stale(PathBuf),

    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output flavor of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EmitKind {
    /// Rewrite the `[[case]]` entries of the suite manifest
    #[default]
    Manifest,
    /// Emit a Rust module with a `KNOWN_CASES` table
    Rust,
}

/// Scan the fixture root and derive one case per fixture.
///
/// ## Errors
/// - Scan failures, and [`fixtura_core::NameCollision`] when two fixtures derive the same name.
#[tracing::instrument(skip_all, fields(root = %scanner.root.display()))]
pub fn generate_registry(scanner: &FixtureScanner) -> FixturaResult<Registry> {
    let scan = scanner.scan()?;
    let registry = derive_registry(scan.iter())?;
    tracing::info!(cases = registry.len(), "registry generated");
    Ok(registry)
}

/// Render `manifest` with its cases replaced by `registry`.
pub fn render_manifest(manifest: &Manifest, registry: &Registry) -> FixturaResult<String> {
    let mut updated = manifest.clone();
    updated.set_registry(registry);
    let body = updated.to_toml_string()?;
    Ok(format!(
        "# Cases generated by fixtura v{} (`fixtura generate`). Edit [suite] and [executor] freely;\n\
         # regenerate instead of editing [[case]] entries by hand.\n\n{}",
        FIXTURA_VERSION, body
    ))
}

/// Render the registry as a standalone Rust module.
pub fn render_rust_module(fixture_root: &str, registry: &Registry) -> Result<String, GenerateError> {
    let tokens = rust_module_tokens(fixture_root, registry);
    let syntax_tree: syn::File = syn::parse2(tokens).map_err(|e| GenerateError::SynParse(e.to_string()))?;
    let formatted = prettyplease::unparse(&syntax_tree);
    let header = format!(
        "// Generated by fixtura v{} (`fixtura generate --emit rust`). DO NOT MODIFY MANUALLY.\n\n",
        FIXTURA_VERSION
    );
    Ok(format!("{}{}", header, formatted))
}

fn rust_module_tokens(fixture_root: &str, registry: &Registry) -> TokenStream {
    let entries = registry.cases().iter().map(|case| {
        let name = &case.name;
        let path = &case.path;
        quote! { (#name, #path) }
    });

    quote! {
        /// Fixture root the paths below are relative to.
        pub const FIXTURE_ROOT: &str = #fixture_root;

        /// Known cases as `(logical name, fixture path)`.
        pub const KNOWN_CASES: &[(&str, &str)] = &[#(#entries),*];
    }
}

/// Compare freshly generated `expected` content with the file at `path`.
///
/// Line endings are normalized before comparing.
pub fn check_up_to_date(path: &Path, expected: &str) -> Result<(), GenerateError> {
    let current = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(GenerateError::Stale(path.to_path_buf())),
        Err(source) => {
            return Err(GenerateError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if current.replace("\r\n", "\n") == expected.replace("\r\n", "\n") {
        Ok(())
    } else {
        Err(GenerateError::Stale(path.to_path_buf()))
    }
}

/// Check that the manifest at `path` registers exactly the cases in `expected`.
///
/// Only the `[[case]]` entries are compared, in any order, so a hand-edited manifest with the
/// right cases passes even without the generated header.
pub fn check_manifest_cases(path: &Path, expected: &Registry) -> FixturaResult<()> {
    if !path.is_file() {
        return Err(GenerateError::Stale(path.to_path_buf()).into());
    }
    let current = Manifest::load(path)?.registry();
    let on_disk: HashSet<&KnownCase> = current.cases().iter().collect();
    let wanted: HashSet<&KnownCase> = expected.cases().iter().collect();
    if current.len() == expected.len() && on_disk == wanted {
        Ok(())
    } else {
        Err(GenerateError::Stale(path.to_path_buf()).into())
    }
}

/// Write generated content, creating parent directories as needed.
pub fn write_output(path: &Path, content: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| GenerateError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
