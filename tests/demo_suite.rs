//! The checked-in suite under `tests/fixture_suite`, driven the way a downstream crate would.
//!
//! Two tests cover the whole directory: the completeness guard, and one data-driven test that
//! dispatches every registered case. Adding a fixture without rerunning `fixtura generate` fails the
//! first; a wrong golden file fails the second.

use std::fs;
use std::path::{Path, PathBuf};

use fixtura::executor::line_diff;
use fixtura::generate::{generate_registry, render_manifest};
use fixtura::manifest::{self, ExecutorSection, Manifest};
use fixtura::testing::{assert_all_cases_pass, assert_all_fixtures_present};
use fixtura::{Failure, Outcome, Suite};

fn manifest_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixture_suite/fixtura.toml")
}

fn load() -> (Manifest, PathBuf) {
    let path = manifest_path();
    let manifest = Manifest::load(&path).unwrap();
    (manifest, manifest::base_dir(&path))
}

fn suite() -> Suite {
    let (manifest, base_dir) = load();
    Suite::from_manifest(&manifest, &base_dir)
}

/// Names of the functions a Kotlin source declares, in order.
fn declared_functions(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let rest = line
                .strip_prefix("fun ")
                .or_else(|| line.split_once(" fun ").map(|(_, rest)| rest))?;
            let name = rest.split('(').next()?.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Compare declared functions against the sibling `.txt` golden file.
fn execute(fixture: &Path) -> Outcome {
    let source = match fs::read_to_string(fixture) {
        Ok(source) => source,
        Err(e) => return Outcome::failed(format!("cannot read fixture: {}", e)),
    };
    let expected = match fs::read_to_string(fixture.with_extension("txt")) {
        Ok(expected) => expected,
        Err(e) => return Outcome::failed(format!("cannot read golden file: {}", e)),
    };
    let mut actual = declared_functions(&source).join("\n");
    actual.push('\n');

    match line_diff(&expected, &actual) {
        None => Outcome::Passed,
        Some(diff) => Outcome::Failed(Failure::new("declared functions differ from golden file").with_diff(diff)),
    }
}

#[test]
fn test_all_files_present() {
    assert_all_fixtures_present(&suite());
}

#[test]
fn test_all_cases_pass() {
    assert_all_cases_pass(&suite(), &execute);
}

#[test]
fn test_checked_in_registry_is_up_to_date() {
    let (manifest, base_dir) = load();
    let generated = generate_registry(&manifest.scanner(&base_dir)).unwrap();
    assert_eq!(manifest.registry(), generated, "rerun `fixtura generate -m tests/fixture_suite/fixtura.toml`");

    let rendered = render_manifest(&manifest, &generated).unwrap();
    assert_eq!(Manifest::parse(&rendered, &manifest_path()).unwrap(), manifest);
}

#[test]
fn test_single_case_by_name() {
    let outcome = suite().run("testSub_ExtensionFunctions", &execute).unwrap();
    assert_eq!(outcome, Outcome::Passed);
}

#[test]
fn test_excluded_fixture_is_not_a_case() {
    let suite = suite();
    assert!(suite.root().join("excluded.kt").is_file());
    assert!(suite.registry.paths().all(|path| path != "excluded.kt"));
}

#[test]
fn test_declared_functions() {
    assert_eq!(
        declared_functions("suspend fun fetch(): Int = 1\nfun String.twice() = this\nval fun_ = 1\n"),
        vec!["fetch", "String.twice"]
    );
}

#[cfg(unix)]
#[test]
fn test_command_executor_through_relative_manifest_path() {
    // Integration tests run from the package root, so this is the documented `-m` path
    let path = Path::new("tests/fixture_suite/fixtura.toml");
    let mut manifest = Manifest::load(path).unwrap();
    manifest.executor = Some(ExecutorSection {
        command: vec!["cat".to_string()],
        expected_extension: None,
    });
    let base_dir = manifest::base_dir(path);
    let executor = manifest.executor(&base_dir).unwrap();
    let suite = Suite::from_manifest(&manifest, &base_dir);

    assert_all_fixtures_present(&suite);
    assert_eq!(suite.run("testImportAliases", &executor).unwrap(), Outcome::Passed);
    assert_all_cases_pass(&suite, &executor);
}
