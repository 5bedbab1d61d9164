//! Logical test names derived from fixture paths.
//!
//! The generated name is `test` followed by each path segment (directories, then the file stem) with
//! its first letter upper-cased, segments joined by `_`. Characters that cannot appear in an
//! identifier become `_`.
//!
//! | fixture path         | logical name        |
//! |----------------------|---------------------|
//! | `coroutines.kt`      | `testCoroutines`    |
//! | `jvmName.kts`        | `testJvmName`       |
//! | `sub/jvm-name.kt`    | `testSub_Jvm_name`  |
//!
//! The extension is not part of the name, so `a.kt` and `a.kts` collide. The generator refuses to
//! produce a registry in that case instead of picking one.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::fixture::Fixture;
use crate::registry::{KnownCase, Registry};

/// Prefix shared by every generated logical name.
pub const TEST_NAME_PREFIX: &str = "test";

/// Derive the logical test name for a fixture path.
///
/// ## Examples
/// ```rust
/// use fixtura_core::logical_name_for;
///
/// assert_eq!(logical_name_for("coroutines.kt"), "testCoroutines");
/// assert_eq!(logical_name_for("sub/jvm-name.kt"), "testSub_Jvm_name");
/// ```
pub fn logical_name_for(relative_path: &str) -> String {
    let fixture = Fixture::new(relative_path);
    let mut segments: Vec<String> = fixture
        .directory()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(identifier_segment)
        .collect();
    segments.push(identifier_segment(fixture.stem()));

    let mut name = String::from(TEST_NAME_PREFIX);
    name.push_str(&segments.join("_"));
    name
}

fn identifier_segment(raw: &str) -> String {
    let escaped: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let mut chars = escaped.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::from("_"),
    }
}

/// Two or more fixtures derived the same logical name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct NameCollision {
    /// Each colliding name with every fixture path that derived it, sorted.
    pub collisions: Vec<(String, Vec<String>)>,
}

impl fmt::Display for NameCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fixtures derive the same logical test name")?;
        for (name, paths) in &self.collisions {
            writeln!(f, "  `{}` <- {}", name, paths.join(", "))?;
        }
        Ok(())
    }
}

/// Build a registry with one derived case per fixture path, sorted by path.
///
/// ## Errors
/// - [`NameCollision`] when two paths derive the same name (e.g. `a.kt` and `a.kts`).
pub fn derive_registry<'a, I>(paths: I) -> Result<Registry, NameCollision>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut sorted: Vec<Fixture> = paths.into_iter().map(Fixture::new).collect();
    sorted.sort();
    sorted.dedup();

    let mut cases = Vec::with_capacity(sorted.len());
    for fixture in &sorted {
        let name = logical_name_for(fixture.relative_path());
        by_name
            .entry(name.clone())
            .or_default()
            .push(fixture.relative_path().to_string());
        cases.push(KnownCase::new(name, fixture.relative_path()));
    }

    let collisions: Vec<(String, Vec<String>)> = by_name.into_iter().filter(|(_, paths)| paths.len() > 1).collect();
    if collisions.is_empty() {
        Ok(Registry::new(cases))
    } else {
        Err(NameCollision { collisions })
    }
}
