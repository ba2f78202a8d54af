use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ParseError;
use crate::model::{Dependency, Ecosystem};

use super::{dedup_dependencies, EcosystemParser, FileRole};

/// Parser for npm `package.json` manifests and `package-lock.json` lockfiles.
///
/// Manifest versions are ranges; the leading range operator (`^`, `~`, `>=`,
/// ...) is stripped to the base version. Lockfile versions are exact, which
/// is why the detector prefers the lockfile when both exist.
pub struct NpmParser;

#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: HashMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: HashMap<String, String>,
}

#[derive(Deserialize)]
struct PackageLock {
    // Lockfile v2/v3 keyed by install path; v1 keyed by package name.
    #[serde(default)]
    packages: HashMap<String, LockEntry>,
    #[serde(default)]
    dependencies: HashMap<String, LockEntry>,
}

#[derive(Deserialize)]
struct LockEntry {
    version: Option<String>,
}

impl EcosystemParser for NpmParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn parse(&self, content: &str, role: FileRole) -> Result<Vec<Dependency>, ParseError> {
        match role {
            FileRole::Manifest => parse_package_json(content),
            FileRole::Lockfile => parse_package_lock(content),
        }
    }
}

fn parse_package_json(content: &str) -> Result<Vec<Dependency>, ParseError> {
    let manifest: PackageJson = serde_json::from_str(content)?;

    let mut deps = Vec::new();
    for (name, range) in sorted(manifest.dependencies).chain(sorted(manifest.dev_dependencies)) {
        if let Some(version) = base_version(&range) {
            deps.push((Dependency::new(name, version, Ecosystem::Npm), false));
        }
    }

    Ok(dedup_dependencies(deps))
}

fn parse_package_lock(content: &str) -> Result<Vec<Dependency>, ParseError> {
    let lock: PackageLock = serde_json::from_str(content)?;

    let mut deps = Vec::new();
    if !lock.packages.is_empty() {
        for (path, entry) in sorted(lock.packages) {
            // The "" key is the root project itself; nested installs keep
            // only the final path segment after the last node_modules/.
            let Some((_, name)) = path.rsplit_once("node_modules/") else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            if let Some(version) = entry.version {
                deps.push((Dependency::new(name, version, Ecosystem::Npm), true));
            }
        }
    } else {
        for (name, entry) in sorted(lock.dependencies) {
            if let Some(version) = entry.version {
                deps.push((Dependency::new(name, version, Ecosystem::Npm), true));
            }
        }
    }

    Ok(dedup_dependencies(deps))
}

/// HashMap iteration order is arbitrary; sort so parsing is deterministic.
fn sorted<V>(map: HashMap<String, V>) -> impl Iterator<Item = (String, V)> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries.into_iter()
}

/// Strips the range operator from an npm version range, keeping the base
/// version. Non-version ranges (tags, URLs, workspace refs) are skipped.
fn base_version(range: &str) -> Option<String> {
    let stripped = range
        .trim()
        .trim_start_matches(['^', '~', '>', '<', '='])
        .trim()
        .trim_start_matches('v');
    if stripped.is_empty() || !stripped.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    // "1.2.3 - 2.0.0" hyphen ranges: take the lower bound.
    Some(
        stripped
            .split_whitespace()
            .next()
            .unwrap_or(stripped)
            .to_string(),
    )
}
