use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ParseError;
use crate::model::{Dependency, Ecosystem};

use super::{dedup_dependencies, EcosystemParser, FileRole};

/// Parser for PHP `composer.json` manifests and `composer.lock` lockfiles.
///
/// Platform requirements (`php`, `ext-*`, `lib-*`) are not packages and are
/// skipped. Lockfile versions are exact and take precedence via the detector.
pub struct ComposerParser;

#[derive(Deserialize)]
struct ComposerJson {
    #[serde(default)]
    require: HashMap<String, String>,
    #[serde(default, rename = "require-dev")]
    require_dev: HashMap<String, String>,
}

#[derive(Deserialize)]
struct ComposerLock {
    #[serde(default)]
    packages: Vec<LockedPackage>,
    #[serde(default, rename = "packages-dev")]
    packages_dev: Vec<LockedPackage>,
}

#[derive(Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
}

impl EcosystemParser for ComposerParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
    }

    fn parse(&self, content: &str, role: FileRole) -> Result<Vec<Dependency>, ParseError> {
        match role {
            FileRole::Manifest => parse_composer_json(content),
            FileRole::Lockfile => parse_composer_lock(content),
        }
    }
}

fn parse_composer_json(content: &str) -> Result<Vec<Dependency>, ParseError> {
    let manifest: ComposerJson = serde_json::from_str(content)?;

    let mut deps = Vec::new();
    for (name, range) in sorted(manifest.require).chain(sorted(manifest.require_dev)) {
        if is_platform_package(&name) {
            continue;
        }
        if let Some(version) = base_version(&range) {
            deps.push((Dependency::new(name, version, Ecosystem::Composer), false));
        }
    }

    Ok(dedup_dependencies(deps))
}

fn parse_composer_lock(content: &str) -> Result<Vec<Dependency>, ParseError> {
    let lock: ComposerLock = serde_json::from_str(content)?;

    let deps = lock
        .packages
        .into_iter()
        .chain(lock.packages_dev)
        .map(|pkg| {
            let version = pkg.version.trim_start_matches('v').to_string();
            (Dependency::new(pkg.name, version, Ecosystem::Composer), true)
        })
        .collect();

    Ok(dedup_dependencies(deps))
}

fn is_platform_package(name: &str) -> bool {
    name == "php" || name.starts_with("ext-") || name.starts_with("lib-")
}

fn sorted(map: HashMap<String, String>) -> impl Iterator<Item = (String, String)> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries.into_iter()
}

/// Strips composer range operators down to the base version. Wildcards and
/// branch aliases (`dev-main`, `*`) are skipped.
fn base_version(range: &str) -> Option<String> {
    // "^1.0 || ^2.0" — take the first alternative's base.
    let first = range.split("||").next()?.trim();
    let stripped = first
        .trim_start_matches(['^', '~', '>', '<', '='])
        .trim()
        .trim_start_matches('v');
    if stripped.is_empty() || !stripped.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if stripped.contains('*') {
        return None;
    }
    Some(
        stripped
            .split_whitespace()
            .next()
            .unwrap_or(stripped)
            .to_string(),
    )
}
