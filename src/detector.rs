//! Manifest discovery.
//!
//! Walks a root directory and lazily yields candidate manifest files tagged
//! with their ecosystem and role, so parsing and matching can start before
//! the walk finishes. Exclusion entries match path components exactly; a
//! matching directory is pruned with its whole subtree. Symlinks are never
//! followed, which also rules out traversal cycles.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::model::{Diagnostic, Ecosystem};
use crate::parser::FileRole;

/// A detected manifest or lockfile, ready for its pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub path: PathBuf,
    pub ecosystem: Ecosystem,
    pub role: FileRole,
}

/// One step of the walk: either a detected file or a recoverable problem.
#[derive(Debug)]
pub enum DetectorEvent {
    File(ManifestFile),
    Walk(Diagnostic),
}

/// File-name pattern table. A name maps to at most one ecosystem, so a
/// single file never matches twice.
fn classify(name: &str) -> Option<(Ecosystem, FileRole)> {
    match name {
        "go.mod" => Some((Ecosystem::Go, FileRole::Manifest)),
        "go.sum" => Some((Ecosystem::Go, FileRole::Lockfile)),
        "pom.xml" => Some((Ecosystem::Maven, FileRole::Manifest)),
        "requirements.txt" | "requirements-dev.txt" => Some((Ecosystem::Pip, FileRole::Manifest)),
        "package.json" => Some((Ecosystem::Npm, FileRole::Manifest)),
        "package-lock.json" => Some((Ecosystem::Npm, FileRole::Lockfile)),
        "composer.json" => Some((Ecosystem::Composer, FileRole::Manifest)),
        "composer.lock" => Some((Ecosystem::Composer, FileRole::Lockfile)),
        _ => None,
    }
}

/// Companion lockfile name for a manifest, when the ecosystem has one.
fn companion_lockfile(name: &str) -> Option<&'static str> {
    match name {
        "go.mod" => Some("go.sum"),
        "package.json" => Some("package-lock.json"),
        "composer.json" => Some("composer.lock"),
        _ => None,
    }
}

/// Walks `root` and lazily yields [`DetectorEvent`]s.
///
/// The walk order is deterministic (entries sorted by file name). A manifest
/// whose companion lockfile sits in the same directory is suppressed in
/// favor of the lockfile, so each directory contributes one pinned source of
/// versions per ecosystem.
pub fn discover<'a>(
    root: &Path,
    ecosystems: &'a [Ecosystem],
    exclude: &'a [String],
) -> impl Iterator<Item = DetectorEvent> + 'a {
    let selected: HashSet<Ecosystem> = ecosystems.iter().copied().collect();

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !is_excluded(entry, exclude))
        .filter_map(move |entry| match entry {
            Ok(entry) => detect(&entry, &selected).map(DetectorEvent::File),
            Err(err) => {
                let scope = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<walk>".to_string());
                Some(DetectorEvent::Walk(Diagnostic::new(scope, err.to_string())))
            }
        })
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    let name = entry.file_name().to_string_lossy();
    exclude.iter().any(|e| e.as_str() == name)
}

fn detect(entry: &DirEntry, selected: &HashSet<Ecosystem>) -> Option<ManifestFile> {
    if !entry.file_type().is_file() {
        return None;
    }
    let name = entry.file_name().to_str()?;
    let (ecosystem, role) = classify(name)?;
    if !selected.contains(&ecosystem) {
        return None;
    }

    // Lockfile precedence: drop the manifest when its lockfile is present.
    if role == FileRole::Manifest {
        if let Some(lock_name) = companion_lockfile(name) {
            let lock_path = entry.path().with_file_name(lock_name);
            if lock_path.is_file() {
                return None;
            }
        }
    }

    Some(ManifestFile {
        path: entry.path().to_path_buf(),
        ecosystem,
        role,
    })
}
