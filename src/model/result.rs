use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Dependency, Ecosystem, Severity};

/// An advisory matched against a declared dependency.
///
/// Produced only by the matcher; `dependency` is always a member of the
/// owning [`ScanResult`]'s dependency list and `cve` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub dependency: Dependency,
    pub cve: String,
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_patched_version: Option<String>,
}

/// A recoverable problem recorded during a scan.
///
/// Diagnostics never fail the scan; they surface in the result so partial
/// failures stay visible in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What the problem applies to: a file path, a dependency, or a walk entry.
    pub scope: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            message: message.into(),
        }
    }
}

/// Scan outcome for a single detected manifest.
///
/// Built by exactly one pipeline worker, then immutable once handed to
/// aggregation. The engine sorts results by `source_file` before returning
/// them, so callers see the same ordering in both execution modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub source_file: PathBuf,
    pub ecosystem: Ecosystem,
    pub dependencies: Vec<Dependency>,
    pub vulnerabilities: Vec<Vulnerability>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanResult {
    pub fn new(
        source_file: impl Into<PathBuf>,
        ecosystem: Ecosystem,
        dependencies: Vec<Dependency>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            ecosystem,
            dependencies,
            vulnerabilities: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_result_starts_clean() {
        let dep = Dependency::new("lodash", "4.17.20", Ecosystem::Npm);
        let result = ScanResult::new("a/package-lock.json", Ecosystem::Npm, vec![dep]);
        assert!(result.vulnerabilities.is_empty());
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.dependencies.len(), 1);
    }
}
