use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::error::ExportError;
use crate::model::{ScanResult, Severity};

use super::Exporter;

/// Minimal DefectDojo findings export.
///
/// Each vulnerability maps to one finding: title from the advisory summary,
/// severity on DefectDojo's four-level scale with "Info" for unmapped
/// values, and a description carrying the affected file, package@version,
/// and upgrade guidance.
pub struct DojoExporter {
    path: PathBuf,
}

#[derive(Serialize)]
struct DojoReport {
    findings: Vec<DojoFinding>,
}

#[derive(Serialize)]
struct DojoFinding {
    title: String,
    severity: &'static str,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cve: Option<String>,
}

impl DojoExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn map_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "Critical",
        Severity::High => "High",
        Severity::Medium => "Medium",
        Severity::Low => "Low",
        Severity::Unknown => "Info",
    }
}

impl Exporter for DojoExporter {
    fn name(&self) -> &'static str {
        "dojo"
    }

    fn export(&self, results: &[ScanResult]) -> Result<(), ExportError> {
        let findings = results
            .iter()
            .flat_map(|result| {
                result.vulnerabilities.iter().map(|vuln| {
                    let mut description = format!(
                        "{}\n\nAffected File: {}\nPackage: {}\n",
                        vuln.description.as_deref().unwrap_or(&vuln.summary),
                        result.source_file.display(),
                        vuln.dependency,
                    );
                    if let Some(patched) = &vuln.first_patched_version {
                        description
                            .push_str(&format!("Remediation: Update to version {patched} or later\n"));
                    }

                    DojoFinding {
                        title: vuln.summary.clone(),
                        severity: map_severity(vuln.severity),
                        description,
                        cve: (!vuln.cve.is_empty()).then(|| vuln.cve.clone()),
                    }
                })
            })
            .collect();

        let report = DojoReport { findings };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&self.path, json).map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), "results exported in DefectDojo format");
        Ok(())
    }
}
