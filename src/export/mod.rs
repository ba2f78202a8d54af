//! Report exporters.
//!
//! Exporters consume the final sorted result set. Two formats:
//!
//! - [`JsonExporter`]: full-fidelity mirror of the scan results
//! - [`DojoExporter`]: minimal DefectDojo findings import format
//!
//! An exporter failure surfaces as a scan-level error because export was
//! explicitly requested.

mod dojo;
mod json;

pub use dojo::DojoExporter;
pub use json::JsonExporter;

use crate::error::ExportError;
use crate::model::ScanResult;

/// Output format for an exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Dojo,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "dojo" | "defectdojo" => Ok(ExportFormat::Dojo),
            _ => Err(format!("Unknown export format: {}. Use 'json' or 'dojo'", s)),
        }
    }
}

/// Trait for serializing the final result set.
pub trait Exporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Writes the complete sorted result set.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if serialization or the write fails.
    fn export(&self, results: &[ScanResult]) -> Result<(), ExportError>;
}

/// Returns the exporter for a format, writing to `path`.
pub fn exporter_for(format: ExportFormat, path: impl Into<std::path::PathBuf>) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Json => Box::new(JsonExporter::new(path)),
        ExportFormat::Dojo => Box::new(DojoExporter::new(path)),
    }
}
