use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::error::ExportError;
use crate::model::ScanResult;

use super::Exporter;

/// Full-fidelity JSON export of the scan results.
pub struct JsonExporter {
    path: PathBuf,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    results: &'a [ScanResult],
}

impl JsonExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Exporter for JsonExporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn export(&self, results: &[ScanResult]) -> Result<(), ExportError> {
        let report = JsonReport {
            generated_at: Utc::now(),
            results,
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&self.path, json).map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), "results exported");
        Ok(())
    }
}
