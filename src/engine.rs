//! Scan orchestration.
//!
//! The engine ties discovery, parsing, advisory lookup, and matching into a
//! per-file pipeline, runs the pipelines concurrently over a bounded worker
//! pool (or sequentially when configured), and aggregates results into a
//! deterministic, path-sorted report. Failures are contained at the smallest
//! unit of work: one file or one dependency lookup. Only an invalid root or
//! a failed export abort the scan.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::advisory::{AdvisoryCache, AdvisorySource, GhsaClient};
use crate::config::Config;
use crate::detector::{discover, DetectorEvent, ManifestFile};
use crate::error::ScanError;
use crate::export::Exporter;
use crate::matcher::match_advisories;
use crate::model::{Diagnostic, ScanResult};
use crate::parser::parser_for;

pub struct Engine {
    config: Config,
    source: Arc<dyn AdvisorySource>,
    cache: AdvisoryCache,
    exporter: Option<Box<dyn Exporter>>,
}

impl Engine {
    /// Creates an engine backed by the GitHub advisory feed, authenticated
    /// with the config's token when present.
    pub fn new(config: Config) -> Self {
        let client = GhsaClient::new(config.token.clone());
        if !client.has_token() {
            warn!("no advisory API token configured, feed rate limits will be lower");
        }
        Self::with_source(config, Arc::new(client))
    }

    /// Creates an engine over an arbitrary advisory source. Tests use this
    /// to substitute fixtures for the network.
    pub fn with_source(config: Config, source: Arc<dyn AdvisorySource>) -> Self {
        Self {
            config,
            source,
            cache: AdvisoryCache::new(),
            exporter: None,
        }
    }

    /// Attaches an exporter, invoked with the complete sorted result set
    /// after aggregation.
    pub fn with_exporter(mut self, exporter: Box<dyn Exporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Scans `root` and returns one result per detected manifest, sorted by
    /// source file path.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidRoot`] when `root` is not a directory,
    /// and [`ScanError::Export`] when a configured exporter fails. Per-file
    /// and per-dependency problems become diagnostics on the affected
    /// result, never errors.
    pub async fn scan(&self, root: &Path) -> Result<Vec<ScanResult>, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::InvalidRoot(root.to_path_buf()));
        }

        info!(
            root = %root.display(),
            mode = if self.config.sequential { "sequential" } else { "concurrent" },
            "starting scan"
        );

        let mut results = if self.config.sequential {
            self.scan_sequential(root).await
        } else {
            self.scan_concurrent(root).await
        };

        // Concurrent completion order is nondeterministic; the sort makes
        // both modes observationally identical.
        results.sort_by(|a, b| a.source_file.cmp(&b.source_file));

        info!(files = results.len(), "scan complete");

        if let Some(exporter) = &self.exporter {
            exporter.export(&results)?;
        }

        Ok(results)
    }

    /// Dispatches each file's pipeline over a bounded worker pool.
    async fn scan_concurrent(&self, root: &Path) -> Vec<ScanResult> {
        stream::iter(discover(root, &self.config.ecosystems, &self.config.exclude))
            .filter_map(|event| async move { keep_file(event) })
            .map(|file| self.process_file(file))
            .buffer_unordered(self.config.workers.max(1))
            .collect()
            .await
    }

    /// Runs one file's full pipeline to completion before the next.
    async fn scan_sequential(&self, root: &Path) -> Vec<ScanResult> {
        let mut results = Vec::new();
        for event in discover(root, &self.config.ecosystems, &self.config.exclude) {
            if let Some(file) = keep_file(event) {
                results.push(self.process_file(file).await);
            }
        }
        results
    }

    /// The per-file pipeline: read, parse, then per-dependency advisory
    /// lookup and matching. Every failure inside becomes a diagnostic on
    /// this file's result.
    async fn process_file(&self, file: ManifestFile) -> ScanResult {
        let mut result = ScanResult::new(file.path.clone(), file.ecosystem, Vec::new());

        let content = match tokio::fs::read_to_string(&file.path).await {
            Ok(content) => content,
            Err(err) => {
                warn!(file = %file.path.display(), %err, "failed to read file");
                result
                    .diagnostics
                    .push(Diagnostic::new(file.path.display().to_string(), err.to_string()));
                return result;
            }
        };

        match parser_for(file.ecosystem).parse(&content, file.role) {
            Ok(dependencies) => result.dependencies = dependencies,
            Err(err) => {
                warn!(file = %file.path.display(), %err, "failed to parse file");
                result
                    .diagnostics
                    .push(Diagnostic::new(file.path.display().to_string(), err.to_string()));
                return result;
            }
        }

        for dependency in &result.dependencies {
            match self
                .cache
                .lookup(self.source.as_ref(), dependency.ecosystem, &dependency.name)
                .await
            {
                Ok(advisories) => {
                    let (vulnerabilities, diagnostic) = match_advisories(dependency, &advisories);
                    result.vulnerabilities.extend(vulnerabilities);
                    result.diagnostics.extend(diagnostic);
                }
                Err(err) => {
                    // Degrades to "no known vulnerabilities determined".
                    warn!(dependency = %dependency, %err, "advisory lookup failed");
                    result
                        .diagnostics
                        .push(Diagnostic::new(dependency.to_string(), err.to_string()));
                }
            }
        }

        result
    }
}

/// Unwraps detected files; walk problems are logged and surface nowhere
/// else, since they have no owning result.
fn keep_file(event: DetectorEvent) -> Option<ManifestFile> {
    match event {
        DetectorEvent::File(file) => Some(file),
        DetectorEvent::Walk(diag) => {
            warn!(scope = %diag.scope, message = %diag.message, "walk diagnostic");
            None
        }
    }
}
