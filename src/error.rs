//! Error taxonomy for the scan pipeline.
//!
//! Failures are contained at the smallest unit of work: a [`ParseError`]
//! belongs to one file, an [`AdvisoryError`] to one dependency lookup. Only
//! an invalid scan root or an exporter failure propagate out of
//! [`Engine::scan`](crate::engine::Engine::scan) as a [`ScanError`].

use std::path::PathBuf;
use thiserror::Error;

/// Fatal, scan-level failures.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root {0} does not exist or is not a directory")]
    InvalidRoot(PathBuf),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// A malformed manifest or lockfile. Scoped to one file; the scan continues.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("{0}")]
    Invalid(String),
}

/// A failed advisory lookup for one (ecosystem, package) key.
///
/// `RateLimited` and `Network` are retried with backoff; the other variants
/// are terminal. Clone so a cached lookup failure can be shared by every
/// waiter on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisoryError {
    #[error("no advisory data found")]
    NotFound,

    #[error("advisory API rate limit exceeded")]
    RateLimited,

    #[error("advisory API requires authentication")]
    AuthRequired,

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed advisory response: {0}")]
    Malformed(String),
}

/// Exporter failure. Export is explicitly requested, so this surfaces as a
/// scan-level error instead of a diagnostic.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
