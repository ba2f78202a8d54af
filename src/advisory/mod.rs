//! Advisory retrieval.
//!
//! [`AdvisorySource`] is the capability seam: the production implementation
//! is [`GhsaClient`] against the GitHub Security Advisory feed, and tests
//! substitute fixture sources. [`AdvisoryCache`] wraps any source with
//! per-scan memoization and single-flight fetches.

mod cache;
mod github;

pub use cache::AdvisoryCache;
pub use github::GhsaClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AdvisoryError;
use crate::model::{Advisory, Ecosystem};

/// Outcome of one advisory lookup, shaped for cheap sharing across waiters.
pub type AdvisoryLookup = Result<Arc<Vec<Advisory>>, AdvisoryError>;

/// Trait for querying a vulnerability-advisory feed per package.
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    /// Returns the human-readable name of this source.
    fn name(&self) -> &'static str;

    /// Fetches all advisories affecting `package` within `ecosystem`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdvisoryError`] scoped to this one lookup; the caller
    /// degrades it to a diagnostic rather than failing the scan.
    async fn fetch(
        &self,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Result<Vec<Advisory>, AdvisoryError>;
}
