//! Per-scan advisory cache with single-flight fetches.
//!
//! Repeated occurrences of the same package across manifests trigger at most
//! one network fetch. Concurrent lookups for one (ecosystem, package) key
//! share a per-key `OnceCell`: a single winner performs the fetch and every
//! waiter observes the same resolved value or error. Entries live for the
//! duration of one scan.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::model::Ecosystem;

use super::{AdvisoryLookup, AdvisorySource};

type CacheKey = (Ecosystem, String);

#[derive(Default)]
pub struct AdvisoryCache {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<AdvisoryLookup>>>>,
}

impl AdvisoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up advisories for a package, fetching through `source` on a
    /// cache miss. The map lock guards only cell lookup/insertion, never the
    /// network fetch itself.
    pub async fn lookup(
        &self,
        source: &dyn AdvisorySource,
        ecosystem: Ecosystem,
        package: &str,
    ) -> AdvisoryLookup {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry((ecosystem, package.to_string()))
                .or_default()
                .clone()
        };

        cell.get_or_init(|| async {
            debug!(%ecosystem, package, source = source.name(), "advisory cache miss");
            source.fetch(ecosystem, package).await.map(Arc::new)
        })
        .await
        .clone()
    }
}
