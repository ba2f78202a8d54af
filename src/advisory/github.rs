use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AdvisoryError;
use crate::model::{Advisory, Ecosystem, Severity};

use super::AdvisorySource;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Retries after the initial attempt, for RateLimited and Network errors.
const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Client for the GitHub Security Advisory REST feed.
///
/// Unauthenticated requests run at a lower rate limit; a bearer token raises
/// it. Pagination is followed until the advisory set for a package is
/// exhausted.
pub struct GhsaClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Feed item: one advisory record with nested per-package entries.
#[derive(Deserialize)]
struct GhAdvisoryResponse {
    severity: Option<String>,
    cve_id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(default)]
    vulnerabilities: Vec<GhVulnerability>,
    #[serde(default)]
    references: Vec<String>,
}

#[derive(Deserialize)]
struct GhVulnerability {
    package: Option<GhPackage>,
    vulnerable_version_range: Option<String>,
    first_patched_version: Option<String>,
}

#[derive(Deserialize)]
struct GhPackage {
    name: Option<String>,
}

impl GhsaClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_API_BASE, token)
    }

    /// Points the client at a different API base. Used by tests to target a
    /// mock server.
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("depscout")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// One paginated pass over the feed for a package, no retries.
    async fn fetch_all_pages(
        &self,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Result<Vec<Advisory>, AdvisoryError> {
        let mut advisories = Vec::new();
        let mut url = Some(format!(
            "{}/advisories?ecosystem={}&affects={}&per_page={}",
            self.base_url,
            ecosystem.as_str(),
            package,
            PER_PAGE
        ));

        while let Some(page_url) = url {
            let mut request = self
                .client
                .get(&page_url)
                .header(ACCEPT, "application/vnd.github+json");
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }

            let response = request
                .send()
                .await
                .map_err(|e| AdvisoryError::Network(e.to_string()))?;

            match response.status() {
                s if s.is_success() => {}
                StatusCode::NOT_FOUND => return Err(AdvisoryError::NotFound),
                StatusCode::UNAUTHORIZED => return Err(AdvisoryError::AuthRequired),
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                    return Err(AdvisoryError::RateLimited)
                }
                s => return Err(AdvisoryError::Network(format!("HTTP {s}"))),
            }

            url = next_page(response.headers().get(LINK));

            let page: Vec<GhAdvisoryResponse> = response
                .json()
                .await
                .map_err(|e| AdvisoryError::Malformed(e.to_string()))?;

            advisories.extend(page.into_iter().flat_map(flatten_response));
        }

        Ok(advisories)
    }
}

#[async_trait]
impl AdvisorySource for GhsaClient {
    fn name(&self) -> &'static str {
        "GitHub Security Advisories"
    }

    async fn fetch(
        &self,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Result<Vec<Advisory>, AdvisoryError> {
        let mut attempt = 0;
        loop {
            match self.fetch_all_pages(ecosystem, package).await {
                Ok(advisories) => {
                    debug!(%ecosystem, package, count = advisories.len(), "fetched advisories");
                    return Ok(advisories);
                }
                Err(err @ (AdvisoryError::RateLimited | AdvisoryError::Network(_)))
                    if attempt < MAX_RETRIES =>
                {
                    let delay = BACKOFF_BASE * 2u32.pow(attempt);
                    warn!(%ecosystem, package, %err, ?delay, "advisory fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Flattens one feed item into one [`Advisory`] per affected package entry.
fn flatten_response(item: GhAdvisoryResponse) -> Vec<Advisory> {
    let severity = Severity::parse_lenient(item.severity.as_deref().unwrap_or(""));
    let cve = item.cve_id.unwrap_or_default();
    let summary = item.summary.unwrap_or_default();
    let description = item.description.unwrap_or_default();

    item.vulnerabilities
        .into_iter()
        .filter_map(|vuln| {
            let package = vuln.package.and_then(|p| p.name)?;
            let range = vuln.vulnerable_version_range?;
            Some(Advisory {
                cve: cve.clone(),
                severity,
                summary: summary.clone(),
                description: description.clone(),
                package,
                vulnerable_version_range: range,
                first_patched_version: vuln.first_patched_version,
                url: item.url.clone(),
                references: item.references.clone(),
            })
        })
        .collect()
}

/// Extracts the rel="next" target from an RFC 5988 Link header.
fn next_page(link: Option<&HeaderValue>) -> Option<String> {
    let link = link?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if params.contains("rel=\"next\"") {
            Some(target.trim().trim_matches(['<', '>']).to_string())
        } else {
            None
        }
    })
}
