use serde::{Deserialize, Serialize};

/// Severity levels as reported by the advisory feed.
///
/// Ordered so that `Critical` ranks highest; `Unknown` covers values the
/// feed reports that do not map onto the four standard levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unknown => "unknown",
        }
    }

    /// Parses a feed severity string, falling back to `Unknown`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A published vulnerability advisory for one affected package.
///
/// The feed nests several affected packages under one advisory record; the
/// client flattens those into one `Advisory` per affected package, which is
/// the shape the matcher consumes. Cached per (ecosystem, package) for the
/// lifetime of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub cve: String,
    pub severity: Severity,
    pub summary: String,
    pub description: String,
    /// Name of the affected package this record applies to.
    pub package: String,
    /// Vulnerable range as published, e.g. `">= 6.0.0, < 8.3.1"`.
    pub vulnerable_version_range: String,
    /// First version that fixes the vulnerability, when one exists.
    pub first_patched_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub references: Vec<String>,
}
