//! Version-range matching of dependencies against advisories.
//!
//! Ranges use the advisory feed's comparator grammar: one or more
//! comma-separated comparators such as `< 1.3.0` or `>= 6.0.0, < 8.3.1`.
//! Each comparator's version literal is parsed under the dependency's
//! ecosystem grammar, so npm and Maven ranges order correctly.

use tracing::debug;

use crate::model::{Advisory, Dependency, Diagnostic, Vulnerability};
use crate::version::{parse_version, PackageVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

struct Comparator {
    op: CompareOp,
    version: PackageVersion,
}

impl Comparator {
    fn matches(&self, candidate: &PackageVersion) -> bool {
        let Some(ord) = candidate.partial_cmp(&self.version) else {
            return false;
        };
        match self.op {
            CompareOp::Lt => ord.is_lt(),
            CompareOp::Le => ord.is_le(),
            CompareOp::Gt => ord.is_gt(),
            CompareOp::Ge => ord.is_ge(),
            CompareOp::Eq => ord.is_eq(),
        }
    }
}

/// Parses a feed range string into comparators under the dependency's
/// ecosystem grammar. Returns `None` when any comparator is malformed.
fn parse_range(dependency: &Dependency, range: &str) -> Option<Vec<Comparator>> {
    let mut comparators = Vec::new();
    for part in range.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (op, rest) = if let Some(rest) = part.strip_prefix(">=") {
            (CompareOp::Ge, rest)
        } else if let Some(rest) = part.strip_prefix("<=") {
            (CompareOp::Le, rest)
        } else if let Some(rest) = part.strip_prefix('>') {
            (CompareOp::Gt, rest)
        } else if let Some(rest) = part.strip_prefix('<') {
            (CompareOp::Lt, rest)
        } else if let Some(rest) = part.strip_prefix('=') {
            (CompareOp::Eq, rest)
        } else {
            // A bare version means an exact match.
            (CompareOp::Eq, part)
        };
        let version = parse_version(dependency.ecosystem, rest.trim()).ok()?;
        comparators.push(Comparator { op, version });
    }
    if comparators.is_empty() {
        None
    } else {
        Some(comparators)
    }
}

/// Matches one dependency against the advisories fetched for its package.
///
/// Emits one [`Vulnerability`] per advisory whose affected package equals the
/// dependency name and whose vulnerable range contains the dependency's
/// version. A dependency version that fails its ecosystem grammar skips
/// matching entirely and yields a [`Diagnostic`] instead; a malformed range
/// skips only that advisory.
pub fn match_advisories(
    dependency: &Dependency,
    advisories: &[Advisory],
) -> (Vec<Vulnerability>, Option<Diagnostic>) {
    let version = match parse_version(dependency.ecosystem, &dependency.version) {
        Ok(v) => v,
        Err(err) => {
            debug!(dependency = %dependency, "skipping unparseable version");
            return (Vec::new(), Some(Diagnostic::new(dependency.to_string(), err.to_string())));
        }
    };

    let vulnerabilities = advisories
        .iter()
        .filter(|advisory| advisory.package == dependency.name && !advisory.cve.is_empty())
        .filter(|advisory| {
            parse_range(dependency, &advisory.vulnerable_version_range)
                .is_some_and(|comparators| comparators.iter().all(|c| c.matches(&version)))
        })
        .map(|advisory| Vulnerability {
            dependency: dependency.clone(),
            cve: advisory.cve.clone(),
            severity: advisory.severity,
            summary: advisory.summary.clone(),
            description: Some(advisory.description.clone()),
            first_patched_version: advisory.first_patched_version.clone(),
        })
        .collect();

    (vulnerabilities, None)
}
