//! Ecosystem-aware version parsing and ordering.
//!
//! Go, npm, pip, and composer versions are handled as lenient semver: a
//! leading `v` is trimmed and missing minor/patch components are padded with
//! zeros. Go pseudo-versions (`v0.0.0-20210101000000-abcdef`) parse as
//! semver pre-releases and order correctly. Maven uses its own ordering with
//! ranked qualifiers, so it gets a dedicated representation.

use std::cmp::Ordering;

use crate::model::Ecosystem;

/// A dependency version parsed under its ecosystem's grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageVersion {
    Semver(semver::Version),
    Maven(MavenVersion),
}

/// The version string did not parse under the ecosystem's grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse {version:?} as a {ecosystem} version")]
pub struct VersionError {
    pub version: String,
    pub ecosystem: Ecosystem,
}

/// Parses a version string under the given ecosystem's rules.
pub fn parse_version(ecosystem: Ecosystem, version: &str) -> Result<PackageVersion, VersionError> {
    match ecosystem {
        Ecosystem::Maven => Ok(PackageVersion::Maven(MavenVersion::parse(version))),
        _ => parse_semver_lenient(version)
            .map(PackageVersion::Semver)
            .ok_or_else(|| VersionError {
                version: version.to_string(),
                ecosystem,
            }),
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (PackageVersion::Semver(a), PackageVersion::Semver(b)) => Some(a.cmp(b)),
            (PackageVersion::Maven(a), PackageVersion::Maven(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Lenient semver: trims a leading `v` and pads missing minor/patch
/// components, so `1.2`, `v1.2.3`, and Go pseudo-versions all parse.
fn parse_semver_lenient(version: &str) -> Option<semver::Version> {
    let trimmed = version.trim().trim_start_matches('v');
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(v) = semver::Version::parse(trimmed) {
        return Some(v);
    }

    // Pad "1" or "1.2" to three components, preserving any -pre/+build tail.
    let (core, tail) = match trimmed.find(['-', '+']) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    let dots = core.chars().filter(|c| *c == '.').count();
    let padded = match dots {
        0 => format!("{core}.0.0{tail}"),
        1 => format!("{core}.0{tail}"),
        _ => return None,
    };
    semver::Version::parse(&padded).ok()
}

/// A Maven version split into comparable tokens.
///
/// Tokens are separated by `.` or `-`; numeric tokens compare by value and
/// qualifier tokens by rank (alpha < beta < milestone < rc < snapshot <
/// release < sp, with unknown qualifiers after sp in lexical order).
/// Trailing null tokens are dropped, so `1.0` equals `1.0.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenVersion {
    tokens: Vec<MavenToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MavenToken {
    Number(u64),
    Qualifier(String),
}

impl MavenVersion {
    pub fn parse(version: &str) -> Self {
        let mut tokens: Vec<MavenToken> = version
            .trim()
            .to_lowercase()
            .split(['.', '-'])
            .filter(|t| !t.is_empty())
            .map(|t| match t.parse::<u64>() {
                Ok(n) => MavenToken::Number(n),
                Err(_) => MavenToken::Qualifier(normalize_qualifier(t)),
            })
            .collect();

        while matches!(tokens.last(), Some(t) if t.is_null()) {
            tokens.pop();
        }

        Self { tokens }
    }
}

fn normalize_qualifier(q: &str) -> String {
    // Single-letter shorthand used by Maven.
    match q {
        "a" => "alpha".to_string(),
        "b" => "beta".to_string(),
        "m" => "milestone".to_string(),
        "cr" => "rc".to_string(),
        "ga" | "final" | "release" => String::new(),
        _ => q.to_string(),
    }
}

impl MavenToken {
    fn is_null(&self) -> bool {
        match self {
            MavenToken::Number(n) => *n == 0,
            MavenToken::Qualifier(q) => q.is_empty(),
        }
    }

    /// Rank of a qualifier relative to the release (empty) qualifier.
    fn qualifier_rank(q: &str) -> (u8, &str) {
        match q {
            "alpha" => (0, ""),
            "beta" => (1, ""),
            "milestone" => (2, ""),
            "rc" => (3, ""),
            "snapshot" => (4, ""),
            "" => (5, ""),
            "sp" => (6, ""),
            other => (7, other),
        }
    }
}

impl Ord for MavenVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.tokens.len().max(other.tokens.len());
        for i in 0..len {
            let a = self.tokens.get(i);
            let b = other.tokens.get(i);
            let ord = match (a, b) {
                (Some(MavenToken::Number(x)), Some(MavenToken::Number(y))) => x.cmp(y),
                (Some(MavenToken::Qualifier(x)), Some(MavenToken::Qualifier(y))) => {
                    MavenToken::qualifier_rank(x).cmp(&MavenToken::qualifier_rank(y))
                }
                // A number always outranks a qualifier ("1.1 > 1-beta").
                (Some(MavenToken::Number(_)), Some(MavenToken::Qualifier(_))) => Ordering::Greater,
                (Some(MavenToken::Qualifier(_)), Some(MavenToken::Number(_))) => Ordering::Less,
                // Missing tokens compare as the release qualifier.
                (Some(MavenToken::Number(x)), None) => x.cmp(&0),
                (None, Some(MavenToken::Number(y))) => 0.cmp(y),
                (Some(MavenToken::Qualifier(x)), None) => {
                    MavenToken::qualifier_rank(x).cmp(&MavenToken::qualifier_rank(""))
                }
                (None, Some(MavenToken::Qualifier(y))) => {
                    MavenToken::qualifier_rank("").cmp(&MavenToken::qualifier_rank(y))
                }
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MavenVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn semver(eco: Ecosystem, s: &str) -> PackageVersion {
        parse_version(eco, s).unwrap()
    }

    #[test]
    fn test_lenient_semver_padding() {
        assert_eq!(
            semver(Ecosystem::Npm, "1.2"),
            semver(Ecosystem::Npm, "1.2.0")
        );
        assert_eq!(semver(Ecosystem::Pip, "2"), semver(Ecosystem::Pip, "2.0.0"));
    }

    #[test]
    fn test_go_v_prefix_trimmed() {
        assert_eq!(
            semver(Ecosystem::Go, "v1.2.3"),
            semver(Ecosystem::Go, "1.2.3")
        );
    }

    #[test]
    fn test_go_pseudo_version_orders_before_release() {
        let pseudo = semver(Ecosystem::Go, "v1.3.0-0.20210101000000-abcdef123456");
        let release = semver(Ecosystem::Go, "v1.3.0");
        assert!(pseudo < release);
    }

    #[test]
    fn test_unparseable_version_is_an_error() {
        let err = parse_version(Ecosystem::Npm, "not-a-version").unwrap_err();
        assert_eq!(err.ecosystem, Ecosystem::Npm);
    }

    #[test]
    fn test_maven_numeric_ordering() {
        assert!(MavenVersion::parse("1.10.0") > MavenVersion::parse("1.9.0"));
        assert!(MavenVersion::parse("2.0") > MavenVersion::parse("1.99.99"));
    }

    #[test]
    fn test_maven_trailing_zeroes_equal() {
        assert_eq!(MavenVersion::parse("1.0"), MavenVersion::parse("1.0.0"));
        assert_eq!(MavenVersion::parse("1"), MavenVersion::parse("1.0"));
    }

    #[test]
    fn test_maven_qualifier_ranks() {
        assert!(MavenVersion::parse("1.0-alpha") < MavenVersion::parse("1.0-beta"));
        assert!(MavenVersion::parse("1.0-rc") < MavenVersion::parse("1.0-SNAPSHOT"));
        assert!(MavenVersion::parse("1.0-SNAPSHOT") < MavenVersion::parse("1.0"));
        assert!(MavenVersion::parse("1.0") < MavenVersion::parse("1.0-sp"));
    }

    #[test]
    fn test_maven_shorthand_qualifiers() {
        assert_eq!(
            MavenVersion::parse("1.0-a1"),
            MavenVersion::parse("1.0-a1")
        );
        assert_eq!(MavenVersion::parse("1.0-ga"), MavenVersion::parse("1.0"));
        assert!(MavenVersion::parse("1.0-b2") > MavenVersion::parse("1.0-a1"));
    }

    #[test]
    fn test_maven_number_beats_qualifier() {
        assert!(MavenVersion::parse("1.0.1") > MavenVersion::parse("1.0-sp"));
    }

    #[test]
    fn test_cross_ecosystem_versions_do_not_compare() {
        let a = parse_version(Ecosystem::Maven, "1.0").unwrap();
        let b = parse_version(Ecosystem::Npm, "1.0.0").unwrap();
        assert!(a.partial_cmp(&b).is_none());
    }
}
