//! Ecosystem-specific manifest and lockfile parsers.
//!
//! This module provides the [`EcosystemParser`] trait and one implementation
//! per supported ecosystem.
//!
//! | Parser | Manifest | Lockfile |
//! |--------|----------|----------|
//! | [`GoParser`] | go.mod | go.sum |
//! | [`MavenParser`] | pom.xml | — |
//! | [`PipParser`] | requirements.txt | — |
//! | [`NpmParser`] | package.json | package-lock.json |
//! | [`ComposerParser`] | composer.json | composer.lock |
//!
//! Parsing is pure: content in, dependencies out. A malformed file yields a
//! [`ParseError`] scoped to that file; the scan continues around it.

mod composer;
mod gomod;
mod maven;
mod npm;
mod pip;

pub use composer::ComposerParser;
pub use gomod::GoParser;
pub use maven::MavenParser;
pub use npm::NpmParser;
pub use pip::PipParser;

use std::collections::HashMap;

use crate::error::ParseError;
use crate::model::{Dependency, Ecosystem};

/// Whether a detected file is the ecosystem's manifest or its lockfile.
///
/// Lockfiles carry fully pinned versions and take precedence when both are
/// present, because they yield a deterministic version for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Manifest,
    Lockfile,
}

/// Trait for turning a manifest's raw content into declared dependencies.
pub trait EcosystemParser: Send + Sync {
    /// The ecosystem this parser handles.
    fn ecosystem(&self) -> Ecosystem;

    /// Parses file content into a deduplicated dependency list.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the content is malformed for the given
    /// role. The error is scoped to this file only.
    fn parse(&self, content: &str, role: FileRole) -> Result<Vec<Dependency>, ParseError>;
}

/// Returns the parser for a specific ecosystem.
pub fn parser_for(ecosystem: Ecosystem) -> Box<dyn EcosystemParser> {
    match ecosystem {
        Ecosystem::Go => Box::new(GoParser),
        Ecosystem::Maven => Box::new(MavenParser),
        Ecosystem::Pip => Box::new(PipParser),
        Ecosystem::Npm => Box::new(NpmParser),
        Ecosystem::Composer => Box::new(ComposerParser),
    }
}

/// Deduplicates dependencies by name, order-preserving.
///
/// A pinned entry replaces an earlier range-derived one for the same name;
/// otherwise the first occurrence wins.
pub(crate) fn dedup_dependencies(entries: Vec<(Dependency, bool)>) -> Vec<Dependency> {
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut deps: Vec<(Dependency, bool)> = Vec::new();

    for (dep, pinned) in entries {
        match by_name.get(&dep.name) {
            Some(&idx) => {
                if pinned && !deps[idx].1 {
                    deps[idx] = (dep, pinned);
                }
            }
            None => {
                by_name.insert(dep.name.clone(), deps.len());
                deps.push((dep, pinned));
            }
        }
    }

    deps.into_iter().map(|(dep, _)| dep).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_for_covers_all_ecosystems() {
        for eco in Ecosystem::all() {
            assert_eq!(parser_for(*eco).ecosystem(), *eco);
        }
    }

    #[test]
    fn test_dedup_prefers_pinned() {
        let range = Dependency::new("requests", "2.0", Ecosystem::Pip);
        let pinned = Dependency::new("requests", "2.31.0", Ecosystem::Pip);
        let deps = dedup_dependencies(vec![(range, false), (pinned.clone(), true)]);
        assert_eq!(deps, vec![pinned]);
    }

    #[test]
    fn test_dedup_keeps_first_when_equally_specific() {
        let first = Dependency::new("lodash", "4.17.20", Ecosystem::Npm);
        let second = Dependency::new("lodash", "4.17.21", Ecosystem::Npm);
        let deps = dedup_dependencies(vec![(first.clone(), true), (second, true)]);
        assert_eq!(deps, vec![first]);
    }

    #[test]
    fn test_dedup_preserves_order() {
        let a = Dependency::new("a", "1.0.0", Ecosystem::Npm);
        let b = Dependency::new("b", "1.0.0", Ecosystem::Npm);
        let c = Dependency::new("c", "1.0.0", Ecosystem::Npm);
        let deps = dedup_dependencies(vec![
            (a.clone(), false),
            (b.clone(), false),
            (c.clone(), false),
        ]);
        assert_eq!(deps, vec![a, b, c]);
    }
}
