use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Go,
    Maven,
    Pip,
    Npm,
    Composer,
}

impl Ecosystem {
    /// Identifier used on the command line and in the advisory API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Go => "go",
            Ecosystem::Maven => "maven",
            Ecosystem::Pip => "pip",
            Ecosystem::Npm => "npm",
            Ecosystem::Composer => "composer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Go => "Go Modules",
            Ecosystem::Maven => "Maven",
            Ecosystem::Pip => "Pip",
            Ecosystem::Npm => "NPM",
            Ecosystem::Composer => "Composer",
        }
    }

    /// All ecosystems depscout knows how to scan.
    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::Go,
            Ecosystem::Maven,
            Ecosystem::Pip,
            Ecosystem::Npm,
            Ecosystem::Composer,
        ]
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "go" | "golang" => Ok(Ecosystem::Go),
            "maven" => Ok(Ecosystem::Maven),
            "pip" | "pypi" => Ok(Ecosystem::Pip),
            "npm" => Ok(Ecosystem::Npm),
            "composer" | "php" => Ok(Ecosystem::Composer),
            _ => Err(format!(
                "Unknown ecosystem: {}. Use: go, maven, pip, npm, composer",
                s
            )),
        }
    }
}

/// A single dependency declared by a manifest or pinned by a lockfile.
///
/// Identity within one manifest is (name, ecosystem); parsers deduplicate
/// on that key before a `Dependency` leaves the parsing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub ecosystem: Ecosystem,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ecosystem,
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
