use crate::error::ParseError;
use crate::model::{Dependency, Ecosystem};

use super::{dedup_dependencies, EcosystemParser, FileRole};

/// Parser for `go.mod` manifests and `go.sum` checksum files.
///
/// `go.sum` entries are fully pinned, so the detector prefers the sum file
/// when both exist. `// indirect` requires are kept: they are still part of
/// the resolved module graph.
pub struct GoParser;

impl EcosystemParser for GoParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn parse(&self, content: &str, role: FileRole) -> Result<Vec<Dependency>, ParseError> {
        match role {
            FileRole::Manifest => parse_go_mod(content),
            FileRole::Lockfile => parse_go_sum(content),
        }
    }
}

fn parse_go_mod(content: &str) -> Result<Vec<Dependency>, ParseError> {
    let mut deps = Vec::new();
    let mut in_require_block = false;

    for (lineno, raw) in content.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if in_require_block {
            if line == ")" {
                in_require_block = false;
                continue;
            }
            deps.push((require_entry(line, lineno + 1)?, true));
            continue;
        }

        if line == "require (" {
            in_require_block = true;
        } else if let Some(rest) = line.strip_prefix("require ") {
            let rest = rest.trim();
            if rest != "(" {
                deps.push((require_entry(rest, lineno + 1)?, true));
            } else {
                in_require_block = true;
            }
        }
        // module/go/replace/exclude directives carry no declared versions.
    }

    Ok(dedup_dependencies(deps))
}

fn require_entry(entry: &str, line: usize) -> Result<Dependency, ParseError> {
    let mut parts = entry.split_whitespace();
    let (Some(name), Some(version)) = (parts.next(), parts.next()) else {
        return Err(ParseError::InvalidLine {
            line,
            reason: format!("expected \"module version\", got {entry:?}"),
        });
    };
    Ok(Dependency::new(name, version, Ecosystem::Go))
}

fn parse_go_sum(content: &str) -> Result<Vec<Dependency>, ParseError> {
    let mut deps = Vec::new();

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(name), Some(version), Some(_hash)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::InvalidLine {
                line: lineno + 1,
                reason: format!("expected \"module version hash\", got {line:?}"),
            });
        };
        // Every module appears once for its zip and once for its go.mod.
        let version = version.strip_suffix("/go.mod").unwrap_or(version);
        deps.push((Dependency::new(name, version, Ecosystem::Go), true));
    }

    Ok(dedup_dependencies(deps))
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}
