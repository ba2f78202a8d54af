use crate::error::ParseError;
use crate::model::{Dependency, Ecosystem};

use super::{dedup_dependencies, EcosystemParser, FileRole};

/// Parser for pip `requirements.txt` files.
///
/// One requirement per line. `==` pins are treated as exact; for range
/// specifiers the first bound's version is used as the declared version.
/// Comments, blank lines, pip options (`-r`, `--hash`, ...), and environment
/// markers are skipped.
pub struct PipParser;

const RANGE_SPECIFIERS: &[&str] = &["~=", ">=", "<=", "!=", ">", "<"];

impl EcosystemParser for PipParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
    }

    fn parse(&self, content: &str, _role: FileRole) -> Result<Vec<Dependency>, ParseError> {
        let mut deps = Vec::new();

        for raw in content.lines() {
            let line = strip_inline_comment(raw).trim();
            if line.is_empty() || line.starts_with('-') {
                continue;
            }
            // Environment markers ("; python_version < '3.9'") don't affect identity.
            let line = line.split(';').next().unwrap_or(line).trim();

            if let Some((name, version, pinned)) = split_requirement(line) {
                deps.push((Dependency::new(name, version, Ecosystem::Pip), pinned));
            }
        }

        Ok(dedup_dependencies(deps))
    }
}

/// Splits a requirement line into (name, version, pinned). Lines without a
/// version specifier (bare names, URLs) are skipped.
fn split_requirement(line: &str) -> Option<(String, String, bool)> {
    if line.contains("://") {
        return None;
    }

    if let Some((name, version)) = line.split_once("==") {
        let version = version.trim().trim_end_matches(".*");
        return Some((normalize_name(name), version.to_string(), true));
    }

    for spec in RANGE_SPECIFIERS {
        if let Some((name, rest)) = line.split_once(spec) {
            // "requests>=2.0,<3.0" — take the first bound's version.
            let version = rest.split(',').next()?.trim();
            if version.is_empty() {
                return None;
            }
            return Some((normalize_name(name), version.to_string(), false));
        }
    }

    None
}

fn normalize_name(name: &str) -> String {
    // Drop extras: "requests[socks]" declares requests.
    let name = name.split('[').next().unwrap_or(name);
    name.trim().to_lowercase()
}

fn strip_inline_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}
