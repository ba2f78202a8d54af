//! End-to-end engine scenarios over temporary directory trees, with a
//! fixture advisory source standing in for the network.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use depscout::advisory::AdvisorySource;
use depscout::config::Config;
use depscout::engine::Engine;
use depscout::error::AdvisoryError;
use depscout::export::DojoExporter;
use depscout::model::{Advisory, Ecosystem, Severity};

/// Fixture advisory feed: a fixed advisory set, optionally failing lookups
/// for chosen package names.
struct FixtureSource {
    advisories: Vec<Advisory>,
    fail_packages: Vec<String>,
}

impl FixtureSource {
    fn new(advisories: Vec<Advisory>) -> Self {
        Self {
            advisories,
            fail_packages: Vec::new(),
        }
    }

    fn failing_for(mut self, package: &str) -> Self {
        self.fail_packages.push(package.to_string());
        self
    }
}

#[async_trait]
impl AdvisorySource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch(
        &self,
        ecosystem: Ecosystem,
        package: &str,
    ) -> Result<Vec<Advisory>, AdvisoryError> {
        if self.fail_packages.iter().any(|p| p == package) {
            return Err(AdvisoryError::RateLimited);
        }
        Ok(self
            .advisories
            .iter()
            .filter(|a| a.package == package && ecosystem_of(a) == ecosystem)
            .cloned()
            .collect())
    }
}

// The fixture keys advisories by package name only; infer the ecosystem
// from the name shape used in these tests.
fn ecosystem_of(advisory: &Advisory) -> Ecosystem {
    if advisory.package.starts_with("github.com/") {
        Ecosystem::Go
    } else if advisory.package.contains(':') {
        Ecosystem::Maven
    } else {
        Ecosystem::Npm
    }
}

fn advisory(package: &str, range: &str, cve: &str, severity: Severity) -> Advisory {
    Advisory {
        cve: cve.to_string(),
        severity,
        summary: format!("{package} is vulnerable"),
        description: "an exploitable flaw".to_string(),
        package: package.to_string(),
        vulnerable_version_range: range.to_string(),
        first_patched_version: Some("1.3.0".to_string()),
        url: None,
        references: vec![],
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn engine(source: FixtureSource, sequential: bool) -> Engine {
    let config = Config {
        sequential,
        ..Config::default()
    };
    Engine::with_source(config, Arc::new(source))
}

fn scenario_a_fixture() -> FixtureSource {
    FixtureSource::new(vec![advisory(
        "github.com/x/y",
        "< 1.3.0",
        "CVE-2024-0001",
        Severity::High,
    )])
}

#[tokio::test]
async fn scenario_a_vulnerable_go_module() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "go.mod", "module m\n\nrequire github.com/x/y v1.2.0\n");

    let results = engine(scenario_a_fixture(), false)
        .scan(tmp.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.dependencies.len(), 1);
    assert_eq!(result.vulnerabilities.len(), 1);
    let vuln = &result.vulnerabilities[0];
    assert_eq!(vuln.cve, "CVE-2024-0001");
    assert_eq!(vuln.severity, Severity::High);
    assert_eq!(vuln.first_patched_version.as_deref(), Some("1.3.0"));
    assert_eq!(vuln.dependency, result.dependencies[0]);
}

#[tokio::test]
async fn scenario_b_patched_version_matches_nothing() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "go.mod", "module m\n\nrequire github.com/x/y v1.4.0\n");

    let results = engine(scenario_a_fixture(), false)
        .scan(tmp.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].dependencies.len(), 1);
    assert!(results[0].vulnerabilities.is_empty());
}

#[tokio::test]
async fn scenario_c_two_ecosystems_export_dojo_findings() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "api/go.mod", "module m\n\nrequire github.com/x/y v1.2.0\n");
    write(
        tmp.path(),
        "web/package.json",
        r#"{ "dependencies": { "lodash": "^4.17.20" } }"#,
    );

    let fixture = FixtureSource::new(vec![
        advisory("github.com/x/y", "< 1.3.0", "CVE-2024-0001", Severity::High),
        advisory("lodash", "< 4.17.21", "CVE-2021-23337", Severity::Critical),
    ]);

    let export_path = tmp.path().join("dojo.json");
    let results = engine(fixture, false)
        .with_exporter(Box::new(DojoExporter::new(&export_path)))
        .scan(tmp.path())
        .await
        .unwrap();

    // Sorted by file path: api/go.mod before web/package.json.
    assert_eq!(results.len(), 2);
    assert!(results[0].source_file.ends_with("api/go.mod"));
    assert!(results[1].source_file.ends_with("web/package.json"));
    assert_eq!(results[0].vulnerabilities.len(), 1);
    assert_eq!(results[1].vulnerabilities.len(), 1);

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&export_path).unwrap()).unwrap();
    let findings = exported["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 2);
    let severities: Vec<&str> = findings
        .iter()
        .map(|f| f["severity"].as_str().unwrap())
        .collect();
    assert!(severities.contains(&"High"));
    assert!(severities.contains(&"Critical"));
}

#[tokio::test]
async fn concurrent_and_sequential_modes_agree() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a/go.mod", "module a\n\nrequire github.com/x/y v1.2.0\n");
    write(tmp.path(), "b/requirements.txt", "requests==2.0.0\n");
    write(
        tmp.path(),
        "c/package.json",
        r#"{ "dependencies": { "lodash": "4.17.20" } }"#,
    );

    let concurrent = engine(scenario_a_fixture(), false)
        .scan(tmp.path())
        .await
        .unwrap();
    let sequential = engine(scenario_a_fixture(), true)
        .scan(tmp.path())
        .await
        .unwrap();

    assert_eq!(concurrent, sequential);
}

#[tokio::test]
async fn repeated_scans_are_deterministic() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "x/go.mod", "module x\n\nrequire github.com/x/y v1.2.0\n");
    write(tmp.path(), "y/go.mod", "module y\n\nrequire github.com/x/y v1.2.0\n");

    let first = engine(scenario_a_fixture(), false)
        .scan(tmp.path())
        .await
        .unwrap();
    let second = engine(scenario_a_fixture(), false)
        .scan(tmp.path())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn excluded_names_never_reach_results() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "vendor/dep/go.mod", "module v\n\nrequire github.com/x/y v1.2.0\n");
    write(tmp.path(), "app/go.mod", "module a\n\nrequire github.com/x/y v1.2.0\n");
    write(tmp.path(), "app/requirements-dev.txt", "pytest==7.0.0\n");

    let config = Config {
        exclude: vec!["vendor".to_string(), "requirements-dev.txt".to_string()],
        ..Config::default()
    };
    let results = Engine::with_source(config, Arc::new(scenario_a_fixture()))
        .scan(tmp.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].source_file.ends_with("app/go.mod"));
}

#[tokio::test]
async fn parse_failure_in_one_file_leaves_siblings_intact() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "good/go.mod", "module g\n\nrequire github.com/x/y v1.2.0\n");
    write(tmp.path(), "bad/package.json", "{ this is not json");
    write(tmp.path(), "other/requirements.txt", "requests==2.0.0\n");

    let results = engine(scenario_a_fixture(), false)
        .scan(tmp.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 3);

    let bad = results
        .iter()
        .find(|r| r.source_file.ends_with("bad/package.json"))
        .unwrap();
    assert!(bad.dependencies.is_empty());
    assert_eq!(bad.diagnostics.len(), 1);

    let good = results
        .iter()
        .find(|r| r.source_file.ends_with("good/go.mod"))
        .unwrap();
    assert_eq!(good.vulnerabilities.len(), 1);
    assert!(good.diagnostics.is_empty());
}

#[tokio::test]
async fn advisory_failure_degrades_to_diagnostic() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "go.mod",
        "module m\n\nrequire (\n\tgithub.com/x/y v1.2.0\n\tgithub.com/broken/pkg v0.1.0\n)\n",
    );

    let fixture = scenario_a_fixture().failing_for("github.com/broken/pkg");
    let results = engine(fixture, false).scan(tmp.path()).await.unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.dependencies.len(), 2);
    // The working dependency still matched; the broken one left a diagnostic.
    assert_eq!(result.vulnerabilities.len(), 1);
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.diagnostics[0].scope.contains("github.com/broken/pkg"));
}

#[tokio::test]
async fn invalid_root_is_fatal() {
    let err = engine(scenario_a_fixture(), false)
        .scan(Path::new("/definitely/not/a/real/path"))
        .await
        .unwrap_err();
    assert!(matches!(err, depscout::error::ScanError::InvalidRoot(_)));
}

#[tokio::test]
async fn lockfile_preferred_over_manifest() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "web/package.json",
        r#"{ "dependencies": { "lodash": "^9.9.9" } }"#,
    );
    write(
        tmp.path(),
        "web/package-lock.json",
        r#"{
            "lockfileVersion": 3,
            "packages": { "node_modules/lodash": { "version": "4.17.20" } }
        }"#,
    );

    let fixture = FixtureSource::new(vec![advisory(
        "lodash",
        "< 4.17.21",
        "CVE-2021-23337",
        Severity::Critical,
    )]);
    let results = engine(fixture, false).scan(tmp.path()).await.unwrap();

    // Only the lockfile is scanned, with its pinned (vulnerable) version.
    assert_eq!(results.len(), 1);
    assert!(results[0].source_file.ends_with("package-lock.json"));
    assert_eq!(results[0].vulnerabilities.len(), 1);
}
