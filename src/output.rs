//! Human-readable scan output.

use chrono::Utc;
use tabled::{settings::Style, Table, Tabled};

use crate::model::ScanResult;

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "CVE")]
    cve: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Fix Version")]
    fix_version: String,
}

/// Prints the per-file summary and, when anything matched, a vulnerability
/// table with upgrade guidance.
pub fn print_report(results: &[ScanResult]) {
    println!();
    println!(
        "Scan completed at: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if results.is_empty() {
        println!("No dependency manifests found.");
        return;
    }

    for result in results {
        println!(
            "{} [{}]: {} dependencies, {} vulnerabilities",
            result.source_file.display(),
            result.ecosystem,
            result.dependencies.len(),
            result.vulnerabilities.len(),
        );
        for diagnostic in &result.diagnostics {
            println!("  warning: {}: {}", diagnostic.scope, diagnostic.message);
        }
    }

    let rows: Vec<VulnRow> = results
        .iter()
        .flat_map(|result| result.vulnerabilities.iter())
        .map(|vuln| VulnRow {
            severity: vuln.severity.to_string(),
            package: truncate(&vuln.dependency.to_string(), 40),
            cve: vuln.cve.clone(),
            summary: truncate(&vuln.summary, 60),
            fix_version: vuln
                .first_patched_version
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!();
    if rows.is_empty() {
        println!("No known vulnerabilities found.");
    } else {
        println!("Found {} vulnerabilities:", rows.len());
        println!();
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{table}");
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
