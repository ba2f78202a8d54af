use anyhow::Result;
use clap::Parser;
use depscout::{
    config::Config,
    engine::Engine,
    export::{exporter_for, ExportFormat},
    model::Ecosystem,
    output::print_report,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Default destination when `--export` is set without a path.
const DEFAULT_EXPORT_PATH: &str = "depscout_report.json";

#[derive(Parser)]
#[command(name = "depscout")]
#[command(
    author,
    version,
    about = "Scan dependency manifests for known vulnerabilities"
)]
struct Cli {
    /// Root directory to scan
    root: PathBuf,

    /// Comma-separated list of ecosystems to scan (e.g., go,pip,maven)
    #[arg(short, long, value_delimiter = ',')]
    ecosystems: Vec<Ecosystem>,

    /// Comma-separated list of directory and file names to exclude
    /// (e.g., node_modules,.git,requirements-dev.txt)
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Export results to a file
    #[arg(long)]
    export: bool,

    /// Export destination (implies --export)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export format (json, dojo)
    #[arg(short = 'f', long, default_value = "json")]
    export_format: String,

    /// GitHub token for authenticated advisory requests (optional)
    #[arg(short, long)]
    token: Option<String>,

    /// Process each file individually without concurrent execution
    #[arg(long)]
    sequential: bool,

    /// Bound on concurrent per-file pipelines
    #[arg(short, long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                path = %Config::config_path().display(),
                %err,
                "ignoring unreadable config file, using defaults"
            );
            Config::default()
        }
    };

    // CLI flags override config-file defaults.
    if !cli.ecosystems.is_empty() {
        config.ecosystems = cli.ecosystems.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude = cli.exclude.clone();
    }
    if cli.token.is_some() {
        config.token = cli.token.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.sequential = config.sequential || cli.sequential;

    let mut engine = Engine::new(config);

    if cli.export || cli.output.is_some() {
        let format = ExportFormat::from_str(&cli.export_format).map_err(|e| anyhow::anyhow!(e))?;
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));
        engine = engine.with_exporter(exporter_for(format, path));
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {}...", cli.root.display()));

    let results = engine.scan(&cli.root).await;

    match results {
        Ok(results) => {
            let total: usize = results.iter().map(|r| r.vulnerabilities.len()).sum();
            spinner.finish_with_message(format!(
                "Scanned {} files, found {} vulnerabilities",
                results.len(),
                total
            ));
            print_report(&results);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}
