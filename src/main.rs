//! Vagas-Ripple main entry point
//!
//! This is the command-line interface for the Vagas-Ripple job harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vagas_ripple::config::{load_config_with_hash, validate, Config};
use vagas_ripple::crawler::{run_crawl, RunPlan};

/// Vagas-Ripple: a quota-bounded job listing harvester
///
/// Vagas-Ripple walks the paginated search results of a job board, keeps the
/// jobs matching the requested location, optionally enriches them from their
/// detail pages, and writes normalized records to a dataset.
#[derive(Parser, Debug)]
#[command(name = "vagas-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A quota-bounded job listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Search keyword (overrides search.keyword)
    #[arg(long)]
    keyword: Option<String>,

    /// Search location, also the location filter (overrides search.location)
    #[arg(long)]
    location: Option<String>,

    /// Search URL to start from (overrides search.start-url)
    #[arg(long)]
    start_url: Option<String>,

    /// Number of jobs to save (overrides crawler.results-wanted)
    #[arg(long)]
    results_wanted: Option<u32>,

    /// Page ceiling (overrides the one derived from the quota)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Fetch each job's detail page
    #[arg(long)]
    collect_details: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the run plan without fetching anything
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(keyword) = &self.keyword {
            config.search.keyword = keyword.clone();
        }
        if let Some(location) = &self.location {
            config.search.location = location.clone();
        }
        if let Some(start_url) = &self.start_url {
            config.search.start_url = Some(start_url.clone());
        }
        if let Some(results_wanted) = self.results_wanted {
            config.crawler.results_wanted = results_wanted;
        }
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = Some(max_pages);
        }
        if self.collect_details {
            config.crawler.collect_details = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid command-line override")?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    match run_crawl(&config, &config_hash).await {
        Ok(_) => {
            tracing::info!("Harvest completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vagas_ripple=info,warn"),
            1 => EnvFilter::new("vagas_ripple=debug,info"),
            2 => EnvFilter::new("vagas_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved plan and the first URL
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let plan = RunPlan::resolve(config).context("Failed to resolve run plan")?;

    println!("=== Vagas-Ripple Dry Run ===\n");
    println!("{}", plan);

    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    println!("  Dataset: {}", config.output.dataset_path);
    if let Some(summary_path) = &config.output.summary_path {
        println!("  Summary: {}", summary_path);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start at {}", plan.first_request().url);

    Ok(())
}
