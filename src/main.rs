//! PMRadar crawler entry point

use anyhow::Context;
use clap::Parser;
use pmradar_crawler::config::{load_config, resolve_seeds, Config};
use pmradar_crawler::crawler::build_http_client;
use pmradar_crawler::sink::{NullSink, RecordSink, SupabaseSink};
use pmradar_crawler::CrawlEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// PMRadar: a polite crawler for structured job-posting data
///
/// Crawls seed pages breadth-first while respecting robots.txt and
/// per-domain crawl delays, extracts JSON-LD and microdata from each page,
/// and optionally upserts the records to a PostgREST endpoint.
#[derive(Parser, Debug)]
#[command(name = "pmradar-crawler")]
#[command(version)]
#[command(about = "A polite structured-data crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config).context("failed to load configuration")?;
    let seeds = resolve_seeds(&config).context("failed to resolve seed URLs")?;

    if cli.dry_run {
        handle_dry_run(&config, seeds.len());
        return Ok(());
    }

    let sink = build_sink(&config)?;

    let engine = Arc::new(CrawlEngine::new(&config, sink).context("failed to build crawl engine")?);
    let results = engine.run(seeds).await;

    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&config.output.results_path, json)
        .with_context(|| format!("failed to write {}", config.output.results_path))?;

    let with_data = results
        .iter()
        .filter(|r| !r.json_ld.is_empty() || !r.microdata.is_empty())
        .count();
    tracing::info!(
        "Crawled {} pages ({} with structured data), results written to {}",
        results.len(),
        with_data,
        config.output.results_path
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pmradar_crawler=info,warn"),
            1 => EnvFilter::new("pmradar_crawler=debug,info"),
            2 => EnvFilter::new("pmradar_crawler=trace,debug"),
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

/// Builds the configured sink, or the null sink when none is configured
fn build_sink(config: &Config) -> anyhow::Result<Arc<dyn RecordSink>> {
    match &config.sink {
        Some(sink_config) => {
            let client = build_http_client(
                &config.user_agent.header_value(),
                config.crawler.fetch_timeout(),
            )
            .context("failed to build sink HTTP client")?;
            tracing::info!("Upserting results to {} (table {})", sink_config.url, sink_config.table);
            Ok(Arc::new(SupabaseSink::new(
                client,
                &sink_config.url,
                sink_config.key.clone(),
                &sink_config.table,
            )))
        }
        None => {
            tracing::warn!("No sink configured, results go to the output file only");
            Ok(Arc::new(NullSink))
        }
    }
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config, seed_count: usize) {
    println!("=== PMRadar Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page budget: {}", config.crawler.max_pages);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Default delay: {}ms", config.crawler.default_delay_ms);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    match &config.sink {
        Some(sink) => println!("  Sink: {} (table {})", sink.url, sink.table),
        None => println!("  Sink: none"),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seed_count);
}
