//! Sanad main entry point
//!
//! This is the command-line interface for the Sanad listings harvester.

use anyhow::{anyhow, Result};
use clap::Parser;
use sanad::config::load_config_with_hash;
use sanad::export::ExportFormat;
use sanad::model::{Market, MarketFilter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sanad: a harvester of Shariah-certified listings
///
/// Sanad crawls the certified-company listings of the Saudi exchange one
/// certifying board at a time, reconciles the result against its local
/// registry, and writes JSON/CSV exports.
#[derive(Parser, Debug)]
#[command(name = "sanad")]
#[command(version = "1.0.0")]
#[command(about = "A harvester of Shariah-certified listings", long_about = None)]
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

    /// Harvest one market only (tasi or nomu)
    #[arg(long, value_name = "MARKET")]
    market: Option<String>,

    /// Harvest one certifying board only, by name
    #[arg(long, value_name = "BOARD")]
    board: Option<String>,

    /// Export format: json, csv, or all
    #[arg(long, value_name = "FORMAT", default_value = "all")]
    format: String,

    /// Skip export files entirely
    #[arg(long)]
    no_export: bool,

    /// Validate config and show what would be harvested without crawling
    #[arg(long, conflicts_with_all = ["stats", "schedule"])]
    dry_run: bool,

    /// Show registry statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "schedule"])]
    stats: bool,

    /// Run on the configured schedule until interrupted
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    schedule: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let filter = parse_market_filter(cli.market.as_deref())?;
    let export_format = if cli.no_export {
        None
    } else {
        Some(parse_export_format(&cli.format)?)
    };

    if cli.dry_run {
        handle_dry_run(&config, filter, cli.board.as_deref());
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.schedule {
        handle_schedule(config, config_hash, filter, export_format).await?;
    } else {
        handle_harvest(
            &config,
            &config_hash,
            filter,
            cli.board.as_deref(),
            export_format,
        )
        .await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sanad=info,warn"),
            1 => EnvFilter::new("sanad=debug,info"),
            2 => EnvFilter::new("sanad=trace,debug"),
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

fn parse_market_filter(market: Option<&str>) -> Result<MarketFilter> {
    match market {
        None => Ok(MarketFilter::All),
        Some(name) => Market::from_cli_name(name)
            .map(MarketFilter::One)
            .ok_or_else(|| anyhow!("Unknown market '{}' (expected tasi or nomu)", name)),
    }
}

fn parse_export_format(format: &str) -> Result<ExportFormat> {
    ExportFormat::from_cli_name(format)
        .ok_or_else(|| anyhow!("Unknown format '{}' (expected json, csv, or all)", format))
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &sanad::config::Config, filter: MarketFilter, board: Option<&str>) {
    println!("=== Sanad Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  User agent: {}", config.source.user_agent);
    println!("  Sector keywords: {}", config.source.sector_keywords.join(", "));

    println!("\nHarvest:");
    println!("  Max pages per unit: {}", config.harvest.max_pages_per_unit);
    println!("  Inter-board delay: {}ms", config.harvest.inter_board_delay_ms);
    println!("  Page timeout: {}s", config.harvest.page_timeout_secs);
    println!(
        "  Retry: {} attempt(s), {}ms apart",
        config.retry.max_attempts, config.retry.delay_ms
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Export directory: {}", config.output.export_dir);

    let market_ids = filter.market_ids();
    println!("\nCertifying Boards ({}):", config.board.len());
    let mut units = 0;
    for entry in &config.board {
        if let Some(wanted) = board {
            let matches = entry.name == wanted
                || entry
                    .name_en
                    .as_deref()
                    .is_some_and(|en| en.eq_ignore_ascii_case(wanted));
            if !matches {
                continue;
            }
        }
        println!("  - {} (id {})", entry.name, entry.id);
        units += market_ids.len();
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} crawl unit(s)", units);
}

/// Handles the --stats mode: shows registry statistics from the database
fn handle_stats(config: &sanad::config::Config) -> Result<()> {
    use sanad::export::print_statistics;
    use sanad::storage::{open_store, Store};
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))?;
    let stats = store.statistics()?;
    let last_run = store.last_run()?;
    print_statistics(&stats, last_run.as_ref());

    Ok(())
}

/// Handles the --schedule mode: periodic harvesting until Ctrl-C
async fn handle_schedule(
    config: sanad::config::Config,
    config_hash: String,
    filter: MarketFilter,
    export_format: Option<ExportFormat>,
) -> Result<()> {
    use sanad::schedule::Scheduler;

    tracing::info!(
        "Scheduler starting: one run every {} hour(s)",
        config.schedule.interval_hours
    );

    let scheduler = Scheduler::start(config, config_hash, filter, export_format);
    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt received, shutting down");
    scheduler.stop().await?;

    Ok(())
}

/// Handles a single harvest run
async fn handle_harvest(
    config: &sanad::config::Config,
    config_hash: &str,
    filter: MarketFilter,
    board: Option<&str>,
    export_format: Option<ExportFormat>,
) -> Result<()> {
    use sanad::harvest::run_harvest;

    let run = run_harvest(config, config_hash, filter, board, export_format).await?;

    println!("=== Harvest Complete ===");
    println!("  Status: {}", run.status.to_db_string());
    println!("  Companies: {}", run.total_companies);
    println!(
        "  Changes: {} new, {} updated, {} delisted",
        run.new_companies, run.updated_companies, run.delisted_companies
    );
    println!("  Duration: {}s", run.duration_seconds);
    if let Some(error) = &run.error_message {
        println!("  Errors: {}", error);
    }

    Ok(())
}
