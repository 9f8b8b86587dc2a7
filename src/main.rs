//! Listing Harvester main entry point
//!
//! This is the command-line interface for the incremental classifieds harvester.

use anyhow::{bail, Context};
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, validate, Config};
use listing_harvester::export::{save_json, DedupExporter, JsonKind};
use listing_harvester::site::{harvest_categories, select_categories, ListingSite, OlxSite};
use listing_harvester::{CatalogReport, CategoryResultSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Listing Harvester: an incremental classifieds scraper
///
/// Walks the categories of a classifieds site and merges every listing into
/// one deduplicated spreadsheet per category. Running it again only adds
/// listings that are not in the spreadsheet yet.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "An incremental classifieds scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the site base URL from the configuration
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discover and print the site's categories, then exit
    #[arg(long, conflicts_with_all = ["category", "all", "dry_run"])]
    list_categories: bool,

    /// Harvest a category by name or 1-based index (repeatable)
    #[arg(short, long, value_name = "NAME|INDEX", conflicts_with = "all")]
    category: Vec<String>,

    /// Harvest every discovered category
    #[arg(long)]
    all: bool,

    /// Validate config and show what would be harvested without any request
    #[arg(long)]
    dry_run: bool,

    /// Do not write JSON dumps for this run
    #[arg(long)]
    no_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
        validate(&config).context("Invalid --base-url")?;
    }
    if cli.no_json {
        config.output.save_json = false;
    }

    if cli.dry_run {
        handle_dry_run(&config, &cli);
        return Ok(());
    }

    let site = OlxSite::new(&config).context("Failed to set up the site adapter")?;

    if cli.list_categories {
        return handle_list_categories(&site).await;
    }

    handle_harvest(&site, &config, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
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

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config, cli: &Cli) {
    println!("=== Listing Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  User agent: {}", config.site.user_agent);

    println!("\nRequests:");
    println!("  Timeout: {}s", config.requests.request_timeout);
    println!("  Delay between pages: {}ms", config.requests.delay_between_requests);
    println!(
        "  Delay between categories: {}ms",
        config.requests.delay_between_categories
    );
    println!("  Max pages per category: {}", config.requests.max_pages);

    println!("\nSelection:");
    if cli.all {
        println!("  All discovered categories (--all)");
    } else if !cli.category.is_empty() {
        for choice in &cli.category {
            println!("  - {}", choice);
        }
    } else if !config.parsing.categories.is_empty() {
        for name in &config.parsing.categories {
            println!("  - {}", name);
        }
    } else if config.parsing.parse_entire_catalog {
        println!("  All discovered categories (parse-entire-catalog)");
    } else {
        println!("  Nothing selected");
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.output_directory);
    println!("  File prefix: {}", config.output.file_prefix);
    println!("  JSON dumps: {}", if config.output.save_json { "yes" } else { "no" });

    println!("\n✓ Configuration is valid");
}

/// Handles the --list-categories mode
async fn handle_list_categories(site: &dyn ListingSite) -> anyhow::Result<()> {
    let categories = site.categories().await;
    if categories.is_empty() {
        bail!("No categories found on {}", site.name());
    }

    println!("Categories on {}:", site.name());
    for (index, category) in categories.iter().enumerate() {
        println!("  {:>3}. {} ({})", index + 1, category.name, category.url);
    }
    Ok(())
}

/// Handles the main harvest: discovery, selection, traversal, export
async fn handle_harvest(site: &dyn ListingSite, config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let available = site.categories().await;
    if available.is_empty() {
        bail!("No categories found on {}", site.name());
    }

    let selected = select_categories(&available, &cli.category, cli.all, &config.parsing)?;
    tracing::info!(
        "Harvesting {} of {} categories",
        selected.len(),
        available.len()
    );

    let exporter = DedupExporter::from_config(&config.output);
    let json_dir = PathBuf::from(&config.output.output_directory);
    let mut export_errors = Vec::new();

    let report = harvest_categories(
        site,
        &selected,
        Duration::from_millis(config.requests.delay_between_categories),
        |result| {
            if let Err(e) = export_result(result, &exporter, &json_dir, config) {
                tracing::error!("Export of {} failed: {:#}", result.category.name, e);
                export_errors.push(format!("{}: {:#}", result.category.name, e));
            }
        },
    )
    .await;

    print_summary(&report, &export_errors);

    let failed = report.failed_categories().count();
    if failed > 0 || !export_errors.is_empty() {
        bail!(
            "{} categories failed, {} exports failed",
            failed,
            export_errors.len()
        );
    }
    Ok(())
}

/// Writes the spreadsheet artifact and, when enabled, the JSON dumps
fn export_result(
    result: &CategoryResultSet,
    exporter: &DedupExporter,
    json_dir: &Path,
    config: &Config,
) -> anyhow::Result<()> {
    if result.records.is_empty() {
        tracing::warn!("No listings in {}, nothing to export", result.category.name);
        return Ok(());
    }

    let summary = exporter.export(&result.records, &result.category.name)?;
    println!(
        "✓ {}: {} new, {} duplicates, {} rows in {}",
        result.category.name,
        summary.added,
        summary.duplicates,
        summary.total_rows,
        summary.path.display()
    );

    if config.output.save_json {
        for kind in [JsonKind::Full, JsonKind::Essential] {
            save_json(result, json_dir, &config.output.file_prefix, kind)
                .with_context(|| format!("Failed to save {:?} JSON", kind))?;
        }
    }
    Ok(())
}

fn print_summary(report: &CatalogReport, export_errors: &[String]) {
    println!("\n=== Harvest Summary ===\n");
    for result in &report.results {
        let status = if result.is_success() { "✓" } else { "✗" };
        println!(
            "{} {}: {} listings, {} pages, {} skipped cards, {:.1}s",
            status,
            result.category.name,
            result.total_products(),
            result.page_count,
            result.skipped_fragments,
            result.elapsed.as_secs_f64()
        );
    }

    println!(
        "\nTotal: {} listings from {} categories in {:.1}s",
        report.total_products(),
        report.results.len(),
        report.elapsed.as_secs_f64()
    );

    let errors = report.all_errors();
    if !errors.is_empty() || !export_errors.is_empty() {
        println!("\nErrors:");
        for error in errors.iter().chain(export_errors) {
            println!("  - {}", error);
        }
    }
}
