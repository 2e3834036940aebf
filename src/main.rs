//! Tululu-Catalog main entry point
//!
//! This is the command-line interface for the Tululu-Catalog scraper.

use clap::Parser;
use std::path::PathBuf;
use tululu_catalog::config::{load_config, validate, Config};
use tululu_catalog::crawler::Coordinator;
use tululu_catalog::output::print_statistics;
use tracing_subscriber::EnvFilter;

/// Tululu-Catalog: downloads books from the tululu.org library
///
/// Crawls a range of catalog listing pages, downloads the text and cover of
/// every book found, and writes a JSON catalog describing them.
#[derive(Parser, Debug)]
#[command(name = "tululu-catalog")]
#[command(version)]
#[command(about = "Downloads books and covers from the tululu.org catalog", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First listing page to crawl
    #[arg(long)]
    start_page: Option<u32>,

    /// Listing page to stop before (exclusive); defaults to after the last page
    #[arg(long)]
    end_page: Option<u32>,

    /// Folder for downloaded books, images and the catalog
    #[arg(long, value_name = "DIR")]
    dest_folder: Option<PathBuf>,

    /// Path of the JSON catalog (default: books_catalog.json in the destination folder)
    #[arg(long, value_name = "FILE")]
    json_path: Option<PathBuf>,

    /// Do not download cover images
    #[arg(long)]
    skip_imgs: bool,

    /// Do not download book texts
    #[arg(long)]
    skip_txt: bool,

    /// Process book ids directly, starting from this id (requires --end-id)
    #[arg(long, requires = "end_id", conflicts_with_all = ["start_page", "end_page"])]
    start_id: Option<u32>,

    /// Last book id to process, inclusive (requires --start-id)
    #[arg(long, requires = "start_id")]
    end_id: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration and page range without downloading
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(start_page) = self.start_page {
            config.crawler.start_page = start_page;
        }
        if let Some(end_page) = self.end_page {
            config.crawler.end_page = Some(end_page);
        }
        if let Some(dest_folder) = &self.dest_folder {
            config.output.destination_folder = dest_folder.clone();
        }
        if let Some(json_path) = &self.json_path {
            config.output.catalog_path = Some(json_path.clone());
        }
        if self.skip_imgs {
            config.output.skip_images = true;
        }
        if self.skip_txt {
            config.output.skip_text = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config)?;

    let mut coordinator = Coordinator::new(config.clone())?;

    if cli.dry_run {
        return handle_dry_run(&config, &coordinator, &cli).await;
    }

    let result = match (cli.start_id, cli.end_id) {
        (Some(start_id), Some(end_id)) => coordinator.run_book_ids(start_id..=end_id).await,
        _ => coordinator.run().await,
    };

    match result {
        Ok(report) => {
            if !cli.quiet {
                print_statistics(&report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
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
            0 => EnvFilter::new("tululu_catalog=info,warn"),
            1 => EnvFilter::new("tululu_catalog=debug,info"),
            2 => EnvFilter::new("tululu_catalog=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be downloaded
async fn handle_dry_run(
    config: &Config,
    coordinator: &Coordinator,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tululu-Catalog Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);
    println!("  Category: {}", config.catalog.category_id);

    println!("\nCrawler:");
    println!("  Cooldown after connection errors: {}s", config.crawler.cooldown_secs);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nOutput:");
    println!("  Books: {}", config.output.books_dir().display());
    println!("  Images: {}", config.output.images_dir().display());
    println!("  Catalog: {}", config.output.catalog_file().display());
    println!("  Skip text: {}", config.output.skip_text);
    println!("  Skip images: {}", config.output.skip_images);

    if let (Some(start_id), Some(end_id)) = (cli.start_id, cli.end_id) {
        println!("\n✓ Would process book ids {}..={}", start_id, end_id);
        return Ok(());
    }

    let range = coordinator.resolve_range().await?;
    println!(
        "\n✓ Would crawl listing pages {}..{} ({:?} end page)",
        range.start, range.end, range.bound
    );

    Ok(())
}
