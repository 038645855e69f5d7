//! Trawler main entry point
//!
//! This is the command-line interface for the Trawler web scraper.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use trawler::config::{load_config_with_hash, Config, FetcherConfig, Settings, SettingsBuilder};
use trawler::output::{print_event, print_statistics};
use trawler::{CrawlOutput, Scraper};
use tracing_subscriber::EnvFilter;

/// Trawler: a bounded, polite web scraper
///
/// Trawler fetches the given seed URLs, extracts their text and, when asked,
/// follows their links breadth-first up to a maximum depth while limiting
/// concurrency and spacing requests to each domain.
#[derive(Parser, Debug)]
#[command(name = "trawler")]
#[command(version)]
#[command(about = "A bounded, polite web scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URLs, crawled in addition to the seeds in the config file
    #[arg(value_name = "SEEDS")]
    seeds: Vec<String>,

    /// Maximum BFS depth (seeds are depth 0)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Number of pages processed concurrently
    #[arg(long)]
    parallels: Option<usize>,

    /// Minimum delay between requests to the same domain, in milliseconds
    #[arg(long, value_name = "MILLIS")]
    delay: Option<u64>,

    /// Collect all results before printing instead of streaming them
    #[arg(long)]
    sync: bool,

    /// Follow links found on scraped pages
    #[arg(long)]
    handle_links: bool,

    /// Maximum number of characters of text kept per page (0 = unlimited)
    #[arg(long, value_name = "CHARS")]
    max_data_length: Option<usize>,

    /// Additional blacklist pattern (repeatable)
    #[arg(long = "blacklist", value_name = "PATTERN")]
    blacklist: Vec<String>,

    /// Replace the configured blacklist with the --blacklist patterns
    #[arg(long, requires = "blacklist")]
    replace_blacklist: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file or default settings
    fn settings(&self, base: Settings) -> Result<Settings, trawler::ConfigError> {
        let mut builder = SettingsBuilder::from_settings(base);

        if let Some(max_depth) = self.max_depth {
            builder = builder.max_depth(max_depth);
        }
        if let Some(parallels) = self.parallels {
            builder = builder.parallels(parallels);
        }
        if let Some(delay) = self.delay {
            builder = builder.delay_millis(delay);
        }
        if self.sync {
            builder = builder.async_mode(false);
        }
        if self.handle_links {
            builder = builder.handle_links(true);
        }
        if let Some(length) = self.max_data_length {
            builder = builder.max_scraped_data_length(length);
        }
        if self.replace_blacklist {
            builder = builder.new_blacklist(self.blacklist.iter().cloned());
        } else if !self.blacklist.is_empty() {
            builder = builder.blacklist(self.blacklist.iter().cloned());
        }

        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    config.seeds.extend(cli.seeds.iter().cloned());

    let settings = cli
        .settings(config.scraper.clone())
        .context("Invalid crawl settings")?;

    if config.seeds.is_empty() {
        bail!("No seed URLs given (pass them as arguments or list them under `seeds` in the config)");
    }

    if cli.dry_run {
        handle_dry_run(&config.seeds, &settings, &config.fetcher);
        return Ok(());
    }

    handle_crawl(config.seeds, settings, &config.fetcher).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawler=info,warn"),
            1 => EnvFilter::new("trawler=debug,info"),
            2 => EnvFilter::new("trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and seeds
fn handle_dry_run(seeds: &[String], settings: &Settings, fetcher: &FetcherConfig) {
    println!("=== Trawler Dry Run ===\n");

    println!("Crawl Settings:");
    println!("  Max depth: {}", settings.max_depth);
    println!("  Parallels: {}", settings.parallels);
    println!("  Delay per domain: {}ms", settings.delay_millis);
    println!(
        "  Delivery: {}",
        if settings.async_mode { "streaming" } else { "sync" }
    );
    println!("  Follow links: {}", settings.handle_links);
    println!(
        "  Max data length: {}",
        match settings.max_scraped_data_length {
            0 => "unlimited".to_string(),
            n => format!("{} chars", n),
        }
    );

    println!("\nFetcher:");
    println!("  User agent: {}", fetcher.user_agent);
    println!("  Request timeout: {}s", fetcher.request_timeout_secs);
    println!("  Connect timeout: {}s", fetcher.connect_timeout_secs);
    println!("  Max content: {} bytes", fetcher.max_content_bytes);

    println!("\nBlacklist ({}):", settings.blacklist.len());
    for pattern in &settings.blacklist {
        println!("  - {}", pattern);
    }

    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        match trawler::normalize_url(seed) {
            Ok(url) if trawler::is_blacklisted(&url, &settings.blacklist) => {
                println!("  - {} (blacklisted)", url)
            }
            Ok(url) => println!("  - {}", url),
            Err(e) => println!("  - {} (invalid: {})", seed, e),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    seeds: Vec<String>,
    settings: Settings,
    fetcher: &FetcherConfig,
) -> anyhow::Result<()> {
    let scraper = Scraper::new(settings, fetcher).context("Failed to set up the scraper")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            on_signal.cancel();
        }
    });

    tracing::info!("Total seed URLs: {}", seeds.len());

    let result = match scraper.start(seeds, cancel).await {
        CrawlOutput::Complete(result) => result,
        CrawlOutput::Streaming(mut stream) => {
            while let Some(event) = stream.next().await {
                print_event(&event);
            }
            stream.finish().await.context("Crawl task failed")?
        }
    };

    println!();
    print_statistics(&result.stats());

    Ok(())
}
