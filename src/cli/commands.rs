use anyhow::{Result, Context};
use std::path::Path;
use tracing::{error, info, warn};

use crate::browser::{BrowserSession, DocumentProvider, RemoteRenderer};
use crate::cli::config::{PaginationStrategy, RenderBackend, ScraperConfig};
use crate::cli::CrawlArgs;
use crate::crawler::{CrawlerController, PageCountSource};
use crate::diff;
use crate::storage::{self, ExportPaths};

/// Crawl the listing and write the movie and page tables
pub async fn crawl(args: CrawlArgs) -> Result<()> {
    let mut config = match &args.profile {
        Some(profile) => ScraperConfig::load_profile(profile)
            .context(format!("Failed to load profile: {}", profile))?,
        None => ScraperConfig::load_default()?,
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    let controller = CrawlerController::new(config.clone())?;

    let mut provider: Box<dyn DocumentProvider> = match config.browser.backend {
        RenderBackend::Webdriver => Box::new(BrowserSession::connect(&config.browser).await?),
        RenderBackend::Remote => Box::new(RemoteRenderer::new(&config.browser)?),
    };

    let result = controller.run(provider.as_mut()).await.map_err(|e| {
        if let Some(page) = e.page() {
            error!("Crawl stopped at page {}", page);
        }
        e
    })?;

    let paths = ExportPaths::new(&config.output, &storage::file_stamp());
    storage::export_crawl(&result, &paths)?;

    let stats = &result.stats;
    if stats.cards_skipped > 0 {
        warn!("{} of {} cards were skipped", stats.cards_skipped, stats.cards_seen);
    }
    if stats.page_count.source == PageCountSource::Fallback {
        warn!("Pagination was not detected; only the first page was crawled");
    }

    info!("Crawled {} pages, {} titles", result.pages.len(), result.movies.len());
    info!("Movie table: {}", paths.movies.display());
    info!("Page table: {}", paths.pages.display());
    println!("Total view count across all pages: {}", result.total_views());

    Ok(())
}

/// Fold command line overrides into the loaded configuration
pub fn apply_overrides(config: &mut ScraperConfig, args: &CrawlArgs) {
    if let Some(url) = &args.url {
        config.target.base_url = url.clone();
    }

    if let Some(pages) = args.pages {
        config.pagination.strategy = PaginationStrategy::Fixed;
        config.pagination.fixed_pages = pages;
    }

    if let Some(settle_ms) = args.settle_ms {
        config.browser.settle_delay_ms = settle_ms;
    }

    if let Some(backend) = args.backend {
        config.browser.backend = backend;
    }

    if let Some(prefix) = &args.output_prefix {
        config.output.prefix = prefix.clone();
    }

    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
}

/// Compare two movie tables and write the per-title differences
pub fn diff(file1: &Path, file2: &Path, output: &Path) -> Result<()> {
    let first = storage::read_snapshot_file(file1)
        .context(format!("Failed to read {}", file1.display()))?;
    let second = storage::read_snapshot_file(file2)
        .context(format!("Failed to read {}", file2.display()))?;

    let rows = diff::diff(&first, &second);
    storage::write_file(output, |file| storage::write_diff(file, &rows))?;

    println!("Results saved to {}", output.display());

    Ok(())
}

/// List all available configuration profiles
pub fn list_profiles() -> Result<()> {
    let profiles = ScraperConfig::list_profiles()?;

    println!("Available configuration profiles:");
    for profile in profiles {
        println!("  - {}", profile);
    }

    Ok(())
}

/// Show a profile, creating it from defaults when it does not exist
pub fn manage_profile(profile_name: &str) -> Result<()> {
    match ScraperConfig::load_profile(profile_name) {
        Ok(config) => {
            println!("Profile: {}", profile_name);
            println!("{}", serde_yaml::to_string(&config)?);
        },
        Err(_) => {
            warn!("Profile '{}' does not exist. Creating a default profile.", profile_name);
            ScraperConfig::default().save_as_profile(profile_name)?;
            println!("Created default profile: {}", profile_name);
        }
    }

    Ok(())
}

/// Show the current configuration
pub fn show_config() -> Result<()> {
    let config = ScraperConfig::load_default()?;
    println!("Current configuration:");
    println!("{}", serde_yaml::to_string(&config)?);

    Ok(())
}
