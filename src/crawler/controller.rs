use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{DocumentProvider, RenderedDocument};
use crate::cli::config::ScraperConfig;
use crate::crawler::error::CrawlError;
use crate::crawler::extractor::PageExtractor;
use crate::crawler::pagination::{PageCountSource, PaginationResolver};
use crate::crawler::results::{CrawlResult, MovieRecord};
use crate::crawler::views::parse_views;

/// Drives a sequential crawl over every listing page
pub struct CrawlerController {
    config: ScraperConfig,
    extractor: PageExtractor,
}

impl CrawlerController {
    /// Create a controller, compiling the configured selectors up front
    pub fn new(config: ScraperConfig) -> Result<Self, CrawlError> {
        let extractor = PageExtractor::new(&config.target)?;
        Ok(Self { config, extractor })
    }

    /// URL of a listing page: the base URL for page 1, `<base>/<page>` after that
    pub fn page_url(&self, page: u32) -> String {
        let base = &self.config.target.base_url;
        if page <= 1 {
            base.clone()
        } else {
            format!("{}/{}", base.trim_end_matches('/'), page)
        }
    }

    /// Crawl every page and release `provider` afterwards, whatever the outcome
    pub async fn run<P>(&self, provider: &mut P) -> Result<CrawlResult, CrawlError>
    where
        P: DocumentProvider + ?Sized,
    {
        let outcome = self.crawl(provider).await;

        if let Err(e) = provider.close().await {
            warn!("Failed to release document provider: {:#}", e);
        }

        outcome
    }

    async fn crawl<P>(&self, provider: &mut P) -> Result<CrawlResult, CrawlError>
    where
        P: DocumentProvider + ?Sized,
    {
        let page_count = PaginationResolver::new(&self.config.pagination, &self.config.target.base_url)
            .resolve(provider)
            .await?;

        info!("Total pages: {}", page_count);
        if page_count.source == PageCountSource::Fallback {
            warn!("Page count fell back to 1; results may be incomplete");
        }

        let mut result = CrawlResult::new(page_count);

        for page in 1..=page_count.pages {
            info!("Scraping page {}/{}...", page, page_count.pages);

            let source = self.fetch_page(provider, page).await?;
            self.extract_page(page, &source, &mut result);
        }

        Ok(result)
    }

    /// Navigate to a page, let it settle and return its rendered markup
    async fn fetch_page<P>(&self, provider: &mut P, page: u32) -> Result<String, CrawlError>
    where
        P: DocumentProvider + ?Sized,
    {
        let url = self.page_url(page);

        let fetched = async {
            provider.navigate(&url).await?;

            let settle = self.config.browser.settle_delay();
            if !settle.is_zero() {
                debug!("Waiting {:?} for page {} to settle", settle, page);
                sleep(settle).await;
            }

            provider.page_source().await
        }
        .await;

        fetched.map_err(|source| CrawlError::PageFetch { page, url, source })
    }

    /// Extract, normalize and record one page's cards
    fn extract_page(&self, page: u32, source: &str, result: &mut CrawlResult) {
        let extraction = self.extractor.extract(&RenderedDocument::parse(source));
        let skipped = extraction.skipped.len();
        result.stats.cards_seen += extraction.cards_seen();
        result.stats.cards_skipped += skipped;

        let movies: Vec<MovieRecord> = extraction
            .entries
            .into_iter()
            .map(|entry| MovieRecord {
                page,
                views: parse_views(&entry.raw_views),
                title: entry.title,
            })
            .collect();

        let cards = movies.len();
        let total = result.push_page(page, movies);

        if skipped > 0 {
            warn!("Page {}: {} cards, {} skipped, {} views", page, cards, skipped, total);
        } else {
            info!("Page {}: {} cards, {} views", page, cards, total);
        }
    }
}
