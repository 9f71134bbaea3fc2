use std::fmt;
use tracing::{debug, info, warn};

use crate::browser::document::parse_selector;
use crate::browser::{DocumentProvider, RenderedDocument};
use crate::cli::config::{PaginationSettings, PaginationStrategy};
use crate::crawler::error::CrawlError;

/// Where a page count came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCountSource {
    /// Configured ahead of time
    Fixed,
    /// Read from the pagination links
    Discovered,
    /// Discovery found nothing usable; crawling the first page only
    Fallback,
}

/// Number of listing pages to crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCount {
    pub pages: u32,
    pub source: PageCountSource,
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            PageCountSource::Fixed => write!(f, "{} (fixed)", self.pages),
            PageCountSource::Discovered => write!(f, "{} (discovered)", self.pages),
            PageCountSource::Fallback => write!(f, "{} (fallback)", self.pages),
        }
    }
}

/// Determines how many listing pages exist
pub struct PaginationResolver<'a> {
    settings: &'a PaginationSettings,
    base_url: &'a str,
}

impl<'a> PaginationResolver<'a> {
    pub fn new(settings: &'a PaginationSettings, base_url: &'a str) -> Self {
        Self { settings, base_url }
    }

    /// Resolve the page count, probing the base URL when configured to.
    ///
    /// Navigation failures surface as a fetch failure of page 1.
    pub async fn resolve<P>(&self, provider: &mut P) -> Result<PageCount, CrawlError>
    where
        P: DocumentProvider + ?Sized,
    {
        match self.settings.strategy {
            PaginationStrategy::Fixed => Ok(PageCount {
                pages: self.settings.fixed_pages.max(1),
                source: PageCountSource::Fixed,
            }),
            PaginationStrategy::Probed => self.probe(provider).await,
        }
    }

    async fn probe<P>(&self, provider: &mut P) -> Result<PageCount, CrawlError>
    where
        P: DocumentProvider + ?Sized,
    {
        let links = parse_selector(&self.settings.link_selector)?;
        let fetch_error = |source: anyhow::Error| CrawlError::PageFetch {
            page: 1,
            url: self.base_url.to_string(),
            source,
        };

        provider.navigate(self.base_url).await.map_err(fetch_error)?;

        let timeout = self.settings.wait_timeout();
        let appeared = provider
            .wait_for_selector(&self.settings.link_selector, timeout)
            .await
            .map_err(fetch_error)?;

        if !appeared {
            if self.settings.fail_on_timeout {
                return Err(CrawlError::PaginationTimeout {
                    selector: self.settings.link_selector.clone(),
                    timeout,
                });
            }
            warn!(
                "Pagination links '{}' did not appear within {:?}; crawling the first page only",
                self.settings.link_selector, timeout
            );
            return Ok(fallback());
        }

        let source = provider.page_source().await.map_err(fetch_error)?;
        let texts = RenderedDocument::parse(&source).select_texts(&links);
        debug!("Found {} pagination links", texts.len());

        match max_page_number(&texts) {
            Some(pages) => {
                info!("Detected total pages: {}", pages);
                Ok(PageCount { pages, source: PageCountSource::Discovered })
            }
            None => {
                warn!("No numeric pagination links found; crawling the first page only");
                Ok(fallback())
            }
        }
    }
}

fn fallback() -> PageCount {
    PageCount { pages: 1, source: PageCountSource::Fallback }
}

/// Highest purely numeric link text, ignoring zero
fn max_page_number(texts: &[String]) -> Option<u32> {
    texts
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|text| text.parse::<u32>().ok())
        .filter(|&page| page > 0)
        .max()
}
