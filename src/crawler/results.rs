use serde::{Serialize, Deserialize};

use crate::crawler::pagination::PageCount;

/// One scraped card after view normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Listing page the card was found on (1-based)
    #[serde(rename = "Page")]
    pub page: u32,

    /// Card title as displayed
    #[serde(rename = "Title")]
    pub title: String,

    /// Normalized view count
    #[serde(rename = "Views")]
    pub views: u64,
}

/// Sum of the views of every card on one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    #[serde(rename = "Page")]
    pub page: u32,

    #[serde(rename = "TotalViews")]
    pub total_views: u64,
}

/// Data quality counters for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    /// Page count the crawl was driven by, and where it came from
    pub page_count: PageCount,
    pub cards_seen: usize,
    pub cards_skipped: usize,
}

/// Output of a crawl run: movie rows in crawl order and one summary per page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    pub movies: Vec<MovieRecord>,
    pub pages: Vec<PageSummary>,
    pub stats: CrawlStats,
}

impl CrawlResult {
    pub(crate) fn new(page_count: PageCount) -> Self {
        Self {
            movies: Vec::new(),
            pages: Vec::with_capacity(page_count.pages as usize),
            stats: CrawlStats {
                page_count,
                cards_seen: 0,
                cards_skipped: 0,
            },
        }
    }

    /// Append one page worth of records and its summary; returns the page total
    pub(crate) fn push_page(&mut self, page: u32, movies: Vec<MovieRecord>) -> u64 {
        let total_views = movies.iter().map(|m| m.views).fold(0u64, u64::saturating_add);
        self.movies.extend(movies);
        self.pages.push(PageSummary { page, total_views });
        total_views
    }

    /// Grand total across all pages
    pub fn total_views(&self) -> u64 {
        self.pages.iter().map(|p| p.total_views).fold(0u64, u64::saturating_add)
    }
}
