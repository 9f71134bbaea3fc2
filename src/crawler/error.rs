use std::time::Duration;
use thiserror::Error;

/// Failures that end a crawl run
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Navigation or the provider itself failed for a page
    #[error("failed to fetch page {page} ({url})")]
    PageFetch {
        page: u32,
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// Pagination controls never appeared and strict discovery is enabled
    #[error("pagination selector '{selector}' not found within {timeout:?}")]
    PaginationTimeout { selector: String, timeout: Duration },

    /// A configured selector does not compile
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl CrawlError {
    /// Page index at which the crawl stopped, if the failure is page-bound
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::PageFetch { page, .. } => Some(*page),
            _ => None,
        }
    }
}
