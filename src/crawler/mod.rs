pub mod controller;
pub mod error;
pub mod extractor;
pub mod pagination;
pub mod results;
pub mod views;

// Re-export common types
pub use controller::CrawlerController;
pub use pagination::PageCountSource;
pub use results::{CrawlResult, MovieRecord, PageSummary};
