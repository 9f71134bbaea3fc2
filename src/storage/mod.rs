pub mod export;
pub mod snapshot;

// Re-export common types
pub use export::{export_crawl, file_stamp, write_diff, write_file, ExportPaths};
pub use snapshot::read_snapshot_file;
