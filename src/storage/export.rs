use anyhow::{Result, Context};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::config::OutputSettings;
use crate::crawler::{CrawlResult, MovieRecord, PageSummary};
use crate::diff::SnapshotDiffRow;

pub const MOVIE_HEADER: [&str; 3] = ["Page", "Title", "Views"];
pub const PAGE_HEADER: [&str; 2] = ["Page", "TotalViews"];
pub const DIFF_HEADER: [&str; 2] = ["Title", "Views_diff"];

/// Write `rows` as CSV under an explicit header.
///
/// The header is written even when there are no rows.
pub fn write_rows<W, T>(out: W, header: &[&str], rows: &[T]) -> Result<(), csv::Error>
where
    W: Write,
    T: Serialize,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

pub fn write_movies<W: Write>(out: W, movies: &[MovieRecord]) -> Result<(), csv::Error> {
    write_rows(out, &MOVIE_HEADER, movies)
}

pub fn write_pages<W: Write>(out: W, pages: &[PageSummary]) -> Result<(), csv::Error> {
    write_rows(out, &PAGE_HEADER, pages)
}

pub fn write_diff<W: Write>(out: W, rows: &[SnapshotDiffRow]) -> Result<(), csv::Error> {
    write_rows(out, &DIFF_HEADER, rows)
}

/// Paths of the two tables produced by a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub movies: PathBuf,
    pub pages: PathBuf,
}

impl ExportPaths {
    /// `<dir>/<prefix>_movies_<stamp>.csv` and `<dir>/<prefix>_page_views_<stamp>.csv`
    pub fn new(settings: &OutputSettings, stamp: &str) -> Self {
        Self {
            movies: settings.directory.join(format!("{}_movies_{}.csv", settings.prefix, stamp)),
            pages: settings.directory.join(format!("{}_page_views_{}.csv", settings.prefix, stamp)),
        }
    }
}

/// Timestamp used in output file names
pub fn file_stamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Write both crawl tables to disk
pub fn export_crawl(result: &CrawlResult, paths: &ExportPaths) -> Result<()> {
    write_file(&paths.movies, |file| write_movies(file, &result.movies))?;
    write_file(&paths.pages, |file| write_pages(file, &result.pages))?;
    Ok(())
}

/// Create `path` (and its directory) and fill it with `write`
pub fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<(), csv::Error>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .context(format!("Failed to create output file: {}", path.display()))?;
    write(file).context(format!("Failed to write CSV: {}", path.display()))?;

    debug!("Wrote {}", path.display());
    Ok(())
}
