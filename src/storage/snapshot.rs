use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::diff::TitleViews;

/// Problems with a snapshot table given to `diff`
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("cannot open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: '{value}' is not a view count")]
    InvalidViews { line: u64, value: String },
}

/// Read a movie table from disk
pub fn read_snapshot_file(path: &Path) -> Result<Vec<TitleViews>, DiffError> {
    let file = File::open(path).map_err(|source| DiffError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_snapshot(file)
}

/// Read `Title` and the views column from a movie table.
///
/// The views column is `Views` when present, else the first header that
/// starts with "view"/"views" followed by a non-letter (`views`, `Views_total`).
pub fn read_snapshot<R: Read>(input: R) -> Result<Vec<TitleViews>, DiffError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let title_col = headers
        .iter()
        .position(|h| h == "Title")
        .ok_or(DiffError::MissingColumn("Title"))?;
    let views_col = views_column(&headers).ok_or(DiffError::MissingColumn("Views"))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let title = record.get(title_col).unwrap_or_default();
        let raw = record.get(views_col).unwrap_or_default();

        let views = parse_cell(raw).ok_or_else(|| DiffError::InvalidViews {
            line,
            value: raw.to_string(),
        })?;

        rows.push(TitleViews::new(title, views));
    }

    Ok(rows)
}

fn views_column(headers: &csv::StringRecord) -> Option<usize> {
    if let Some(exact) = headers.iter().position(|h| h == "Views") {
        return Some(exact);
    }

    let pattern = Regex::new(r"(?i)^views?($|[^a-z])").ok()?;
    headers.iter().position(|h| pattern.is_match(h))
}

/// Integer cell; blank is 0 and decimals such as `150.0` are truncated
fn parse_cell(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value.trunc() as i64),
        _ => None,
    }
}
