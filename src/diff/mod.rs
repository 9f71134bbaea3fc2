use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// One row of a movie table as needed for comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleViews {
    pub title: String,
    pub views: i64,
}

impl TitleViews {
    pub fn new(title: impl Into<String>, views: i64) -> Self {
        Self { title: title.into(), views }
    }
}

/// Change in views for one title between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiffRow {
    #[serde(rename = "Title")]
    pub title: String,

    /// Views in the second snapshot minus views in the first
    #[serde(rename = "Views_diff")]
    pub views_delta: i64,
}

/// Outer-join two snapshots on title and sort by absolute change, largest first.
///
/// A title missing from one side counts as 0 views there. A title repeated
/// within one snapshot keeps its last value. Joined rows are ordered by title,
/// and equal magnitudes keep that order.
pub fn diff(first: &[TitleViews], second: &[TitleViews]) -> Vec<SnapshotDiffRow> {
    let mut joined: BTreeMap<&str, (i64, i64)> = BTreeMap::new();

    for row in first {
        joined.entry(row.title.as_str()).or_default().0 = row.views;
    }

    for row in second {
        joined.entry(row.title.as_str()).or_default().1 = row.views;
    }

    let mut rows: Vec<SnapshotDiffRow> = joined
        .into_iter()
        .map(|(title, (before, after))| SnapshotDiffRow {
            title: title.to_string(),
            views_delta: after.saturating_sub(before),
        })
        .collect();

    // `sort_by` is stable, so ties stay in title order
    rows.sort_by(|a, b| b.views_delta.unsigned_abs().cmp(&a.views_delta.unsigned_abs()));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, views_delta: i64) -> SnapshotDiffRow {
        SnapshotDiffRow { title: title.to_string(), views_delta }
    }

    #[test]
    fn test_outer_join_with_tie_keeps_title_order() {
        let a = vec![TitleViews::new("Alpha", 100)];
        let b = vec![TitleViews::new("Alpha", 150), TitleViews::new("Beta", 50)];

        assert_eq!(diff(&a, &b), vec![row("Alpha", 50), row("Beta", 50)]);
    }

    #[test]
    fn test_tie_order_ignores_input_order() {
        let a = vec![TitleViews::new("Beta", 100)];
        let b = vec![TitleViews::new("Beta", 150), TitleViews::new("Alpha", 50)];

        assert_eq!(diff(&a, &b), vec![row("Alpha", 50), row("Beta", 50)]);
    }

    #[test]
    fn test_sorted_by_magnitude_descending() {
        let a = vec![
            TitleViews::new("Small", 10),
            TitleViews::new("Dropped", 5_000),
            TitleViews::new("Grew", 1_000),
        ];
        let b = vec![
            TitleViews::new("Small", 11),
            TitleViews::new("Grew", 3_000),
            TitleViews::new("New", 700),
        ];

        assert_eq!(
            diff(&a, &b),
            vec![row("Dropped", -5_000), row("Grew", 2_000), row("New", 700), row("Small", 1)]
        );
    }

    #[test]
    fn test_stable_across_many_ties() {
        let a = vec![
            TitleViews::new("D", 0),
            TitleViews::new("B", 10),
            TitleViews::new("C", 0),
        ];
        let b = vec![
            TitleViews::new("C", 10),
            TitleViews::new("A", 10),
            TitleViews::new("D", 10),
        ];

        assert_eq!(
            diff(&a, &b),
            vec![row("A", 10), row("B", -10), row("C", 10), row("D", 10)]
        );
    }

    #[test]
    fn test_is_antisymmetric() {
        let a = vec![TitleViews::new("X", 5), TitleViews::new("Y", 40), TitleViews::new("Z", 9)];
        let b = vec![TitleViews::new("Y", 1), TitleViews::new("X", 25), TitleViews::new("W", 3)];

        let forward: std::collections::HashMap<String, i64> = diff(&a, &b).into_iter().map(|r| (r.title, r.views_delta)).collect();
        let backward: std::collections::HashMap<String, i64> = diff(&b, &a).into_iter().map(|r| (r.title, r.views_delta)).collect();

        assert_eq!(forward.len(), 4);
        for (title, delta) in &forward {
            assert_eq!(backward[title], -delta, "title {}", title);
        }
    }

    #[test]
    fn test_repeated_title_last_value_wins() {
        let a = vec![TitleViews::new("Dup", 1), TitleViews::new("Other", 0), TitleViews::new("Dup", 7)];
        let b = vec![TitleViews::new("Dup", 10)];

        assert_eq!(diff(&a, &b), vec![row("Dup", 3), row("Other", 0)]);
        assert_eq!(diff(&b, &a), vec![row("Dup", -3), row("Other", 0)]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(diff(&[], &[]).is_empty());
        assert_eq!(diff(&[], &[TitleViews::new("Only", 4)]), vec![row("Only", 4)]);
    }
}
