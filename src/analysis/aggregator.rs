//! Grouping and windowing primitives shared by the views.
//!
//! Every view is a single pass of `group_stats` over the source rows,
//! followed by filtering and sorting of the per-group statistics.

use crate::models::RatingRecord;
use std::collections::BTreeMap;

/// Running count and rating sum for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub sum: f64,
}

impl GroupStats {
    fn add(&mut self, rating: f64) {
        self.count += 1;
        self.sum += rating;
    }

    /// Mean rating of the group. Groups are never empty once created.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Group rows by `key`, ordered by key.
pub fn group_stats<'a, K, F>(rows: &'a [RatingRecord], key: F) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    F: Fn(&'a RatingRecord) -> K,
{
    let mut grouped: BTreeMap<K, GroupStats> = BTreeMap::new();

    for row in rows {
        grouped.entry(key(row)).or_default().add(row.rating);
    }

    grouped
}

/// Centered rolling mean over `values` in sequence order.
///
/// Position `i` averages the `window` values ending at `i + (window - 1) / 2`.
/// Positions whose window runs off either end get `None`. A window of 0 or 1
/// returns the values unchanged.
pub fn centered_rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window <= 1 {
        return values.iter().copied().map(Some).collect();
    }

    let n = values.len();
    let offset = (window - 1) / 2;

    (0..n)
        .map(|i| {
            let end = i + 1 + offset;
            if end < window || end > n {
                return None;
            }
            let slice = &values[end - window..end];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<RatingRecord> {
        vec![
            RatingRecord::new(1, "A", "Comedy", 4.0, 2000),
            RatingRecord::new(1, "A", "Comedy", 5.0, 2000),
            RatingRecord::new(2, "B", "Drama", 2.0, 2001),
            RatingRecord::new(3, "C", "Action", 3.0, 2001),
        ]
    }

    #[test]
    fn test_group_stats_by_genre() {
        let rows = rows();
        let grouped = group_stats(&rows, |r| r.genres.as_str());

        let keys: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(keys, vec!["Action", "Comedy", "Drama"]);

        let comedy = grouped["Comedy"];
        assert_eq!(comedy.count, 2);
        assert_eq!(comedy.mean(), 4.5);
    }

    #[test]
    fn test_group_stats_by_compound_key() {
        let rows = rows();
        let grouped = group_stats(&rows, |r| (r.year, r.movie_id));

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[&(2001, 2)].count, 1);
    }

    #[test]
    fn test_empty_group_mean() {
        assert_eq!(GroupStats::default().mean(), 0.0);
    }

    #[test]
    fn test_rolling_mean_window_one_is_identity() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(
            centered_rolling_mean(&values, 1),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn test_rolling_mean_odd_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(
            centered_rolling_mean(&values, 3),
            vec![None, Some(2.0), Some(3.0), Some(4.0), None]
        );
        assert_eq!(
            centered_rolling_mean(&values, 5),
            vec![None, None, Some(3.0), None, None]
        );
    }

    #[test]
    fn test_rolling_mean_even_window_leans_back() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        // Width 4 covers i-2..=i+1.
        assert_eq!(
            centered_rolling_mean(&values, 4),
            vec![None, None, Some(2.5), Some(3.5), None]
        );
    }

    #[test]
    fn test_rolling_mean_window_longer_than_series() {
        let values = [1.0, 2.0];
        assert_eq!(centered_rolling_mean(&values, 5), vec![None, None]);
        assert!(centered_rolling_mean(&[], 3).is_empty());
    }
}
