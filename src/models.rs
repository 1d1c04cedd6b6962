//! Data models for the movie dashboard.
//!
//! This module contains the source row type, the aggregate rows each view
//! produces, and the report that bundles them together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the synthetic group that absorbs genres below the share threshold.
pub const OTHER_GENRE: &str = "Other";

/// A single rating row from the source table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingRecord {
    /// Movie identifier.
    pub movie_id: u64,
    /// Movie title.
    pub title: String,
    /// Genre label (one per row once exploded).
    pub genres: String,
    /// Rating value, typically 1-5.
    pub rating: f64,
    /// Release year.
    pub year: i32,
}

impl RatingRecord {
    /// Convenience constructor, mostly for fixtures.
    pub fn new(movie_id: u64, title: &str, genres: &str, rating: f64, year: i32) -> Self {
        Self {
            movie_id,
            title: title.to_string(),
            genres: genres.to_string(),
            rating,
            year,
        }
    }
}

/// Sort direction for the genre rating view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Highest mean rating first (default)
    #[default]
    #[value(alias = "descending")]
    Desc,
    /// Lowest mean rating first
    #[value(alias = "ascending")]
    Asc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Desc => write!(f, "High → Low"),
            SortOrder::Asc => write!(f, "Low → High"),
        }
    }
}

/// The four canned views.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    GenreDistribution,
    GenreRating,
    YearTrend,
    TopMovies,
}

impl ViewKind {
    /// All views in display order.
    pub const ALL: [ViewKind; 4] = [
        ViewKind::GenreDistribution,
        ViewKind::GenreRating,
        ViewKind::YearTrend,
        ViewKind::TopMovies,
    ];

    /// Short identifier used in logs and errors.
    pub fn id(&self) -> &'static str {
        match self {
            ViewKind::GenreDistribution => "genre-distribution",
            ViewKind::GenreRating => "genre-rating",
            ViewKind::YearTrend => "year-trend",
            ViewKind::TopMovies => "top-movies",
        }
    }

    /// Question the view answers, used as the report heading.
    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::GenreDistribution => "Q1: How popular are the different genres?",
            ViewKind::GenreRating => "Q2: Which genres get the highest ratings?",
            ViewKind::YearTrend => "Q3: How do ratings change over years?",
            ViewKind::TopMovies => "Q4: Highest Rated Movies",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One slice of the genre pie chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreShare {
    pub genre: String,
    pub count: usize,
    /// Share of all ratings, in percent.
    pub pct: f64,
}

/// Mean rating of one genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRating {
    pub genre: String,
    pub avg_rating: f64,
    pub num_ratings: usize,
}

/// One point on the rating-by-year line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub year: i32,
    /// Centered rolling mean; `None` where the window runs off either end.
    pub avg_smoothed: Option<f64>,
    pub n_ratings: usize,
    pub avg_rating: f64,
}

/// Year trend output together with the resolved year range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTrend {
    /// Inclusive range actually applied, if the table had any years.
    pub year_range: Option<(i32, i32)>,
    pub smooth_window: usize,
    pub points: Vec<YearPoint>,
}

/// One bar of the top movies chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMovie {
    pub movie_id: u64,
    pub title: String,
    pub avg_rating: f64,
    pub n_ratings: usize,
}

/// Metadata about a dashboard run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the ratings file.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Rows in the source table.
    pub total_ratings: usize,
    /// Distinct movie ids in the source table.
    pub distinct_movies: usize,
    /// Views included in this report.
    pub views: Vec<ViewKind>,
    /// Wall time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// Everything one dashboard run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    /// Parameters the views were computed with.
    pub parameters: crate::config::ViewsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_distribution: Option<Vec<GenreShare>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_rating: Option<Vec<GenreRating>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_trend: Option<YearTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_movies: Option<Vec<TopMovie>>,
    /// First rows of the raw table, when a preview was requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preview: Vec<RatingRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_ids_are_unique() {
        let ids: std::collections::HashSet<_> = ViewKind::ALL.iter().map(|v| v.id()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(ViewKind::YearTrend.to_string(), "year-trend");
    }

    #[test]
    fn test_sort_order_serde() {
        let json = serde_json::to_string(&SortOrder::Asc).unwrap();
        assert_eq!(json, "\"asc\"");
        let parsed: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(parsed, SortOrder::Desc);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }

    #[test]
    fn test_record_defaults_for_missing_fields() {
        let record: RatingRecord = serde_json::from_str(r#"{"title": "Heat"}"#).unwrap();
        assert_eq!(record.title, "Heat");
        assert_eq!(record.movie_id, 0);
        assert!(record.genres.is_empty());
    }
}
