//! Running the selected views against one table.

use super::views::{genre_distribution, genre_rating, top_movies, year_trend};
use crate::config::ViewsConfig;
use crate::data::RatingsTable;
use crate::error::DashboardResult;
use crate::models::{DashboardReport, ReportMetadata, ViewKind};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info};

/// Inputs for one dashboard run besides the table itself.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    /// Label for the data source shown in the report.
    pub source: String,
    /// Views to compute, in any order.
    pub views: Vec<ViewKind>,
    pub params: ViewsConfig,
    /// Raw rows to include in the report.
    pub preview_rows: usize,
}

/// Compute every requested view. Any pipeline error aborts the whole run.
pub fn build_report(
    table: &RatingsTable,
    request: &DashboardRequest,
) -> DashboardResult<DashboardReport> {
    let start = Instant::now();
    request.params.validate()?;

    let mut views = request.views.clone();
    views.sort();
    views.dedup();

    let mut report = DashboardReport {
        metadata: ReportMetadata {
            source: request.source.clone(),
            generated_at: Utc::now(),
            total_ratings: table.len(),
            distinct_movies: table.distinct_movies(),
            views: views.clone(),
            duration_seconds: 0.0,
        },
        parameters: request.params.clone(),
        genre_distribution: None,
        genre_rating: None,
        year_trend: None,
        top_movies: None,
        preview: table.rows().iter().take(request.preview_rows).cloned().collect(),
    };

    for view in &views {
        debug!("Computing view: {}", view);
        match view {
            ViewKind::GenreDistribution => {
                report.genre_distribution =
                    Some(genre_distribution(table, &request.params.genre_distribution())?);
            }
            ViewKind::GenreRating => {
                report.genre_rating = Some(genre_rating(table, &request.params.genre_rating())?);
            }
            ViewKind::YearTrend => {
                let params = request.params.year_trend(table.year_bounds());
                report.year_trend = Some(year_trend(table, &params)?);
            }
            ViewKind::TopMovies => {
                report.top_movies = Some(top_movies(table, &request.params.top_movies())?);
            }
        }
    }

    report.metadata.duration_seconds = start.elapsed().as_secs_f64();
    info!(
        "Computed {} views over {} ratings in {:.3}s",
        views.len(),
        table.len(),
        report.metadata.duration_seconds
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::models::RatingRecord;

    fn table() -> RatingsTable {
        let mut rows = vec![RatingRecord::new(1, "A", "Comedy", 4.0, 2000); 10];
        rows.extend(vec![RatingRecord::new(2, "B", "Drama", 2.0, 2001); 2]);
        RatingsTable::from_records(rows)
    }

    fn request(views: Vec<ViewKind>) -> DashboardRequest {
        DashboardRequest {
            source: "test.csv".to_string(),
            views,
            params: ViewsConfig {
                min_ratings: 0,
                min_count_year: 0,
                min_movie_ratings: 1,
                ..Default::default()
            },
            preview_rows: 0,
        }
    }

    #[test]
    fn test_build_report_all_views() {
        let report = build_report(&table(), &request(ViewKind::ALL.to_vec())).unwrap();

        assert_eq!(report.metadata.total_ratings, 12);
        assert_eq!(report.metadata.distinct_movies, 2);
        assert_eq!(report.metadata.views, ViewKind::ALL.to_vec());
        assert_eq!(report.genre_distribution.as_ref().map(Vec::len), Some(2));
        assert_eq!(report.genre_rating.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            report.year_trend.as_ref().map(|t| t.points.len()),
            Some(2)
        );
        assert_eq!(report.top_movies.as_ref().map(|m| m[0].title.as_str()), Some("A"));
        assert!(report.preview.is_empty());
    }

    #[test]
    fn test_build_report_subset_and_preview() {
        let mut req = request(vec![ViewKind::TopMovies, ViewKind::TopMovies]);
        req.preview_rows = 3;

        let report = build_report(&table(), &req).unwrap();

        assert_eq!(report.metadata.views, vec![ViewKind::TopMovies]);
        assert!(report.genre_distribution.is_none());
        assert!(report.year_trend.is_none());
        assert!(report.top_movies.is_some());
        assert_eq!(report.preview.len(), 3);
    }

    #[test]
    fn test_build_report_year_from_after_data() {
        let mut req = request(vec![ViewKind::YearTrend]);
        req.params.year_from = Some(2050);

        let report = build_report(&table(), &req).unwrap();
        let trend = report.year_trend.unwrap();
        assert_eq!(trend.year_range, Some((2050, 2050)));
        assert!(trend.points.is_empty());
    }

    #[test]
    fn test_build_report_rejects_invalid_params_before_running() {
        let mut req = request(vec![ViewKind::GenreDistribution]);
        req.params.top_n = 1;

        let err = build_report(&table(), &req).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidParameter { name: "top_n", .. }
        ));
    }

    #[test]
    fn test_build_report_surfaces_missing_column() {
        let table = RatingsTable::with_columns(&["movie_id", "title", "rating", "year"], Vec::new());
        let err = build_report(&table, &request(ViewKind::ALL.to_vec())).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { .. }));
    }
}
