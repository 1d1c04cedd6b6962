//! The four view pipelines.
//!
//! Each pipeline is a pure function of the source table and its parameters:
//! validate parameters, check required columns, group, filter, sort.

use super::aggregator::{centered_rolling_mean, group_stats};
use crate::data::RatingsTable;
use crate::error::{DashboardError, DashboardResult};
use crate::models::{
    GenreRating, GenreShare, SortOrder, TopMovie, ViewKind, YearPoint, YearTrend, OTHER_GENRE,
};
use std::ops::RangeInclusive;
use tracing::debug;

const MIN_PCT: RangeInclusive<f64> = 0.0..=100.0;
const MIN_RATINGS: RangeInclusive<u32> = 0..=10_000;
const MIN_COUNT_YEAR: RangeInclusive<u32> = 0..=100_000;
const SMOOTH_WINDOW: RangeInclusive<usize> = 1..=9;
const MIN_MOVIE_RATINGS: RangeInclusive<u32> = 1..=100_000;
const TOP_N: RangeInclusive<usize> = 3..=25;

pub(crate) fn check_range<T>(name: &'static str, value: T, range: &RangeInclusive<T>) -> DashboardResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(DashboardError::invalid(
            name,
            format!(
                "{} is outside {}..={}",
                value,
                range.start(),
                range.end()
            ),
        ))
    }
}

/// Parameters for the genre distribution view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreDistributionParams {
    /// Genres with a smaller share (percent) are merged into "Other".
    pub min_pct: f64,
}

impl GenreDistributionParams {
    pub fn validate(&self) -> DashboardResult<()> {
        check_range("min_pct", self.min_pct, &MIN_PCT)
    }
}

/// Share of ratings per genre, with small genres folded into "Other".
///
/// Major genres come first in genre order; "Other" is appended last and only
/// when at least one genre falls below the threshold.
pub fn genre_distribution(
    table: &RatingsTable,
    params: &GenreDistributionParams,
) -> DashboardResult<Vec<GenreShare>> {
    params.validate()?;
    table.require(ViewKind::GenreDistribution, &["genres"])?;

    let total = table.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut major = Vec::new();
    let mut other = GenreShare {
        genre: OTHER_GENRE.to_string(),
        count: 0,
        pct: 0.0,
    };
    let mut has_minor = false;

    for (genre, stats) in group_stats(table.rows(), |r| r.genres.as_str()) {
        let pct = 100.0 * stats.count as f64 / total as f64;
        if pct >= params.min_pct {
            major.push(GenreShare {
                genre: genre.to_string(),
                count: stats.count,
                pct,
            });
        } else {
            has_minor = true;
            other.count += stats.count;
            other.pct += pct;
        }
    }

    if has_minor {
        // A real "Other" genre absorbs the merged remainder instead of
        // producing a second slice with the same label.
        match major.iter_mut().find(|s| s.genre == OTHER_GENRE) {
            Some(existing) => {
                existing.count += other.count;
                existing.pct += other.pct;
            }
            None => major.push(other),
        }
    }

    debug!(
        "genre-distribution: {} slices (min_pct={})",
        major.len(),
        params.min_pct
    );
    Ok(major)
}

/// Parameters for the genre rating view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreRatingParams {
    /// Genres with fewer ratings are dropped.
    pub min_ratings: u32,
    pub sort_order: SortOrder,
}

impl GenreRatingParams {
    pub fn validate(&self) -> DashboardResult<()> {
        check_range("min_ratings", self.min_ratings, &MIN_RATINGS)
    }
}

/// Mean rating per genre, filtered by count and sorted by mean.
///
/// The sort is stable, so genres with equal means stay in genre order.
pub fn genre_rating(
    table: &RatingsTable,
    params: &GenreRatingParams,
) -> DashboardResult<Vec<GenreRating>> {
    params.validate()?;
    table.require(ViewKind::GenreRating, &["genres", "rating"])?;

    let mut genres: Vec<GenreRating> = group_stats(table.rows(), |r| r.genres.as_str())
        .into_iter()
        .filter(|(_, stats)| stats.count >= params.min_ratings as usize)
        .map(|(genre, stats)| GenreRating {
            genre: genre.to_string(),
            avg_rating: stats.mean(),
            num_ratings: stats.count,
        })
        .collect();

    match params.sort_order {
        SortOrder::Desc => genres.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating)),
        SortOrder::Asc => genres.sort_by(|a, b| a.avg_rating.total_cmp(&b.avg_rating)),
    }

    debug!(
        "genre-rating: {} genres (min_ratings={}, order={:?})",
        genres.len(),
        params.min_ratings,
        params.sort_order
    );
    Ok(genres)
}

/// Parameters for the year trend view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearTrendParams {
    /// Inclusive year range; `None` uses the table's full span.
    pub year_range: Option<(i32, i32)>,
    /// Years with fewer ratings are dropped.
    pub min_count_year: u32,
    /// Width of the centered moving average; 1 disables smoothing.
    pub smooth_window: usize,
}

impl YearTrendParams {
    pub fn validate(&self) -> DashboardResult<()> {
        check_range("min_count_year", self.min_count_year, &MIN_COUNT_YEAR)?;
        check_range("smooth_window", self.smooth_window, &SMOOTH_WINDOW)?;
        if let Some((from, to)) = self.year_range {
            if from > to {
                return Err(DashboardError::invalid(
                    "year_range",
                    format!("start year {} is after end year {}", from, to),
                ));
            }
        }
        Ok(())
    }
}

/// Mean rating per release year with optional smoothing.
///
/// Smoothing runs over the filtered, year-ordered sequence, so years removed
/// by the filters do not leave gaps in the window.
pub fn year_trend(table: &RatingsTable, params: &YearTrendParams) -> DashboardResult<YearTrend> {
    params.validate()?;
    table.require(ViewKind::YearTrend, &["year", "rating"])?;

    let year_range = params.year_range.or_else(|| table.year_bounds());
    let Some((from, to)) = year_range else {
        return Ok(YearTrend {
            year_range: None,
            smooth_window: params.smooth_window,
            points: Vec::new(),
        });
    };

    let years: Vec<_> = group_stats(table.rows(), |r| r.year)
        .into_iter()
        .filter(|(year, stats)| {
            (from..=to).contains(year) && stats.count >= params.min_count_year as usize
        })
        .collect();

    let means: Vec<f64> = years.iter().map(|(_, stats)| stats.mean()).collect();
    let smoothed = centered_rolling_mean(&means, params.smooth_window);

    let points: Vec<YearPoint> = years
        .iter()
        .zip(smoothed)
        .map(|((year, stats), avg_smoothed)| YearPoint {
            year: *year,
            avg_smoothed,
            n_ratings: stats.count,
            avg_rating: stats.mean(),
        })
        .collect();

    debug!(
        "year-trend: {} years in {}..={} (window={})",
        points.len(),
        from,
        to,
        params.smooth_window
    );
    Ok(YearTrend {
        year_range: Some((from, to)),
        smooth_window: params.smooth_window,
        points,
    })
}

/// Parameters for the top movies view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopMoviesParams {
    /// Movies with fewer ratings are dropped.
    pub min_movie_ratings: u32,
    /// Number of movies to keep.
    pub top_n: usize,
}

impl TopMoviesParams {
    pub fn validate(&self) -> DashboardResult<()> {
        check_range(
            "min_movie_ratings",
            self.min_movie_ratings,
            &MIN_MOVIE_RATINGS,
        )?;
        check_range("top_n", self.top_n, &TOP_N)
    }
}

/// Highest rated movies, ranked by mean rating and then by rating count.
pub fn top_movies(table: &RatingsTable, params: &TopMoviesParams) -> DashboardResult<Vec<TopMovie>> {
    params.validate()?;
    table.require(ViewKind::TopMovies, &["movie_id", "title", "rating"])?;

    let mut movies: Vec<TopMovie> = group_stats(table.rows(), |r| (r.movie_id, r.title.as_str()))
        .into_iter()
        .filter(|(_, stats)| stats.count >= params.min_movie_ratings as usize)
        .map(|((movie_id, title), stats)| TopMovie {
            movie_id,
            title: title.to_string(),
            avg_rating: stats.mean(),
            n_ratings: stats.count,
        })
        .collect();

    movies.sort_by(|a, b| {
        b.avg_rating
            .total_cmp(&a.avg_rating)
            .then_with(|| b.n_ratings.cmp(&a.n_ratings))
    });
    movies.truncate(params.top_n);

    debug!(
        "top-movies: {} movies (min_movie_ratings={}, top_n={})",
        movies.len(),
        params.min_movie_ratings,
        params.top_n
    );
    Ok(movies)
}
