//! Markdown and JSON report generation.
//!
//! Each view becomes one section holding the exact table its chart would
//! plot: a pie for genre shares, bars for genre and movie ratings, a line
//! for the year trend.

use crate::config::ViewsConfig;
use crate::models::{
    DashboardReport, GenreRating, GenreShare, RatingRecord, ReportMetadata, TopMovie, ViewKind,
    YearTrend,
};
use anyhow::Result;

const EMPTY_VIEW: &str = "_No data matches the current filters._\n\n";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# MovieDash Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));

    for view in &report.metadata.views {
        let body = match view {
            ViewKind::GenreDistribution => report
                .genre_distribution
                .as_deref()
                .map(|shares| generate_genre_distribution_section(shares, &report.parameters)),
            ViewKind::GenreRating => report
                .genre_rating
                .as_deref()
                .map(|genres| generate_genre_rating_section(genres, &report.parameters)),
            ViewKind::YearTrend => report
                .year_trend
                .as_ref()
                .map(|trend| generate_year_trend_section(trend, &report.parameters)),
            ViewKind::TopMovies => report
                .top_movies
                .as_deref()
                .map(|movies| generate_top_movies_section(movies, &report.parameters)),
        };

        if let Some(body) = body {
            output.push_str(&format!("## {}\n\n", view.title()));
            output.push_str(&body);
        }
    }

    if !report.preview.is_empty() {
        output.push_str(&generate_preview_section(&report.preview));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Ratings:** {}\n", metadata.total_ratings));
    section.push_str(&format!("- **Movies:** {}\n", metadata.distinct_movies));
    section.push_str(&format!(
        "- **Compute Time:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(report: &DashboardReport) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    for view in &report.metadata.views {
        toc.push_str(&format!("- [{}](#{})\n", view.title(), anchor(view.title())));
    }
    if !report.preview.is_empty() {
        toc.push_str("- [Raw Data Preview](#raw-data-preview)\n");
    }
    toc.push('\n');

    toc
}

/// Genre distribution as pie slices.
fn generate_genre_distribution_section(shares: &[GenreShare], params: &ViewsConfig) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "*Count of ratings per genre. Genres below {:.1}% are combined into 'Other'.*\n\n",
        params.min_pct
    ));

    if shares.is_empty() {
        section.push_str(EMPTY_VIEW);
        return section;
    }

    section.push_str("| Genre | Ratings | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for share in shares {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            cell(&share.genre),
            share.count,
            share.pct
        ));
    }
    section.push('\n');

    section
}

/// Average rating per genre as bars.
fn generate_genre_rating_section(genres: &[GenreRating], params: &ViewsConfig) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "*Mean rating per genre with at least {} ratings, sorted {}.*\n\n",
        params.min_ratings, params.sort_order
    ));

    if genres.is_empty() {
        section.push_str(EMPTY_VIEW);
        return section;
    }

    section.push_str("| Genre | Avg Rating | Ratings |\n");
    section.push_str("|:---|---:|---:|\n");
    for genre in genres {
        section.push_str(&format!(
            "| {} | {:.2} | {} |\n",
            cell(&genre.genre),
            genre.avg_rating,
            genre.num_ratings
        ));
    }
    section.push('\n');

    section
}

/// Rating trend by release year as a line.
fn generate_year_trend_section(trend: &YearTrend, params: &ViewsConfig) -> String {
    let mut section = String::new();

    let range = match trend.year_range {
        Some((from, to)) => format!("{}-{}", from, to),
        None => "all years".to_string(),
    };
    section.push_str(&format!(
        "*Average rating per release year ({}), years with at least {} ratings, smoothing window {}.*\n\n",
        range, params.min_count_year, trend.smooth_window
    ));

    if trend.points.is_empty() {
        section.push_str(EMPTY_VIEW);
        return section;
    }

    section.push_str("| Year | Avg (smoothed) | Avg Rating | Ratings |\n");
    section.push_str("|:---:|---:|---:|---:|\n");
    for point in &trend.points {
        let smoothed = point
            .avg_smoothed
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a".to_string());
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} |\n",
            point.year, smoothed, point.avg_rating, point.n_ratings
        ));
    }
    section.push('\n');

    section
}

/// Top movies as horizontal bars.
fn generate_top_movies_section(movies: &[TopMovie], params: &ViewsConfig) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "*Top {} Movies (Min {} Ratings)*\n\n",
        params.top_n, params.min_movie_ratings
    ));

    if movies.is_empty() {
        section.push_str(EMPTY_VIEW);
        return section;
    }

    section.push_str("| # | Movie Title | Avg Rating | Ratings |\n");
    section.push_str("|---:|:---|---:|---:|\n");
    for (i, movie) in movies.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {} |\n",
            i + 1,
            cell(&movie.title),
            movie.avg_rating,
            movie.n_ratings
        ));
    }
    section.push('\n');

    section
}

/// First rows of the raw table.
fn generate_preview_section(rows: &[RatingRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Raw Data Preview\n\n");
    section.push_str(&format!("*First {} rows.*\n\n", rows.len()));
    section.push_str("| movie_id | title | genres | rating | year |\n");
    section.push_str("|---:|:---|:---|---:|:---:|\n");
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.movie_id,
            cell(&row.title),
            cell(&row.genres),
            row.rating,
            row.year
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by MovieDash*\n".to_string()
}

fn anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearPoint;
    use chrono::Utc;

    fn create_test_report() -> DashboardReport {
        DashboardReport {
            metadata: ReportMetadata {
                source: "data/movie_ratings.csv".to_string(),
                generated_at: Utc::now(),
                total_ratings: 12,
                distinct_movies: 2,
                views: ViewKind::ALL.to_vec(),
                duration_seconds: 0.01,
            },
            parameters: ViewsConfig::default(),
            genre_distribution: Some(vec![
                GenreShare {
                    genre: "Comedy".to_string(),
                    count: 10,
                    pct: 83.333,
                },
                GenreShare {
                    genre: "Other".to_string(),
                    count: 2,
                    pct: 16.667,
                },
            ]),
            genre_rating: Some(vec![GenreRating {
                genre: "Comedy".to_string(),
                avg_rating: 4.0,
                num_ratings: 10,
            }]),
            year_trend: Some(YearTrend {
                year_range: Some((2000, 2002)),
                smooth_window: 3,
                points: vec![
                    YearPoint {
                        year: 2000,
                        avg_smoothed: None,
                        n_ratings: 4,
                        avg_rating: 3.5,
                    },
                    YearPoint {
                        year: 2001,
                        avg_smoothed: Some(3.25),
                        n_ratings: 8,
                        avg_rating: 3.0,
                    },
                ],
            }),
            top_movies: Some(Vec::new()),
            preview: vec![RatingRecord::new(1, "A | B", "Comedy", 4.0, 2000)],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.contains("# MovieDash Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Q1: How popular are the different genres?"));
        assert!(markdown.contains("| Comedy | 10 | 83.3% |"));
        assert!(markdown.contains("| Other | 2 | 16.7% |"));
        assert!(markdown.contains("sorted High → Low"));
        assert!(markdown.contains("| 2000 | n/a | 3.50 | 4 |"));
        assert!(markdown.contains("| 2001 | 3.25 | 3.00 | 8 |"));
        assert!(markdown.contains("*Top 5 Movies (Min 50 Ratings)*"));
        assert!(markdown.contains(EMPTY_VIEW));
        assert!(markdown.contains("## Raw Data Preview"));
        assert!(markdown.contains("A \\| B"));
    }

    #[test]
    fn test_only_selected_views_are_rendered() {
        let mut report = create_test_report();
        report.metadata.views = vec![ViewKind::GenreRating];
        report.genre_distribution = None;
        report.year_trend = None;
        report.top_movies = None;
        report.preview.clear();

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("## Q2: Which genres get the highest ratings?"));
        assert!(!markdown.contains("## Q1"));
        assert!(!markdown.contains("## Q3"));
        assert!(!markdown.contains("Raw Data Preview"));
    }

    #[test]
    fn test_anchor() {
        assert_eq!(
            anchor("Q4: Highest Rated Movies"),
            "q4-highest-rated-movies"
        );
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["total_ratings"], 12);
        assert_eq!(value["genre_distribution"][1]["genre"], "Other");
        assert!(value["year_trend"]["points"][0]["avg_smoothed"].is_null());
        assert_eq!(value["parameters"]["sort_order"], "desc");
        assert_eq!(value["metadata"]["views"][0], "genre-distribution");
    }
}
