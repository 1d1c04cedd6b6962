//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values. View parameters are optional
//! here so that unset flags fall back to the config file.

use crate::models::{SortOrder, ViewKind};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// MovieDash - movie ratings analytics
///
/// Answers four questions about a movie ratings table (genre popularity,
/// average rating by genre, rating trend by year, top-rated movies) and
/// writes the chart-ready tables as a Markdown or JSON report.
///
/// Examples:
///   moviedash --data data/movie_ratings.csv
///   moviedash --view top-movies --top-n 10 --min-movie-ratings 100
///   moviedash --year-from 1990 --smooth-window 3 --format json -o trend.json
///   moviedash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the ratings CSV (movie_id, title, genres, rating, year)
    #[arg(short, long, value_name = "FILE", env = "MOVIEDASH_DATA")]
    pub data: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json) [default: markdown]
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .moviedash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Views to include (comma-separated, default: all)
    #[arg(long, value_name = "VIEWS", value_delimiter = ',')]
    pub view: Option<Vec<ViewKind>>,

    /// Merge genres below this share into "Other" (percent, 0-10)
    #[arg(long, value_name = "PCT")]
    pub min_pct: Option<f64>,

    /// Minimum ratings per genre for the genre rating view
    #[arg(long, value_name = "COUNT")]
    pub min_ratings: Option<u32>,

    /// Sort order for the genre rating view
    #[arg(long, value_name = "ORDER")]
    pub sort_order: Option<SortOrder>,

    /// First release year of the trend view (inclusive)
    #[arg(long, value_name = "YEAR", allow_negative_numbers = true)]
    pub year_from: Option<i32>,

    /// Last release year of the trend view (inclusive)
    #[arg(long, value_name = "YEAR", allow_negative_numbers = true)]
    pub year_to: Option<i32>,

    /// Minimum ratings per year for the trend view
    #[arg(long, value_name = "COUNT")]
    pub min_count_year: Option<u32>,

    /// Centered moving average width in years (1-9, 1 disables smoothing)
    #[arg(long, value_name = "YEARS")]
    pub smooth_window: Option<usize>,

    /// Minimum ratings per movie for the top movies view
    #[arg(long, value_name = "COUNT")]
    pub min_movie_ratings: Option<u32>,

    /// Number of top movies to show (3-25)
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Include the first rows of the raw data in the report
    #[arg(long, value_name = "ROWS", num_args = 0..=1, default_missing_value = "50")]
    pub preview: Option<usize>,

    /// Split pipe-separated genre lists ("Action|Comedy") into one row per genre
    #[arg(long)]
    pub explode_genres: bool,

    /// Seconds a loaded table stays cached
    ///
    /// Applies to library callers that reuse a TableCache. A single run
    /// loads the file once, so this has no effect on one invocation.
    #[arg(long, value_name = "SECS")]
    pub cache_ttl: Option<u64>,

    /// Generate a default .moviedash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    ///
    /// Range checks on view parameters happen after merging with the
    /// config file, so only flag combinations are checked here.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref views) = self.view {
            if views.is_empty() {
                return Err("--view needs at least one view".to_string());
            }
        }

        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(format!(
                    "--year-from ({}) must not be after --year-to ({})",
                    from, to
                ));
            }
        }

        if let Some(ref data) = self.data {
            if data.is_dir() {
                return Err(format!("Data path is a directory: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the views to run.
    pub fn effective_views(&self) -> Vec<ViewKind> {
        self.view
            .clone()
            .unwrap_or_else(|| ViewKind::ALL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["moviedash"];
        argv.extend_from_slice(args);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert!(args.format.is_none());
        assert!(args.min_pct.is_none());
        assert!(args.preview.is_none());
        assert_eq!(args.effective_views(), ViewKind::ALL.to_vec());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_view_list() {
        let args = parse(&["--view", "year-trend,top-movies"]);
        assert_eq!(
            args.effective_views(),
            vec![ViewKind::YearTrend, ViewKind::TopMovies]
        );
    }

    #[test]
    fn test_preview_default_rows() {
        assert_eq!(parse(&["--preview"]).preview, Some(50));
        assert_eq!(parse(&["--preview", "5"]).preview, Some(5));
    }

    #[test]
    fn test_sort_order_aliases() {
        assert_eq!(
            parse(&["--sort-order", "ascending"]).sort_order,
            Some(SortOrder::Asc)
        );
        assert_eq!(
            parse(&["--sort-order", "desc"]).sort_order,
            Some(SortOrder::Desc)
        );
    }

    #[test]
    fn test_validation_conflicting_options() {
        let args = parse(&["--verbose", "--quiet"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_year_order() {
        let args = parse(&["--year-from", "2000", "--year-to", "1990"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_format_flag() {
        assert_eq!(parse(&["--format", "json"]).format, Some(OutputFormat::Json));
        assert_eq!(
            parse(&["--format", "markdown"]).format,
            Some(OutputFormat::Markdown)
        );
    }
}
