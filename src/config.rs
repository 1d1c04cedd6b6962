//! Configuration file handling.
//!
//! This module handles loading `.moviedash.toml` and merging it with
//! command-line overrides. Defaults match the dashboard's widget defaults.

use crate::analysis::views::check_range;
use crate::analysis::{
    GenreDistributionParams, GenreRatingParams, TopMoviesParams, YearTrendParams,
};
use crate::cli::OutputFormat;
use crate::error::DashboardResult;
use crate::models::SortOrder;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".moviedash.toml";

/// Accepted `min_pct` setting. The pipeline itself takes any percentage.
const MIN_PCT_SETTING: RangeInclusive<f64> = 0.0..=10.0;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// View parameters.
    #[serde(default)]
    pub views: ViewsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Report format when `--format` is not given.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose output by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of raw rows to include in the report (0 disables the preview).
    #[serde(default)]
    pub preview_rows: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            verbose: false,
            preview_rows: 0,
        }
    }
}

impl GeneralConfig {
    /// Log level for this run; `--quiet` wins over a verbose config.
    pub fn log_level(&self, quiet: bool) -> Level {
        if quiet {
            Level::ERROR
        } else if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

fn default_output() -> String {
    "moviedash_report.md".to_string()
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the ratings CSV.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Split pipe-separated genre lists into one row per genre.
    #[serde(default)]
    pub explode_genres: bool,

    /// How long a loaded table stays valid in a reused `TableCache`.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            explode_genres: false,
            cache_ttl_seconds: default_cache_ttl(),
        }
    }
}

impl DataConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/movie_ratings.csv")
}

fn default_cache_ttl() -> u64 {
    3600
}

/// Parameters of the four views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// Genres below this share (percent) are merged into "Other".
    #[serde(default = "default_min_pct")]
    pub min_pct: f64,

    /// Minimum ratings per genre.
    #[serde(default = "default_min_ratings")]
    pub min_ratings: u32,

    /// Genre rating sort order.
    #[serde(default)]
    pub sort_order: SortOrder,

    /// First year of the trend (defaults to the earliest year in the data).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_from: Option<i32>,

    /// Last year of the trend (defaults to the latest year in the data).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_to: Option<i32>,

    /// Minimum ratings per year.
    #[serde(default = "default_min_count_year")]
    pub min_count_year: u32,

    /// Smoothing window in years.
    #[serde(default = "default_smooth_window")]
    pub smooth_window: usize,

    /// Minimum ratings per movie.
    #[serde(default = "default_min_movie_ratings")]
    pub min_movie_ratings: u32,

    /// Number of top movies to show.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            min_pct: default_min_pct(),
            min_ratings: default_min_ratings(),
            sort_order: SortOrder::default(),
            year_from: None,
            year_to: None,
            min_count_year: default_min_count_year(),
            smooth_window: default_smooth_window(),
            min_movie_ratings: default_min_movie_ratings(),
            top_n: default_top_n(),
        }
    }
}

fn default_min_pct() -> f64 {
    2.0
}

fn default_min_ratings() -> u32 {
    50
}

fn default_min_count_year() -> u32 {
    50
}

fn default_smooth_window() -> usize {
    1
}

fn default_min_movie_ratings() -> u32 {
    50
}

fn default_top_n() -> usize {
    5
}

impl ViewsConfig {
    pub fn genre_distribution(&self) -> GenreDistributionParams {
        GenreDistributionParams {
            min_pct: self.min_pct,
        }
    }

    pub fn genre_rating(&self) -> GenreRatingParams {
        GenreRatingParams {
            min_ratings: self.min_ratings,
            sort_order: self.sort_order,
        }
    }

    /// Year trend parameters, given the table's year span for open ends.
    ///
    /// An open end never crosses the given one, so a bound outside the data
    /// yields an empty trend rather than an inverted range.
    pub fn year_trend(&self, bounds: Option<(i32, i32)>) -> YearTrendParams {
        let year_range = match (self.year_from, self.year_to, bounds) {
            (None, None, _) => None,
            (Some(from), Some(to), _) => Some((from, to)),
            (Some(from), None, Some((_, max))) => Some((from, max.max(from))),
            (None, Some(to), Some((min, _))) => Some((min.min(to), to)),
            // Empty table: nothing to fill the open end with, nothing to show.
            (Some(year), None, None) | (None, Some(year), None) => Some((year, year)),
        };

        YearTrendParams {
            year_range,
            min_count_year: self.min_count_year,
            smooth_window: self.smooth_window,
        }
    }

    pub fn top_movies(&self) -> TopMoviesParams {
        TopMoviesParams {
            min_movie_ratings: self.min_movie_ratings,
            top_n: self.top_n,
        }
    }

    /// Check every parameter up front, independent of the data.
    pub fn validate(&self) -> DashboardResult<()> {
        check_range("min_pct", self.min_pct, &MIN_PCT_SETTING)?;
        self.genre_distribution().validate()?;
        self.genre_rating().validate()?;
        self.year_trend(None).validate()?;
        self.top_movies().validate()
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }
        if let Some(rows) = args.preview {
            self.general.preview_rows = rows;
        }

        if let Some(ref path) = args.data {
            self.data.path = path.clone();
        }
        if args.explode_genres {
            self.data.explode_genres = true;
        }
        if let Some(ttl) = args.cache_ttl {
            self.data.cache_ttl_seconds = ttl;
        }

        let views = &mut self.views;
        if let Some(min_pct) = args.min_pct {
            views.min_pct = min_pct;
        }
        if let Some(min_ratings) = args.min_ratings {
            views.min_ratings = min_ratings;
        }
        if let Some(sort_order) = args.sort_order {
            views.sort_order = sort_order;
        }
        if args.year_from.is_some() {
            views.year_from = args.year_from;
        }
        if args.year_to.is_some() {
            views.year_to = args.year_to;
        }
        if let Some(min_count_year) = args.min_count_year {
            views.min_count_year = min_count_year;
        }
        if let Some(smooth_window) = args.smooth_window {
            views.smooth_window = smooth_window;
        }
        if let Some(min_movie_ratings) = args.min_movie_ratings {
            views.min_movie_ratings = min_movie_ratings;
        }
        if let Some(top_n) = args.top_n {
            views.top_n = top_n;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
