//! Loading the ratings CSV into an immutable in-memory table.

use crate::error::{DashboardError, DashboardResult};
use crate::models::{RatingRecord, ViewKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Column names the loader understands.
pub const COLUMNS: [&str; 5] = ["movie_id", "title", "genres", "rating", "year"];

/// Options for loading a ratings file.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Split pipe-separated genre lists into one row per genre.
    pub explode_genres: bool,
    /// Whether to show a spinner while reading.
    pub show_progress: bool,
}

/// The source table: rows plus the set of columns the file actually had.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingsTable {
    columns: BTreeSet<String>,
    rows: Vec<RatingRecord>,
}

impl RatingsTable {
    /// Build a table with every known column present.
    pub fn from_records(rows: Vec<RatingRecord>) -> Self {
        Self::with_columns(&COLUMNS, rows)
    }

    /// Build a table that only claims the given columns.
    pub fn with_columns(columns: &[&str], rows: Vec<RatingRecord>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn rows(&self) -> &[RatingRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Fail with `MissingColumn` unless every listed column is present.
    pub fn require(&self, view: ViewKind, columns: &[&'static str]) -> DashboardResult<()> {
        match columns.iter().find(|c| !self.has_column(c)) {
            Some(&column) => Err(DashboardError::MissingColumn {
                view: view.id(),
                column,
            }),
            None => Ok(()),
        }
    }

    /// Smallest and largest release year, or `None` for an empty table.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    pub fn distinct_movies(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.movie_id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Split `Action|Comedy` style genre lists into one row per label.
    pub fn explode_genres(self) -> Self {
        let mut rows = Vec::with_capacity(self.rows.len());

        for record in self.rows {
            if !record.genres.contains('|') {
                rows.push(record);
                continue;
            }
            let labels: Vec<&str> = record
                .genres
                .split('|')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .collect();
            // A field of bare separators keeps its row and label.
            if labels.is_empty() {
                rows.push(record);
                continue;
            }
            for genre in labels {
                rows.push(RatingRecord {
                    genres: genre.to_string(),
                    ..record.clone()
                });
            }
        }

        Self {
            columns: self.columns,
            rows,
        }
    }
}

/// Load a ratings CSV from disk.
pub fn load_csv(path: &Path, options: &LoadOptions) -> DashboardResult<RatingsTable> {
    info!("Loading ratings from: {}", path.display());

    let file = File::open(path).map_err(|e| DashboardError::unavailable(path, e))?;

    let spinner = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Reading {}", path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = read_table(file, path, options);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let table = result?;
    info!(
        "Loaded {} ratings for {} movies",
        table.len(),
        table.distinct_movies()
    );
    Ok(table)
}

/// Parse a ratings table from any reader. `source` is only used in errors.
pub fn read_table<R: Read>(
    reader: R,
    source: &Path,
    options: &LoadOptions,
) -> DashboardResult<RatingsTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DashboardError::unavailable(source, e))?
        .clone();
    let columns: Vec<&str> = headers.iter().collect();
    debug!("CSV columns: {:?}", columns);

    let known: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|c| columns.contains(c))
        .collect();

    let mut rows = Vec::new();
    for record in rdr.deserialize::<RatingRecord>() {
        rows.push(record.map_err(|e| DashboardError::unavailable(source, e))?);
    }

    let table = RatingsTable::with_columns(&known, rows);
    if options.explode_genres {
        let before = table.len();
        let table = table.explode_genres();
        debug!("Exploded genres: {} rows -> {} rows", before, table.len());
        return Ok(table);
    }

    Ok(table)
}
