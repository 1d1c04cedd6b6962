//! Error types for loading the ratings table and running views.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the loader and the aggregation pipelines.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Source file missing, unreadable, or not the expected CSV
    #[error("Cannot read ratings data from '{}': {reason}", .path.display())]
    DataSourceUnavailable { path: PathBuf, reason: String },

    /// A view needs a column the source table does not have
    #[error("View '{view}' requires column '{column}', which is missing from the data")]
    MissingColumn { view: &'static str, column: &'static str },

    /// Parameter outside its accepted range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl DashboardError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DataSourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for loader and pipeline operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DashboardError::unavailable("data/movie_ratings.csv", "No such file");
        assert_eq!(
            err.to_string(),
            "Cannot read ratings data from 'data/movie_ratings.csv': No such file"
        );

        let err = DashboardError::MissingColumn {
            view: "genre-rating",
            column: "rating",
        };
        assert!(err.to_string().contains("'rating'"));

        let err = DashboardError::invalid("top_n", "must be between 3 and 25");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'top_n': must be between 3 and 25"
        );
    }
}
