//! MovieDash library.
//!
//! Loads a movie ratings table and computes the four dashboard views:
//! genre distribution, average rating by genre, rating trend by year and
//! top-rated movies. Every view is a pure function of the table and its
//! parameters; see [`analysis`].

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod report;

pub use error::{DashboardError, DashboardResult};
