//! Analysis modules.
//!
//! Grouping primitives, the four view pipelines, and the dashboard run
//! that ties them together.

pub mod aggregator;
pub mod dashboard;
pub mod views;

pub use dashboard::{build_report, DashboardRequest};
pub use views::*;
