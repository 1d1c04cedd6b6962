//! Ratings data: CSV loading and the load-once table cache.

pub mod cache;
pub mod loader;

pub use cache::TableCache;
pub use loader::{load_csv, LoadOptions, RatingsTable};
