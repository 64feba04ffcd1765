//! Climate API - read-only HTTP access to a weather-observation dataset
//!
//! This library provides the storage access, query logic and HTTP wiring
//! for serving precipitation, station and temperature views over the
//! `station` and `measurement` relations.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use crate::config::ClimateApiConfig;
pub use error::ClimateApiError;
pub use models::{DateRangeSummary, Measurement, RangeFromSummary, Station, TemperatureStats};
pub use service::QueryService;
pub use store::{ClimateRepository, MemoryRepository, SqliteRepository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimateApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
