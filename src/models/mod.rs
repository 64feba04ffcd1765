//! Data models for the climate API
//!
//! This module contains the dataset records and the response shapes:
//! - Station: fixed reporting locations
//! - Measurement: per-date precipitation and temperature observations
//! - Summary: temperature aggregates and dataset overview

pub mod measurement;
pub mod station;
pub mod summary;

// Re-export all public types for convenient access
pub use measurement::{Measurement, is_iso_date, prior_year_cutoff};
pub use station::Station;
pub use summary::{DatasetSummary, DateRangeSummary, RangeFromSummary, TemperatureStats};
