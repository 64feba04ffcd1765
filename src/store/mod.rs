//! Storage module
//!
//! Read-only access to the `station` and `measurement` relations:
//! - SQLite backend aggregating in SQL over a pooled, read-only connection
//! - In-memory backend folding over rows loaded once at startup

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Result;
use crate::models::{DatasetSummary, Station, TemperatureStats};

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// A single value observed on a date
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: String,
    pub value: f64,
}

impl DatedValue {
    #[must_use]
    pub fn new(date: &str, value: f64) -> Self {
        Self {
            date: date.to_string(),
            value,
        }
    }
}

/// Queries the service runs against the observation dataset.
///
/// Series are ordered by date, and rows sharing a date keep the order in
/// which they were stored. Dates compare as plain strings.
#[async_trait]
pub trait ClimateRepository: Send + Sync {
    /// All stations of the reference table
    async fn stations(&self) -> Result<Vec<Station>>;

    /// Non-null precipitation readings
    async fn precipitation(&self) -> Result<Vec<DatedValue>>;

    /// Distinct station ids referenced by measurements, ascending
    async fn station_ids(&self) -> Result<Vec<String>>;

    /// Greatest measurement date, `None` on an empty dataset
    async fn latest_date(&self) -> Result<Option<String>>;

    /// Non-null temperatures dated strictly after `cutoff`
    async fn temperatures_after(&self, cutoff: &str) -> Result<Vec<DatedValue>>;

    /// Temperature aggregate over `start <= date` and, when given, `date <= end`
    async fn temperature_stats(&self, start: &str, end: Option<&str>) -> Result<TemperatureStats>;

    /// Counts, date span and referential problems of the dataset
    async fn summary(&self) -> Result<DatasetSummary>;
}
