//! In-memory backend
//!
//! Holds every row in process and answers each query with a filter/fold,
//! so the database is only touched once at startup.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::info;

use super::sqlite::SqliteRepository;
use super::{ClimateRepository, DatedValue};
use crate::Result;
use crate::models::{DatasetSummary, Measurement, Station, TemperatureStats};

/// Repository over rows held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    stations: Vec<Station>,
    /// Sorted by date; rows on the same date keep their original order
    measurements: Vec<Measurement>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new(stations: Vec<Station>, mut measurements: Vec<Measurement>) -> Self {
        measurements.sort_by(|a, b| a.date.cmp(&b.date));
        Self {
            stations,
            measurements,
        }
    }

    /// Copy both relations out of a SQLite database
    pub async fn load(source: &SqliteRepository) -> Result<Self> {
        let stations = source.stations().await?;
        let measurements = source.measurements().await?;
        info!(
            "Preloaded {} stations and {} measurements into memory",
            stations.len(),
            measurements.len()
        );
        Ok(Self::new(stations, measurements))
    }

    fn in_range<'a>(
        &'a self,
        start: &'a str,
        end: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Measurement> + 'a {
        self.measurements.iter().filter(move |m| {
            m.date.as_str() >= start && end.is_none_or(|end| m.date.as_str() <= end)
        })
    }
}

#[async_trait]
impl ClimateRepository for MemoryRepository {
    async fn stations(&self) -> Result<Vec<Station>> {
        let mut stations = self.stations.clone();
        stations.sort_by(|a, b| a.station.cmp(&b.station));
        Ok(stations)
    }

    async fn precipitation(&self) -> Result<Vec<DatedValue>> {
        Ok(self
            .measurements
            .iter()
            .filter_map(|m| m.prcp.map(|prcp| DatedValue::new(&m.date, prcp)))
            .collect())
    }

    async fn station_ids(&self) -> Result<Vec<String>> {
        let ids: BTreeSet<&str> = self.measurements.iter().map(|m| m.station.as_str()).collect();
        Ok(ids.into_iter().map(str::to_string).collect())
    }

    async fn latest_date(&self) -> Result<Option<String>> {
        Ok(self.measurements.last().map(|m| m.date.clone()))
    }

    async fn temperatures_after(&self, cutoff: &str) -> Result<Vec<DatedValue>> {
        Ok(self
            .measurements
            .iter()
            .filter(|m| m.date.as_str() > cutoff)
            .filter_map(|m| m.tobs.map(|tobs| DatedValue::new(&m.date, tobs)))
            .collect())
    }

    async fn temperature_stats(&self, start: &str, end: Option<&str>) -> Result<TemperatureStats> {
        Ok(TemperatureStats::from_temperatures(
            self.in_range(start, end).filter_map(|m| m.tobs),
        ))
    }

    async fn summary(&self) -> Result<DatasetSummary> {
        let known: BTreeSet<&str> = self.stations.iter().map(|s| s.station.as_str()).collect();
        let orphan_stations: BTreeSet<&str> = self
            .measurements
            .iter()
            .map(|m| m.station.as_str())
            .filter(|id| !known.contains(id))
            .collect();

        Ok(DatasetSummary {
            station_count: self.stations.len(),
            measurement_count: self.measurements.len() as u64,
            first_date: self.measurements.first().map(|m| m.date.clone()),
            last_date: self.measurements.last().map(|m| m.date.clone()),
            orphan_stations: orphan_stations.into_iter().map(str::to_string).collect(),
        })
    }
}
