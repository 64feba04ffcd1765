//! Dataset query service
//!
//! Maps request parameters onto repository queries and shapes the results
//! the HTTP layer serializes. Date parameters are compared as strings; a
//! value outside `YYYY-MM-DD` is still used, only logged.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::models::{
    DatasetSummary, DateRangeSummary, RangeFromSummary, is_iso_date, prior_year_cutoff,
};
use crate::store::{ClimateRepository, DatedValue};

/// Date-keyed series as returned to clients
pub type DateSeries = BTreeMap<String, f64>;

/// Read-only queries over the observation dataset
#[derive(Clone)]
pub struct QueryService {
    repository: Arc<dyn ClimateRepository>,
}

impl QueryService {
    pub fn new(repository: Arc<dyn ClimateRepository>) -> Self {
        Self { repository }
    }

    /// Date → precipitation across all stations. When several rows share a
    /// date the one stored last wins.
    #[instrument(skip(self))]
    pub async fn precipitation(&self) -> Result<DateSeries> {
        let rows = self.repository.precipitation().await?;
        Ok(collapse_by_date(rows))
    }

    /// Distinct station ids that have at least one measurement
    #[instrument(skip(self))]
    pub async fn stations(&self) -> Result<Vec<String>> {
        self.repository.station_ids().await
    }

    /// Date → temperature for the 365 days ending at the latest measurement
    #[instrument(skip(self))]
    pub async fn prior_year_temperatures(&self) -> Result<DateSeries> {
        let Some(latest) = self.repository.latest_date().await? else {
            debug!("No measurements, returning an empty series");
            return Ok(DateSeries::new());
        };

        let cutoff = prior_year_cutoff(&latest)?;
        debug!("Latest measurement {}, cutoff {}", latest, cutoff);

        let rows = self.repository.temperatures_after(&cutoff).await?;
        Ok(collapse_by_date(rows))
    }

    /// Temperature aggregate over every date on or after `start`
    #[instrument(skip(self))]
    pub async fn range_from(&self, start: &str) -> Result<RangeFromSummary> {
        check_date_param("start", start);
        let stats = self.repository.temperature_stats(start, None).await?;
        if stats.is_empty() {
            debug!("No temperatures on or after {}", start);
        }
        Ok(RangeFromSummary::new(start, stats))
    }

    /// Temperature aggregate over `start..=end`
    #[instrument(skip(self))]
    pub async fn range(&self, start: &str, end: &str) -> Result<DateRangeSummary> {
        check_date_param("start", start);
        check_date_param("end", end);
        if start > end {
            debug!("Start {} sorts after end {}, range is empty", start, end);
        }
        let stats = self.repository.temperature_stats(start, Some(end)).await?;
        Ok(DateRangeSummary::new(start, end, stats))
    }

    /// Load the station table, inspect the dataset and log what was found
    pub async fn describe_dataset(&self) -> Result<DatasetSummary> {
        let stations = self.repository.stations().await?;
        let summary = self.repository.summary().await?;

        info!(
            "Dataset holds {} stations and {} measurements ({} .. {})",
            stations.len(),
            summary.measurement_count,
            summary.first_date.as_deref().unwrap_or("-"),
            summary.last_date.as_deref().unwrap_or("-"),
        );
        for station in &stations {
            debug!(
                "Station {} '{}' at {} ({} m)",
                station.station,
                station.name,
                station.format_coordinates(),
                station.elevation
            );
        }
        if !summary.orphan_stations.is_empty() {
            warn!(
                "Measurements reference unknown stations: {}",
                summary.orphan_stations.join(", ")
            );
        }

        Ok(summary)
    }
}

fn collapse_by_date(rows: Vec<DatedValue>) -> DateSeries {
    let total = rows.len();
    let series: DateSeries = rows.into_iter().map(|r| (r.date, r.value)).collect();
    if series.len() < total {
        debug!(
            "Collapsed {} rows onto {} distinct dates",
            total,
            series.len()
        );
    }
    series
}

fn check_date_param(name: &str, value: &str) {
    if !is_iso_date(value) {
        warn!(
            "Parameter {}='{}' is not a YYYY-MM-DD date, comparing it as plain text",
            name, value
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measurement, Station};
    use crate::store::{MemoryRepository, fixtures};
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> QueryService {
        QueryService::new(Arc::new(MemoryRepository::new(
            fixtures::stations(),
            fixtures::measurements(),
        )))
    }

    fn service_with(measurements: Vec<Measurement>) -> QueryService {
        QueryService::new(Arc::new(MemoryRepository::new(
            fixtures::stations(),
            measurements,
        )))
    }

    #[rstest]
    #[tokio::test]
    async fn test_precipitation_contains_only_non_null_rows(service: QueryService) {
        let series = service.precipitation().await.unwrap();

        for m in fixtures::measurements() {
            if m.prcp.is_some() {
                assert!(series.contains_key(&m.date), "missing {}", m.date);
            }
        }
        // only null readings on that date
        assert!(!series.contains_key("2017-08-05"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_precipitation_last_row_wins(service: QueryService) {
        let series = service.precipitation().await.unwrap();
        assert_eq!(series.get("2017-08-01"), Some(&0.12));
        assert_eq!(series.get("2017-08-23"), Some(&0.45));
        assert_eq!(series.get("2017-08-10"), Some(&0.5));
    }

    #[rstest]
    #[tokio::test]
    async fn test_station_without_precipitation_is_in_roster(service: QueryService) {
        let roster = service.stations().await.unwrap();
        assert!(roster.contains(&"USC00517948".to_string()));
        assert_eq!(roster.len(), 4);

        let mut deduped = roster.clone();
        deduped.dedup();
        assert_eq!(deduped, roster);
    }

    #[rstest]
    #[tokio::test]
    async fn test_prior_year_window(service: QueryService) {
        let series = service.prior_year_temperatures().await.unwrap();

        assert!(series.keys().all(|date| date.as_str() > "2016-08-23"));
        assert!(!series.contains_key("2016-08-23"));
        assert!(!series.contains_key("2016-08-22"));
        assert_eq!(series.get("2016-08-24"), Some(&79.0));
        assert_eq!(series.get("2017-08-23"), Some(&76.0));
    }

    #[tokio::test]
    async fn test_prior_year_on_empty_dataset() {
        let series = service_with(Vec::new()).prior_year_temperatures().await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_prior_year_with_malformed_latest_date() {
        let service = service_with(vec![Measurement::new("USC00519397", "2017/08/23", None, Some(80.0))]);
        let err = service.prior_year_temperatures().await.unwrap_err();
        assert!(matches!(err, crate::ClimateApiError::Data { .. }));
    }

    #[tokio::test]
    async fn test_range_from_single_last_day() {
        let measurements: Vec<Measurement> = (1..=23)
            .flat_map(|day| {
                let date = format!("2017-08-{day:02}");
                vec![
                    Measurement::new("USC00519397", &date, Some(0.0), Some(60.0 + f64::from(day))),
                    Measurement::new("USC00513117", &date, None, Some(50.0 + f64::from(day))),
                ]
            })
            .collect();
        let summary = service_with(measurements).range_from("2017-08-23").await.unwrap();

        assert_eq!(summary.date, "2017-08-23");
        assert_eq!(summary.min_temp, Some(73.0));
        assert_eq!(summary.max_temp, Some(83.0));
        assert_eq!(summary.avg_temp, Some(78.0));
    }

    #[rstest]
    #[tokio::test]
    async fn test_range_excludes_following_day(service: QueryService) {
        let summary = service.range("2017-08-01", "2017-08-10").await.unwrap();
        assert_eq!(summary.date_range, "2017-08-01 - 2017-08-10");
        // the 60.0 reading on 2017-08-11 must not pull the minimum down
        assert_eq!(summary.min_temp, Some(71.0));
        assert_eq!(summary.max_temp, Some(82.0));
    }

    #[rstest]
    #[case("2016-01-01", "2018-01-01")]
    #[case("2017-08-01", "2017-08-10")]
    #[case("2016-08-23", "2016-08-23")]
    #[tokio::test]
    async fn test_range_is_ordered(
        service: QueryService,
        #[case] start: &str,
        #[case] end: &str,
    ) {
        let summary = service.range(start, end).await.unwrap();
        let (min, avg, max) = (
            summary.min_temp.unwrap(),
            summary.avg_temp.unwrap(),
            summary.max_temp.unwrap(),
        );
        assert!(min <= avg && avg <= max);
    }

    #[rstest]
    #[case("2030-01-01", "2030-12-31")]
    #[case("2017-08-10", "2017-08-01")]
    #[case("not-a-date", "also-not")]
    #[tokio::test]
    async fn test_empty_range_is_null(
        service: QueryService,
        #[case] start: &str,
        #[case] end: &str,
    ) {
        let summary = service.range(start, end).await.unwrap();
        assert_eq!(summary.min_temp, None);
        assert_eq!(summary.avg_temp, None);
        assert_eq!(summary.max_temp, None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_malformed_start_falls_back_to_text_comparison(service: QueryService) {
        // "2017" sorts below every 2017 date and above every 2016 date
        let summary = service.range_from("2017").await.unwrap();
        assert_eq!(summary.date, "2017");
        assert_eq!(summary.min_temp, Some(60.0));
        assert_eq!(summary.max_temp, Some(83.0));
    }

    #[rstest]
    #[tokio::test]
    async fn test_describe_dataset(service: QueryService) {
        let summary = service.describe_dataset().await.unwrap();
        assert_eq!(summary.station_count, fixtures::stations().len());
        assert_eq!(summary.orphan_stations, vec!["USC00511918"]);
    }

    #[tokio::test]
    async fn test_describe_dataset_without_stations() {
        let service = QueryService::new(Arc::new(MemoryRepository::new(
            Vec::<Station>::new(),
            fixtures::measurements(),
        )));
        let summary = service.describe_dataset().await.unwrap();
        assert_eq!(summary.station_count, 0);
        assert_eq!(summary.orphan_stations.len(), 4);
    }
}
