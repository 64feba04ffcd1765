//! Temperature aggregates and dataset overview

use serde::{Deserialize, Serialize};

/// Min/average/max temperature over a filtered set of measurements.
/// All three are `None` when the set is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl TemperatureStats {
    /// Build stats from raw aggregate values, keeping `avg` inside `[min, max]`
    #[must_use]
    pub fn new(min: Option<f64>, avg: Option<f64>, max: Option<f64>) -> Self {
        let avg = match (min, avg, max) {
            (Some(lo), Some(mean), Some(hi)) => Some(mean.clamp(lo, hi)),
            _ => avg,
        };
        Self { min, avg, max }
    }

    /// Fold temperatures in one pass
    pub fn from_temperatures<I: IntoIterator<Item = f64>>(temps: I) -> Self {
        let mut count = 0_u64;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for t in temps {
            count += 1;
            sum += t;
            min = min.min(t);
            max = max.max(t);
        }

        if count == 0 {
            return Self::default();
        }

        #[allow(clippy::cast_precision_loss)]
        let avg = sum / count as f64;
        Self::new(Some(min), Some(avg), Some(max))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

/// Response of the open-ended range query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFromSummary {
    /// Requested start date, echoed verbatim
    pub date: String,
    pub min_temp: Option<f64>,
    pub avg_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

impl RangeFromSummary {
    #[must_use]
    pub fn new(start: &str, stats: TemperatureStats) -> Self {
        Self {
            date: start.to_string(),
            min_temp: stats.min,
            avg_temp: stats.avg,
            max_temp: stats.max,
        }
    }
}

/// Response of the closed range query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRangeSummary {
    /// `"{start} - {end}"`
    pub date_range: String,
    pub min_temp: Option<f64>,
    pub avg_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

impl DateRangeSummary {
    #[must_use]
    pub fn new(start: &str, end: &str, stats: TemperatureStats) -> Self {
        Self {
            date_range: format!("{start} - {end}"),
            min_temp: stats.min,
            avg_temp: stats.avg,
            max_temp: stats.max,
        }
    }
}

/// Overview of the loaded dataset, logged at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub station_count: usize,
    pub measurement_count: u64,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    /// Station ids referenced by measurements but missing from `station`
    pub orphan_stations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fold_temperatures() {
        let stats = TemperatureStats::from_temperatures([70.0, 74.0, 78.0]);
        assert_eq!(stats.min, Some(70.0));
        assert_eq!(stats.avg, Some(74.0));
        assert_eq!(stats.max, Some(78.0));
    }

    #[test]
    fn test_fold_empty_is_null() {
        let stats = TemperatureStats::from_temperatures(std::iter::empty());
        assert!(stats.is_empty());
    }

    #[test]
    fn test_avg_stays_within_bounds() {
        let stats = TemperatureStats::from_temperatures([0.1, 0.1, 0.1]);
        let (min, avg, max) = (stats.min.unwrap(), stats.avg.unwrap(), stats.max.unwrap());
        assert!(min <= avg && avg <= max);
    }

    #[test]
    fn test_range_from_serializes_nulls() {
        let summary = RangeFromSummary::new("2030-01-01", TemperatureStats::default());
        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            json!({"date": "2030-01-01", "min_temp": null, "avg_temp": null, "max_temp": null})
        );
    }

    #[test]
    fn test_date_range_label() {
        let summary = DateRangeSummary::new(
            "2017-08-01",
            "2017-08-10",
            TemperatureStats::new(Some(70.0), Some(75.5), Some(81.0)),
        );
        assert_eq!(summary.date_range, "2017-08-01 - 2017-08-10");
        assert_eq!(summary.avg_temp, Some(75.5));
    }
}
