//! Measurement record and date helpers
//!
//! Dates are stored as `YYYY-MM-DD` text and compared lexically, which
//! orders them chronologically as long as every value keeps that format.

use crate::ClimateApiError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Storage format of `measurement.date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Window of the prior-year temperature view
pub const PRIOR_YEAR_DAYS: i64 = 365;

/// One observation for a station on a date, bound from the `measurement` table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Measurement {
    /// Station identifier (references `station.station`)
    pub station: String,
    /// Observation date, `YYYY-MM-DD`
    pub date: String,
    /// Precipitation amount, absent when not reported
    pub prcp: Option<f64>,
    /// Temperature observation
    pub tobs: Option<f64>,
}

impl Measurement {
    #[must_use]
    pub fn new(station: &str, date: &str, prcp: Option<f64>, tobs: Option<f64>) -> Self {
        Self {
            station: station.to_string(),
            date: date.to_string(),
            prcp,
            tobs,
        }
    }
}

/// Whether `value` is a calendar date in storage format
#[must_use]
pub fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

/// Exclusive lower bound of the prior-year window ending at `latest`
pub fn prior_year_cutoff(latest: &str) -> Result<String, ClimateApiError> {
    let latest = NaiveDate::parse_from_str(latest, DATE_FORMAT).map_err(|e| {
        ClimateApiError::data(format!("latest measurement date '{latest}' is not YYYY-MM-DD: {e}"))
    })?;
    let cutoff = latest - Duration::days(PRIOR_YEAR_DAYS);
    Ok(cutoff.format(DATE_FORMAT).to_string())
}
