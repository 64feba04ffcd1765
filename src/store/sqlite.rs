//! SQLite backend
//!
//! Opens the observation database read-only behind a connection pool.
//! Every query checks a connection out of the pool and hands it back when
//! the query future completes or is dropped.

use std::path::Path;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info, instrument};

use super::{ClimateRepository, DatedValue};
use crate::models::{DatasetSummary, Measurement, Station, TemperatureStats};
use crate::{ClimateApiError, Result};

/// Column layout both tables must provide
const SCHEMA_PROBES: [(&str, &str); 2] = [
    (
        "station",
        "SELECT station, name, latitude, longitude, elevation FROM station LIMIT 0",
    ),
    (
        "measurement",
        "SELECT station, date, prcp, tobs FROM measurement LIMIT 0",
    ),
];

type AggregateRow = (Option<f64>, Option<f64>, Option<f64>);

/// Repository over a SQLite file
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open an existing database file read-only and verify its schema.
    /// A missing file is an error; it is never created.
    pub async fn open(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ClimateApiError::storage(format!(
                "database file not found: {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                ClimateApiError::storage(format!("failed to open {}: {e}", path.display()))
            })?;

        info!(
            "Opened observation database {} (pool size {})",
            path.display(),
            max_connections
        );

        let repository = Self { pool };
        repository.check_schema().await?;
        Ok(repository)
    }

    /// Wrap an already configured pool
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fail unless both tables expose the expected columns
    pub async fn check_schema(&self) -> Result<()> {
        for (table, probe) in SCHEMA_PROBES {
            sqlx::query(probe).execute(&self.pool).await.map_err(|e| {
                ClimateApiError::storage(format!("table '{table}' does not match the expected schema: {e}"))
            })?;
        }
        Ok(())
    }

    /// Every measurement row, in date order then storage order
    pub async fn measurements(&self) -> Result<Vec<Measurement>> {
        let rows = sqlx::query_as::<_, Measurement>(
            "SELECT station, date, prcp, tobs FROM measurement ORDER BY date, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ClimateRepository for SqliteRepository {
    async fn stations(&self) -> Result<Vec<Station>> {
        let stations = sqlx::query_as::<_, Station>(
            "SELECT station, name, latitude, longitude, elevation FROM station ORDER BY station",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stations)
    }

    #[instrument(level = "debug", skip(self))]
    async fn precipitation(&self) -> Result<Vec<DatedValue>> {
        let rows = sqlx::query_as::<_, DatedValue>(
            "SELECT date, prcp AS value FROM measurement \
             WHERE prcp IS NOT NULL ORDER BY date, rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        debug!("Fetched {} precipitation rows", rows.len());
        Ok(rows)
    }

    async fn station_ids(&self) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT station FROM measurement ORDER BY station",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn latest_date(&self) -> Result<Option<String>> {
        let latest = sqlx::query_scalar::<_, Option<String>>("SELECT MAX(date) FROM measurement")
            .fetch_one(&self.pool)
            .await?;
        Ok(latest)
    }

    #[instrument(level = "debug", skip(self))]
    async fn temperatures_after(&self, cutoff: &str) -> Result<Vec<DatedValue>> {
        let rows = sqlx::query_as::<_, DatedValue>(
            "SELECT date, tobs AS value FROM measurement \
             WHERE date > ? AND tobs IS NOT NULL ORDER BY date, rowid",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        debug!("Fetched {} temperature rows", rows.len());
        Ok(rows)
    }

    #[instrument(level = "debug", skip(self))]
    async fn temperature_stats(&self, start: &str, end: Option<&str>) -> Result<TemperatureStats> {
        let (min, avg, max) = match end {
            Some(end) => {
                sqlx::query_as::<_, AggregateRow>(
                    "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement \
                     WHERE date >= ? AND date <= ?",
                )
                .bind(start)
                .bind(end)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, AggregateRow>(
                    "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement WHERE date >= ?",
                )
                .bind(start)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(TemperatureStats::new(min, avg, max))
    }

    async fn summary(&self) -> Result<DatasetSummary> {
        let station_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM station")
                .fetch_one(&self.pool)
                .await?;

        let (measurement_count, first_date, last_date) =
            sqlx::query_as::<_, (i64, Option<String>, Option<String>)>(
                "SELECT COUNT(*), MIN(date), MAX(date) FROM measurement",
            )
            .fetch_one(&self.pool)
            .await?;

        let orphan_stations = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT m.station FROM measurement m \
             LEFT JOIN station s ON s.station = m.station \
             WHERE s.station IS NULL ORDER BY m.station",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DatasetSummary {
            station_count: usize::try_from(station_count).unwrap_or_default(),
            measurement_count: u64::try_from(measurement_count).unwrap_or_default(),
            first_date,
            last_date,
            orphan_stations,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::store::fixtures;

    /// Single-connection in-memory database holding `stations` and `measurements`
    pub async fn seeded_pool(stations: &[Station], measurements: &[Measurement]) -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE station (id INTEGER PRIMARY KEY, station TEXT, name TEXT, \
             latitude FLOAT, longitude FLOAT, elevation FLOAT)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE measurement (id INTEGER PRIMARY KEY, station TEXT, date TEXT, \
             prcp FLOAT, tobs FLOAT)",
        )
        .execute(&pool)
        .await
        .unwrap();

        for s in stations {
            sqlx::query(
                "INSERT INTO station (station, name, latitude, longitude, elevation) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&s.station)
            .bind(&s.name)
            .bind(s.latitude)
            .bind(s.longitude)
            .bind(s.elevation)
            .execute(&pool)
            .await
            .unwrap();
        }
        for m in measurements {
            sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
                .bind(&m.station)
                .bind(&m.date)
                .bind(m.prcp)
                .bind(m.tobs)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    pub async fn fixture_repository() -> SqliteRepository {
        let pool = seeded_pool(&fixtures::stations(), &fixtures::measurements()).await;
        SqliteRepository::from_pool(pool)
    }
}
