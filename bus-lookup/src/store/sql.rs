//! SQLite-backed schedule store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};

use crate::domain::Coordinates;

use super::error::StoreError;
use super::{ArrivalQuery, ArrivalRow, ScheduleStore, StopLocation};

/// Default database location.
const DEFAULT_DATABASE_URL: &str = "sqlite://schedule.db";

/// Default maximum pooled connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const REGIONS_SQL: &str = "
    SELECT DISTINCT stop_area
    FROM stops
    WHERE stop_area IS NOT NULL
    ORDER BY stop_area";

const STOPS_SQL: &str = "
    SELECT DISTINCT stop_name
    FROM stops
    WHERE stop_area = ?
    ORDER BY stop_name";

const BUSES_SQL: &str = "
    SELECT DISTINCT r.route_short_name
    FROM routes r
    JOIN trips t ON r.route_id = t.route_id
    WHERE t.trip_id IN (
        SELECT DISTINCT st.trip_id
        FROM stop_times st
        JOIN stops s ON st.stop_id = s.stop_id
        WHERE s.stop_name = ? AND s.stop_area = ?
    )
    ORDER BY LENGTH(r.route_short_name), r.route_short_name";

const ARRIVALS_SQL: &str = "
    SELECT
        st.arrival_time AS arrival_time,
        t.trip_headsign AS trip_headsign,
        t.trip_long_name AS trip_long_name,
        r.route_long_name AS route_long_name,
        s_next.stop_name AS next_stop
    FROM stop_times st
    JOIN trips t ON st.trip_id = t.trip_id
    JOIN routes r ON t.route_id = r.route_id
    JOIN stop_times st_next ON st.trip_id = st_next.trip_id
        AND st_next.stop_sequence = st.stop_sequence + 1
    JOIN stops s_next ON st_next.stop_id = s_next.stop_id
    WHERE r.route_short_name = ?
        AND st.stop_id IN (
            SELECT stop_id FROM stops
            WHERE stop_name = ? AND (? IS NULL OR stop_area = ?)
        )
    ORDER BY st.arrival_time ASC
    LIMIT ?";

const STOP_LOCATIONS_SQL: &str = "
    SELECT stop_name, COALESCE(stop_area, ''), stop_lat, stop_lon
    FROM stops
    WHERE stop_lat IS NOT NULL AND stop_lon IS NOT NULL";

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite connection URL
    pub database_url: String,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    /// Create a config for the given database URL with default pool limits.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Schedule store reading from SQLite through a bounded pool.
///
/// Each query checks out one connection for its duration; concurrent
/// requests beyond `max_connections` wait up to `acquire_timeout`.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Open the database read-only.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        info!(
            database_url = %config.database_url,
            max_connections = config.max_connections,
            "connected to schedule database"
        );

        Ok(Self { pool })
    }
}

#[async_trait]
impl ScheduleStore for SqlStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn regions(&self) -> Result<Vec<String>, StoreError> {
        let regions: Vec<String> = sqlx::query_scalar(REGIONS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(regions)
    }

    async fn stops_in_region(&self, region: &str) -> Result<Vec<String>, StoreError> {
        let stops: Vec<String> = sqlx::query_scalar(STOPS_SQL)
            .bind(region)
            .fetch_all(&self.pool)
            .await?;
        Ok(stops)
    }

    async fn buses_at_stop(&self, stop: &str, region: &str) -> Result<Vec<String>, StoreError> {
        let buses: Vec<String> = sqlx::query_scalar(BUSES_SQL)
            .bind(stop)
            .bind(region)
            .fetch_all(&self.pool)
            .await?;
        Ok(buses)
    }

    async fn arrivals(&self, query: &ArrivalQuery) -> Result<Vec<ArrivalRow>, StoreError> {
        let rows = sqlx::query_as::<_, ArrivalRow>(ARRIVALS_SQL)
            .bind(&query.bus)
            .bind(&query.stop)
            .bind(query.region.as_deref())
            .bind(query.region.as_deref())
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn stop_locations(&self) -> Result<Vec<StopLocation>, StoreError> {
        let rows: Vec<(String, String, f64, f64)> = sqlx::query_as(STOP_LOCATIONS_SQL)
            .fetch_all(&self.pool)
            .await?;

        let locations = rows
            .into_iter()
            .filter_map(|(name, region, lat, lon)| match Coordinates::new(lat, lon) {
                Ok(position) => Some(StopLocation {
                    name,
                    region,
                    position,
                }),
                Err(e) => {
                    warn!(stop = %name, error = %e, "skipping stop with bad coordinates");
                    None
                }
            })
            .collect();

        Ok(locations)
    }
}
