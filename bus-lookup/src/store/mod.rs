//! Read-only access to the schedule database.
//!
//! The schedule is loaded by an external import process into four tables:
//! `stops`, `routes`, `trips` and `stop_times`. This module only reads them.
//!
//! [`ScheduleStore`] is the seam between the HTTP layer and storage:
//! [`SqlStore`] talks to SQLite through a bounded connection pool, while
//! [`InMemoryStore`] answers the same queries from in-memory rows for tests
//! and local development.

mod error;
mod memory;
mod sql;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Coordinates;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use sql::{SqlStore, StoreConfig};

/// Maximum number of rows returned by an arrivals query.
pub const ARRIVALS_LIMIT: u32 = 30;

/// A row of the `stops` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_area: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
}

/// A row of the `routes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: Option<String>,
}

/// A row of the `trips` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub trip_headsign: Option<String>,
    pub trip_long_name: Option<String>,
}

/// A row of the `stop_times` table.
///
/// `stop_sequence` is unique within a trip and increases along its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: i64,
    pub arrival_time: String,
}

/// A full schedule, as loaded from a fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleData {
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub stop_times: Vec<StopTime>,
}

/// One scheduled arrival of a route at a stop, with the stop that follows.
///
/// This is also the JSON shape of the `/bus-details` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ArrivalRow {
    pub arrival_time: String,
    pub trip_headsign: Option<String>,
    pub trip_long_name: Option<String>,
    pub route_long_name: Option<String>,
    pub next_stop: String,
}

/// Parameters of an arrivals lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalQuery {
    /// Route short name
    pub bus: String,

    /// Stop name
    pub stop: String,

    /// When set, only stops in this region match
    pub region: Option<String>,

    /// Maximum rows to return
    pub limit: u32,
}

impl ArrivalQuery {
    /// Create a query matching the stop name in any region.
    pub fn new(bus: impl Into<String>, stop: impl Into<String>) -> Self {
        Self {
            bus: bus.into(),
            stop: stop.into(),
            region: None,
            limit: ARRIVALS_LIMIT,
        }
    }

    /// Restrict matching stops to a region.
    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// A stop with known coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StopLocation {
    pub name: String,
    pub region: String,
    pub position: Coordinates,
}

/// Read operations over the schedule database.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Check that the store can answer queries.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Distinct non-null region names.
    async fn regions(&self) -> Result<Vec<String>, StoreError>;

    /// Distinct stop names within a region.
    async fn stops_in_region(&self, region: &str) -> Result<Vec<String>, StoreError>;

    /// Distinct route short names visiting the stop `(name, region)`,
    /// ordered by label length, then label.
    async fn buses_at_stop(&self, stop: &str, region: &str) -> Result<Vec<String>, StoreError>;

    /// Arrivals of a route at a stop, ordered by arrival time.
    ///
    /// Only stop times that have a following stop in their trip are returned.
    async fn arrivals(&self, query: &ArrivalQuery) -> Result<Vec<ArrivalRow>, StoreError>;

    /// Every stop that has coordinates.
    async fn stop_locations(&self) -> Result<Vec<StopLocation>, StoreError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! A small two-region schedule shared by storage and handler tests.

    use super::*;

    fn stop(id: &str, name: &str, area: Option<&str>, pos: Option<(f64, f64)>) -> Stop {
        Stop {
            stop_id: id.into(),
            stop_name: name.into(),
            stop_area: area.map(Into::into),
            stop_lat: pos.map(|p| p.0),
            stop_lon: pos.map(|p| p.1),
        }
    }

    fn route(id: &str, short: &str, long: &str) -> Route {
        Route {
            route_id: id.into(),
            route_short_name: short.into(),
            route_long_name: Some(long.into()),
        }
    }

    fn trip(id: &str, route_id: &str, headsign: &str) -> Trip {
        Trip {
            trip_id: id.into(),
            route_id: route_id.into(),
            trip_headsign: Some(headsign.into()),
            trip_long_name: None,
        }
    }

    fn calls(trip_id: &str, visits: &[(&str, &str)]) -> Vec<StopTime> {
        visits
            .iter()
            .enumerate()
            .map(|(i, (stop_id, time))| StopTime {
                trip_id: trip_id.into(),
                stop_id: (*stop_id).into(),
                stop_sequence: i as i64 + 1,
                arrival_time: (*time).into(),
            })
            .collect()
    }

    /// Tallinn and Tartu both have a stop called "Kaubamaja", and "Balti jaam"
    /// in Tallinn has two platforms.
    pub(crate) fn sample_schedule() -> ScheduleData {
        let stops = vec![
            stop("s1", "Balti jaam", Some("Tallinn"), Some((59.4397, 24.7372))),
            stop("s2", "Vabaduse väljak", Some("Tallinn"), Some((59.4331, 24.7445))),
            stop("s3", "Kaubamaja", Some("Tallinn"), Some((59.4323, 24.7565))),
            stop("s4", "Kaubamaja", Some("Tartu"), Some((58.3780, 26.7290))),
            stop("s5", "Raekoda", Some("Tartu"), Some((58.3806, 26.7225))),
            stop("s6", "Depoo", None, None),
            stop("s7", "Balti jaam", Some("Tallinn"), Some((59.4402, 24.7366))),
        ];

        let routes = vec![
            route("r2", "2", "Mõigu - Reisisadam"),
            route("r10", "10", "Väike-Õismäe - Kaubamaja"),
            route("r10a", "10A", "Väike-Õismäe - Kaubamaja"),
            route("r4", "4", "Annelinn - Raekoda"),
        ];

        let trips = vec![
            trip("t2a", "r2", "Reisisadam"),
            trip("t2b", "r2", "Mõigu"),
            trip("t2c", "r2", "Reisisadam"),
            trip("t2d", "r2", "Reisisadam"),
            trip("t10", "r10", "Kaubamaja"),
            trip("t10a", "r10a", "Kaubamaja"),
            trip("t4", "r4", "Raekoda"),
        ];

        let mut stop_times = Vec::new();
        stop_times.extend(calls("t2a", &[("s1", "08:00:00"), ("s2", "08:05:00"), ("s3", "08:10:00")]));
        stop_times.extend(calls("t2b", &[("s3", "08:20:00"), ("s2", "08:25:00"), ("s1", "08:30:00")]));
        stop_times.extend(calls("t2c", &[("s1", "09:00:00"), ("s2", "09:05:00"), ("s3", "09:10:00")]));
        stop_times.extend(calls("t2d", &[("s1", "09:00:00"), ("s2", "09:05:00")]));
        stop_times.extend(calls("t10", &[("s2", "07:45:00"), ("s3", "07:50:00")]));
        stop_times.extend(calls("t10a", &[("s2", "07:55:00"), ("s3", "08:00:00")]));
        stop_times.extend(calls("t4", &[("s4", "10:00:00"), ("s5", "10:05:00")]));

        ScheduleData {
            stops,
            routes,
            trips,
            stop_times,
        }
    }
}
