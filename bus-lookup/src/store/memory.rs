//! In-memory schedule store for tests and local development.
//!
//! Answers the same queries as [`SqlStore`](super::SqlStore) from rows held
//! in memory, optionally loaded from a JSON fixture file.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::warn;

use crate::domain::Coordinates;

use super::error::StoreError;
use super::{ArrivalQuery, ArrivalRow, ScheduleData, ScheduleStore, StopLocation};

/// Schedule store backed by in-memory rows.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: ScheduleData,

    /// When set, every query fails with this message.
    failure: Option<String>,

    /// Number of queries served (or refused).
    queries: AtomicUsize,
}

impl InMemoryStore {
    /// Create a store over the given rows.
    pub fn new(data: ScheduleData) -> Self {
        Self {
            data,
            failure: None,
            queries: AtomicUsize::new(0),
        }
    }

    /// Load a store from a JSON file with `stops`, `routes`, `trips` and
    /// `stop_times` arrays.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| StoreError::Fixture {
            message: format!("failed to read {:?}: {}", path, e),
        })?;
        let data: ScheduleData = serde_json::from_str(&json).map_err(|e| StoreError::Fixture {
            message: format!("failed to parse {:?}: {}", path, e),
        })?;
        Ok(Self::new(data))
    }

    /// Make every subsequent query fail, simulating a storage outage.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Number of queries issued against this store.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn stop_ids_named<'a>(&'a self, name: &str, region: Option<&str>) -> HashSet<&'a str> {
        self.data
            .stops
            .iter()
            .filter(|s| s.stop_name == name)
            .filter(|s| region.is_none_or(|r| s.stop_area.as_deref() == Some(r)))
            .map(|s| s.stop_id.as_str())
            .collect()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.begin()
    }

    async fn regions(&self) -> Result<Vec<String>, StoreError> {
        self.begin()?;
        let regions: BTreeSet<&str> = self
            .data
            .stops
            .iter()
            .filter_map(|s| s.stop_area.as_deref())
            .collect();
        Ok(regions.into_iter().map(String::from).collect())
    }

    async fn stops_in_region(&self, region: &str) -> Result<Vec<String>, StoreError> {
        self.begin()?;
        let names: BTreeSet<&str> = self
            .data
            .stops
            .iter()
            .filter(|s| s.stop_area.as_deref() == Some(region))
            .map(|s| s.stop_name.as_str())
            .collect();
        Ok(names.into_iter().map(String::from).collect())
    }

    async fn buses_at_stop(&self, stop: &str, region: &str) -> Result<Vec<String>, StoreError> {
        self.begin()?;
        let stop_ids = self.stop_ids_named(stop, Some(region));

        let trip_ids: HashSet<&str> = self
            .data
            .stop_times
            .iter()
            .filter(|st| stop_ids.contains(st.stop_id.as_str()))
            .map(|st| st.trip_id.as_str())
            .collect();

        let route_ids: HashSet<&str> = self
            .data
            .trips
            .iter()
            .filter(|t| trip_ids.contains(t.trip_id.as_str()))
            .map(|t| t.route_id.as_str())
            .collect();

        let labels: HashSet<&str> = self
            .data
            .routes
            .iter()
            .filter(|r| route_ids.contains(r.route_id.as_str()))
            .map(|r| r.route_short_name.as_str())
            .collect();

        let mut labels: Vec<String> = labels.into_iter().map(String::from).collect();
        labels.sort_by(|a, b| {
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        });
        Ok(labels)
    }

    async fn arrivals(&self, query: &ArrivalQuery) -> Result<Vec<ArrivalRow>, StoreError> {
        self.begin()?;
        let stop_ids = self.stop_ids_named(&query.stop, query.region.as_deref());

        let routes: HashMap<&str, Option<&str>> = self
            .data
            .routes
            .iter()
            .filter(|r| r.route_short_name == query.bus)
            .map(|r| (r.route_id.as_str(), r.route_long_name.as_deref()))
            .collect();

        let trips: HashMap<&str, _> = self
            .data
            .trips
            .iter()
            .filter_map(|t| {
                routes
                    .get(t.route_id.as_str())
                    .map(|route_long_name| (t.trip_id.as_str(), (t, *route_long_name)))
            })
            .collect();

        let stop_names: HashMap<&str, &str> = self
            .data
            .stops
            .iter()
            .map(|s| (s.stop_id.as_str(), s.stop_name.as_str()))
            .collect();

        let by_position: HashMap<(&str, i64), &str> = self
            .data
            .stop_times
            .iter()
            .map(|st| ((st.trip_id.as_str(), st.stop_sequence), st.stop_id.as_str()))
            .collect();

        let mut rows: Vec<ArrivalRow> = self
            .data
            .stop_times
            .iter()
            .filter(|st| stop_ids.contains(st.stop_id.as_str()))
            .filter_map(|st| {
                let &(trip, route_long_name) = trips.get(st.trip_id.as_str())?;
                let next_stop_id =
                    by_position.get(&(st.trip_id.as_str(), st.stop_sequence + 1))?;
                let next_stop = stop_names.get(next_stop_id)?;
                Some(ArrivalRow {
                    arrival_time: st.arrival_time.clone(),
                    trip_headsign: trip.trip_headsign.clone(),
                    trip_long_name: trip.trip_long_name.clone(),
                    route_long_name: route_long_name.map(String::from),
                    next_stop: (*next_stop).to_string(),
                })
            })
            .collect();

        rows.sort_by(|a, b| a.arrival_time.cmp(&b.arrival_time));
        rows.truncate(query.limit as usize);
        Ok(rows)
    }

    async fn stop_locations(&self) -> Result<Vec<StopLocation>, StoreError> {
        self.begin()?;
        let locations = self
            .data
            .stops
            .iter()
            .filter_map(|s| {
                let (lat, lon) = (s.stop_lat?, s.stop_lon?);
                match Coordinates::new(lat, lon) {
                    Ok(position) => Some(StopLocation {
                        name: s.stop_name.clone(),
                        region: s.stop_area.clone().unwrap_or_default(),
                        position,
                    }),
                    Err(e) => {
                        warn!(stop_id = %s.stop_id, error = %e, "skipping stop with bad coordinates");
                        None
                    }
                }
            })
            .collect();
        Ok(locations)
    }
}
