//! Nearest-stop lookup.
//!
//! Scans every located stop and keeps the one with the smallest great-circle
//! distance from the query point.

use serde::{Deserialize, Serialize};

use crate::domain::Coordinates;
use crate::store::{ScheduleStore, StopLocation, StoreError};

/// The stop closest to a query point. Also the `/nearest` response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestStop {
    pub stop: String,
    pub region: String,
}

/// Find the stop nearest to `origin`.
///
/// Ties keep the first stop encountered. Returns `None` for an empty input.
pub fn nearest<'a, I>(stops: I, origin: &Coordinates) -> Option<&'a StopLocation>
where
    I: IntoIterator<Item = &'a StopLocation>,
{
    stops
        .into_iter()
        .map(|s| (s, s.position.distance_km(origin)))
        .fold(None, |best: Option<(&StopLocation, f64)>, (stop, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((stop, d)),
        })
        .map(|(stop, _)| stop)
}

/// Look up the nearest stop in a schedule store.
pub async fn find_nearest(
    store: &dyn ScheduleStore,
    origin: &Coordinates,
) -> Result<Option<NearestStop>, StoreError> {
    let stops = store.stop_locations().await?;
    Ok(nearest(&stops, origin).map(|s| NearestStop {
        stop: s.name.clone(),
        region: s.region.clone(),
    }))
}
