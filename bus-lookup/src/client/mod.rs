//! Client side of the lookup service: HTTP client and front-end session.

mod api;
mod error;
mod session;

use std::collections::VecDeque;

use tracing::debug;

use crate::domain::ArrivalTime;

pub use api::{ApiClient, ApiConfig};
pub use error::ApiError;
pub use session::{
    Effect, Event, LOAD_ERROR_MESSAGE, LOCATE_ERROR_MESSAGE, Panel, RequestTag, Session,
};

/// Perform one effect against the API and return the resulting event.
pub async fn perform(api: &ApiClient, effect: Effect) -> Event {
    debug!(?effect, "performing fetch");
    match effect {
        Effect::FetchRegions { tag } => Event::RegionsLoaded {
            tag,
            result: api.regions().await,
        },
        Effect::FetchStops { tag, region } => Event::StopsLoaded {
            tag,
            result: api.stops(&region).await,
        },
        Effect::FetchBuses { tag, stop, region } => Event::BusesLoaded {
            tag,
            result: api.buses(&stop, &region).await,
        },
        Effect::FetchDetails {
            tag,
            bus,
            stop,
            region,
        } => {
            let result = api.bus_details(&bus, &stop, Some(&region)).await;
            Event::DetailsLoaded {
                tag,
                result,
                now: ArrivalTime::now_local(),
            }
        }
        Effect::FetchNearest { tag, position } => Event::NearestLoaded {
            tag,
            result: api.nearest(&position).await,
        },
    }
}

/// Apply `event` and run every fetch it triggers, one at a time, until the
/// session is idle.
pub async fn dispatch(session: &mut Session, api: &ApiClient, event: Event) {
    let mut queue: VecDeque<Effect> = session.update(event).into();
    while let Some(effect) = queue.pop_front() {
        let event = perform(api, effect).await;
        queue.extend(session.update(event));
    }
}
