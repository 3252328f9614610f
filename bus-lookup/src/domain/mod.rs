//! Domain types for the bus lookup service.
//!
//! These types validate at construction time, so code that receives them
//! can trust their invariants.

mod geo;
mod label;
mod time;

pub use geo::{Coordinates, EARTH_RADIUS_KM, InvalidCoordinates};
pub use label::{compare_labels, sort_labels};
pub use time::{ArrivalTime, TimeError};
