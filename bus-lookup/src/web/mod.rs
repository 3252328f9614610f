//! Web layer for the bus lookup service.
//!
//! JSON endpoints for regions, stops, buses, arrivals and the nearest stop,
//! with server-rendered HTML pages for browsers.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, NO_ARRIVALS_MESSAGE, create_router};
pub use state::AppState;
