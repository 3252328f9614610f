//! Query parameters and response bodies of the HTTP API.
//!
//! Every parameter is optional at the type level so that a missing one is
//! reported as a `400` with a JSON body rather than axum's plain-text
//! rejection.

use serde::{Deserialize, Serialize};

/// `GET /regions`
#[derive(Debug, Default, Deserialize)]
pub struct RegionsRequest {
    /// Optional prefix filter
    pub q: Option<String>,
}

/// `GET /stops`
#[derive(Debug, Default, Deserialize)]
pub struct StopsRequest {
    pub region: Option<String>,

    /// Optional prefix filter
    pub q: Option<String>,
}

/// `GET /buses`
#[derive(Debug, Default, Deserialize)]
pub struct BusesRequest {
    pub stop: Option<String>,
    pub region: Option<String>,
}

/// `GET /bus-details`
#[derive(Debug, Default, Deserialize)]
pub struct BusDetailsRequest {
    /// Route short name
    pub bus: Option<String>,
    pub stop: Option<String>,

    /// Restricts the stop match to one region when present
    pub region: Option<String>,
}

/// `GET /nearest`
#[derive(Debug, Default, Deserialize)]
pub struct NearestRequest {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
