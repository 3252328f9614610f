//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{ArrivalTime, Coordinates, sort_labels};
use crate::locator::{NearestStop, find_nearest};
use crate::schedule::build_board;
use crate::store::{ArrivalQuery, ArrivalRow, StoreError};
use crate::suggest::filter_suggestions;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Message of the `404` returned when a bus has no arrivals at a stop.
pub const NO_ARRIVALS_MESSAGE: &str = "no data for the selected bus";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/regions", get(list_regions))
        .route("/stops", get(list_stops))
        .route("/buses", get(list_buses))
        .route("/bus-details", get(bus_details))
        .route("/nearest", get(nearest_stop))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.store.ping().await?;
    Ok("ok")
}

/// Index page with the region picker.
async fn index_page(State(state): State<AppState>) -> Response {
    let result = state
        .store
        .regions()
        .await
        .map_err(AppError::from)
        .and_then(|regions| Ok(IndexTemplate { regions }.render()?));

    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_html_response(),
    }
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Return `result` as JSON, or as the HTML page built by `page` when the
/// client asked for HTML.
fn respond<T, F>(headers: &HeaderMap, result: Result<T, AppError>, page: F) -> Response
where
    T: Serialize,
    F: FnOnce(T) -> askama::Result<String>,
{
    if accepts_html(headers) {
        match result.and_then(|value| Ok(page(value)?)) {
            Ok(html) => Html(html).into_response(),
            Err(e) => e.into_html_response(),
        }
    } else {
        match result {
            Ok(value) => Json(value).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// A required query parameter. Blank values count as missing.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest {
            message: format!("missing parameter: {name}"),
        }),
    }
}

/// An optional query parameter. Blank values count as absent.
fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Apply the optional `q` prefix filter.
fn suggest(names: Vec<String>, q: Option<&str>) -> Vec<String> {
    match q {
        Some(q) => filter_suggestions(q, &names)
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => names,
    }
}

/// Parse and validate the `lat`/`lon` pair.
fn coordinates(req: &NearestRequest) -> Result<Coordinates, AppError> {
    let parse = |value: &Option<String>, name: &str| -> Result<f64, AppError> {
        required(value, name)?
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::BadRequest {
                message: format!("invalid parameter: {name} must be a number"),
            })
    };

    let lat = parse(&req.lat, "lat")?;
    let lon = parse(&req.lon, "lon")?;
    Coordinates::new(lat, lon).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

/// List all regions.
async fn list_regions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<RegionsRequest>,
) -> Response {
    let result = state
        .store
        .regions()
        .await
        .map(|regions| suggest(regions, optional(&req.q)))
        .map_err(AppError::from);

    respond(&headers, result, |regions| {
        IndexTemplate { regions }.render()
    })
}

/// List the stops of a region.
async fn list_stops(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<StopsRequest>,
) -> Response {
    let result: Result<Vec<String>, AppError> = async {
        let region = required(&req.region, "region")?;
        let stops = state.store.stops_in_region(region).await?;
        Ok(suggest(stops, optional(&req.q)))
    }
    .await;

    respond(&headers, result, |stops| {
        StopsTemplate {
            region: req.region.clone().unwrap_or_default(),
            stops,
        }
        .render()
    })
}

/// List the buses serving a stop.
///
/// JSON keeps the store's (length, label) order; the HTML page sorts labels
/// naturally.
async fn list_buses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<BusesRequest>,
) -> Response {
    let result: Result<Vec<String>, AppError> = async {
        let stop = required(&req.stop, "stop")?;
        let region = required(&req.region, "region")?;
        Ok(state.store.buses_at_stop(stop, region).await?)
    }
    .await;

    respond(&headers, result, |mut buses: Vec<String>| {
        sort_labels(&mut buses);
        BusesTemplate {
            stop: req.stop.clone().unwrap_or_default(),
            region: req.region.clone().unwrap_or_default(),
            buses,
        }
        .render()
    })
}

/// Arrivals of a bus at a stop.
///
/// Without `region` every stop with the given name matches.
async fn bus_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<BusDetailsRequest>,
) -> Response {
    let result: Result<Vec<ArrivalRow>, AppError> = async {
        let bus = required(&req.bus, "bus")?;
        let stop = required(&req.stop, "stop")?;

        let mut query = ArrivalQuery::new(bus, stop);
        if let Some(region) = optional(&req.region) {
            query = query.in_region(region);
        }

        let rows = state.store.arrivals(&query).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound {
                message: NO_ARRIVALS_MESSAGE.to_string(),
            });
        }
        Ok(rows)
    }
    .await;

    respond(&headers, result, |rows| {
        BoardTemplate {
            bus: req.bus.clone().unwrap_or_default(),
            stop: req.stop.clone().unwrap_or_default(),
            region: optional(&req.region).map(str::to_string),
            boards: build_board(&rows, ArrivalTime::now_local()),
        }
        .render()
    })
}

/// The stop closest to a position.
async fn nearest_stop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<NearestRequest>,
) -> Response {
    let result: Result<NearestStop, AppError> = async {
        let origin = coordinates(&req)?;
        find_nearest(state.store.as_ref(), &origin)
            .await?
            .ok_or_else(|| AppError::NotFound {
                message: "no stops with coordinates".to_string(),
            })
    }
    .await;

    respond(&headers, result, |NearestStop { stop, region }| {
        NearestTemplate { stop, region }.render()
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl AppError {
    /// Status and message, logged at a level matching the status.
    fn status_and_message(self) -> (StatusCode, String) {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), %message, "request failed");
        } else {
            warn!(status = status.as_u16(), %message, "request rejected");
        }

        (status, message)
    }

    /// Render as an HTML error page.
    fn into_html_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let page = ErrorTemplate {
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => (status, format!("Template error: {e}")).into_response(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Internal {
            message: format!("Template error: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
