//! HTTP client for the bus lookup API.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::Coordinates;
use crate::locator::NearestStop;
use crate::store::ArrivalRow;

use super::error::ApiError;

/// Default base URL of a locally running server.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the lookup server
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a config for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the region/stop/bus lookup endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// All regions.
    pub async fn regions(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/regions", &[]).await
    }

    /// Stop names within a region.
    pub async fn stops(&self, region: &str) -> Result<Vec<String>, ApiError> {
        self.get_json("/stops", &[("region", region)]).await
    }

    /// Route labels serving a stop, in the server's (length, label) order.
    pub async fn buses(&self, stop: &str, region: &str) -> Result<Vec<String>, ApiError> {
        self.get_json("/buses", &[("stop", stop), ("region", region)])
            .await
    }

    /// Arrivals of a bus at a stop, optionally restricted to one region.
    pub async fn bus_details(
        &self,
        bus: &str,
        stop: &str,
        region: Option<&str>,
    ) -> Result<Vec<ArrivalRow>, ApiError> {
        let mut query = vec![("bus", bus), ("stop", stop)];
        if let Some(region) = region {
            query.push(("region", region));
        }
        self.get_json("/bus-details", &query).await
    }

    /// The stop nearest to a position.
    pub async fn nearest(&self, position: &Coordinates) -> Result<NearestStop, ApiError> {
        let lat = position.lat().to_string();
        let lon = position.lon().to_string();
        self.get_json("/nearest", &[("lat", lat.as_str()), ("lon", lon.as_str())])
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(message));
            }
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Json {
            message: e.to_string(),
        })
    }
}

/// Extract the message from a `{"error": ...}` body, or use the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_with_timeout() {
        let config = ApiConfig::new("http://localhost:8080").with_timeout(3);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new(ApiConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn error_message_from_json_body() {
        assert_eq!(
            error_message(r#"{"error":"missing parameter: region"}"#),
            "missing parameter: region"
        );
    }

    #[test]
    fn error_message_from_plain_body() {
        assert_eq!(error_message("Server error\n"), "Server error");
    }
}
