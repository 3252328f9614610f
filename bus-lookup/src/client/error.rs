//! Lookup API client error types.

/// Errors from calling the bus lookup HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server has no data for the request
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned another error status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::NotFound("no arrivals for bus 7".into());
        assert_eq!(err.to_string(), "not found: no arrivals for bus 7");

        let err = ApiError::Status {
            status: 400,
            message: "missing parameter: region".into(),
        };
        assert_eq!(err.to_string(), "API error 400: missing parameter: region");
    }
}
