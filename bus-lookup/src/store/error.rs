//! Storage error types.

/// Errors from reading the schedule database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connection, pool checkout or query execution failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A fixture file could not be read or parsed
    #[error("fixture error: {message}")]
    Fixture { message: String },

    /// The store refused to serve the request
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::Fixture {
            message: "missing stops".into(),
        };
        assert_eq!(err.to_string(), "fixture error: missing stops");

        let err = StoreError::Unavailable("offline".into());
        assert_eq!(err.to_string(), "store unavailable: offline");

        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(err.to_string().starts_with("database error:"));
    }
}
