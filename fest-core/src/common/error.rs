use thiserror::Error;

/// Message fragments that indicate the backing store itself is unreachable
/// rather than a problem with the statement we sent it. Matched
/// case-insensitively against the underlying driver message.
const CONNECTIVITY_MARKERS: &[&str] = &[
    "connection refused",
    "connection reset",
    "connection closed",
    "unable to connect",
    "failed to connect",
    "dns error",
    "timed out",
    "handshake",
    "unauthorized",
    "auth token",
];

#[derive(Error, Debug)]
pub enum FestError {
    /// The store is unreachable or rejected our credentials. Commonly
    /// transient; callers may retry.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// A transactional write step failed. The whole import was rolled back.
    #[error("import write failed: {message}")]
    WriteFailed { message: String },

    #[error("database error: {message}")]
    Database { message: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FestError {
    /// Classify a raw store error message, distinguishing connectivity and
    /// credential failures from ordinary statement failures.
    pub fn from_store(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if CONNECTIVITY_MARKERS.iter().any(|m| lower.contains(m)) {
            FestError::StoreUnavailable { message }
        } else {
            FestError::Database { message }
        }
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, FestError::StoreUnavailable { .. })
    }
}

impl From<libsql::Error> for FestError {
    fn from(err: libsql::Error) -> Self {
        FestError::from_store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_messages_classify_as_unavailable() {
        let err = FestError::from_store("Hrana: connection refused (os error 111)");
        assert!(err.is_store_unavailable());

        let err = FestError::from_store("server returned 401 Unauthorized");
        assert!(err.is_store_unavailable());
    }

    #[test]
    fn statement_failures_stay_database_errors() {
        let err = FestError::from_store("no such table: event_prices");
        assert!(matches!(err, FestError::Database { .. }));
    }
}
