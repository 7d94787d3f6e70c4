//! Error types for tap-wrike
//!
//! This module defines the error hierarchy for the whole tap.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tap-wrike
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("No access token configured (set `access_token` in the config file)")]
    AuthConfigMissing,

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("JWT generation failed: {message}")]
    JwtGeneration { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    ClientError {
        status: u16,
        url: String,
        body: String,
    },

    #[error("HTTP {status} from {url}: {body}")]
    ServerError {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request failed after {attempts} attempts: {message}")]
    TransientNetworkFailure { attempts: u32, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No schema found for stream '{stream}'")]
    SchemaNotFound { stream: String },

    #[error("No bulk export resource named '{name}'")]
    ResourceNotFound { name: String },

    #[error("Cannot transform '{field}' in stream '{stream}': {message}")]
    Transform {
        stream: String,
        field: String,
        message: String,
    },

    // ============================================================================
    // Destination Errors
    // ============================================================================
    #[error("Warehouse error: {message}")]
    Warehouse { message: String },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a transform error
    pub fn transform(
        stream: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transform {
            stream: stream.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a warehouse error
    pub fn warehouse(message: impl Into<String>) -> Self {
        Self::Warehouse {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Build the error for a non-success HTTP status
    pub fn from_status(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        let (url, body) = (url.into(), body.into());
        if (400..500).contains(&status) {
            Self::ClientError { status, url, body }
        } else {
            Self::ServerError { status, url, body }
        }
    }

    /// Check if this error is worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_decode() && !e.is_builder(),
            Error::ServerError { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for tap-wrike
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("bq_project");
        assert_eq!(err.to_string(), "Missing required config field: bq_project");

        let err = Error::SchemaNotFound {
            stream: "tasks".to_string(),
        };
        assert_eq!(err.to_string(), "No schema found for stream 'tasks'");
    }

    #[test_case(400 ; "bad request")]
    #[test_case(401 ; "unauthorized")]
    #[test_case(404 ; "not found")]
    #[test_case(429 ; "too many requests")]
    #[test_case(499 ; "upper bound")]
    fn test_client_statuses_are_terminal(status: u16) {
        let err = Error::from_status(status, "https://example.com", "");
        assert!(matches!(err, Error::ClientError { .. }));
        assert!(!err.is_retryable());
    }

    #[test_case(500 ; "internal error")]
    #[test_case(502 ; "bad gateway")]
    #[test_case(503 ; "unavailable")]
    #[test_case(599 ; "upper bound")]
    fn test_server_statuses_are_retryable(status: u16) {
        let err = Error::from_status(status, "https://example.com", "");
        assert!(matches!(err, Error::ServerError { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_configuration_errors_not_retryable() {
        assert!(!Error::AuthConfigMissing.is_retryable());
        assert!(!Error::config("bad").is_retryable());
        assert!(!Error::ResourceNotFound {
            name: "tasks".to_string()
        }
        .is_retryable());
    }
}
