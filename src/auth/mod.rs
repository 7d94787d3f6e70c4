//! Authentication module
//!
//! Supports: static Bearer tokens (Wrike) and service-account JWT exchange
//! (BigQuery).
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! exchanged access tokens until shortly before they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{
    AuthConfig, CachedToken, ServiceAccountKey, BIGQUERY_SCOPE, GOOGLE_TOKEN_URI,
};
