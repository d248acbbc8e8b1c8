//! # Nexus Gateway
//!
//! Rate-limited access to the CMS Content Delivery API.
//!
//! This crate owns every outbound CMS call:
//! - [`RateLimiter`] serialises requests into a single FIFO queue at a fixed maximum rate
//! - [`ContentDeliveryClient`] issues the HTTP requests and maps failures to [`GatewayError`]
//! - [`ContentService`] is the entry point for renderers: fetch, validate, apply the fallback
//!   policy
//!
//! **No rendering concerns**: HTTP routes and page metadata belong in `api-rest`.

pub mod cdn;
pub mod config;
pub mod content;
pub mod rate_limiter;

#[cfg(test)]
mod test_support;

pub use cdn::{ContentDeliveryClient, ContentVersion, StorySummary};
pub use config::{ConfigError, GatewayConfig, Region};
pub use content::ContentService;
pub use rate_limiter::{Pending, RateLimiter};

use nexus_schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("CMS returned HTTP {status} for {resource}")]
    Status { resource: String, status: u16 },

    #[error("request for {resource} failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response for {resource} did not match the expected shape at {path}: {message}")]
    Decode {
        resource: String,
        path: String,
        message: String,
    },

    #[error("content for {resource} is unusable: {source}")]
    Content {
        resource: String,
        #[source]
        source: SchemaError,
    },

    #[error("invalid slug '{0}'")]
    InvalidSlug(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("queued request was aborted before it completed")]
    TaskAborted,
}

impl GatewayError {
    /// Returns true if the CMS answered that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
