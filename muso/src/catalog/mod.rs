//! External catalog access
//!
//! The catalog client is the sole point of contact with the metadata
//! service. All requests are rate limited, issued strictly sequentially,
//! and retried with exponential backoff when the service pushes back.

pub mod client;
pub mod retry;
pub mod types;

pub use client::{CatalogClient, HydrateOptions};
pub use retry::RetryPolicy;

use thiserror::Error;

/// Catalog access errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Rate limited by the service (429)
    #[error("catalog rate limit hit (429)")]
    RateLimited,

    /// Service temporarily unavailable (503)
    #[error("catalog service unavailable (503)")]
    Unavailable,

    /// Malformed request, typically a bad identifier (400)
    #[error("catalog rejected request: {0}")]
    BadRequest(String),

    /// Entity does not exist (404)
    #[error("catalog entity not found: {0}")]
    NotFound(String),

    /// Transport-level failure (connect, timeout, body read)
    #[error("catalog transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other non-success status
    #[error("unexpected catalog response: {0}")]
    UnexpectedResponse(String),
}

impl CatalogError {
    /// Whether retrying the same request can reasonably succeed.
    ///
    /// Bad requests and missing entities are permanent; everything else
    /// (rate limits, outages, transport hiccups) is worth retrying.
    pub fn is_transient(&self) -> bool {
        !matches!(self, CatalogError::BadRequest(_) | CatalogError::NotFound(_))
    }
}
