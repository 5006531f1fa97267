//! Rentsweep: a resilient rental-listing extraction pipeline
//!
//! This crate scrapes rental listings from a JavaScript-rendered property
//! search site, surviving rate limiting and partial renders through a
//! transport fallback ladder, then validates, deduplicates and delivers
//! complete records to a remote sink with a durable local buffer.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod listing;
pub mod output;
pub mod transport;
pub mod url;

use thiserror::Error;

/// Main error type for rentsweep operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// The only fatal error class: anything here aborts the run at INIT,
/// before any crawl activity begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Parse {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Navigation failure for a single URL attempt
///
/// `Blocked` and `Timeout` route to different recovery paths in the
/// fallback ladder: a timeout retries the same transport once, a block
/// escalates to the next transport immediately.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Navigation timed out for {url}")]
    Timeout { url: String },

    #[error("Non-success status {status} for {url}")]
    NonSuccess { url: String, status: u16 },

    #[error("Blocked response (status {status}) for {url}")]
    Blocked { url: String, status: u16 },
}

/// Fetch failure after the fallback ladder is exhausted
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("All {attempts} transport attempts exhausted for {url}")]
    Exhausted { url: String, attempts: u32 },
}

/// Extraction failure: neither structured data nor DOM fallback found anything
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No structured data or recognizable markup in {url}")]
    NoStructuredData { url: String },
}

/// Delivery failure when posting a record to the remote sink
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Sink unreachable: {0}")]
    SinkUnreachable(#[source] reqwest::Error),

    #[error("Sink rejected record with status {status}")]
    SinkRejected { status: u16 },
}

/// Transport-level failure inside the rendering engine
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timed out for {url}")]
    Timeout { url: String },
}

/// Result type alias for rentsweep operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use crate::url::canonical_url;
pub use config::Config;
pub use crawler::{run_scrape, QuotaExceeded};
pub use listing::{CandidateRecord, DedupeKey, ValidatedRecord, ValidationOutcome};
pub use transport::{resolve_proxy, TransportDescriptor};
