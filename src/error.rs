//! Error types for the harvesting pipeline.
//!
//! Fetch and parse failures are absorbed inside the pipeline (by the
//! extractor, the enricher, or the pagination controller's retry policy).
//! Only [`HarvestError`] is allowed to reach the service boundary.

use thiserror::Error;

/// How a failed fetch should be counted by retry policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Upstream answered HTTP 429.
    RateLimited,
    /// Any other non-2xx status, timeout, or connection error.
    Generic,
}

/// A single outbound request that did not produce a usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Rate limited by upstream (HTTP 429) for {url}")]
    RateLimited { url: String },
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    /// Classify this failure for backoff accounting.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::RateLimited { .. } => FailureKind::RateLimited,
            FetchError::Status { status: 429, .. } => FailureKind::RateLimited,
            _ => FailureKind::Generic,
        }
    }
}

/// Markup that could not be turned into records.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
    #[error("Listing item has neither position nor company")]
    MissingIdentity,
    #[error("Response is a full HTML document, not a listing fragment")]
    NotAFragment,
}

/// Failure to turn one listing page into records.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl PageError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PageError::Fetch(e) => e.kind(),
            PageError::Parse(_) => FailureKind::Generic,
        }
    }
}

/// Faults that abort a whole harvest and surface to the caller.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ParseError> for HarvestError {
    fn from(e: ParseError) -> Self {
        HarvestError::Config(e.to_string())
    }
}
