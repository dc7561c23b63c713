//! Error types for the market comparison engine

use thiserror::Error;

/// Errors that can occur when fetching a listings page from a data source
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be parsed into listing records
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Data source answered with a non-success status
    #[error("Provider API error: {0}")]
    Api(String),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,
}

impl FetchError {
    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Errors raised when assigning an entity to a comparison slot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No record in the current snapshot carries this name
    #[error("No listing named {name:?} in the current snapshot")]
    LookupMiss { name: String },
}

impl SelectionError {
    /// Creates a LookupMiss error
    pub fn lookup_miss(name: &str) -> Self {
        Self::LookupMiss {
            name: name.to_string(),
        }
    }
}

/// Errors raised by the derived metrics calculator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// A zero market cap or price sits in a denominator position
    #[error("Degenerate input: {reason}")]
    DegenerateInput { reason: String },

    /// One or both comparison slots are empty
    #[error("Comparison selection is incomplete")]
    IncompleteSelection,
}

impl MetricsError {
    /// Creates a DegenerateInput error
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            reason: reason.into(),
        }
    }
}
