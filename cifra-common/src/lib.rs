//! Common types and utilities shared across cifra crates.
//!
//! This crate holds the observability helpers and the shared error type used
//! by the acquisition layer. It stays dependency-light so every crate in the
//! workspace can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`CifraError`] and [`Result`]: Shared error handling for markup sources
//!
//! # Examples
//!
//! ```rust
//! use cifra_common::CifraError;
//!
//! let err = CifraError::SourceUnavailable("connection refused".into());
//! assert!(err.is_source_unavailable());
//! assert_eq!(err.to_string(), "Source unavailable: connection refused");
//! ```

pub mod observability;

/// Error types used by the acquisition layer (markup sources, search, browser).
#[derive(thiserror::Error, Debug)]
pub enum CifraError {
    /// The markup source could not produce page markup (network, blocked, timeout).
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A driver (browser, network, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request kind is not supported by the selected source.
    #[error("Unsupported request: {0}")]
    Unsupported(String),

    /// No search engine produced a usable candidate.
    #[error("No results for query: {0}")]
    NoResults(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

impl CifraError {
    /// Whether this failure means no markup could be obtained at all.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            CifraError::SourceUnavailable(_) | CifraError::Driver(_) | CifraError::Timeout
        )
    }
}

/// Convenient alias for results that use [`CifraError`].
pub type Result<T> = std::result::Result<T, CifraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_and_timeout_count_as_unavailable() {
        assert!(CifraError::Timeout.is_source_unavailable());
        assert!(CifraError::from(anyhow::anyhow!("boom")).is_source_unavailable());
        assert!(!CifraError::Unsupported("query".into()).is_source_unavailable());
        assert!(!CifraError::Config("bad".into()).is_source_unavailable());
    }
}
