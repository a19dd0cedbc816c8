//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum returned by every provider call
//! - [`FailureClass`]: How the caching layer should treat a failed lookup

mod failure;

pub use failure::FailureClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`FailureClass`] via the
/// [`failure_class`](Self::failure_class) method, which the quote cache uses
/// to decide between stale-value fallback and negative caching.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered but the payload had no usable price.
    #[error("Invalid payload from {provider}: {message}")]
    InvalidPayload {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The provider responded with a non-success HTTP status.
    #[error("HTTP {status} from {provider}")]
    HttpStatus {
        /// The provider that returned the status
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// No exchange rate is available to convert a quote.
    #[error("No FX rate for {from}/{to}")]
    FxRateUnavailable {
        /// Source currency
        from: String,
        /// Target currency
        to: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use familyfolio_market_data::errors::{FailureClass, MarketDataError};
    ///
    /// let error = MarketDataError::Timeout { provider: "FINNHUB".to_string() };
    /// assert_eq!(error.failure_class(), FailureClass::Transient);
    ///
    /// let error = MarketDataError::SymbolNotFound("NOPE".to_string());
    /// assert_eq!(error.failure_class(), FailureClass::Terminal);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Timeout { .. } | Self::Network(_) => FailureClass::Transient,

            Self::SymbolNotFound(_)
            | Self::InvalidPayload { .. }
            | Self::HttpStatus { .. }
            | Self::FxRateUnavailable { .. } => FailureClass::Terminal,
        }
    }

    /// Shorthand for `failure_class() == FailureClass::Transient`.
    pub fn is_transient(&self) -> bool {
        self.failure_class() == FailureClass::Transient
    }

    pub(crate) fn invalid_payload(provider: &str, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Map a reqwest error into a provider-tagged error, keeping timeouts distinct.
    pub(crate) fn from_request(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else if err.is_decode() {
            Self::invalid_payload(provider, err.to_string())
        } else {
            Self::Network(err)
        }
    }
}
