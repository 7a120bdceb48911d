//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single capability the
//! retrieval pipeline needs from an upstream vendor: "give me the bars for one
//! symbol, one interval, between two instants". Concrete vendors (currently
//! [`alpaca_rest`]) handle authentication, pagination, rate limiting and the
//! mapping of their native bar format into [`Candle`]s.
//!
//! The trait is object safe so a client can hold an `Arc<dyn DataProvider>`
//! chosen at runtime.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use candle_history::models::{candle::Candle, request_params::BarsRequestParams};
//! use candle_history::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<Candle>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod alpaca_rest;

use async_trait::async_trait;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{candle::Candle, request_params::BarsRequestParams, timeframe::TimeFrame};

/// Trait for fetching time-series bars from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Checks that the provider can serve `timeframe` at all.
    ///
    /// Called once per retrieval before any network activity. A failure here
    /// is a configuration error and is never retried.
    fn validate_timeframe(&self, _timeframe: &TimeFrame) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Fetches every bar for `params.symbol` between `params.start` and
    /// `params.end`, following pagination to the end.
    ///
    /// An empty vector means the upstream has no data for the range.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<Candle>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// A zero timeout would fail every request.
    #[snafu(display("Invalid request timeout: must be at least one second"))]
    InvalidTimeout { backtrace: Backtrace },

    /// Rate limit must allow at least one request per minute.
    #[snafu(display("Invalid rate limit: {requests_per_minute} requests per minute"))]
    InvalidRateLimit {
        requests_per_minute: u32,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, truncated body).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider answered with a non-success HTTP status.
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl ProviderError {
    /// Whether the failure is transient and the batch should be retried.
    ///
    /// Transport errors and HTTP 408, 429 and 5xx are transient. Other 4xx,
    /// bad parameters, undecodable payloads and init failures abort the
    /// retrieval.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Reqwest { source, .. } => !(source.is_builder() || source.is_decode()),
            ProviderError::Api { status, .. } => {
                matches!(*status, 408 | 429) || (500..600).contains(status)
            }
            ProviderError::Validation { .. }
            | ProviderError::Internal { .. }
            | ProviderError::Init { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_and_server_errors_are_retryable() {
        for status in [408u16, 429, 500, 502, 503, 504] {
            let err = ApiSnafu {
                status,
                message: "try later",
            }
            .build();
            assert!(err.is_retryable(), "status {status} should be retryable");
        }
    }

    #[test]
    fn client_errors_are_fatal() {
        for status in [400u16, 401, 403, 404, 422] {
            let err = ApiSnafu {
                status,
                message: "nope",
            }
            .build();
            assert!(!err.is_retryable(), "status {status} should be fatal");
        }

        let err = ValidationSnafu {
            message: "bad timeframe",
        }
        .build();
        assert!(!err.is_retryable());

        let err = InternalSnafu {
            message: "bad timestamp",
        }
        .build();
        assert!(!err.is_retryable());
    }

    #[test]
    fn display_includes_status() {
        let err = ApiSnafu {
            status: 429u16,
            message: "too many requests",
        }
        .build();
        assert_eq!(err.to_string(), "API error (429): too many requests");
    }
}
