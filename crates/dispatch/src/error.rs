// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Transport errors

use thiserror::Error;

/// Errors raised while dispatching a request
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DispatchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Network timeout
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// Service returned an error response
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// Descriptor cannot be turned into a request
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A byte source could not be read
    #[error("Failed to read stream for field '{field}': {source}")]
    Stream {
        field: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Blocking work for the request body did not complete
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
