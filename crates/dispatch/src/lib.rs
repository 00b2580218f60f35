// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Dispatcher seam for the visual recognition client
//!
//! The parameter pipeline never talks to the network. It hands every
//! [`RequestDescriptor`] it builds to a [`Dispatcher`], together with the
//! process-wide [`ServiceConfig`].
//!
//! # Contents
//!
//! - **`Dispatcher` Trait**: the single call the pipeline makes into transport
//! - **Service Configuration**: [`config::ServiceConfig`], loaded through the `config` crate
//! - **HTTP Transport**: [`http::HttpDispatcher`], a thin reqwest implementation without retries
//! - **Validation Utilities**: [`non_empty_string::NonEmptyString`] for configuration values

use request_types::RequestDescriptor;
use serde_json::Value;

pub mod config;
pub mod error;
pub mod http;
pub mod non_empty_string;

pub use config::{
    ConfigurationError, DEFAULT_SERVICE_URL, ServiceConfig, ServiceSettings, TimeoutSeconds,
    VERSION_DATE_2016_05_20,
};
pub use error::DispatchError;
pub use http::HttpDispatcher;
pub use non_empty_string::NonEmptyString;

/// Performs the transport for a built request
///
/// Implementations own authentication and default query injection, HTTP
/// transport and JSON decoding of the response body.
pub trait Dispatcher: Send + Sync {
    /// Send the request described by `descriptor` and decode the response
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, the service answers
    /// with a non-success status, or the body is not valid JSON
    fn dispatch(
        &self,
        descriptor: RequestDescriptor,
        config: &ServiceConfig,
    ) -> impl Future<Output = Result<Value, DispatchError>> + Send;
}
