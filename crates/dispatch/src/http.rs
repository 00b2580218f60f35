// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! reqwest-backed [`Dispatcher`]
//!
//! Turns a [`RequestDescriptor`] into one HTTP request against the configured
//! service. The version date and API key are injected as query parameters on
//! every request. No retries are attempted.

use std::{collections::BTreeMap, io::Read};

use reqwest::{
    Client, Method, StatusCode,
    multipart::{Form, Part},
};
use request_types::{EncodedField, HttpMethod, MultipartField, RequestDescriptor};
use serde_json::Value;
use tokio::{task, time::timeout};
use tracing::{debug, info, warn};
use url::Url;

use crate::{Dispatcher, config::ServiceConfig, error::DispatchError};

/// HTTP transport for built requests
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    /// Create a dispatcher whose client timeout follows `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: &ServiceConfig) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(config.timeout().value())
            .user_agent(concat!("visual-recognition/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        descriptor: RequestDescriptor,
        config: &ServiceConfig,
    ) -> Result<Value, DispatchError> {
        let url = request_url(config, &descriptor)?;
        let query: Vec<(&str, String)> = descriptor
            .query_params
            .iter()
            .map(|(key, value)| (key.as_str(), query_value(value)))
            .collect();

        debug!(%url, method = %descriptor.method, ?query, "building visual recognition request");

        let mut request = self
            .client
            .request(method(descriptor.method), url.clone())
            .query(&config.default_query())
            .query(&query);

        for (name, value) in &descriptor.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if descriptor.has_body() {
            let fields = descriptor.multipart_fields;
            let form = task::spawn_blocking(move || multipart_form(fields)).await??;
            request = request.multipart(form);
        }

        info!(%url, method = %descriptor.method, "dispatching visual recognition request");

        let timeout_seconds = config.timeout().seconds();
        let response = timeout(config.timeout().value(), request.send())
            .await
            .map_err(|_| DispatchError::Timeout { timeout_seconds })??;

        match response.status() {
            status if status.is_success() => {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&text).map_err(|e| DispatchError::InvalidResponse {
                    message: e.to_string(),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(%url, "visual recognition request rejected: unauthorized");
                Err(DispatchError::Authentication {
                    message: response.text().await.unwrap_or_default(),
                })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(%url, "visual recognition request rate limited");
                Err(DispatchError::RateLimitExceeded)
            }
            status => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(%url, status = status.as_u16(), %message, "visual recognition API error");
                Err(DispatchError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

/// Resolve the absolute URL of a descriptor against the service base URL
///
/// Path parameters are percent-encoded as single path segments.
///
/// # Errors
///
/// Returns an error if a path placeholder has no value or the base URL
/// cannot carry a path
pub fn request_url(
    config: &ServiceConfig,
    descriptor: &RequestDescriptor,
) -> Result<Url, DispatchError> {
    let segments = descriptor
        .path_segments()
        .ok_or_else(|| DispatchError::InvalidRequest {
            message: format!("missing path parameter for '{}'", descriptor.path),
        })?;

    let mut url = config.base_url().clone();
    url.path_segments_mut()
        .map_err(|()| DispatchError::Configuration {
            message: format!("base URL '{}' cannot carry a path", config.base_url()),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Lists travel comma-separated, other non-string values as their JSON text
fn query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Read every stream and assemble the form
///
/// Opens and reads caller-owned byte sources, so it must run off the async
/// workers.
fn multipart_form(fields: BTreeMap<String, MultipartField>) -> Result<Form, DispatchError> {
    let mut form = Form::new();

    for (name, field) in fields {
        let part = match field {
            MultipartField::Stream(handle) => {
                let mut bytes = Vec::new();
                handle
                    .open()
                    .and_then(|mut reader| reader.read_to_end(&mut bytes))
                    .map_err(|source| DispatchError::Stream {
                        field: name.clone(),
                        source,
                    })?;

                let mut part = Part::bytes(bytes);
                if let Some(file_name) = handle.file_name() {
                    part = part.file_name(file_name);
                }
                if let Some(content_type) = handle.content_type() {
                    part = part.mime_str(&content_type)?;
                }
                part
            }
            MultipartField::Text(text) => Part::text(text),
            MultipartField::Encoded(EncodedField {
                value,
                content_type,
            }) => Part::text(value).mime_str(&content_type)?,
        };
        form = form.part(name, part);
    }

    Ok(form)
}
