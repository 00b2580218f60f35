// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Transport-agnostic request descriptors

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::StreamHandle;

/// HTTP method of an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Query-string request
    Get,
    /// Multipart request
    Post,
    /// Path-only request
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a `{name}` path template segment, or `None` for a literal segment
pub fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// A text part sent with an explicit content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedField {
    /// Encoded payload
    pub value: String,
    /// MIME type of the payload
    pub content_type: String,
}

impl EncodedField {
    /// JSON-encode `value` into a part tagged `application/json`
    pub fn json(value: &Value) -> Self {
        Self {
            value: value.to_string(),
            content_type: "application/json".to_string(),
        }
    }
}

/// One field of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    /// Binary payload streamed from a caller-owned source
    Stream(StreamHandle),
    /// Plain text field
    Text(String),
    /// Text field with an explicit content type
    Encoded(EncodedField),
}

/// Fully resolved description of one outgoing request
///
/// `path` is a template: every `{name}` segment is filled from `path_params`
/// by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: HttpMethod,
    /// Path template relative to the service base URL
    pub path: String,
    /// Values for the placeholders in `path`
    pub path_params: BTreeMap<String, String>,
    /// Query parameters, structured values left for the dispatcher to flatten
    pub query_params: BTreeMap<String, Value>,
    /// Multipart body fields, empty for requests without a body
    pub multipart_fields: BTreeMap<String, MultipartField>,
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Create a descriptor with no parameters
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: BTreeMap::new(),
            query_params: BTreeMap::new(),
            multipart_fields: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Whether the request carries a multipart body
    pub fn has_body(&self) -> bool {
        !self.multipart_fields.is_empty()
    }

    /// Fill the path template from `path_params`
    ///
    /// Returns `None` if a placeholder has no value. Values are substituted
    /// verbatim; percent-encoding is the dispatcher's job.
    pub fn path_segments(&self) -> Option<Vec<&str>> {
        self.path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match placeholder(segment) {
                Some(name) => self.path_params.get(name).map(String::as_str),
                None => Some(segment),
            })
            .collect()
    }
}
