// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Operation entry points
//!
//! [`prepare`] runs the synchronous pipeline (resolve, validate, build) for a
//! single call. [`VisualRecognition`] wraps it with a shared configuration
//! and a [`Dispatcher`], exposing one async method per operation.

use std::sync::Arc;

use dispatch::{ConfigurationError, Dispatcher, HttpDispatcher, ServiceConfig, ServiceSettings};
use request_types::{ParameterBag, RequestDescriptor};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    builder::build,
    error::{ValidationResult, VisualRecognitionError},
    operation::Operation,
    resolver::resolve,
    validator::validate,
};

/// Result type alias for operation calls
pub type Result<T> = std::result::Result<T, VisualRecognitionError>;

/// Turn a caller's parameter bag into the request descriptor for `operation`
///
/// The caller's bag is left untouched and no stream is opened.
///
/// # Errors
///
/// Returns the first [`ValidationError`](crate::ValidationError) raised by
/// input resolution, contract validation or descriptor construction
pub fn prepare(operation: Operation, params: &ParameterBag) -> ValidationResult<RequestDescriptor> {
    let contract = operation.contract();
    let resolved = resolve(params, contract.input_mode)?;
    let validated = validate(resolved, contract)?;
    build(&validated, contract)
}

/// Client for the visual recognition service
///
/// Cheap to share: the configuration sits behind an [`Arc`] and every call
/// only borrows `self`.
#[derive(Debug, Clone)]
pub struct VisualRecognition<D> {
    config: Arc<ServiceConfig>,
    dispatcher: D,
}

impl<D: Dispatcher> VisualRecognition<D> {
    /// Create a client from a validated configuration
    pub fn new(config: impl Into<Arc<ServiceConfig>>, dispatcher: D) -> Self {
        Self {
            config: config.into(),
            dispatcher,
        }
    }

    /// Create a client from raw settings
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the settings lack a version date or
    /// carry an invalid URL or timeout
    pub fn from_settings(
        settings: ServiceSettings,
        dispatcher: D,
    ) -> std::result::Result<Self, ConfigurationError> {
        Ok(Self::new(ServiceConfig::from_settings(settings)?, dispatcher))
    }

    /// Shared service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Dispatcher requests are handed to
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Validate `params` for `operation` and dispatch the resulting request
    ///
    /// A rejected bag never reaches the dispatcher. Otherwise exactly one
    /// dispatch happens and its outcome is returned as is.
    ///
    /// # Errors
    ///
    /// Returns [`VisualRecognitionError::Validation`] for a rejected bag and
    /// [`VisualRecognitionError::Dispatch`] if the dispatcher fails
    pub async fn call(&self, operation: Operation, params: &ParameterBag) -> Result<Value> {
        let descriptor = match prepare(operation, params) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                warn!(%operation, kind = ?error.kind(), %error, "rejected parameters");
                return Err(error.into());
            }
        };

        debug!(%operation, path = %descriptor.path, "handing request to dispatcher");
        Ok(self.dispatcher.dispatch(descriptor, &self.config).await?)
    }

    /// Classify an image given as `images_file` (or `image_file`) or `url`
    ///
    /// Forwards `classifier_ids`, `owners` and `threshold`. `classifier_ids`
    /// defaults to `["default"]` and `owners` to `["me", "IBM"]`.
    ///
    /// # Errors
    ///
    /// See [`VisualRecognition::call`]
    pub async fn classify(&self, params: &ParameterBag) -> Result<Value> {
        self.call(Operation::Classify, params).await
    }

    /// Detect faces in an image given as `images_file` or `url`
    ///
    /// # Errors
    ///
    /// See [`VisualRecognition::call`]
    pub async fn detect_faces(&self, params: &ParameterBag) -> Result<Value> {
        self.call(Operation::DetectFaces, params).await
    }

    /// Recognize text in an image given as `images_file` or `url`
    ///
    /// # Errors
    ///
    /// See [`VisualRecognition::call`]
    pub async fn recognize_text(&self, params: &ParameterBag) -> Result<Value> {
        self.call(Operation::RecognizeText, params).await
    }

    /// Train a classifier
    ///
    /// Needs at least two example sets: `<class>_positive_examples` streams,
    /// optionally with one `negative_examples` stream. `name` is forwarded.
    ///
    /// # Errors
    ///
    /// See [`VisualRecognition::call`]
    pub async fn create_classifier(&self, params: &ParameterBag) -> Result<Value> {
        self.call(Operation::CreateClassifier, params).await
    }

    /// List classifiers, forwarding `verbose`
    ///
    /// # Errors
    ///
    /// See [`VisualRecognition::call`]
    pub async fn list_classifiers(&self, params: &ParameterBag) -> Result<Value> {
        self.call(Operation::ListClassifiers, params).await
    }

    /// Fetch the classifier named by `classifier_id`
    ///
    /// # Errors
    ///
    /// See [`VisualRecognition::call`]
    pub async fn get_classifier(&self, params: &ParameterBag) -> Result<Value> {
        self.call(Operation::GetClassifier, params).await
    }

    /// Delete the classifier named by `classifier_id`
    ///
    /// # Errors
    ///
    /// See [`VisualRecognition::call`]
    pub async fn delete_classifier(&self, params: &ParameterBag) -> Result<Value> {
        self.call(Operation::DeleteClassifier, params).await
    }
}

impl VisualRecognition<HttpDispatcher> {
    /// Create a client that sends requests over HTTP
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn connect(config: ServiceConfig) -> Result<Self> {
        let dispatcher = HttpDispatcher::new(&config)?;
        Ok(Self::new(config, dispatcher))
    }

    /// Create an HTTP client from `visual_recognition.json` and
    /// `VISUAL_RECOGNITION_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns [`VisualRecognitionError::Configuration`] if the settings cannot
    /// be loaded or are invalid
    pub fn from_env() -> Result<Self> {
        Self::connect(ServiceConfig::from_env()?)
    }
}
