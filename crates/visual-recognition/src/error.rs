// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for parameter validation and operation calls

use dispatch::{ConfigurationError, DispatchError};
use thiserror::Error;

/// Result type alias for the parameter pipeline
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Category of a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Neither or both of the alternative inputs were supplied
    MissingOrConflictingInput,
    /// An input that must be a byte stream is not one
    InvalidStreamType,
    /// A required parameter is absent or empty
    MissingRequiredParameter,
    /// Too few class-example sets for training
    InsufficientTrainingExamples,
    /// A value cannot be placed in its request slot
    InvalidParameterValue,
}

/// Rejection of a parameter bag
///
/// Every variant is recoverable: fix the bag and call again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Neither or both of the alternative inputs were supplied
    #[error("Missing required parameters: {message}")]
    MissingOrConflictingInput {
        /// Which inputs were expected
        message: String,
    },

    /// An input that must be a byte stream is not one
    #[error("{key} param must be a readable byte stream")]
    InvalidStreamType {
        /// Offending key
        key: String,
    },

    /// A required parameter is absent or empty
    #[error("Missing required parameters: {key}")]
    MissingRequiredParameter {
        /// First missing key in declaration order
        key: String,
    },

    /// Too few class-example sets for training
    #[error(
        "Missing required parameters: either two *_positive_examples or one *_positive_examples and one negative_examples must be provided (found {found}, need {required})"
    )]
    InsufficientTrainingExamples {
        /// Class-example keys found in the bag
        found: usize,
        /// Minimum number of class-example keys
        required: usize,
    },

    /// A value cannot be placed in its request slot
    #[error("Invalid value for {key}: {message}")]
    InvalidParameterValue {
        /// Offending key
        key: String,
        /// What was wrong with the value
        message: String,
    },
}

impl ValidationError {
    /// Category of this error
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::MissingOrConflictingInput { .. } => {
                ValidationErrorKind::MissingOrConflictingInput
            }
            ValidationError::InvalidStreamType { .. } => ValidationErrorKind::InvalidStreamType,
            ValidationError::MissingRequiredParameter { .. } => {
                ValidationErrorKind::MissingRequiredParameter
            }
            ValidationError::InsufficientTrainingExamples { .. } => {
                ValidationErrorKind::InsufficientTrainingExamples
            }
            ValidationError::InvalidParameterValue { .. } => {
                ValidationErrorKind::InvalidParameterValue
            }
        }
    }

    pub(crate) fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors returned by the operation entry points
#[derive(Debug, Error)]
pub enum VisualRecognitionError {
    /// The parameter bag was rejected; nothing was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Service configuration is unusable
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The dispatcher failed to complete the request
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl VisualRecognitionError {
    /// Validation failure behind this error, if any
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            VisualRecognitionError::Validation(error) => Some(error),
            _ => None,
        }
    }
}
