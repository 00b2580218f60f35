// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Visual recognition client
//!
//! Validates loosely-typed parameter bags against per-operation contracts and
//! turns them into transport-agnostic request descriptors for a
//! [`Dispatcher`](dispatch::Dispatcher).
//!
//! # Architecture
//!
//! - **Contracts**: [`operation`] - one static [`OperationContract`] per [`Operation`]
//! - **Input Resolver**: [`resolver`] - alias folding and stream-or-URL exclusivity
//! - **Parameter Set Validator**: [`validator`] - required keys and training example sets
//! - **Request Descriptor Builder**: [`builder`] - GET, multipart POST or DELETE
//! - **Service Facade**: [`service::VisualRecognition`] - one async entry point per operation
//!
//! # Example
//!
//! ```no_run
//! use request_types::ParameterBag;
//! use visual_recognition::VisualRecognition;
//!
//! # async fn run() -> visual_recognition::Result<()> {
//! let client = VisualRecognition::from_env()?;
//! let params = ParameterBag::new().with("url", "https://example.com/dog.jpg");
//! let classes = client.classify(&params).await?;
//! println!("{classes}");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod operation;
pub mod resolver;
pub mod service;
pub mod validator;

pub use error::{ValidationError, ValidationErrorKind, ValidationResult, VisualRecognitionError};
pub use operation::{InputMode, Operation, OperationContract};
pub use resolver::{ResolvedInput, ResolvedParams};
pub use service::{Result, VisualRecognition, prepare};
pub use validator::{TrainingExamples, ValidatedParams};
