// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Parameter set validation
//!
//! Checks that a resolved bag holds the keys its operation needs. For classifier
//! training the key space is open-ended: every `<class>_positive_examples` key
//! names a class, so the bag is scanned and the matching keys are collected
//! into a closed [`TrainingExamples`] structure.
//!
//! Keys the operation does not know about are never rejected here.

use std::collections::BTreeMap;

use request_types::{ParamValue, ParameterBag, StreamHandle};
use tracing::debug;

use crate::{
    error::{ValidationError, ValidationResult},
    operation::{DynamicKeys, NEGATIVE_EXAMPLES, OperationContract, POSITIVE_EXAMPLES_SUFFIX},
    resolver::{ResolvedInput, ResolvedParams},
};

/// Example sets collected from a training bag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingExamples {
    /// Positive example sets keyed by class name
    pub positive: BTreeMap<String, StreamHandle>,
    /// Negative example set, if supplied
    pub negative: Option<StreamHandle>,
}

impl TrainingExamples {
    /// Number of example sets
    pub fn len(&self) -> usize {
        self.positive.len() + usize::from(self.negative.is_some())
    }

    /// Whether no example set was collected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Multipart field name and stream of every example set, positives first
    pub fn fields(&self) -> impl Iterator<Item = (String, &StreamHandle)> {
        self.positive
            .iter()
            .map(|(class, stream)| (format!("{class}{POSITIVE_EXAMPLES_SUFFIX}"), stream))
            .chain(
                self.negative
                    .iter()
                    .map(|stream| (NEGATIVE_EXAMPLES.to_string(), stream)),
            )
    }
}

/// Parameters that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams {
    /// Normalized bag
    pub bag: ParameterBag,
    /// Image input chosen by the resolver
    pub input: ResolvedInput,
    /// Training example sets, for operations with a dynamic key space
    pub training: Option<TrainingExamples>,
}

/// Validate a resolved bag against `contract`
///
/// # Errors
///
/// - [`ValidationError::MissingRequiredParameter`] naming the first missing required key
/// - [`ValidationError::InsufficientTrainingExamples`] if too few class-example keys exist
/// - [`ValidationError::InvalidStreamType`] if a class-example key does not hold a stream
pub fn validate(
    resolved: ResolvedParams,
    contract: &OperationContract,
) -> ValidationResult<ValidatedParams> {
    let ResolvedParams { bag, input } = resolved;

    if let Some(key) = contract
        .required_keys
        .iter()
        .find(|key| !bag.is_present(key))
    {
        debug!(operation = %contract.operation, key, "required parameter missing");
        return Err(ValidationError::MissingRequiredParameter {
            key: (*key).to_string(),
        });
    }

    let training = contract
        .dynamic_keys
        .map(|dynamic| collect_examples(&bag, dynamic))
        .transpose()?;

    Ok(ValidatedParams {
        bag,
        input,
        training,
    })
}

fn collect_examples(bag: &ParameterBag, dynamic: DynamicKeys) -> ValidationResult<TrainingExamples> {
    let matched: Vec<(&String, &ParamValue)> =
        bag.iter().filter(|(key, _)| (dynamic.matcher)(key)).collect();

    if matched.len() < dynamic.min_matches {
        debug!(
            found = matched.len(),
            required = dynamic.min_matches,
            "not enough training example sets"
        );
        return Err(ValidationError::InsufficientTrainingExamples {
            found: matched.len(),
            required: dynamic.min_matches,
        });
    }

    let mut examples = TrainingExamples::default();
    for (key, value) in matched {
        let stream = value
            .as_stream()
            .cloned()
            .ok_or_else(|| ValidationError::InvalidStreamType { key: key.clone() })?;

        if key == NEGATIVE_EXAMPLES {
            examples.negative = Some(stream);
        } else {
            let class = key.strip_suffix(POSITIVE_EXAMPLES_SUFFIX).unwrap_or(key);
            examples.positive.insert(class.to_string(), stream);
        }
    }

    Ok(examples)
}
