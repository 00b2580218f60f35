// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request descriptor construction
//!
//! Turns validated parameters into exactly one [`RequestDescriptor`]:
//!
//! - `DELETE` operations carry path parameters only
//! - training calls and stream inputs become a multipart `POST`
//! - everything else becomes a `GET` with a query string
//!
//! Building is a pure function of its inputs. Streams are placed into the
//! descriptor by handle and never opened.

use std::collections::BTreeMap;

use request_types::{
    EncodedField, HttpMethod, MultipartField, ParamValue, ParameterBag, RequestDescriptor,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{ValidationError, ValidationResult},
    operation::{IMAGES_FILE, OperationContract, PARAMETERS_FIELD, URL},
    resolver::ResolvedInput,
    validator::{TrainingExamples, ValidatedParams},
};

/// Build the request descriptor for validated parameters
///
/// Contract defaults are merged under the caller's parameters first; a key
/// supplied by the caller replaces the default wholesale. Keys outside the
/// contract are dropped.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidParameterValue`] if a value cannot be
/// placed in its slot, e.g. a list used as a path parameter or a stream
/// nested in a JSON parameter
pub fn build(
    validated: &ValidatedParams,
    contract: &OperationContract,
) -> ValidationResult<RequestDescriptor> {
    let params = defaults(contract).overlaid_with(&validated.bag);

    let mut descriptor = RequestDescriptor::new(HttpMethod::Get, contract.path);
    descriptor
        .headers
        .insert("accept".to_string(), "application/json".to_string());
    descriptor.path_params = path_params(&params, contract)?;

    if contract.delete {
        descriptor.method = HttpMethod::Delete;
    } else if let Some(training) = &validated.training {
        descriptor.method = HttpMethod::Post;
        descriptor.multipart_fields = training_fields(training, &params, contract)?;
    } else if let ResolvedInput::Stream(stream) = &validated.input {
        descriptor.method = HttpMethod::Post;
        descriptor
            .multipart_fields
            .insert(IMAGES_FILE.to_string(), MultipartField::Stream(stream.clone()));

        let side_channel = json_params(&params, contract, |key| key != URL)?;
        if !side_channel.is_empty() {
            descriptor.multipart_fields.insert(
                PARAMETERS_FIELD.to_string(),
                MultipartField::Encoded(EncodedField::json(&Value::Object(side_channel))),
            );
        }
    } else {
        descriptor.query_params = json_params(&params, contract, |_| true)?
            .into_iter()
            .collect();
    }

    debug!(
        operation = %contract.operation,
        method = %descriptor.method,
        fields = descriptor.multipart_fields.len(),
        query = descriptor.query_params.len(),
        "built request descriptor"
    );

    Ok(descriptor)
}

fn defaults(contract: &OperationContract) -> ParameterBag {
    contract
        .defaults
        .iter()
        .map(|(key, values)| (*key, ParamValue::from(values.to_vec())))
        .collect()
}

/// Forwarded keys with a non-null value, in contract order
fn forwarded<'a>(
    params: &'a ParameterBag,
    contract: &OperationContract,
) -> impl Iterator<Item = (&'static str, &'a ParamValue)> {
    contract
        .optional_keys
        .iter()
        .filter_map(|key| Some((*key, params.get(key)?)))
        .filter(|(_, value)| **value != ParamValue::Null)
}

fn path_params(
    params: &ParameterBag,
    contract: &OperationContract,
) -> ValidationResult<BTreeMap<String, String>> {
    contract
        .path_params()
        .map(|name| {
            params
                .get(name)
                .and_then(ParamValue::to_text)
                .map(|value| (name.to_string(), value))
                .ok_or_else(|| {
                    ValidationError::invalid_value(name, "must be a string, number or boolean")
                })
        })
        .collect()
}

fn json_params(
    params: &ParameterBag,
    contract: &OperationContract,
    include: impl Fn(&str) -> bool,
) -> ValidationResult<Map<String, Value>> {
    forwarded(params, contract)
        .filter(|(key, _)| include(key))
        .map(|(key, value)| {
            value
                .to_json()
                .map(|json| (key.to_string(), json))
                .ok_or_else(|| ValidationError::invalid_value(key, "cannot contain a stream"))
        })
        .collect()
}

fn training_fields(
    training: &TrainingExamples,
    params: &ParameterBag,
    contract: &OperationContract,
) -> ValidationResult<BTreeMap<String, MultipartField>> {
    let mut fields: BTreeMap<String, MultipartField> = training
        .fields()
        .map(|(name, stream)| (name, MultipartField::Stream(stream.clone())))
        .collect();

    for (key, value) in forwarded(params, contract) {
        let text = value
            .to_text()
            .ok_or_else(|| {
                ValidationError::invalid_value(key, "must be a string, number or boolean")
            })?;
        fields.insert(key.to_string(), MultipartField::Text(text));
    }

    Ok(fields)
}
