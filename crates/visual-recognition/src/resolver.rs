// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Input resolution
//!
//! Folds the singular `image_file` alias into `images_file`, enforces the
//! stream-or-URL exclusivity and checks that a supplied image is a byte
//! stream. The caller's bag is never modified; a normalized copy is returned.

use request_types::{ParamValue, ParameterBag, StreamHandle};
use tracing::debug;

use crate::{
    error::{ValidationError, ValidationResult},
    operation::{IMAGE_FILE, IMAGES_FILE, InputMode, URL},
};

/// Image input selected by the resolver
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedInput {
    /// Image supplied as a byte stream
    Stream(StreamHandle),
    /// Image supplied as a remote URL
    Url(String),
    /// The operation takes no image input
    Absent,
}

/// Normalized parameters plus the selected image input
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    /// Normalized copy of the caller's bag
    pub bag: ParameterBag,
    /// Image input selected from the bag
    pub input: ResolvedInput,
}

/// Resolve the image input of `bag` according to `mode`
///
/// # Errors
///
/// - [`ValidationError::MissingOrConflictingInput`] if neither or both inputs are present
/// - [`ValidationError::InvalidStreamType`] if `images_file` is not a byte stream
/// - [`ValidationError::InvalidParameterValue`] if `url` is not a string
pub fn resolve(bag: &ParameterBag, mode: InputMode) -> ValidationResult<ResolvedParams> {
    if mode == InputMode::None {
        return Ok(ResolvedParams {
            bag: bag.clone(),
            input: ResolvedInput::Absent,
        });
    }

    let normalized = fold_alias(bag);
    let has_file = normalized.is_present(IMAGES_FILE);
    let has_url = mode == InputMode::FileOrUrl && normalized.is_present(URL);

    if has_file == has_url {
        debug!(?mode, has_file, has_url, "rejecting image input");
        let message = if mode == InputMode::FileOrUrl {
            format!("either {URL} or {IMAGES_FILE} needs to be specified")
        } else {
            format!("{IMAGES_FILE} needs to be specified")
        };
        return Err(ValidationError::MissingOrConflictingInput { message });
    }

    let input = if has_file {
        ResolvedInput::Stream(stream_input(&normalized)?)
    } else {
        ResolvedInput::Url(url_input(&normalized)?)
    };

    Ok(ResolvedParams {
        bag: normalized,
        input,
    })
}

/// Copy of `bag` where a present `image_file` fills an absent `images_file`
///
/// The alias key stays in place.
fn fold_alias(bag: &ParameterBag) -> ParameterBag {
    let mut normalized = bag.clone();
    if !bag.is_present(IMAGES_FILE)
        && let Some(alias) = bag.get(IMAGE_FILE).filter(|value| value.is_present())
    {
        normalized.insert(IMAGES_FILE, alias.clone());
    }
    normalized
}

fn stream_input(bag: &ParameterBag) -> ValidationResult<StreamHandle> {
    bag.get(IMAGES_FILE)
        .and_then(ParamValue::as_stream)
        .cloned()
        .ok_or_else(|| ValidationError::InvalidStreamType {
            key: IMAGES_FILE.to_string(),
        })
}

fn url_input(bag: &ParameterBag) -> ValidationResult<String> {
    bag.get(URL)
        .and_then(ParamValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| ValidationError::invalid_value(URL, "must be a string"))
}
