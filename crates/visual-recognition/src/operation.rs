// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Operations and their static parameter contracts

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use request_types::placeholder;

/// Canonical key of the image stream input
pub const IMAGES_FILE: &str = "images_file";
/// Singular alias accepted for [`IMAGES_FILE`]
pub const IMAGE_FILE: &str = "image_file";
/// Key of the remote image URL input
pub const URL: &str = "url";
/// Key naming a classifier in lookup and delete calls
pub const CLASSIFIER_ID: &str = "classifier_id";
/// Fixed key of the negative training example set
pub const NEGATIVE_EXAMPLES: &str = "negative_examples";
/// Suffix marking a key as a positive example set for the class named by its prefix
pub const POSITIVE_EXAMPLES_SUFFIX: &str = "_positive_examples";
/// Multipart field holding the JSON-encoded non-stream parameters
pub const PARAMETERS_FIELD: &str = "parameters";
/// Minimum number of class-example sets needed to train a classifier
pub const MIN_TRAINING_EXAMPLE_SETS: usize = 2;

static POSITIVE_EXAMPLES_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+_positive_examples$").expect("positive examples regex is valid")
});

/// Whether `key` names a training example set
pub fn is_class_example_key(key: &str) -> bool {
    key == NEGATIVE_EXAMPLES || POSITIVE_EXAMPLES_REGEX.is_match(key)
}

/// How an operation takes its image input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Exactly one of an image stream or an image URL
    FileOrUrl,
    /// An image stream, no URL alternative
    FileOnly,
    /// No image input
    None,
}

/// Matcher for parameter keys that are not known in advance
#[derive(Debug, Clone, Copy)]
pub struct DynamicKeys {
    /// Whether a key belongs to the dynamic key space
    pub matcher: fn(&str) -> bool,
    /// Minimum number of matching keys
    pub min_matches: usize,
}

/// Static description of an operation's parameter shape
#[derive(Debug, Clone, Copy)]
pub struct OperationContract {
    /// Operation this contract belongs to
    pub operation: Operation,
    /// Whether the call is a path-only `DELETE`
    ///
    /// Every other call is a `GET` with a query string or, when it carries
    /// streams, a multipart `POST`.
    pub delete: bool,
    /// Path template, placeholders written as `{name}`
    pub path: &'static str,
    /// Image input mode
    pub input_mode: InputMode,
    /// Keys that must be present, checked in this order
    pub required_keys: &'static [&'static str],
    /// Keys forwarded to the request when present
    pub optional_keys: &'static [&'static str],
    /// Dynamic key space, if the operation has one
    pub dynamic_keys: Option<DynamicKeys>,
    /// List-valued defaults merged under the caller's parameters
    pub defaults: &'static [(&'static str, &'static [&'static str])],
}

impl OperationContract {
    /// Names of the placeholders in the path template
    pub fn path_params(&self) -> impl Iterator<Item = &'static str> {
        self.path
            .split('/')
            .filter_map(placeholder)
    }
}

static CLASSIFY: OperationContract = OperationContract {
    operation: Operation::Classify,
    delete: false,
    path: "/v3/classify",
    input_mode: InputMode::FileOrUrl,
    required_keys: &[],
    optional_keys: &[URL, "classifier_ids", "owners", "threshold"],
    dynamic_keys: None,
    defaults: &[("classifier_ids", &["default"]), ("owners", &["me", "IBM"])],
};

static DETECT_FACES: OperationContract = OperationContract {
    operation: Operation::DetectFaces,
    delete: false,
    path: "/v3/detect_faces",
    input_mode: InputMode::FileOrUrl,
    required_keys: &[],
    optional_keys: &[URL],
    dynamic_keys: None,
    defaults: &[],
};

static RECOGNIZE_TEXT: OperationContract = OperationContract {
    operation: Operation::RecognizeText,
    delete: false,
    path: "/v3/recognize_text",
    input_mode: InputMode::FileOrUrl,
    required_keys: &[],
    optional_keys: &[URL],
    dynamic_keys: None,
    defaults: &[],
};

static CREATE_CLASSIFIER: OperationContract = OperationContract {
    operation: Operation::CreateClassifier,
    delete: false,
    path: "/v3/classifiers",
    input_mode: InputMode::None,
    required_keys: &[],
    optional_keys: &["name"],
    dynamic_keys: Some(DynamicKeys {
        matcher: is_class_example_key,
        min_matches: MIN_TRAINING_EXAMPLE_SETS,
    }),
    defaults: &[],
};

static LIST_CLASSIFIERS: OperationContract = OperationContract {
    operation: Operation::ListClassifiers,
    delete: false,
    path: "/v3/classifiers",
    input_mode: InputMode::None,
    required_keys: &[],
    optional_keys: &["verbose"],
    dynamic_keys: None,
    defaults: &[],
};

static GET_CLASSIFIER: OperationContract = OperationContract {
    operation: Operation::GetClassifier,
    delete: false,
    path: "/v3/classifiers/{classifier_id}",
    input_mode: InputMode::None,
    required_keys: &[CLASSIFIER_ID],
    optional_keys: &[],
    dynamic_keys: None,
    defaults: &[],
};

static DELETE_CLASSIFIER: OperationContract = OperationContract {
    operation: Operation::DeleteClassifier,
    delete: true,
    path: "/v3/classifiers/{classifier_id}",
    input_mode: InputMode::None,
    required_keys: &[CLASSIFIER_ID],
    optional_keys: &[],
    dynamic_keys: None,
    defaults: &[],
};

/// Named operations of the visual recognition service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Classify an image against one or more classifiers
    Classify,
    /// Detect faces in an image
    DetectFaces,
    /// Recognize text in an image
    RecognizeText,
    /// Train a custom classifier from per-class example sets
    CreateClassifier,
    /// List available classifiers
    ListClassifiers,
    /// Look up one classifier
    GetClassifier,
    /// Delete one classifier
    DeleteClassifier,
}

impl Operation {
    /// Every operation, in declaration order
    pub const ALL: [Operation; 7] = [
        Operation::Classify,
        Operation::DetectFaces,
        Operation::RecognizeText,
        Operation::CreateClassifier,
        Operation::ListClassifiers,
        Operation::GetClassifier,
        Operation::DeleteClassifier,
    ];

    /// Static contract of this operation
    pub fn contract(self) -> &'static OperationContract {
        match self {
            Operation::Classify => &CLASSIFY,
            Operation::DetectFaces => &DETECT_FACES,
            Operation::RecognizeText => &RECOGNIZE_TEXT,
            Operation::CreateClassifier => &CREATE_CLASSIFIER,
            Operation::ListClassifiers => &LIST_CLASSIFIERS,
            Operation::GetClassifier => &GET_CLASSIFIER,
            Operation::DeleteClassifier => &DELETE_CLASSIFIER,
        }
    }

    /// Snake-case operation name
    pub fn name(self) -> &'static str {
        match self {
            Operation::Classify => "classify",
            Operation::DetectFaces => "detect_faces",
            Operation::RecognizeText => "recognize_text",
            Operation::CreateClassifier => "create_classifier",
            Operation::ListClassifiers => "list_classifiers",
            Operation::GetClassifier => "get_classifier",
            Operation::DeleteClassifier => "delete_classifier",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
