// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared request types for the visual recognition client
//!
//! This crate holds the types that flow between the parameter pipeline and the
//! dispatcher, avoiding a dependency cycle between the two.
//!
//! - [`params`]: the loosely-typed [`ParameterBag`] callers fill in per call
//! - [`source`]: the [`ByteSource`] capability and the shared [`StreamHandle`]
//! - [`descriptor`]: the transport-agnostic [`RequestDescriptor`]

pub mod descriptor;
pub mod params;
pub mod source;

pub use descriptor::{EncodedField, HttpMethod, MultipartField, RequestDescriptor, placeholder};
pub use params::{ParamValue, ParameterBag};
pub use source::{ByteSource, FileSource, MemorySource, StreamHandle};
