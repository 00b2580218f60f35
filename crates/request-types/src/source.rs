// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Readable byte sources
//!
//! Image and training-set inputs are passed around as [`StreamHandle`]s. The
//! pipeline only checks that an input *is* a byte source; it never opens one.
//! Opening and reading is left to the dispatcher.

use core::fmt;
use std::{
    fs::File,
    io::{self, Cursor, Read},
    path::PathBuf,
    sync::Arc,
};

/// Capability of producing a readable byte stream
pub trait ByteSource: fmt::Debug + Send + Sync {
    /// Open a fresh reader over the source bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying resource cannot be opened
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;

    /// File name reported in the multipart part, if any
    fn file_name(&self) -> Option<String> {
        None
    }

    /// MIME type reported in the multipart part, if known
    fn content_type(&self) -> Option<String> {
        None
    }
}

/// Shared, caller-owned handle to a [`ByteSource`]
///
/// Cloning the handle does not copy the source. Two handles are equal only
/// when they point at the same source.
#[derive(Clone)]
pub struct StreamHandle(Arc<dyn ByteSource>);

impl StreamHandle {
    /// Wrap a byte source in a new handle
    pub fn new(source: impl ByteSource + 'static) -> Self {
        Self(Arc::new(source))
    }

    /// Open a reader over the source bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying resource cannot be opened
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        self.0.open()
    }

    /// File name of the source, if any
    pub fn file_name(&self) -> Option<String> {
        self.0.file_name()
    }

    /// MIME type of the source, if known
    pub fn content_type(&self) -> Option<String> {
        self.0.content_type()
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StreamHandle").field(&self.0).finish()
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Byte source backed by a file on disk
///
/// The file is opened on every call to [`ByteSource::open`], not at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ByteSource for FileSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn content_type(&self) -> Option<String> {
        mime_guess::from_path(&self.path)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }
}

/// Byte source over bytes already held in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Arc<[u8]>,
    file_name: Option<String>,
}

impl MemorySource {
    /// Create an in-memory source
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            bytes: Arc::from(bytes),
            file_name: None,
        }
    }

    /// Attach a file name, also used to guess the content type
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

impl ByteSource for MemorySource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.bytes))))
    }

    fn file_name(&self) -> Option<String> {
        self.file_name.clone()
    }

    fn content_type(&self) -> Option<String> {
        self.file_name.as_deref().and_then(|name| {
            mime_guess::from_path(name)
                .first()
                .map(|mime| mime.essence_str().to_string())
        })
    }
}
