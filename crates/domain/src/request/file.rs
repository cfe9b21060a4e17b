//! File upload mappings for multipart GraphQL requests.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// In-memory handle to a selected file's bytes.
///
/// Handles are cheap to clone and are never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    bytes: Arc<[u8]>,
}

impl FileHandle {
    /// Wraps the given bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the content length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Binds a file to a dot-path inside the variables object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMapping {
    /// Stable identifier for list editing.
    #[serde(default = "generate_id")]
    pub id: String,
    /// Dot-path into the variables JSON, e.g. `input.avatar` or `files.0`.
    pub variable_path: String,
    /// The bound file, absent until the user selects one.
    #[serde(skip)]
    pub file: Option<FileHandle>,
    /// File name reported in the multipart part.
    #[serde(default)]
    pub file_name: String,
}

impl FileMapping {
    /// Creates an unbound mapping for the given variable path.
    #[must_use]
    pub fn new(variable_path: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            variable_path: variable_path.into(),
            file: None,
            file_name: String::new(),
        }
    }

    /// Binds a file to this mapping.
    #[must_use]
    pub fn with_file(mut self, file_name: impl Into<String>, file: FileHandle) -> Self {
        self.file_name = file_name.into();
        self.file = Some(file);
        self
    }

    /// Returns true if a file is bound.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.file.is_some()
    }
}
