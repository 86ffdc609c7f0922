//! Workspace file access capability.
//!
//! The core consumes "give me the text of files matching these patterns"
//! as an abstract capability. Glob matching, file watching and directory
//! traversal belong to the host; tests use an in-memory fake.

use crate::Result;
use std::path::PathBuf;

/// Opaque handle to an enumerated workspace file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle(PathBuf);

impl FileHandle {
    /// Creates a handle for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the path behind this handle.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.0
    }
}

/// Host-provided file enumeration and reading.
///
/// Implementations are expected to be cheap to call repeatedly; the
/// indexer performs one enumeration and one read per file per pass.
pub trait WorkspaceScanner {
    /// Enumerates workspace files matching any of `patterns`, skipping
    /// `exclude_glob`, returning at most `max_count` handles.
    ///
    /// # Errors
    ///
    /// Returns an error if the enumeration itself cannot be performed.
    /// This is the only failure an indexing pass propagates.
    fn enumerate(
        &self,
        patterns: &[String],
        exclude_glob: &str,
        max_count: usize,
    ) -> Result<Vec<FileHandle>>;

    /// Reads the text content of a single file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ReadError`] if the file cannot be read.
    /// Callers log and skip; a single unreadable file never fails a pass.
    fn read_text(&self, handle: &FileHandle) -> Result<String>;
}
