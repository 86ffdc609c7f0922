//! # Patternbase
//!
//! A local, file-backed pattern knowledge base and context enrichment
//! engine for AI coding assistants.
//!
//! Patternbase stores reusable code patterns (named, tagged, language
//! annotated snippets) on disk and assembles enriched prompts for a
//! downstream chat or completion system. A free-text query is matched
//! against the saved patterns and, optionally, against a best-effort
//! structural index of the current workspace's source files. The result
//! is a single deterministic prompt string, or the bare query when
//! nothing relevant was found.
//!
//! ## Components
//!
//! - [`PatternStore`] - durable CRUD over pattern records plus a
//!   denormalized `index.json` document
//! - [`SourceIndexer`] - line-oriented structural scan of source files
//!   (no real parser, heuristic probes only)
//! - [`ContextAssembler`] - query analysis, candidate selection, snippet
//!   distillation and prompt templating
//!
//! ## Example
//!
//! ```rust,ignore
//! use patternbase::{ContextAssembler, KnowledgeBaseConfig, PatternStore};
//!
//! let config = KnowledgeBaseConfig::new("/path/to/storage");
//! let store = PatternStore::new(&config);
//! store.initialize()?;
//!
//! let assembler = ContextAssembler::new(&config, &store);
//! let prompt = assembler.build_context_for_query("how do I add jwt auth");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod context;
pub mod indexer;
pub mod models;
pub mod storage;
pub mod workspace;

// Re-exports for convenience
pub use config::KnowledgeBaseConfig;
pub use context::ContextAssembler;
pub use indexer::SourceIndexer;
pub use models::{
    KnowledgeBaseMetadata, Pattern, PatternDraft, PatternId, PatternKind, SourceFile, StoreStats,
    StructuralRecord,
};
pub use storage::PatternStore;
pub use workspace::{FileHandle, WorkspaceScanner};

/// Error type for patternbase operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait
/// implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `StorageUnavailable` | Storage root or patterns directory cannot be created/accessed |
/// | `CorruptIndex` | `index.json` exists but is not valid JSON |
/// | `ReadError` | A single workspace source file cannot be read |
/// | `OperationFailed` | Serialization fails, record writes fail, enumeration fails |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The storage root cannot be created or accessed.
    ///
    /// Fatal to initialization; surfaced to the caller. Raised for
    /// permission errors, missing parent directories, or a full disk.
    #[error("storage unavailable at '{path}': {cause}")]
    StorageUnavailable {
        /// The storage path that could not be prepared.
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// The metadata document is unreadable or unparseable.
    ///
    /// Absent fields in an older-schema document are defaulted rather
    /// than failing; this variant is raised only when the document is
    /// not valid JSON at all.
    #[error("corrupt knowledge base index: {cause}")]
    CorruptIndex {
        /// The underlying cause.
        cause: String,
    },

    /// A single source file could not be read during indexing.
    ///
    /// Fully local: callers log it and skip the file. Never propagated
    /// out of an indexing pass.
    #[error("failed to read '{path}': {cause}")]
    ReadError {
        /// The file that could not be read.
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - JSON serialization of a record fails
    /// - A record or index write fails
    /// - Workspace file enumeration fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for patternbase operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::StorageUnavailable {
            path: "/tmp/kb".to_string(),
            cause: "permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "storage unavailable at '/tmp/kb': permission denied"
        );

        let err = Error::CorruptIndex {
            cause: "unexpected end of file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt knowledge base index: unexpected end of file"
        );

        let err = Error::OperationFailed {
            operation: "write_pattern_record".to_string(),
            cause: "disk full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operation 'write_pattern_record' failed: disk full"
        );
    }
}
