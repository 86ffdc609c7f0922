//! Structural record types produced by the source indexer.

use super::PatternKind;
use std::path::PathBuf;

/// A (path, text) pair handed to the indexer.
///
/// The core never walks directories itself; a workspace collaborator
/// supplies these.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path of the file, used for exclusion and classification rules.
    pub path: PathBuf,
    /// Full text content.
    pub text: String,
}

impl SourceFile {
    /// Creates a source file from a path and its text content.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Ephemeral, heuristically extracted description of one source file.
///
/// Rebuilt from scratch on every indexing pass and never persisted.
/// Keyed by `declared_name` in the indexer map; when two files declare
/// the same name the later-scanned one wins.
#[derive(Debug, Clone)]
pub struct StructuralRecord {
    /// Path of the source file.
    pub file_path: PathBuf,
    /// Extracted type/class/top-level-export name.
    pub declared_name: String,
    /// Coarse architectural role.
    pub kind: PatternKind,
    /// Language tag detected from the file extension.
    pub language: String,
    /// Full raw text, input to snippet distillation.
    pub raw_text: String,
    /// Referenced type names, best-effort and deduplicated.
    pub dependencies: Vec<String>,
}
