//! Configuration for the knowledge base and context assembly.

use std::path::PathBuf;

/// Default glob patterns used to enumerate workspace source files.
pub const DEFAULT_SOURCE_GLOBS: &[&str] =
    &["**/*.java", "**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"];

/// Default glob excluded from workspace enumeration.
pub const DEFAULT_EXCLUDE_GLOB: &str = "**/node_modules/**";

/// Main configuration for patternbase.
#[derive(Debug, Clone)]
pub struct KnowledgeBaseConfig {
    /// Root directory for durable storage (`index.json` lives here).
    pub data_dir: PathBuf,
    /// Glob patterns for workspace source enumeration.
    pub source_globs: Vec<String>,
    /// Glob excluded from workspace enumeration.
    pub exclude_glob: String,
    /// Maximum number of workspace files to enumerate per indexing pass.
    pub max_workspace_files: usize,
    /// Maximum saved-pattern candidates included in a context block.
    pub max_pattern_candidates: usize,
    /// Maximum structural-record candidates included in a context block.
    pub max_structural_candidates: usize,
}

impl KnowledgeBaseConfig {
    /// Creates a configuration rooted at the given data directory, with
    /// defaults for everything else.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            source_globs: DEFAULT_SOURCE_GLOBS
                .iter()
                .map(ToString::to_string)
                .collect(),
            exclude_glob: DEFAULT_EXCLUDE_GLOB.to_string(),
            max_workspace_files: 200,
            max_pattern_candidates: 3,
            max_structural_candidates: 2,
        }
    }
}
