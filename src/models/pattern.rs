//! Pattern types and identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a saved pattern.
///
/// Assigned by the store at save time and never reused. The string form
/// is a millisecond timestamp followed by a random suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(String);

impl PatternId {
    /// Creates a pattern ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh ID: millisecond timestamp plus a random suffix.
    ///
    /// Collision probability is negligible, not zero-guaranteed.
    #[must_use]
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{millis}-{}", &suffix[..8]))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PatternId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PatternId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Coarse architectural role of a pattern or structural record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Request routing and HTTP entry points.
    Controller,
    /// Business logic.
    Service,
    /// Data access.
    Repository,
    /// Anything without a more specific role.
    #[default]
    Component,
    /// Configuration classes (structural records only).
    Config,
}

impl PatternKind {
    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Service => "service",
            Self::Repository => "repository",
            Self::Component => "component",
            Self::Config => "config",
        }
    }

    /// Parses a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "controller" => Some(Self::Controller),
            "service" => Some(Self::Service),
            "repository" => Some(Self::Repository),
            "component" => Some(Self::Component),
            "config" => Some(Self::Config),
            _ => None,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A saved, reusable code pattern.
///
/// Patterns are replace-never: once persisted, `id` and `saved_at` are
/// immutable and the only mutation is delete-then-resave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Unique identifier, assigned by the store.
    pub id: PatternId,
    /// Display name, non-empty.
    pub name: String,
    /// Language tag, e.g. "typescript" or "java".
    pub language: String,
    /// Architectural role.
    pub kind: PatternKind,
    /// The raw snippet text.
    pub code: String,
    /// Free-text description.
    pub description: String,
    /// The query that produced this pattern, kept for provenance.
    #[serde(default)]
    pub origin_query: String,
    /// Creation timestamp, set once at save time.
    pub saved_at: DateTime<Utc>,
    /// Tags for search. Insertion order is irrelevant.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Pattern {
    /// Returns true if the query (already lowercased) is a substring of
    /// the name, description, kind, or any tag.
    #[must_use]
    pub fn matches(&self, query_lower: &str) -> bool {
        if query_lower.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
            || self.kind.as_str().contains(query_lower)
            || self
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(query_lower))
    }
}

/// Caller-supplied fields for a pattern about to be saved.
///
/// The store assigns `id` and `saved_at`.
#[derive(Debug, Clone, Default)]
pub struct PatternDraft {
    /// Display name, non-empty.
    pub name: String,
    /// Language tag.
    pub language: String,
    /// Architectural role.
    pub kind: PatternKind,
    /// The raw snippet text.
    pub code: String,
    /// Free-text description.
    pub description: String,
    /// The query that produced this pattern.
    pub origin_query: String,
    /// Tags for search.
    pub tags: Vec<String>,
}

impl PatternDraft {
    /// Stamps the draft into a full pattern with the given identity.
    #[must_use]
    pub fn into_pattern(self, id: PatternId, saved_at: DateTime<Utc>) -> Pattern {
        Pattern {
            id,
            name: self.name,
            language: self.language,
            kind: self.kind,
            code: self.code,
            description: self.description,
            origin_query: self.origin_query,
            saved_at,
            tags: self.tags,
        }
    }
}

/// Schema version written into fresh metadata documents.
pub(crate) const METADATA_VERSION: &str = "1.0.0";

/// The single denormalized index document.
///
/// Rewritten wholesale on every mutation; never partially updated. The
/// embedded pattern list is authoritative for all read operations.
/// Absent fields (older schema versions) default to their empty values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseMetadata {
    /// Schema version.
    #[serde(default)]
    pub version: String,
    /// Timestamp of first initialization.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    /// Derived count; always equals `patterns.len()`.
    #[serde(default)]
    pub pattern_count: usize,
    /// The full pattern list, in insertion order.
    #[serde(default)]
    pub patterns: Vec<Pattern>,
}

impl KnowledgeBaseMetadata {
    /// Creates a fresh, empty metadata document.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: METADATA_VERSION.to_string(),
            created_at: now,
            last_updated: now,
            pattern_count: 0,
            patterns: Vec::new(),
        }
    }
}

impl Default for KnowledgeBaseMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics for a knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of saved patterns.
    pub pattern_count: usize,
    /// Storage root path.
    pub path: std::path::PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pattern(name: &str) -> Pattern {
        Pattern {
            id: PatternId::new("100-abc"),
            name: name.to_string(),
            language: "java".to_string(),
            kind: PatternKind::Controller,
            code: "class X {}".to_string(),
            description: "REST endpoint for users".to_string(),
            origin_query: String::new(),
            saved_at: Utc::now(),
            tags: vec!["rest".to_string(), "Users".to_string()],
        }
    }

    #[test]
    fn test_generate_id_is_unique() {
        let a = PatternId::generate();
        let b = PatternId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            PatternKind::Controller,
            PatternKind::Service,
            PatternKind::Repository,
            PatternKind::Component,
            PatternKind::Config,
        ] {
            assert_eq!(PatternKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PatternKind::parse("widget"), None);
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&PatternKind::Repository).unwrap();
        assert_eq!(json, "\"repository\"");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let p = sample_pattern("UserController");
        assert!(p.matches("usercontroller"));
        assert!(p.matches("user"));
        assert!(p.matches("endpoint"));
        // kind
        assert!(p.matches("controller"));
        // tag, stored with mixed case
        assert!(p.matches("users"));
        assert!(!p.matches("payment"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(sample_pattern("Anything").matches(""));
    }

    #[test]
    fn test_metadata_defaults_for_legacy_schema() {
        // An index document from an older version that only carried a
        // version and count must still parse, defaulting the rest.
        let json = r#"{"version": "0.9.0", "pattern_count": 0}"#;
        let meta: KnowledgeBaseMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.version, "0.9.0");
        assert!(meta.patterns.is_empty());
    }
}
