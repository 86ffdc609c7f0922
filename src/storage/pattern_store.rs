//! File-backed pattern store.
//!
//! Durable layout, one per installation:
//!
//! - `index.json` - the metadata document with the full pattern list
//!   inline. Authoritative for all reads.
//! - `patterns/<id>.json` - one file per pattern, written for redundancy
//!   and debuggability.
//!
//! Every mutation rewrites `index.json` wholesale. The individual record
//! is written before the index (two-phase, record first), so a crash
//! between the two writes leaves an orphan record file but never loses
//! an acknowledged save. `initialize()` detects such drift and logs it
//! without repairing it.
//!
//! # Security
//!
//! Pattern IDs are validated before being used as file names to prevent
//! directory escape.

use crate::config::KnowledgeBaseConfig;
use crate::models::{KnowledgeBaseMetadata, Pattern, PatternDraft, PatternId, StoreStats};
use crate::{Error, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the metadata document.
const INDEX_FILE: &str = "index.json";

/// Name of the per-record sub-directory.
const PATTERNS_DIR: &str = "patterns";

/// Durable, crash-tolerant CRUD over pattern records.
pub struct PatternStore {
    /// Storage root.
    base_path: PathBuf,
    /// Path of the metadata document.
    index_path: PathBuf,
    /// Directory holding individual pattern records.
    patterns_path: PathBuf,
}

impl PatternStore {
    /// Creates a store rooted at the configured data directory.
    ///
    /// No filesystem access happens until [`Self::initialize`] is called.
    #[must_use]
    pub fn new(config: &KnowledgeBaseConfig) -> Self {
        Self::at(&config.data_dir)
    }

    /// Creates a store rooted at an explicit path.
    #[must_use]
    pub fn at(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        let index_path = base_path.join(INDEX_FILE);
        let patterns_path = base_path.join(PATTERNS_DIR);
        Self {
            base_path,
            index_path,
            patterns_path,
        }
    }

    /// Ensures the storage layout exists and writes a fresh metadata
    /// document on first use.
    ///
    /// Idempotent: calling twice is a no-op after the first call. Also
    /// checks that the record files and the index agree, logging (never
    /// repairing) any drift left behind by a crash between the two
    /// mutation writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if either directory cannot
    /// be created.
    pub fn initialize(&self) -> Result<()> {
        for dir in [&self.base_path, &self.patterns_path] {
            fs::create_dir_all(dir).map_err(|e| Error::StorageUnavailable {
                path: dir.display().to_string(),
                cause: e.to_string(),
            })?;
        }

        if self.index_path.exists() {
            tracing::debug!(path = %self.base_path.display(), "knowledge base already initialized");
        } else {
            self.write_metadata(&KnowledgeBaseMetadata::new())?;
            tracing::info!(path = %self.base_path.display(), "knowledge base initialized");
        }

        self.reconcile();
        Ok(())
    }

    /// Loads and parses the metadata document.
    ///
    /// Fields absent from an older schema version default to their empty
    /// values instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptIndex`] if the document is not valid
    /// JSON, or [`Error::OperationFailed`] if it cannot be read at all.
    pub fn get_metadata(&self) -> Result<KnowledgeBaseMetadata> {
        let json = fs::read_to_string(&self.index_path).map_err(|e| Error::OperationFailed {
            operation: "read_index".to_string(),
            cause: e.to_string(),
        })?;

        serde_json::from_str(&json).map_err(|e| Error::CorruptIndex {
            cause: e.to_string(),
        })
    }

    /// Saves a new pattern.
    ///
    /// Generates a unique id, stamps the save time, writes the
    /// individual record, then rewrites the index with the pattern
    /// appended. On success both documents list the pattern; on failure
    /// after the record write the store is recoverable-inconsistent (the
    /// record survives, `initialize()` will log it as an orphan).
    ///
    /// Two concurrent saves race on the index read-modify-write; callers
    /// needing concurrent mutation must serialize externally.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft name is empty, or if either write
    /// fails.
    pub fn save(&self, draft: PatternDraft) -> Result<Pattern> {
        if draft.name.trim().is_empty() {
            return Err(Error::OperationFailed {
                operation: "save_pattern".to_string(),
                cause: "pattern name is empty".to_string(),
            });
        }

        let pattern = draft.into_pattern(PatternId::generate(), Utc::now());

        // Record file first; the index rewrite makes the save visible.
        self.write_record(&pattern)?;

        let mut metadata = self.get_metadata()?;
        metadata.patterns.push(pattern.clone());
        metadata.pattern_count = metadata.patterns.len();
        metadata.last_updated = Utc::now();
        self.write_metadata(&metadata)?;

        tracing::debug!(id = %pattern.id, name = %pattern.name, "pattern saved");
        Ok(pattern)
    }

    /// Case-insensitive substring search over name, description, kind
    /// and tags.
    ///
    /// Returns all matches in metadata (insertion) order, with no
    /// ranking beyond the filter. An empty query matches everything.
    /// Never fails: a store-level problem is logged and yields an empty
    /// result.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Pattern> {
        let metadata = match self.get_metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "pattern search degraded to empty result");
                return Vec::new();
            },
        };

        let query_lower = query.to_lowercase();
        metadata
            .patterns
            .into_iter()
            .filter(|p| p.matches(&query_lower))
            .collect()
    }

    /// Returns the full pattern sequence in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata document cannot be loaded.
    pub fn get_all(&self) -> Result<Vec<Pattern>> {
        Ok(self.get_metadata()?.patterns)
    }

    /// Deletes a pattern by id.
    ///
    /// The index rewrite is authoritative; removal of the individual
    /// record file is best-effort and a failure there is logged, not
    /// propagated. Deleting an unknown id returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be loaded or rewritten.
    pub fn delete(&self, id: &PatternId) -> Result<bool> {
        let mut metadata = self.get_metadata()?;
        let before = metadata.patterns.len();
        metadata.patterns.retain(|p| p.id != *id);

        if metadata.patterns.len() == before {
            return Ok(false);
        }

        metadata.pattern_count = metadata.patterns.len();
        metadata.last_updated = Utc::now();
        self.write_metadata(&metadata)?;

        match self.record_path(id) {
            Ok(path) => {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!(
                        id = %id,
                        error = %e,
                        "failed to remove pattern record file; index removal is authoritative"
                    );
                }
            },
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "skipping record file removal");
            },
        }

        tracing::debug!(id = %id, "pattern deleted");
        Ok(true)
    }

    /// Returns summary statistics for the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata document cannot be loaded.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let metadata = self.get_metadata()?;
        Ok(StoreStats {
            pattern_count: metadata.pattern_count,
            path: self.base_path.clone(),
        })
    }

    /// Returns the storage root.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Writes the metadata document, pretty-printed.
    fn write_metadata(&self, metadata: &KnowledgeBaseMetadata) -> Result<()> {
        let json =
            serde_json::to_string_pretty(metadata).map_err(|e| Error::OperationFailed {
                operation: "serialize_index".to_string(),
                cause: e.to_string(),
            })?;

        fs::write(&self.index_path, json).map_err(|e| Error::OperationFailed {
            operation: "write_index".to_string(),
            cause: e.to_string(),
        })
    }

    /// Writes one pattern record file, pretty-printed.
    fn write_record(&self, pattern: &Pattern) -> Result<()> {
        let path = self.record_path(&pattern.id)?;
        let json = serde_json::to_string_pretty(pattern).map_err(|e| Error::OperationFailed {
            operation: "serialize_pattern".to_string(),
            cause: e.to_string(),
        })?;

        fs::write(&path, json).map_err(|e| Error::OperationFailed {
            operation: "write_pattern_record".to_string(),
            cause: e.to_string(),
        })
    }

    /// Returns the record file path for a pattern id.
    ///
    /// # Security
    ///
    /// The id is validated to prevent directory escape. Only
    /// alphanumeric characters, dashes and underscores are allowed.
    fn record_path(&self, id: &PatternId) -> Result<PathBuf> {
        let id_str = id.as_str();

        if !is_safe_filename(id_str) {
            return Err(Error::OperationFailed {
                operation: "resolve_record_path".to_string(),
                cause: format!("pattern id contains invalid characters: {id_str}"),
            });
        }

        Ok(self.patterns_path.join(format!("{id_str}.json")))
    }

    /// Compares record files against the index and logs discrepancies.
    ///
    /// Drift can appear after a crash between the record write and the
    /// index rewrite. Advisory only: nothing is repaired, and a failure
    /// to perform the check itself is logged and swallowed.
    fn reconcile(&self) {
        let metadata = match self.get_metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "skipping store reconciliation");
                return;
            },
        };

        let indexed: HashSet<&str> = metadata.patterns.iter().map(|p| p.id.as_str()).collect();

        let on_disk: HashSet<String> = match fs::read_dir(&self.patterns_path) {
            Ok(entries) => entries
                .filter_map(std::result::Result::ok)
                .filter_map(|entry| record_id_from_path(&entry.path()))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "skipping store reconciliation");
                return;
            },
        };

        for id in &on_disk {
            if !indexed.contains(id.as_str()) {
                tracing::warn!(id = %id, "orphan pattern record not listed in index");
            }
        }
        for id in &indexed {
            if !on_disk.contains(*id) {
                tracing::warn!(id = %id, "indexed pattern has no record file");
            }
        }
    }
}

/// Checks if a filename is safe (no path traversal).
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Extracts a pattern id from a record file path.
fn record_id_from_path(path: &Path) -> Option<String> {
    if path.extension().is_none_or(|ext| ext != "json") {
        return None;
    }
    Some(path.file_stem()?.to_str()?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatternKind;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, PatternStore) {
        let dir = TempDir::new().unwrap();
        let store = PatternStore::at(dir.path());
        store.initialize().unwrap();
        (dir, store)
    }

    fn draft(name: &str) -> PatternDraft {
        PatternDraft {
            name: name.to_string(),
            language: "java".to_string(),
            kind: PatternKind::Service,
            code: "class X {}".to_string(),
            description: "a test pattern".to_string(),
            origin_query: "make a service".to_string(),
            tags: vec!["spring".to_string()],
        }
    }

    #[test]
    fn test_fresh_store_has_empty_metadata() {
        let (_dir, store) = test_store();
        let metadata = store.get_metadata().unwrap();
        assert_eq!(metadata.pattern_count, 0);
        assert!(metadata.patterns.is_empty());
        assert_eq!(metadata.version, "1.0.0");
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_dir, store) = test_store();
        store.save(draft("Kept")).unwrap();

        store.initialize().unwrap();

        let metadata = store.get_metadata().unwrap();
        assert_eq!(metadata.pattern_count, 1);
    }

    #[test]
    fn test_save_assigns_id_and_timestamp() {
        let (_dir, store) = test_store();
        let saved = store.save(draft("JwtAuthFilter")).unwrap();

        assert!(!saved.id.as_str().is_empty());
        assert_eq!(saved.name, "JwtAuthFilter");

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], saved);

        let metadata = store.get_metadata().unwrap();
        assert_eq!(metadata.pattern_count, metadata.patterns.len());
    }

    #[test]
    fn test_save_writes_record_file() {
        let (dir, store) = test_store();
        let saved = store.save(draft("OnDisk")).unwrap();

        let record = dir
            .path()
            .join("patterns")
            .join(format!("{}.json", saved.id));
        assert!(record.exists());
    }

    #[test]
    fn test_save_rejects_empty_name() {
        let (_dir, store) = test_store();
        let mut d = draft("");
        d.name = "   ".to_string();
        assert!(store.save(d).is_err());
    }

    #[test]
    fn test_search_empty_query_lists_all() {
        let (_dir, store) = test_store();
        store.save(draft("First")).unwrap();
        store.save(draft("Second")).unwrap();

        let all = store.get_all().unwrap();
        let results = store.search("");
        assert_eq!(results, all);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (_dir, store) = test_store();
        store.save(draft("UserController")).unwrap();

        assert_eq!(store.search("usercontroller").len(), 1);
        assert_eq!(store.search("USER").len(), 1);
        assert_eq!(store.search("payments").len(), 0);
    }

    #[test]
    fn test_search_matches_tags_and_kind() {
        let (_dir, store) = test_store();
        store.save(draft("Tagged")).unwrap();

        assert_eq!(store.search("SPRING").len(), 1);
        assert_eq!(store.search("service").len(), 1);
    }

    #[test]
    fn test_search_never_fails() {
        let dir = TempDir::new().unwrap();
        // Not initialized: no index.json at all.
        let store = PatternStore::at(dir.path());
        assert!(store.search("anything").is_empty());
    }

    #[test]
    fn test_delete_removes_pattern() {
        let (dir, store) = test_store();
        let saved = store.save(draft("Doomed")).unwrap();

        assert!(store.delete(&saved.id).unwrap());

        let all = store.get_all().unwrap();
        assert!(all.iter().all(|p| p.id != saved.id));

        let record = dir
            .path()
            .join("patterns")
            .join(format!("{}.json", saved.id));
        assert!(!record.exists());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let (_dir, store) = test_store();
        assert!(!store.delete(&PatternId::new("no-such-id")).unwrap());
    }

    #[test]
    fn test_double_delete_does_not_fail() {
        let (_dir, store) = test_store();
        let saved = store.save(draft("Once")).unwrap();

        assert!(store.delete(&saved.id).unwrap());
        assert!(!store.delete(&saved.id).unwrap());
    }

    #[test]
    fn test_delete_survives_missing_record_file() {
        let (dir, store) = test_store();
        let saved = store.save(draft("HalfGone")).unwrap();

        let record = dir
            .path()
            .join("patterns")
            .join(format!("{}.json", saved.id));
        fs::remove_file(record).unwrap();

        // Index removal still succeeds; the file failure is only logged.
        assert!(store.delete(&saved.id).unwrap());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_reconcile_logs_without_repairing_drift() {
        let (dir, store) = test_store();
        store.save(draft("Kept")).unwrap();
        let lost = store.save(draft("Lost")).unwrap();

        // Drift in both directions: an orphan record file the index
        // does not list, and an indexed pattern whose record is gone.
        let orphan = dir.path().join("patterns").join("zzz-orphan.json");
        fs::write(&orphan, "{}").unwrap();
        let lost_record = dir
            .path()
            .join("patterns")
            .join(format!("{}.json", lost.id));
        fs::remove_file(&lost_record).unwrap();

        store.initialize().unwrap();

        // Advisory only: the index is untouched and nothing is repaired.
        let names: Vec<String> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Kept", "Lost"]);
        assert!(orphan.exists());
        assert!(!lost_record.exists());
    }

    #[test]
    fn test_corrupt_index_is_reported() {
        let (dir, store) = test_store();
        fs::write(dir.path().join("index.json"), "{not json").unwrap();

        let err = store.get_metadata().unwrap_err();
        assert!(matches!(err, Error::CorruptIndex { .. }));
    }

    #[test]
    fn test_legacy_index_is_tolerated() {
        let (dir, store) = test_store();
        fs::write(
            dir.path().join("index.json"),
            r#"{"version": "0.9.0", "pattern_count": 0}"#,
        )
        .unwrap();

        let metadata = store.get_metadata().unwrap();
        assert_eq!(metadata.version, "0.9.0");
        assert!(metadata.patterns.is_empty());
    }

    #[test]
    fn test_get_stats() {
        let (dir, store) = test_store();
        store.save(draft("One")).unwrap();
        store.save(draft("Two")).unwrap();

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.pattern_count, 2);
        assert_eq!(stats.path, dir.path());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let (_dir, store) = test_store();
        for name in ["A", "B", "C"] {
            store.save(draft(name)).unwrap();
        }

        let names: Vec<String> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_safe_filename_validation() {
        assert!(is_safe_filename("1730000000000-a1b2c3d4"));
        assert!(is_safe_filename("valid_id"));

        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../escape"));
        assert!(!is_safe_filename("dir/file"));
        assert!(!is_safe_filename("dir\\file"));
        assert!(!is_safe_filename("file.json"));
    }

    #[test]
    fn test_initialize_unwritable_root_fails() {
        let dir = TempDir::new().unwrap();
        // A regular file where the directory should go.
        let blocked = dir.path().join("occupied");
        fs::write(&blocked, "not a directory").unwrap();

        let store = PatternStore::at(&blocked);
        let err = store.initialize().unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }
}
