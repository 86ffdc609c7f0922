//! Best-effort structural indexing of workspace source files.
//!
//! No real parser: line-oriented regex probes extract a declared name,
//! classify the file into a coarse architectural role, and collect
//! referenced type names. A file the probes cannot make sense of is
//! silently dropped; a file that cannot be read is logged and skipped.
//! The resulting map lives only for the duration of one assembler call.

mod probes;

use crate::config::KnowledgeBaseConfig;
use crate::models::{PatternKind, SourceFile, StructuralRecord};
use crate::workspace::WorkspaceScanner;
use crate::Result;
use probes::{
    language_for_extension, BODY_KIND_MARKERS, DECLARATION_PROBES, DEPENDENCY_PATTERNS,
    EXCLUDED_NAME_MARKERS,
};
use std::collections::HashMap;
use std::path::Path;

/// In-memory structural map of a source tree, keyed by declared name.
///
/// When two files declare the same name, the later-scanned one wins.
/// This is an accepted approximation, not a correctness requirement.
#[derive(Debug, Default)]
pub struct SourceIndexer {
    records: HashMap<String, StructuralRecord>,
}

impl SourceIndexer {
    /// Builds the structural map from pre-read (path, text) pairs.
    ///
    /// Pure function of its inputs; never fails for a single bad file.
    #[must_use]
    pub fn index(files: impl IntoIterator<Item = SourceFile>) -> Self {
        let mut records = HashMap::new();

        for file in files {
            if let Some(record) = parse_file(&file) {
                records.insert(record.declared_name.clone(), record);
            }
        }

        tracing::debug!(classes = records.len(), "built structural map");
        Self { records }
    }

    /// Enumerates and reads workspace files through the scanner, then
    /// builds the structural map.
    ///
    /// A file that fails to read is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the enumeration itself fails.
    pub fn scan(scanner: &dyn WorkspaceScanner, config: &KnowledgeBaseConfig) -> Result<Self> {
        let handles = scanner.enumerate(
            &config.source_globs,
            &config.exclude_glob,
            config.max_workspace_files,
        )?;

        let mut files = Vec::with_capacity(handles.len());
        for handle in handles {
            match scanner.read_text(&handle) {
                Ok(text) => files.push(SourceFile::new(handle.path(), text)),
                Err(e) => {
                    tracing::warn!(path = %handle.path().display(), error = %e, "skipping unreadable file");
                },
            }
        }

        Ok(Self::index(files))
    }

    /// Looks up a record by declared name.
    #[must_use]
    pub fn get(&self, declared_name: &str) -> Option<&StructuralRecord> {
        self.records.get(declared_name)
    }

    /// Iterates over all records. Iteration order is unspecified.
    pub fn records(&self) -> impl Iterator<Item = &StructuralRecord> {
        self.records.values()
    }

    /// Returns the number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parses one file into a structural record, or drops it.
fn parse_file(file: &SourceFile) -> Option<StructuralRecord> {
    let file_name = file
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if EXCLUDED_NAME_MARKERS.iter().any(|m| file_name.contains(m)) {
        return None;
    }

    let declared_name = extract_declared_name(&file.text)?;
    let language = detect_language(&file.path);
    let kind = classify_kind(file_name, &file.text);
    let dependencies = extract_dependencies(&file.text);

    Some(StructuralRecord {
        file_path: file.path.clone(),
        declared_name,
        kind,
        language: language.to_string(),
        raw_text: file.text.clone(),
        dependencies,
    })
}

/// Runs the ordered declaration probes; the first match wins.
fn extract_declared_name(text: &str) -> Option<String> {
    for probe in DECLARATION_PROBES.iter() {
        if let Some(caps) = probe.pattern.captures(text) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Detects the language tag from the file extension.
fn detect_language(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    language_for_extension(ext)
}

/// Classifies the architectural role.
///
/// File-name rules fire before body markers, so `OrderService.java` is a
/// service even when its body mentions a repository.
fn classify_kind(file_name: &str, text: &str) -> PatternKind {
    let name_lower = file_name.to_lowercase();

    if name_lower.contains("controller") || name_lower.contains("router") {
        return PatternKind::Controller;
    }
    if name_lower.contains("service") {
        return PatternKind::Service;
    }
    if name_lower.contains("repository") || name_lower.contains("dao") {
        return PatternKind::Repository;
    }
    if name_lower.contains("config") {
        return PatternKind::Config;
    }

    for marker in BODY_KIND_MARKERS.iter() {
        if marker.pattern.is_match(text) {
            return marker.kind;
        }
    }

    PatternKind::Component
}

/// Collects referenced type names from constructor-parameter-like and
/// field-declaration-like lines, deduplicated in discovery order.
fn extract_dependencies(text: &str) -> Vec<String> {
    let mut dependencies: Vec<String> = Vec::new();

    for pattern in DEPENDENCY_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            // The last capture group holds the type name.
            let Some(type_name) = caps.get(caps.len() - 1) else {
                continue;
            };
            let type_name = type_name.as_str();
            if type_name.len() > 1 && !dependencies.iter().any(|d| d == type_name) {
                dependencies.push(type_name.to_string());
            }
        }
    }

    dependencies
}
