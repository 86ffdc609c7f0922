//! Context assembly: query -> enriched prompt.
//!
//! Turns a free-text query into a deterministic, length-bounded context
//! block drawn from the saved patterns and, when a workspace scanner is
//! available, from a structural index of the source tree. When nothing
//! relevant is found, or when anything fails along the way, the bare
//! query is returned unchanged: the assembler degrades, never errors.

mod distill;
mod keywords;

pub use distill::distill;
pub use keywords::extract_keywords;

use crate::config::KnowledgeBaseConfig;
use crate::indexer::SourceIndexer;
use crate::models::{Pattern, StructuralRecord};
use crate::storage::PatternStore;
use crate::workspace::WorkspaceScanner;

/// Assembles enriched prompts for a downstream chat consumer.
///
/// Holds explicit references to its collaborators; there is no ambient
/// global state. Each call builds its candidate pools from scratch.
pub struct ContextAssembler<'a> {
    config: &'a KnowledgeBaseConfig,
    store: &'a PatternStore,
    scanner: Option<&'a dyn WorkspaceScanner>,
}

impl<'a> ContextAssembler<'a> {
    /// Creates an assembler over the pattern store only.
    #[must_use]
    pub const fn new(config: &'a KnowledgeBaseConfig, store: &'a PatternStore) -> Self {
        Self {
            config,
            store,
            scanner: None,
        }
    }

    /// Creates an assembler that also mines the workspace source tree.
    #[must_use]
    pub const fn with_scanner(
        config: &'a KnowledgeBaseConfig,
        store: &'a PatternStore,
        scanner: &'a dyn WorkspaceScanner,
    ) -> Self {
        Self {
            config,
            store,
            scanner: Some(scanner),
        }
    }

    /// Builds the enriched prompt for a query.
    ///
    /// Returns the original query unchanged when both candidate pools
    /// are empty. Never fails: a degraded result is indistinguishable
    /// from "no relevant context found".
    #[must_use]
    pub fn build_context_for_query(&self, query: &str) -> String {
        let keywords = extract_keywords(query);

        // Raw substring search first; a conversational query rarely
        // substring-matches anything, so fall back to the derived
        // keywords before giving up on the saved patterns.
        let mut patterns = self.store.search(query);
        if patterns.is_empty() {
            patterns = self.keyword_pattern_matches(&keywords);
        }
        patterns.truncate(self.config.max_pattern_candidates);

        let structural = self.structural_candidates(&keywords);

        if patterns.is_empty() && structural.is_empty() {
            return query.to_string();
        }

        render_prompt(query, &patterns, &structural)
    }

    /// Matches each derived keyword against the saved patterns,
    /// preserving metadata (insertion) order.
    fn keyword_pattern_matches(&self, keywords: &[String]) -> Vec<Pattern> {
        if keywords.is_empty() {
            return Vec::new();
        }
        self.store
            .search("")
            .into_iter()
            .filter(|p| keywords.iter().any(|k| p.matches(k)))
            .collect()
    }

    /// Selects workspace records whose declared name or file path
    /// contains a keyword, or whose kind equals one.
    ///
    /// Selection order follows map iteration and is a don't-care.
    fn structural_candidates(&self, keywords: &[String]) -> Vec<StructuralRecord> {
        let Some(scanner) = self.scanner else {
            return Vec::new();
        };

        let indexer = match SourceIndexer::scan(scanner, self.config) {
            Ok(indexer) => indexer,
            Err(e) => {
                tracing::warn!(error = %e, "workspace indexing failed, continuing without it");
                return Vec::new();
            },
        };

        let mut selected = Vec::new();
        for record in indexer.records() {
            if selected.len() >= self.config.max_structural_candidates {
                break;
            }
            if record_matches(record, keywords) {
                selected.push(record.clone());
            }
        }
        selected
    }
}

/// Matching rule for one structural record against the keyword set.
fn record_matches(record: &StructuralRecord, keywords: &[String]) -> bool {
    let name_lower = record.declared_name.to_lowercase();
    let path_lower = record.file_path.to_string_lossy().to_lowercase();

    keywords.iter().any(|k| {
        name_lower.contains(k.as_str())
            || path_lower.contains(k.as_str())
            || k == record.kind.as_str()
    })
}

/// Renders the fixed prompt template.
fn render_prompt(query: &str, patterns: &[Pattern], structural: &[StructuralRecord]) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Answer using ONLY the context provided below. Do not invent identifiers, \
         types, or APIs that do not appear in it.\n\n",
    );

    if !patterns.is_empty() {
        prompt.push_str("=== SAVED KNOWLEDGE BASE PATTERNS ===\n\n");
        for pattern in patterns {
            prompt.push_str(&format!(
                "**{}** ({}): {}\n",
                pattern.name, pattern.kind, pattern.description
            ));
            if !pattern.tags.is_empty() {
                prompt.push_str(&format!("Tags: {}\n", pattern.tags.join(", ")));
            }
            prompt.push_str(&format!(
                "```{}\n{}\n```\n\n",
                pattern.language, pattern.code
            ));
        }
    }

    if !structural.is_empty() {
        prompt.push_str("=== RELEVANT WORKSPACE CODE ===\n\n");
        for record in structural {
            prompt.push_str(&format!(
                "**{}** ({}):\n```{}\n{}\n```\n\n",
                record.declared_name,
                record.kind,
                record.language,
                distill(record)
            ));
        }
    }

    prompt.push_str("---\n\n");
    prompt.push_str(&format!("User Request: {query}\n\n"));
    prompt.push_str("Answer only from the patterns and workspace code shown above.");

    prompt
}
