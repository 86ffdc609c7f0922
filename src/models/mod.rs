//! Domain types for patterns, metadata and structural records.

mod pattern;
mod structural;

pub use pattern::{KnowledgeBaseMetadata, Pattern, PatternDraft, PatternId, PatternKind, StoreStats};
pub use structural::{SourceFile, StructuralRecord};
