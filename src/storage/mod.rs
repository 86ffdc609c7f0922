//! Durable storage for the pattern knowledge base.

mod pattern_store;

pub use pattern_store::PatternStore;
