//! Snippet distillation.
//!
//! Reduces a full source file to a short representative skeleton for
//! prompt inclusion: one package/import line, the annotated declaration,
//! the constructor signature, and up to three method signatures. This is
//! a deliberately lossy display aid, not a semantic extraction.

use crate::models::StructuralRecord;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum number of distinct method signatures included.
const MAX_METHODS: usize = 3;

#[allow(clippy::expect_used)]
static METHOD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\s*\(").expect("static regex: method name"));

/// Distills a structural record to its essential lines.
///
/// Always terminates with a closing-brace line for visual balance.
#[must_use]
pub fn distill(record: &StructuralRecord) -> String {
    let name = record.declared_name.as_str();
    let lines: Vec<&str> = record
        .raw_text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut essential: Vec<String> = Vec::new();
    let mut added: HashSet<String> = HashSet::new();

    // One package/import line at most.
    if let Some(line) = lines.iter().find(|l| {
        let t = l.trim();
        t.starts_with("package ") || (t.starts_with("import ") && t.contains("Injectable"))
    }) {
        push_once(&mut essential, &mut added, line.trim());
    }

    // Declaration line for the matched name, with any immediately
    // preceding annotation/decorator lines.
    let decl_idx = lines.iter().position(|l| {
        l.contains(&format!("class {name}")) || l.contains(&format!("export const {name}"))
    });
    if let Some(idx) = decl_idx {
        for line in &lines[idx.saturating_sub(2)..idx] {
            let t = line.trim();
            if t.starts_with('@') {
                push_once(&mut essential, &mut added, t);
            }
        }
        push_once(&mut essential, &mut added, lines[idx].trim());
    }

    essential.push(String::new());

    // Constructor / primary-initializer signature, body truncated at the
    // first opening brace.
    let ctor_marker = format!("public {name}(");
    if let Some(line) = lines
        .iter()
        .find(|l| l.contains("constructor(") || l.contains(&ctor_marker))
    {
        let signature = truncate_at_brace(line.trim());
        push_once(&mut essential, &mut added, &signature);
    }

    essential.push(String::new());

    // Up to three distinct public/async method signatures.
    let own_call = format!("{name}(");
    let mut seen_methods: HashSet<String> = HashSet::new();
    for line in &lines {
        if seen_methods.len() >= MAX_METHODS {
            break;
        }
        let t = line.trim();
        if !(t.starts_with("public ") || t.starts_with("async ")) {
            continue;
        }
        if !t.contains('(') || t.contains("constructor") || t.contains(&own_call) {
            continue;
        }

        let signature = truncate_at_brace(t);
        let Some(method) = METHOD_NAME
            .captures(&signature)
            .map(|caps| caps[1].to_string())
        else {
            continue;
        };
        if seen_methods.insert(method) {
            essential.push(signature);
        }
    }

    essential.push("}".to_string());
    essential.join("\n")
}

/// Truncates a line at its first opening brace, trimming the remainder.
fn truncate_at_brace(line: &str) -> String {
    line.find('{')
        .map_or_else(|| line.to_string(), |idx| line[..idx].trim_end().to_string())
}

/// Pushes a line unless an identical one was already included.
fn push_once(essential: &mut Vec<String>, added: &mut HashSet<String>, line: &str) {
    if added.insert(line.to_string()) {
        essential.push(line.to_string());
    }
}
