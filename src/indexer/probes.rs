//! Static probe tables for the source indexer.
//!
//! The original heuristics were a handful of ad-hoc regex scans; here
//! they are explicit ordered tables with first-match-wins semantics.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::PatternKind;
use regex::Regex;
use std::sync::LazyLock;

/// File-name substrings that exclude a file from indexing entirely
/// (tests, specs, and the host entry file).
pub const EXCLUDED_NAME_MARKERS: &[&str] = &[".test.", ".spec.", "extension."];

/// A declared-name extraction probe.
#[derive(Debug)]
pub struct DeclarationProbe {
    /// The regex to match; capture group 1 is the declared name.
    pub pattern: Regex,
    /// Human-readable description of the probe.
    #[allow(dead_code)]
    pub description: &'static str,
}

/// Ordered declared-name probes. The first probe that matches wins; a
/// file matching none of them is dropped from the index.
pub static DECLARATION_PROBES: LazyLock<Vec<DeclarationProbe>> = LazyLock::new(|| {
    vec![
        DeclarationProbe {
            pattern: Regex::new(r"(?:public\s+)?class\s+(\w+)")
                .expect("static regex: class declaration"),
            description: "public/top-level class declaration",
        },
        DeclarationProbe {
            pattern: Regex::new(r"export\s+(?:class|function)\s+(\w+)")
                .expect("static regex: exported class/function"),
            description: "exported class or function",
        },
        DeclarationProbe {
            pattern: Regex::new(r"export\s+const\s+(\w+)\s*[:=]")
                .expect("static regex: exported const"),
            description: "exported const with assignment",
        },
    ]
});

/// A body-text marker associated with an architectural role.
#[derive(Debug)]
pub struct KindMarker {
    /// The regex to match against the file body.
    pub pattern: Regex,
    /// The kind this marker indicates.
    pub kind: PatternKind,
}

/// Ordered framework-style body markers, consulted only when no
/// file-name rule fires. Controller markers take precedence over
/// service markers over repository markers.
pub static BODY_KIND_MARKERS: LazyLock<Vec<KindMarker>> = LazyLock::new(|| {
    vec![
        KindMarker {
            pattern: Regex::new(r"@RestController").expect("static regex: @RestController"),
            kind: PatternKind::Controller,
        },
        KindMarker {
            pattern: Regex::new(r"@Controller").expect("static regex: @Controller"),
            kind: PatternKind::Controller,
        },
        KindMarker {
            pattern: Regex::new(r"Router\(\)").expect("static regex: Router()"),
            kind: PatternKind::Controller,
        },
        KindMarker {
            pattern: Regex::new(r"@Service").expect("static regex: @Service"),
            kind: PatternKind::Service,
        },
        KindMarker {
            pattern: Regex::new(r"@Injectable").expect("static regex: @Injectable"),
            kind: PatternKind::Service,
        },
        KindMarker {
            pattern: Regex::new(r"@Repository").expect("static regex: @Repository"),
            kind: PatternKind::Repository,
        },
        KindMarker {
            pattern: Regex::new(r"extends.*Repository").expect("static regex: extends Repository"),
            kind: PatternKind::Repository,
        },
    ]
});

/// Dependency-reference patterns over constructor-parameter-like and
/// field-declaration-like lines. The last capture group of each match is
/// the referenced type name.
pub static DEPENDENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"@Autowired[\s\S]*?private\s+(?:final\s+)?(\w+)\s+\w+")
            .expect("static regex: autowired field"),
        Regex::new(r"private\s+final\s+(\w+)\s+\w+").expect("static regex: final field"),
        Regex::new(r"constructor\s*\([^)]*?(\w+):\s*(\w+)")
            .expect("static regex: constructor parameter"),
    ]
});

/// Maps a file extension to its language tag.
///
/// Unknown extensions yield `"unknown"`; the file is still indexed.
#[must_use]
pub fn language_for_extension(ext: &str) -> &'static str {
    match ext {
        "java" => "java",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        _ => "unknown",
    }
}
