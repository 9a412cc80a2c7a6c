//! Module parsing for the next-load transform.
//!
//! A `ModulePkg` wraps one oxc parse of one module. Transform passes never
//! rebuild the tree: they collect span-anchored text edits against the
//! original source and `get_code` splices them in reverse order. A module
//! with no pending edits prints byte-identical to its input, which the
//! untouched branch of the transform relies on.

use lazy_static::lazy_static;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use regex::Regex;

lazy_static! {
    /// File extensions the transform registers for.
    pub static ref EXTENSIONS_RGX: Regex = Regex::new(r"\.(tsx|ts|js|cjs|mjs|jsx)$").unwrap();

    static ref COMMENTS_RGX: Regex =
        Regex::new(r"(?m)/\*[\s\S]*?\*/|([^\\:]|^)//.*$").unwrap();
}

/// Strip block and line comments. Mirrors the plugin's historical regex
/// behavior, including swallowing the single character captured before a
/// line comment, so directive detection sees the same text.
pub fn remove_comments_from_code(code: &str) -> String {
    COMMENTS_RGX.replace_all(code, "").to_string()
}

/// Normalize slashes in a file path to posix-like forward slashes.
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Compute the extension-free route of a resource inside the pages root.
/// The root only matches at a segment boundary; paths that merely share its
/// spelling keep their full route.
pub fn page_route_no_ext(resource_path: &str, pages_root_path: &str) -> String {
    let resource = normalize_slashes(resource_path);
    let root = normalize_slashes(pages_root_path);
    let page = match resource.strip_prefix(root.trim_end_matches('/')) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => resource,
    };
    EXTENSIONS_RGX.replace(&page, "").to_string()
}

pub fn module_source_type() -> SourceType {
    SourceType::default()
        .with_module(true)
        .with_typescript(true)
        .with_jsx(true)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEXT EDITS
// ═══════════════════════════════════════════════════════════════════════════════

/// One span-anchored replacement against the original source text.
/// A zero-length span is an insertion.
#[derive(Debug, Clone)]
pub struct TextEdit {
    pub start: u32,
    pub end: u32,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        TextEdit {
            start: span.start,
            end: span.end,
            replacement: replacement.into(),
        }
    }

    pub fn replace_range(start: u32, end: u32, replacement: impl Into<String>) -> Self {
        TextEdit {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        TextEdit {
            start: at,
            end: at,
            replacement: text.into(),
        }
    }

    pub fn delete(start: u32, end: u32) -> Self {
        TextEdit {
            start,
            end,
            replacement: String::new(),
        }
    }
}

/// Apply edits back-to-front so earlier offsets stay valid.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut result = source.to_string();
    for edit in sorted {
        result.replace_range(edit.start as usize..edit.end as usize, &edit.replacement);
    }
    result
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODULE PACKAGE
// ═══════════════════════════════════════════════════════════════════════════════

/// One parsed module plus its pending transform edits.
pub struct ModulePkg<'a> {
    pub source_text: &'a str,
    pub program: Program<'a>,
    edits: Vec<TextEdit>,
}

impl<'a> ModulePkg<'a> {
    /// Parse a module. Returns `None` when the underlying parser reports
    /// errors; callers treat that as "pass the source through unchanged",
    /// not as a user-facing failure.
    pub fn parse(allocator: &'a Allocator, source_text: &'a str) -> Option<ModulePkg<'a>> {
        let ret = Parser::new(allocator, source_text, module_source_type()).parse();
        if !ret.errors.is_empty() {
            return None;
        }
        Some(ModulePkg {
            source_text,
            program: ret.program,
            edits: Vec::new(),
        })
    }

    pub fn slice(&self, span: Span) -> &'a str {
        &self.source_text[span.start as usize..span.end as usize]
    }

    pub fn push_edit(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Current code, reflecting every transform applied so far.
    pub fn get_code(&self) -> String {
        if self.edits.is_empty() {
            return self.source_text.to_string();
        }
        apply_edits(self.source_text, &self.edits)
    }
}
