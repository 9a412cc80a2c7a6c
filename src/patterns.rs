//! Route pattern matching.
//!
//! A pattern list entry is either an exact route string or a regular
//! expression. Regex entries found in configuration source are materialized
//! through a constrained literal parser that recognizes exactly two source
//! forms: a bare regex literal (`/pat/flags`) and a two-argument
//! `new RegExp('pat', 'flags')` constructor call with string-literal
//! arguments. Arbitrary expression text is never evaluated.

#[cfg(feature = "napi")]
use napi_derive::napi;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum RoutePattern {
    Exact(String),
    Matcher(Regex),
}

impl RoutePattern {
    pub fn exact(route: &str) -> Self {
        RoutePattern::Exact(route.to_string())
    }

    /// Build a matcher from a JS regex pattern plus flag characters.
    /// `i`, `m` and `s` translate to inline flags; `g`, `u` and `y` have no
    /// bearing on a single `test` call and are ignored.
    pub fn matcher(pattern: &str, flags: &str) -> Option<Self> {
        let inline: String = flags.chars().filter(|c| matches!(c, 'i' | 'm' | 's')).collect();
        let source = if inline.is_empty() {
            pattern.to_string()
        } else {
            format!("(?{}){}", inline, pattern)
        };
        Regex::new(&source).ok().map(RoutePattern::Matcher)
    }

    pub fn matches(&self, route: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => exact == route,
            // JS RegExp.test semantics: a search, not an anchored match.
            RoutePattern::Matcher(re) => re.is_match(route),
        }
    }

    /// Stable identity used for ordered first-seen deduplication.
    pub fn key(&self) -> String {
        match self {
            RoutePattern::Exact(exact) => format!("s:{}", exact),
            RoutePattern::Matcher(re) => format!("r:{}", re.as_str()),
        }
    }
}

/// `true` when any pattern in the list matches the route.
pub fn is_page_of_the_list(route: &str, patterns: &[RoutePattern]) -> bool {
    patterns.iter().any(|pattern| pattern.matches(route))
}

/// Deduplicate preserving first-seen order.
pub fn unique_patterns(patterns: Vec<RoutePattern>) -> Vec<RoutePattern> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for pattern in patterns {
        if seen.insert(pattern.key()) {
            unique.push(pattern);
        }
    }
    unique
}

/// Parse the source text of a pattern expression found in configuration code.
///
/// Returns `None` for anything that is not one of the two recognized literal
/// forms; such entries are dropped from the list (a shape anomaly, not an
/// error).
pub fn parse_pattern_source(source: &str) -> Option<RoutePattern> {
    let trimmed = source.trim();

    if let Some(rest) = trimmed.strip_prefix('/') {
        // Bare regex literal: find the unescaped closing slash.
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '/' => {
                    let pattern = &rest[..i];
                    let flags = &rest[i + 1..];
                    if flags.chars().all(|f| f.is_ascii_alphabetic()) {
                        return RoutePattern::matcher(pattern, flags);
                    }
                    return None;
                }
                _ => {}
            }
        }
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("new") {
        let rest = rest.trim_start();
        let rest = rest.strip_prefix("RegExp")?.trim_start();
        let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
        let mut args = split_constructor_args(inner);
        if args.is_empty() || args.len() > 2 {
            return None;
        }
        let pattern = string_literal_value(&args.remove(0))?;
        let flags = match args.pop() {
            Some(arg) => string_literal_value(&arg)?,
            None => String::new(),
        };
        return RoutePattern::matcher(&pattern, &flags);
    }

    None
}

fn split_constructor_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if quote.is_some() => {
                current.push(c);
                escaped = true;
            }
            '\'' | '"' | '`' => {
                current.push(c);
                match quote {
                    Some(q) if q == c => quote = None,
                    None => quote = Some(c),
                    _ => {}
                }
            }
            ',' if quote.is_none() => {
                args.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    args
}

fn string_literal_value(arg: &str) -> Option<String> {
    let arg = arg.trim();
    let mut chars = arg.chars();
    let quote = chars.next()?;
    if !matches!(quote, '\'' | '"' | '`') || !arg.ends_with(quote) || arg.len() < 2 {
        return None;
    }
    let body = &arg[1..arg.len() - 1];
    // Unescape only the quote character and backslash; regex escapes like
    // \d must survive into the pattern untouched.
    let mut value = String::with_capacity(body.len());
    let mut iter = body.chars().peekable();
    while let Some(c) = iter.next() {
        if c == '\\' {
            match iter.peek() {
                Some(&next) if next == quote || next == '\\' => {
                    value.push(next);
                    iter.next();
                }
                _ => value.push(c),
            }
        } else {
            value.push(c);
        }
    }
    Some(value)
}

// ═══════════════════════════════════════════════════════════════════════════════
// FFI-FACING PATTERN REPRESENTATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Serializable pattern form crossing the bundler boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct PatternSpec {
    /// "string" for exact match, "regex" for a matcher.
    pub kind: String,
    pub source: String,
    pub flags: String,
}

impl PatternSpec {
    pub fn exact(route: &str) -> Self {
        PatternSpec {
            kind: "string".to_string(),
            source: route.to_string(),
            flags: String::new(),
        }
    }

    pub fn regex(pattern: &str, flags: &str) -> Self {
        PatternSpec {
            kind: "regex".to_string(),
            source: pattern.to_string(),
            flags: flags.to_string(),
        }
    }

    pub fn to_pattern(&self) -> Option<RoutePattern> {
        match self.kind.as_str() {
            "string" => Some(RoutePattern::exact(&self.source)),
            "regex" => RoutePattern::matcher(&self.source, &self.flags),
            _ => None,
        }
    }
}

pub fn specs_to_patterns(specs: &[PatternSpec]) -> Vec<RoutePattern> {
    specs.iter().filter_map(PatternSpec::to_pattern).collect()
}

pub fn patterns_to_specs(patterns: &[RoutePattern]) -> Vec<PatternSpec> {
    patterns
        .iter()
        .map(|pattern| match pattern {
            RoutePattern::Exact(exact) => PatternSpec::exact(exact),
            RoutePattern::Matcher(re) => PatternSpec::regex(re.as_str(), ""),
        })
        .collect()
}
