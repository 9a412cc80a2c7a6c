//! Module classification: where a file lives and what kind of module it is
//! decide which rewrite template (if any) applies to it.

use crate::parse::normalize_slashes;

const CLIENT_DIRECTIVE_FORMS: [&str; 2] = ["\"use client\"", "'use client'"];

/// What kind of module the transform is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    ServerPage,
    ClientPage,
    ClientComponent,
    Other,
}

#[derive(Debug, Clone)]
pub struct RouteClassification {
    pub kind: ModuleKind,
    /// Extensionless route of the module, e.g. `/about/page`. Empty for
    /// modules outside the pages root.
    pub route: String,
}

/// A client directive counts only as the first statement of the module; the
/// caller strips comments before this check.
pub fn has_client_directive(clean_code: &str) -> bool {
    let head = clean_code.trim_start();
    CLIENT_DIRECTIVE_FORMS
        .iter()
        .any(|form| head.starts_with(form))
}

/// A module is a page when it lives under the pages root and its
/// extensionless route ends in `/page`. Containment requires a segment
/// boundary: a path that merely shares the root's spelling is out of tree.
pub fn is_page(route: &str, resource_path: &str, pages_root_path: &str) -> bool {
    let resource = normalize_slashes(resource_path);
    let mut root = normalize_slashes(pages_root_path);
    if !root.ends_with('/') {
        root.push('/');
    }
    route.ends_with("/page") && resource.starts_with(&root)
}

/// Strip the trailing `/page` segment to get the user-facing route. The root
/// page maps to `/`.
pub fn page_route(route: &str) -> String {
    match route.strip_suffix("/page") {
        Some("") => "/".to_string(),
        Some(stripped) => stripped.to_string(),
        None => route.to_string(),
    }
}

pub fn classify(
    clean_code: &str,
    route: &str,
    resource_path: &str,
    pages_root_path: &str,
) -> RouteClassification {
    let client = has_client_directive(clean_code);
    let page = is_page(route, resource_path, pages_root_path);
    let kind = match (page, client) {
        (true, false) => ModuleKind::ServerPage,
        (true, true) => ModuleKind::ClientPage,
        (false, true) => ModuleKind::ClientComponent,
        (false, false) => ModuleKind::Other,
    };
    RouteClassification {
        kind,
        route: route.to_string(),
    }
}
