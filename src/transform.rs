//! Per-module transform entry point.
//!
//! The host bundler invokes this once per compiled file with the raw source
//! text plus path metadata and the two pattern lists extracted from the
//! project configuration. Anything that is not a transformable page or
//! client module comes back byte-identical.

use oxc_allocator::Allocator;
use serde::{Deserialize, Serialize};

use crate::classify::{classify, page_route, ModuleKind};
use crate::exports::intercept_export;
use crate::parse::{remove_comments_from_code, ModulePkg};
use crate::patterns::{is_page_of_the_list, PatternSpec, RoutePattern};
use crate::template::{self, TransformState};

#[cfg(feature = "napi")]
use napi_derive::napi;

pub struct TransformOptions {
    /// Extensionless route of the module, e.g. `/about/page`.
    pub page_route_no_ext: String,
    pub resource_path: String,
    pub pages_root_path: String,
    pub loaders: Vec<RoutePattern>,
    pub hydraters: Vec<RoutePattern>,
}

/// Rewrite one module, or return the input unchanged when no transformation
/// applies. Unparseable source always passes through untouched.
pub fn transform_source(raw: &str, options: &TransformOptions) -> String {
    let clean = remove_comments_from_code(raw);
    let classification = classify(
        &clean,
        &options.page_route_no_ext,
        &options.resource_path,
        &options.pages_root_path,
    );
    if classification.kind == ModuleKind::Other {
        return raw.to_string();
    }

    let allocator = Allocator::default();
    let Some(mut pkg) = ModulePkg::parse(&allocator, raw) else {
        return raw.to_string();
    };

    let hash = template::content_hash(raw);
    let route = page_route(&options.page_route_no_ext);
    let has_load = is_page_of_the_list(&route, &options.loaders);
    let has_hydrate = is_page_of_the_list(&route, &options.hydraters);

    // Interception must precede template generation: the templates only see
    // the resulting local name as a string.
    let Some(local_name) =
        intercept_export(&mut pkg, "default", &template::page_fallback_name(&hash))
    else {
        return raw.to_string();
    };

    let has_hydrate =
        template::check_hydrate_policy(classification.kind, has_load, has_hydrate);

    let code = pkg.get_code();
    match template::decide_state(classification.kind, has_load) {
        // The interception edits are discarded in favor of the pristine
        // source.
        TransformState::Untouched => raw.to_string(),
        TransformState::ClientComponent => template::client_component(&code, &local_name, &hash),
        TransformState::ClientPage => template::client_page(&code, &local_name, &route, &hash),
        TransformState::ServerPage => {
            template::server_page(&code, &local_name, &route, &hash, has_hydrate)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FFI-FACING OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Options as they cross the bundler boundary; patterns arrive in their
/// serializable form and are materialized here.
#[cfg_attr(feature = "napi", napi(object))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransformOptions {
    pub page_route_no_ext: String,
    pub resource_path: String,
    pub pages_root_path: String,
    pub loaders: Vec<PatternSpec>,
    pub hydraters: Vec<PatternSpec>,
}

impl From<NativeTransformOptions> for TransformOptions {
    fn from(options: NativeTransformOptions) -> Self {
        TransformOptions {
            page_route_no_ext: options.page_route_no_ext,
            resource_path: options.resource_path,
            pages_root_path: options.pages_root_path,
            loaders: crate::patterns::specs_to_patterns(&options.loaders),
            hydraters: crate::patterns::specs_to_patterns(&options.hydraters),
        }
    }
}
