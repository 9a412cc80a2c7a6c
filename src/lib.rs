//! # next-load native transform
//!
//! Source-to-source transform adding a load/hydrate data protocol to
//! app-router pages and client components.
//!
//! ## Protocol Invariants
//!
//! 1. **One slot**: server and client code share a single global state slot
//!    (`__NEXT_LOAD__`) of shape `{ hydrate, page }`. The slot is fresh
//!    exactly when its `page` tag equals the rendered route.
//! 2. **Intercept before generate**: the default export is relocated to a
//!    stable local name BEFORE any template text referencing that name is
//!    assembled. Generation is pure string work with no tree awareness.
//! 3. **Untouched means byte-identical**: a module that is neither a page
//!    nor client code, has no default export, or is a page with no matching
//!    loader route, comes back as the exact input text.
//! 4. **Server embeds, client reads**: server pages embed the hydrated
//!    payload in a `__NEXT_LOAD_DATA__` marker element; client pages load
//!    once per route after mount; plain client components only ever read.
//! 5. **Stale loads lose**: every client-side load carries a generation;
//!    a completion whose generation is no longer current is discarded.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod classify;
mod config;
mod diagnostics;
mod discovery;
mod exports;
mod parse;
mod patterns;
mod runtime;
mod template;
mod transform;

#[cfg(test)]
mod transform_tests;

pub use classify::{classify, page_route, ModuleKind, RouteClassification};
pub use config::{extract_config_patterns, ConfigPatterns};
pub use discovery::{
    create_config_file_if_not_exists, find_config_file, find_pages_dir, load_pattern_lists,
    project_root, CONFIG_BASENAME,
};
pub use exports::{find_named_export, intercept_export, ExportDescriptor, ExportForm};
pub use parse::{page_route_no_ext, remove_comments_from_code, ModulePkg, EXTENSIONS_RGX};
pub use patterns::{is_page_of_the_list, parse_pattern_source, PatternSpec, RoutePattern};
pub use runtime::{
    consume, get_slot, hydrate_all, load_all, reset_slot, set_slot, slot_is_fresh, ConfigEntry,
    HydrateFn, HydrationMachine, HydrationPhase, LoadConfig, LoadFn, SlotState, CONFIG_ALIAS,
    DATA_ELEMENT_ID, DATA_HYDRATE_ATTR, DATA_PAGE_ATTR, HYDRATE_HOOK, NEXT_LOAD_SLOT,
    RUNTIME_PACKAGE,
};
pub use template::TransformState;
pub use transform::{transform_source, NativeTransformOptions, TransformOptions};

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn transform_source_native(raw_code: String, options: NativeTransformOptions) -> String {
    transform_source(&raw_code, &options.into())
}

/// What the bundler-side plugin needs to register the transform: the pages
/// root (if any), the configuration module, and the flattened pattern lists.
#[cfg(feature = "napi")]
#[napi(object)]
pub struct NativeProjectSetup {
    pub pages_path: Option<String>,
    pub config_path: String,
    pub loaders: Vec<PatternSpec>,
    pub hydraters: Vec<PatternSpec>,
}

#[cfg(feature = "napi")]
#[napi]
pub fn setup_project_native(root: String) -> napi::Result<NativeProjectSetup> {
    let root = std::path::PathBuf::from(root);
    let config_path = create_config_file_if_not_exists(&root)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let lists = load_pattern_lists(&root);
    Ok(NativeProjectSetup {
        pages_path: find_pages_dir(&root).map(|p| p.to_string_lossy().into_owned()),
        config_path: config_path.to_string_lossy().into_owned(),
        loaders: patterns::patterns_to_specs(&lists.loaders),
        hydraters: patterns::patterns_to_specs(&lists.hydraters),
    })
}

/// Extension pattern the bundler registers the transform against.
#[cfg(feature = "napi")]
#[napi]
pub fn extensions_pattern_native() -> String {
    EXTENSIONS_RGX.as_str().to_string()
}
