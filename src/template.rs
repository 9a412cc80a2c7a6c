//! Wrapper code generation.
//!
//! Once the default export of a module has been intercepted, generation is
//! pure string assembly: one template per transform state, referencing the
//! intercepted local name and the runtime bridge contract. No tree awareness
//! remains at this stage, which is why interception must already have
//! happened when any of these run.

use sha2::{Digest, Sha256};

use crate::classify::ModuleKind;
use crate::diagnostics::{
    hydrate_on_client_page_message, hydrate_without_load_message, log_plugin_error,
};
use crate::runtime::{
    CONFIG_ALIAS, DATA_ELEMENT_ID, DATA_HYDRATE_ATTR, DATA_PAGE_ATTR, HYDRATE_HOOK,
    NEXT_LOAD_SLOT, RUNTIME_PACKAGE,
};

/// Mutually exclusive transform states, decided in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    Untouched,
    ClientComponent,
    ClientPage,
    ServerPage,
}

/// Decide the transform state. A page with no qualifying load route is
/// demoted to untouched: there is nothing to wrap for.
pub fn decide_state(kind: ModuleKind, has_load: bool) -> TransformState {
    match kind {
        ModuleKind::Other => TransformState::Untouched,
        ModuleKind::ClientComponent => TransformState::ClientComponent,
        ModuleKind::ClientPage if has_load => TransformState::ClientPage,
        ModuleKind::ServerPage if has_load => TransformState::ServerPage,
        _ => TransformState::Untouched,
    }
}

const CLIENT_DIRECTIVE_FORMS: [&str; 2] = ["\"use client\"", "'use client'"];

/// Stable per-module hash used to make generated wrapper names collision-free
/// across modules while staying deterministic for the same input.
pub fn content_hash(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn page_fallback_name(hash: &str) -> String {
    format!("__Next_Load__Page__{}__", hash)
}

pub fn wrapper_name(hash: &str) -> String {
    format!("__Next_Load_new__{}__", hash)
}

/// Remove the first occurrence of each client directive form; the generated
/// client templates re-emit a single directive at the very top.
pub fn strip_client_directives(code: &str) -> String {
    let mut stripped = code.to_string();
    for form in CLIENT_DIRECTIVE_FORMS {
        stripped = stripped.replacen(form, "", 1);
    }
    stripped
}

/// Single decision point for the hydrate policy. Violations log a diagnostic
/// and the build proceeds as if `hydrate` were absent for this page.
pub fn check_hydrate_policy(kind: ModuleKind, has_load: bool, has_hydrate: bool) -> bool {
    if !has_hydrate {
        return false;
    }
    match kind {
        ModuleKind::ClientPage => {
            log_plugin_error(hydrate_on_client_page_message());
            false
        }
        ModuleKind::ServerPage if !has_load => {
            log_plugin_error(hydrate_without_load_message());
            false
        }
        _ => true,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATES
// ═══════════════════════════════════════════════════════════════════════════════

/// Server page: one awaited aggregation before render, hydrated projection
/// embedded as a marker element next to the original component. Without a
/// qualifying hydrate route the loaded data is embedded unprojected.
pub fn server_page(code: &str, local_name: &str, route: &str, hash: &str, has_hydrate: bool) -> String {
    let hydrate_import = if has_hydrate { ", hydrate as __hydrate" } else { "" };
    let projection = if has_hydrate {
        format!("__hydrate(_data, '{}', __loadConfig)", route)
    } else {
        "_data".to_string()
    };
    format!(
        r#"
import * as __react from 'react'
import {{ load as __load{hydrate_import} }} from '{package}'
import __loadConfig from '{config_alias}'

{code}

export default async function {wrapper}(props) {{
  const _data = await __load(props, '{route}', __loadConfig)
  const _dataToHydrate = {projection}
  globalThis.{slot} = {{ hydrate: _data, page: '{route}' }}
  return (
    <>
      <div
        id="{element_id}"
        data-testid="{element_id}"
        {hydrate_attr}={{JSON.stringify(_dataToHydrate)}}
        {page_attr}="{route}"
      />
      <{local_name} {{...props}} />
    </>
  )
}}
"#,
        hydrate_import = hydrate_import,
        package = RUNTIME_PACKAGE,
        config_alias = CONFIG_ALIAS,
        code = code,
        wrapper = wrapper_name(hash),
        route = route,
        projection = projection,
        slot = NEXT_LOAD_SLOT,
        element_id = DATA_ELEMENT_ID,
        hydrate_attr = DATA_HYDRATE_ATTR,
        page_attr = DATA_PAGE_ATTR,
        local_name = local_name,
    )
}

/// Client page: load fires once per mount when the cached route is stale. A
/// module-scope generation counter discards responses superseded by a newer
/// request, so an in-flight load can never clobber fresher data.
pub fn client_page(code: &str, local_name: &str, route: &str, hash: &str) -> String {
    format!(
        r#""use client"
import * as __react from 'react'
import {{ load as __load }} from '{package}'
import __loadConfig from '{config_alias}'

{code}

let __loadGeneration = 0

export default function {wrapper}(props) {{
  const forceUpdate = __react.useReducer(() => [])[1]
  const page = '{route}'
  const isServer = typeof window === 'undefined'

  __react.useEffect(() => {{
    const shouldLoad = page !== window.{slot}?.page
    if (!shouldLoad) return

    const generation = ++__loadGeneration
    Promise.resolve(__load(props, page, __loadConfig)).then(_data => {{
      if (generation !== __loadGeneration) return
      window.{slot} = {{ hydrate: _data, page }}
      forceUpdate()
    }})
  }}, [])

  if (isServer || page !== window.{slot}?.page) return null

  return <{local_name} {{...props}} />
}}
"#,
        package = RUNTIME_PACKAGE,
        config_alias = CONFIG_ALIAS,
        code = strip_client_directives(code),
        wrapper = wrapper_name(hash),
        route = route,
        slot = NEXT_LOAD_SLOT,
        local_name = local_name,
    )
}

/// Client component: apply the hydration-read hook on every render, never
/// trigger a load.
pub fn client_component(code: &str, local_name: &str, hash: &str) -> String {
    format!(
        r#""use client"
import {{ {hook} }} from '{package}'

{code}

export default function {wrapper}(props) {{
  {hook}()
  return <{local_name} {{...props}} />
}}
"#,
        hook = HYDRATE_HOOK,
        package = RUNTIME_PACKAGE,
        code = strip_client_directives(code),
        wrapper = wrapper_name(hash),
        local_name = local_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_deterministic_and_short() {
        let a = content_hash("export default 1");
        let b = content_hash("export default 1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, content_hash("export default 2"));
    }

    #[test]
    fn test_strip_client_directives_first_occurrence_only() {
        let out = strip_client_directives("'use client';\nconst a = \"'use client'\";");
        assert!(!out.starts_with("'use client'"));
        assert!(out.contains("const a"));
    }

    #[test]
    fn test_server_page_embeds_marker_and_wrapper() {
        let out = server_page("function Page() {}", "Page", "/about", "abc123abc123", true);
        assert!(out.contains("export default async function __Next_Load_new__abc123abc123__(props)"));
        assert!(out.contains("await __load(props, '/about', __loadConfig)"));
        assert!(out.contains("__hydrate(_data, '/about', __loadConfig)"));
        assert!(out.contains("id=\"__NEXT_LOAD_DATA__\""));
        // The emitted attributes are the protocol constants themselves.
        assert!(out.contains(&format!("{}={{JSON.stringify(_dataToHydrate)}}", DATA_HYDRATE_ATTR)));
        assert!(out.contains(&format!("{}=\"/about\"", DATA_PAGE_ATTR)));
        assert!(out.contains("<Page {...props} />"));
        assert!(out.contains("globalThis.__NEXT_LOAD__ = { hydrate: _data, page: '/about' }"));
    }

    #[test]
    fn test_server_page_without_hydrate_embeds_raw_data() {
        let out = server_page("function Page() {}", "Page", "/about", "abc123abc123", false);
        assert!(out.contains("const _dataToHydrate = _data"));
        assert!(!out.contains("__hydrate"));
    }

    #[test]
    fn test_client_page_has_generation_guard() {
        let out = client_page("'use client'\nfunction Page() {}", "Page", "/", "ffffffffffff");
        assert!(out.starts_with("\"use client\""));
        assert!(out.contains("let __loadGeneration = 0"));
        assert!(out.contains("if (generation !== __loadGeneration) return"));
        assert!(out.contains("page !== window.__NEXT_LOAD__?.page"));
        // The original directive line must not survive inside the body.
        assert_eq!(out.matches("use client").count(), 1);
    }

    #[test]
    fn test_client_component_applies_hook_without_loading() {
        let out = client_component("'use client'\nconst C = () => null", "C", "0123456789ab");
        assert!(out.contains("import { _useHydrate } from 'next-load'"));
        assert!(out.contains("_useHydrate()"));
        assert!(!out.contains("__load("));
    }

    #[test]
    fn test_decide_state_demotes_loadless_pages() {
        assert_eq!(
            decide_state(ModuleKind::ServerPage, true),
            TransformState::ServerPage
        );
        assert_eq!(
            decide_state(ModuleKind::ServerPage, false),
            TransformState::Untouched
        );
        assert_eq!(
            decide_state(ModuleKind::ClientPage, false),
            TransformState::Untouched
        );
        // Components never depend on a load route.
        assert_eq!(
            decide_state(ModuleKind::ClientComponent, false),
            TransformState::ClientComponent
        );
    }

    #[test]
    fn test_hydrate_policy_decisions() {
        assert!(check_hydrate_policy(ModuleKind::ServerPage, true, true));
        assert!(!check_hydrate_policy(ModuleKind::ServerPage, false, true));
        assert!(!check_hydrate_policy(ModuleKind::ClientPage, true, true));
        assert!(!check_hydrate_policy(ModuleKind::ClientComponent, false, false));
    }
}
