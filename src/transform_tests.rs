//! End-to-end transform scenarios over realistic page sources.

use crate::patterns::RoutePattern;
use crate::transform::{transform_source, TransformOptions};

fn page_options(route_no_ext: &str, loaders: Vec<RoutePattern>, hydraters: Vec<RoutePattern>) -> TransformOptions {
    TransformOptions {
        page_route_no_ext: route_no_ext.to_string(),
        resource_path: format!("/home/test/project/app{}.tsx", route_no_ext),
        pages_root_path: "/home/test/project/app".to_string(),
        loaders,
        hydraters,
    }
}

#[test]
fn test_layout_module_is_untouched() {
    let src = r#"
export default function Layout({ children }) {
  return <html><body>{children}</body></html>
}
"#;
    let opts = page_options("/layout", vec![RoutePattern::exact("/")], vec![]);
    assert_eq!(transform_source(src, &opts), src);
}

#[test]
fn test_page_with_comments_only_directive_is_untouched() {
    // The directive text inside a comment must not classify the module as
    // client code.
    let src = r#"
// This is not marked with "use client" for real
export function helper() { return 1 }
"#;
    let opts = TransformOptions {
        page_route_no_ext: "/helper".to_string(),
        resource_path: "/home/test/project/lib/helper.ts".to_string(),
        pages_root_path: "/home/test/project/app".to_string(),
        loaders: vec![],
        hydraters: vec![],
    };
    assert_eq!(transform_source(src, &opts), src);
}

#[test]
fn test_server_page_full_shape() {
    let src = r#"
import Header from '../components/header'

type Props = { title: string }

export default function AboutPage({ title }: Props) {
  return (
    <>
      <Header />
      <h1>{title}</h1>
    </>
  )
}
"#;
    let opts = page_options(
        "/about/page",
        vec![RoutePattern::exact("/about")],
        vec![RoutePattern::exact("/about")],
    );
    let out = transform_source(src, &opts);

    // Original module body survives with the export modifier stripped.
    assert!(out.contains("import Header from '../components/header'"));
    assert!(out.contains("function AboutPage({ title }: Props)"));
    assert!(!out.contains("export default function AboutPage"));

    // Wrapper performs the aggregation and embeds the marker element.
    assert!(out.contains("import { load as __load, hydrate as __hydrate } from 'next-load'"));
    assert!(out.contains("import __loadConfig from '@next-load-root/next.load'"));
    assert!(out.contains("const _data = await __load(props, '/about', __loadConfig)"));
    assert!(out.contains("data-hydrate={JSON.stringify(_dataToHydrate)}"));
    assert!(out.contains("data-page=\"/about\""));
    assert!(out.contains("<AboutPage {...props} />"));
}

#[test]
fn test_server_page_regex_loader_route() {
    let src = "export default function Post() { return null }\n";
    let opts = page_options(
        "/blog/first-post/page",
        vec![RoutePattern::matcher(r"blog/.+", "").unwrap()],
        vec![],
    );
    let out = transform_source(src, &opts);
    assert!(out.contains("data-page=\"/blog/first-post\""));
}

#[test]
fn test_page_under_src_app_root() {
    let src = "export default function Docs() { return null }\n";
    let opts = TransformOptions {
        page_route_no_ext: "/docs/page".to_string(),
        resource_path: "/home/test/project/src/app/docs/page.jsx".to_string(),
        pages_root_path: "/home/test/project/src/app".to_string(),
        loaders: vec![RoutePattern::exact("/docs")],
        hydraters: vec![],
    };
    let out = transform_source(src, &opts);
    assert!(out.contains("export default async function __Next_Load_new__"));
}

#[test]
fn test_file_outside_pages_root_is_component_not_page() {
    // Same route shape, but physically outside the pages root: never a page.
    let src = "export default function Page() { return null }\n";
    let opts = TransformOptions {
        page_route_no_ext: "/other/page".to_string(),
        resource_path: "/home/test/elsewhere/other/page.tsx".to_string(),
        pages_root_path: "/home/test/project/app".to_string(),
        loaders: vec![RoutePattern::exact("/other")],
        hydraters: vec![],
    };
    assert_eq!(transform_source(src, &opts), src);
}

#[test]
fn test_path_sharing_root_spelling_is_untouched() {
    // "/apples/page.tsx" shares the spelling of the "/app" root without
    // living under it; even a catch-all loader must not produce a wrapper.
    let src = "export default function Page() { return null }\n";
    let opts = TransformOptions {
        page_route_no_ext: "/les/page".to_string(),
        resource_path: "/apples/page.tsx".to_string(),
        pages_root_path: "/app".to_string(),
        loaders: vec![RoutePattern::matcher(".*", "").unwrap()],
        hydraters: vec![],
    };
    assert_eq!(transform_source(src, &opts), src);
}

#[test]
fn test_client_component_rewraps_even_without_load_route() {
    let src = r#""use client"

export default function Counter() {
  return <button>+</button>
}
"#;
    let opts = TransformOptions {
        page_route_no_ext: "/components/counter".to_string(),
        resource_path: "/home/test/project/components/counter.tsx".to_string(),
        pages_root_path: "/home/test/project/app".to_string(),
        loaders: vec![],
        hydraters: vec![],
    };
    let out = transform_source(src, &opts);
    assert!(out.starts_with("\"use client\""));
    assert!(out.contains("_useHydrate()"));
    assert!(out.contains("<Counter {...props} />"));
    assert!(!out.contains("__load("));
    assert!(!out.contains("useEffect"));
}

#[test]
fn test_client_page_load_once_per_route() {
    let src = r#"'use client'
export default function Dashboard() { return <p>dash</p> }
"#;
    let opts = page_options("/dashboard/page", vec![RoutePattern::exact("/dashboard")], vec![]);
    let out = transform_source(src, &opts);
    assert!(out.contains("const shouldLoad = page !== window.__NEXT_LOAD__?.page"));
    assert!(out.contains("Promise.resolve(__load(props, page, __loadConfig))"));
    assert!(out.contains("const generation = ++__loadGeneration"));
    assert!(out.contains("if (isServer || page !== window.__NEXT_LOAD__?.page) return null"));
}

#[test]
fn test_default_export_via_export_list() {
    let src = r#"
function Home() { return <h1>home</h1> }

export { Home as default }
"#;
    let opts = page_options("/page", vec![RoutePattern::exact("/")], vec![]);
    let out = transform_source(src, &opts);
    assert!(out.contains("function Home() { return <h1>home</h1> }"));
    assert!(!out.contains("export { Home as default }"));
    assert!(out.contains("<Home {...props} />"));
}

#[test]
fn test_default_export_via_reexport() {
    let src = "export { HomePage as default } from './home-page'\n";
    let opts = page_options("/page", vec![RoutePattern::exact("/")], vec![]);
    let out = transform_source(src, &opts);
    assert!(out.contains("import { HomePage as __Next_Load__Page__"));
    assert!(out.contains("from './home-page'"));
    assert!(out.contains("<__Next_Load__Page__"));
}

#[test]
fn test_arrow_default_export_page() {
    let src = "export default () => <h1>anon</h1>\n";
    let opts = page_options("/page", vec![RoutePattern::exact("/")], vec![]);
    let out = transform_source(src, &opts);
    assert!(out.contains("const __Next_Load__Page__"));
    assert!(out.contains("export default async function __Next_Load_new__"));
}

#[test]
fn test_named_load_export_survives_in_output() {
    let src = r#"
export async function load() {
  return { from: 'page' }
}

export default function Page() { return null }
"#;
    let opts = page_options("/page", vec![RoutePattern::exact("/")], vec![]);
    let out = transform_source(src, &opts);
    // Only the default export is intercepted; other exports stay exported.
    assert!(out.contains("export async function load()"));
    assert!(out.contains("function Page() { return null }"));
    assert!(!out.contains("export default function Page"));
}

#[test]
fn test_same_input_same_output() {
    let src = "export default function Page() { return null }\n";
    let opts = page_options("/page", vec![RoutePattern::exact("/")], vec![]);
    assert_eq!(transform_source(src, &opts), transform_source(src, &opts));
}
