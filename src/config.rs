//! Extraction of route pattern lists from the user's configuration module.
//!
//! The configuration default-exports an object keyed by data name, each entry
//! carrying a `pages` pattern list plus optional `load` / `hydrate`
//! functions. The transform only needs to know WHICH routes have a loader or
//! a hydrater, so extraction flattens the entries into two pattern lists and
//! discards everything else. Entries with an unrecognized shape are skipped,
//! not reported: configuration is user-authored and the transform must stay
//! resilient.

use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_span::GetSpan;

use crate::exports::{default_export_object, module_exports_object, unwrap_parens};
use crate::parse::ModulePkg;
use crate::patterns::{parse_pattern_source, unique_patterns, RoutePattern};

/// The two flattened pattern lists the transform consumes.
#[derive(Debug, Default)]
pub struct ConfigPatterns {
    pub loaders: Vec<RoutePattern>,
    pub hydraters: Vec<RoutePattern>,
}

impl ConfigPatterns {
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty() && self.hydraters.is_empty()
    }
}

/// Extract the loader and hydrater pattern lists from configuration source.
///
/// Unparseable or exportless configuration yields empty lists.
pub fn extract_config_patterns(config_source: &str) -> ConfigPatterns {
    let allocator = Allocator::default();
    let Some(pkg) = ModulePkg::parse(&allocator, config_source) else {
        return ConfigPatterns::default();
    };

    let Some(object) = default_export_object(&pkg).or_else(|| module_exports_object(&pkg)) else {
        return ConfigPatterns::default();
    };

    let mut loaders = Vec::new();
    let mut hydraters = Vec::new();

    for property in &object.properties {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            continue;
        };
        let Expression::ObjectExpression(entry) = unwrap_parens(&property.value) else {
            continue;
        };

        let patterns = entry_pages(&pkg, entry);
        if patterns.is_empty() {
            continue;
        }
        if has_own_property(entry, "load") {
            loaders.extend(patterns.iter().cloned());
        }
        if has_own_property(entry, "hydrate") {
            hydraters.extend(patterns);
        }
    }

    ConfigPatterns {
        loaders: unique_patterns(loaders),
        hydraters: unique_patterns(hydraters),
    }
}

fn property_key_name(key: &PropertyKey) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.to_string()),
        PropertyKey::StringLiteral(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn has_own_property(object: &ObjectExpression, name: &str) -> bool {
    object.properties.iter().any(|property| match property {
        ObjectPropertyKind::ObjectProperty(property) => {
            property_key_name(&property.key).as_deref() == Some(name)
        }
        ObjectPropertyKind::SpreadProperty(_) => false,
    })
}

fn entry_pages(pkg: &ModulePkg, entry: &ObjectExpression) -> Vec<RoutePattern> {
    let Some(pages) = entry.properties.iter().find_map(|property| {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            return None;
        };
        if property_key_name(&property.key).as_deref() != Some("pages") {
            return None;
        }
        match unwrap_parens(&property.value) {
            Expression::ArrayExpression(array) => Some(array),
            _ => None,
        }
    }) else {
        return Vec::new();
    };

    pages
        .elements
        .iter()
        .filter_map(|element| {
            let expression = unwrap_parens(element.as_expression()?);
            match expression {
                Expression::StringLiteral(literal) => {
                    Some(RoutePattern::exact(&literal.value))
                }
                // Regex literals and RegExp constructions are re-parsed from
                // their source text in their constrained literal forms.
                other => parse_pattern_source(pkg.slice(other.span())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_splits_loaders_and_hydraters() {
        let config = r#"
            export default {
                user: {
                    pages: ['/about', /blog\/.+/],
                    load: async () => ({ name: 'Aral' }),
                    hydrate: (user) => user.name,
                },
                stats: {
                    pages: ['/dashboard'],
                    load: async () => ({ count: 1 }),
                },
            };
        "#;
        let patterns = extract_config_patterns(config);
        assert_eq!(patterns.loaders.len(), 3);
        assert_eq!(patterns.hydraters.len(), 2);
        assert!(patterns.loaders.iter().any(|p| p.matches("/dashboard")));
        assert!(!patterns.hydraters.iter().any(|p| p.matches("/dashboard")));
        assert!(patterns.hydraters.iter().any(|p| p.matches("/blog/post-1")));
    }

    #[test]
    fn test_extract_regexp_constructor_and_flags() {
        let config = r#"
            export default {
                data: {
                    pages: [new RegExp('^/Admin', 'i')],
                    load: () => 1,
                },
            };
        "#;
        let patterns = extract_config_patterns(config);
        assert_eq!(patterns.loaders.len(), 1);
        assert!(patterns.loaders[0].matches("/admin/users"));
    }

    #[test]
    fn test_extract_module_exports_form() {
        let config = "module.exports = { data: { pages: ['/'], load: () => 1 } };";
        let patterns = extract_config_patterns(config);
        assert_eq!(patterns.loaders.len(), 1);
        assert!(patterns.loaders[0].matches("/"));
    }

    #[test]
    fn test_extract_follows_identifier_indirection() {
        let config = "const config = { data: { pages: ['/x'], hydrate: (d) => d } };\nexport default config;";
        let patterns = extract_config_patterns(config);
        assert!(patterns.loaders.is_empty());
        assert_eq!(patterns.hydraters.len(), 1);
    }

    #[test]
    fn test_extract_skips_malformed_entries() {
        let config = r#"
            export default {
                broken: { load: () => 1 },
                alsoBroken: 42,
                dynamic: { pages: [someVariable, '/kept'], load: () => 1 },
            };
        "#;
        let patterns = extract_config_patterns(config);
        assert_eq!(patterns.loaders.len(), 1);
        assert!(patterns.loaders[0].matches("/kept"));
    }

    #[test]
    fn test_extract_deduplicates_across_entries() {
        let config = r#"
            export default {
                a: { pages: ['/about'], load: () => 1 },
                b: { pages: ['/about'], load: () => 2 },
            };
        "#;
        let patterns = extract_config_patterns(config);
        assert_eq!(patterns.loaders.len(), 1);
    }

    #[test]
    fn test_extract_unparseable_source_is_empty() {
        assert!(extract_config_patterns("export default {").is_empty());
        assert!(extract_config_patterns("const a = 1;").is_empty());
    }

    #[test]
    fn test_extract_regex_literal_from_source_text() {
        let config = "export default { k: { pages: [/^\\/docs/], load: () => 1 } };";
        let patterns = extract_config_patterns(config);
        assert!(patterns.loaders[0].matches("/docs/intro"));
    }
}
