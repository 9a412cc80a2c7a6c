//! Export lookup and interception.
//!
//! Every export syntactic form the transform must survive is classified once
//! into an [`ExportForm`] before any rewrite executes; each variant carries
//! its own rewrite rule. Interception strips the export modifiers from the
//! declaration while keeping the entity reachable under a stable local name,
//! expressed as span-anchored text edits against the original source.
//!
//! Interception must run before template generation: the templates are plain
//! string assembly with no further tree awareness.

use std::collections::HashSet;

use oxc_ast::ast::*;
use oxc_span::{GetSpan, Span};

use crate::parse::{ModulePkg, TextEdit};

// ═══════════════════════════════════════════════════════════════════════════════
// EXPORT DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════════════

/// The declaration form behind a named export. All payloads are owned so a
/// descriptor never borrows the tree it was resolved from.
#[derive(Debug, Clone)]
pub enum ExportForm {
    /// `export function NAME` / `export default function NAME`
    FunctionDecl {
        stmt_span: Span,
        decl_start: u32,
        local_name: String,
    },
    /// `export class NAME` / `export default class NAME`
    ClassDecl {
        stmt_span: Span,
        decl_start: u32,
        local_name: String,
    },
    /// `export const NAME = ...` (one declarator of a possibly longer list)
    VariableDecl {
        stmt_span: Span,
        decl_start: u32,
        local_name: String,
    },
    /// `export default <expression>`, including anonymous function/class
    /// declarations, which rewrite as expressions.
    DefaultExpression { stmt_span: Span, expr_span: Span },
    /// `export { LOCAL as NAME }` with no module specifier.
    SpecifierLocal {
        stmt_span: Span,
        local_name: String,
        remaining: Vec<String>,
    },
    /// `export { ORIG as NAME } from 'module'`.
    SpecifierReexport {
        stmt_span: Span,
        imported_text: String,
        source_raw: String,
        remaining: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ExportDescriptor {
    pub export_name: String,
    pub form: ExportForm,
}

fn module_export_name_text(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

/// Resolve a named export (`default`, `load`, `hydrate`, ...) to its
/// declaration form. First match wins when duplicates exist.
pub fn find_named_export(pkg: &ModulePkg, name: &str) -> Option<ExportDescriptor> {
    for stmt in &pkg.program.body {
        match stmt {
            Statement::ExportDefaultDeclaration(export) if name == "default" => {
                let form = match &export.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        match &func.id {
                            Some(id) => ExportForm::FunctionDecl {
                                stmt_span: export.span,
                                decl_start: func.span.start,
                                local_name: id.name.to_string(),
                            },
                            // Anonymous declarations are valid expressions.
                            None => ExportForm::DefaultExpression {
                                stmt_span: export.span,
                                expr_span: func.span,
                            },
                        }
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => match &class.id {
                        Some(id) => ExportForm::ClassDecl {
                            stmt_span: export.span,
                            decl_start: class.span.start,
                            local_name: id.name.to_string(),
                        },
                        None => ExportForm::DefaultExpression {
                            stmt_span: export.span,
                            expr_span: class.span,
                        },
                    },
                    other => match other.as_expression() {
                        Some(expr) => ExportForm::DefaultExpression {
                            stmt_span: export.span,
                            expr_span: expr.span(),
                        },
                        // TS interface default export: nothing to wrap.
                        None => continue,
                    },
                };
                return Some(ExportDescriptor {
                    export_name: name.to_string(),
                    form,
                });
            }

            Statement::ExportNamedDeclaration(export) => {
                if export.export_kind.is_type() {
                    continue;
                }

                if let Some(declaration) = &export.declaration {
                    let form = match declaration {
                        Declaration::FunctionDeclaration(func) => func.id.as_ref().and_then(|id| {
                            (id.name == name).then(|| ExportForm::FunctionDecl {
                                stmt_span: export.span,
                                decl_start: func.span.start,
                                local_name: id.name.to_string(),
                            })
                        }),
                        Declaration::ClassDeclaration(class) => class.id.as_ref().and_then(|id| {
                            (id.name == name).then(|| ExportForm::ClassDecl {
                                stmt_span: export.span,
                                decl_start: class.span.start,
                                local_name: id.name.to_string(),
                            })
                        }),
                        Declaration::VariableDeclaration(var_decl) => {
                            var_decl.declarations.iter().find_map(|declarator| {
                                if let BindingPattern::BindingIdentifier(id) = &declarator.id {
                                    (id.name == name).then(|| ExportForm::VariableDecl {
                                        stmt_span: export.span,
                                        decl_start: var_decl.span.start,
                                        local_name: id.name.to_string(),
                                    })
                                } else {
                                    None
                                }
                            })
                        }
                        _ => None,
                    };
                    if let Some(form) = form {
                        return Some(ExportDescriptor {
                            export_name: name.to_string(),
                            form,
                        });
                    }
                }

                let target = export.specifiers.iter().find(|specifier| {
                    !specifier.export_kind.is_type()
                        && module_export_name_text(&specifier.exported) == name
                });
                if let Some(specifier) = target {
                    let remaining: Vec<String> = export
                        .specifiers
                        .iter()
                        .filter(|other| other.span != specifier.span)
                        .map(|other| pkg.slice(other.span).to_string())
                        .collect();

                    let form = match &export.source {
                        Some(source) => ExportForm::SpecifierReexport {
                            stmt_span: export.span,
                            imported_text: pkg.slice(specifier.local.span()).to_string(),
                            source_raw: pkg.slice(source.span).to_string(),
                            remaining,
                        },
                        None => ExportForm::SpecifierLocal {
                            stmt_span: export.span,
                            local_name: module_export_name_text(&specifier.local),
                            remaining,
                        },
                    };
                    return Some(ExportDescriptor {
                        export_name: name.to_string(),
                        form,
                    });
                }
            }

            _ => {}
        }
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// INTERCEPTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Strip the export modifiers from the named export, keeping the entity
/// reachable under a stable local identifier.
///
/// Returns the surviving local name, or `None` (and no mutation) when no
/// matching export exists. When the entity already has a name inside the
/// module that name is reused to avoid rename hazards; only the anonymous
/// and re-export forms receive `fallback_local_name`.
pub fn intercept_export(
    pkg: &mut ModulePkg,
    export_name: &str,
    fallback_local_name: &str,
) -> Option<String> {
    let descriptor = find_named_export(pkg, export_name)?;

    match descriptor.form {
        ExportForm::FunctionDecl {
            stmt_span,
            decl_start,
            local_name,
        }
        | ExportForm::ClassDecl {
            stmt_span,
            decl_start,
            local_name,
        }
        | ExportForm::VariableDecl {
            stmt_span,
            decl_start,
            local_name,
        } => {
            // Drop only the `export [default]` modifier text.
            pkg.push_edit(TextEdit::delete(stmt_span.start, decl_start));
            Some(local_name)
        }

        ExportForm::DefaultExpression {
            stmt_span,
            expr_span,
        } => {
            pkg.push_edit(TextEdit::replace_range(
                stmt_span.start,
                expr_span.start,
                format!("const {} = ", fallback_local_name),
            ));
            if needs_trailing_semicolon(pkg.source_text, expr_span.end) {
                pkg.push_edit(TextEdit::insert(expr_span.end, ";"));
            }
            Some(fallback_local_name.to_string())
        }

        ExportForm::SpecifierLocal {
            stmt_span,
            local_name,
            remaining,
        } => {
            pkg.push_edit(TextEdit::replace(
                stmt_span,
                rebuild_export_list(&remaining, None),
            ));
            Some(local_name)
        }

        ExportForm::SpecifierReexport {
            stmt_span,
            imported_text,
            source_raw,
            remaining,
        } => {
            pkg.push_edit(TextEdit::insert(
                0,
                format!(
                    "import {{ {} as {} }} from {};\n",
                    imported_text, fallback_local_name, source_raw
                ),
            ));
            pkg.push_edit(TextEdit::replace(
                stmt_span,
                rebuild_export_list(&remaining, Some(&source_raw)),
            ));
            Some(fallback_local_name.to_string())
        }
    }
}

fn rebuild_export_list(remaining: &[String], source_raw: Option<&str>) -> String {
    if remaining.is_empty() {
        return String::new();
    }
    match source_raw {
        Some(source) => format!("export {{ {} }} from {};", remaining.join(", "), source),
        None => format!("export {{ {} }};", remaining.join(", ")),
    }
}

fn needs_trailing_semicolon(source: &str, at: u32) -> bool {
    source[at as usize..]
        .trim_start()
        .chars()
        .next()
        .map(|c| c != ';')
        .unwrap_or(true)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSION RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Unwrap nested parentheses.
pub fn unwrap_parens<'b, 'a>(expression: &'b Expression<'a>) -> &'b Expression<'a> {
    let mut current = expression;
    while let Expression::ParenthesizedExpression(paren) = current {
        current = &paren.expression;
    }
    current
}

/// Resolve the module's default export down to an object literal, following
/// identifier indirection (`export default config` → `const config = {...}`)
/// through top-level declarations with a cycle guard.
pub fn default_export_object<'b, 'a>(pkg: &'b ModulePkg<'a>) -> Option<&'b ObjectExpression<'a>> {
    for stmt in &pkg.program.body {
        if let Statement::ExportDefaultDeclaration(export) = stmt {
            let expression = export.declaration.as_expression()?;
            return resolve_to_object(&pkg.program, expression, &mut HashSet::new());
        }
    }
    None
}

/// Locate a CommonJS-style `module.exports = {...}` object literal.
pub fn module_exports_object<'b, 'a>(pkg: &'b ModulePkg<'a>) -> Option<&'b ObjectExpression<'a>> {
    for stmt in &pkg.program.body {
        if let Statement::ExpressionStatement(expr_stmt) = stmt {
            if let Expression::AssignmentExpression(assignment) = &expr_stmt.expression {
                if let AssignmentTarget::StaticMemberExpression(member) = &assignment.left {
                    if let Expression::Identifier(object) = &member.object {
                        if object.name == "module" && member.property.name == "exports" {
                            return resolve_to_object(
                                &pkg.program,
                                &assignment.right,
                                &mut HashSet::new(),
                            );
                        }
                    }
                }
            }
        }
    }
    None
}

fn resolve_to_object<'b, 'a>(
    program: &'b Program<'a>,
    expression: &'b Expression<'a>,
    visited: &mut HashSet<String>,
) -> Option<&'b ObjectExpression<'a>> {
    match unwrap_parens(expression) {
        Expression::ObjectExpression(object) => Some(object),
        Expression::Identifier(identifier) => {
            let name = identifier.name.to_string();
            if !visited.insert(name.clone()) {
                return None;
            }
            let init = top_level_initializer(program, &name)?;
            resolve_to_object(program, init, visited)
        }
        _ => None,
    }
}

fn top_level_initializer<'b, 'a>(
    program: &'b Program<'a>,
    name: &str,
) -> Option<&'b Expression<'a>> {
    for stmt in &program.body {
        let var_decl = match stmt {
            Statement::VariableDeclaration(var_decl) => var_decl,
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::VariableDeclaration(var_decl)) => var_decl,
                _ => continue,
            },
            _ => continue,
        };
        for declarator in &var_decl.declarations {
            if let BindingPattern::BindingIdentifier(id) = &declarator.id {
                if id.name == name {
                    return declarator.init.as_ref();
                }
            }
        }
    }
    None
}
