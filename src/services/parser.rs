// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use tree_sitter::Parser;

use crate::domain::{EdgeKind, Language, NodeKind};

/// A declaration discovered in one file. `parent` indexes into the
/// owning [`ParsedFile::declarations`] for nested declarations.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: NodeKind,
    pub name: String,
    pub qualified_name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub parent: Option<usize>,
}

/// A by-name reference found inside a declaration body (or at file
/// scope, when `origin` is None). Resolution against the cross-file
/// declaration table happens in the graph builder.
#[derive(Debug, Clone)]
pub struct Reference {
    pub origin: Option<usize>,
    pub name: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Default)]
pub struct ParsedFile {
    pub relative_path: String,
    pub declarations: Vec<Declaration>,
    pub references: Vec<Reference>,
}

fn grammar(language: Language) -> tree_sitter::Language {
    match language {
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
    }
}

/// Parse one source file into declarations and outgoing references.
///
/// Returns None when the grammar cannot be loaded or the parse yields
/// no tree; the caller records the failure and moves on.
pub fn parse_source(relative_path: &str, source: &str, language: Language) -> Option<ParsedFile> {
    let mut parser = Parser::new();
    parser.set_language(&grammar(language)).ok()?;
    let tree = parser.parse(source, None)?;

    let mut parsed = ParsedFile {
        relative_path: relative_path.to_string(),
        ..Default::default()
    };
    let mut cursor = tree.walk();
    let mut stack: Vec<usize> = Vec::new();
    visit(&mut cursor, source, relative_path, &mut parsed, &mut stack);
    Some(parsed)
}

fn declaration_kind(node_kind: &str, inside_type: bool) -> Option<NodeKind> {
    match node_kind {
        "function_item" | "function_definition" | "function_declaration" => {
            if inside_type {
                Some(NodeKind::Method)
            } else {
                Some(NodeKind::Function)
            }
        }
        "method_definition" | "method_declaration" => Some(NodeKind::Method),
        "struct_item" | "struct_declaration" | "type_spec" => Some(NodeKind::Struct),
        "enum_item" | "enum_declaration" => Some(NodeKind::Enum),
        "trait_item" => Some(NodeKind::Trait),
        "impl_item" => Some(NodeKind::Class),
        "class_declaration" | "class_definition" => Some(NodeKind::Class),
        "interface_declaration" => Some(NodeKind::Interface),
        "const_item" | "const_declaration" => Some(NodeKind::Const),
        "type_alias_declaration" | "type_item" => Some(NodeKind::TypeAlias),
        _ => None,
    }
}

fn is_type_scope(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Struct | NodeKind::Enum | NodeKind::Trait | NodeKind::Interface | NodeKind::Class
    )
}

/// Rightmost name of a possibly-qualified expression: `a.b.c` -> `c`,
/// `mod::f` -> `f`.
fn trailing_name(node: tree_sitter::Node, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" | "property_identifier" | "type_identifier" => node
            .utf8_text(source.as_bytes())
            .ok()
            .map(|s| s.to_string()),
        _ => {
            for field in ["field", "property", "attribute", "name", "function"] {
                if let Some(child) = node.child_by_field_name(field) {
                    return trailing_name(child, source);
                }
            }
            None
        }
    }
}

fn visit(
    cursor: &mut tree_sitter::TreeCursor,
    source: &str,
    relative_path: &str,
    parsed: &mut ParsedFile,
    stack: &mut Vec<usize>,
) {
    loop {
        let node = cursor.node();
        let node_kind = node.kind();
        let origin = stack.last().copied();
        let inside_type = origin
            .map(|i| is_type_scope(parsed.declarations[i].kind))
            .unwrap_or(false);

        let mut pushed = false;
        if let Some(kind) = declaration_kind(node_kind, inside_type) {
            let name = node
                .child_by_field_name("name")
                .or_else(|| node.child_by_field_name("type"))
                .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                .unwrap_or("anonymous")
                .to_string();

            let qualified_name = match origin {
                Some(i) => format!("{}::{}", parsed.declarations[i].qualified_name, name),
                None => format!("{relative_path}::{name}"),
            };

            // a Rust impl block targeting a trait is also an implements ref
            if node_kind == "impl_item" {
                if let Some(trait_node) = node.child_by_field_name("trait") {
                    if let Some(trait_name) = trailing_name(trait_node, source) {
                        parsed.references.push(Reference {
                            origin,
                            name: trait_name,
                            kind: EdgeKind::Implements,
                        });
                    }
                }
            }

            parsed.declarations.push(Declaration {
                kind,
                name,
                qualified_name,
                start_line: node.start_position().row + 1,
                end_line: node.end_position().row + 1,
                parent: origin,
            });
            stack.push(parsed.declarations.len() - 1);
            pushed = true;
        } else {
            extract_reference(cursor, node, source, origin, parsed);
        }

        if cursor.goto_first_child() {
            visit(cursor, source, relative_path, parsed, stack);
            cursor.goto_parent();
        }

        if pushed {
            stack.pop();
        }

        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

fn extract_reference(
    cursor: &tree_sitter::TreeCursor,
    node: tree_sitter::Node,
    source: &str,
    origin: Option<usize>,
    parsed: &mut ParsedFile,
) {
    let push = |parsed: &mut ParsedFile, name: Option<String>, kind: EdgeKind| {
        if let Some(name) = name {
            parsed.references.push(Reference { origin, name, kind });
        }
    };

    match node.kind() {
        "call_expression" | "call" => {
            let callee = node
                .child_by_field_name("function")
                .and_then(|f| trailing_name(f, source));
            push(parsed, callee, EdgeKind::Calls);
        }
        "assignment_expression" | "assignment" | "augmented_assignment" => {
            let target = node
                .child_by_field_name("left")
                .and_then(|l| trailing_name(l, source));
            push(parsed, target, EdgeKind::Writes);
        }
        "type_identifier" => {
            // skip the defining occurrence inside the declaration itself
            if !matches!(cursor.field_name(), Some("name")) {
                push(
                    parsed,
                    node.utf8_text(source.as_bytes()).ok().map(String::from),
                    EdgeKind::ReferencesType,
                );
            }
        }
        // js/ts `extends` clause, or a python superclass list
        "class_heritage" | "extends_clause" => {
            let mut walker = node.walk();
            for child in node.named_children(&mut walker) {
                push(parsed, trailing_name(child, source), EdgeKind::Extends);
            }
        }
        "argument_list" if matches!(cursor.field_name(), Some("superclasses")) => {
            let mut walker = node.walk();
            for child in node.named_children(&mut walker) {
                push(parsed, trailing_name(child, source), EdgeKind::Extends);
            }
        }
        "identifier" => {
            // declaration names are definitions, not uses
            if !matches!(cursor.field_name(), Some("name")) {
                push(
                    parsed,
                    node.utf8_text(source.as_bytes()).ok().map(String::from),
                    EdgeKind::Reads,
                );
            }
        }
        _ => {}
    }
}
