//! Reference extraction from expressions.
//!
//! The grammar flattens traversals: `var.a[0].b` is
//! `(expression (variable_expr) (get_attr) (index) (get_attr))`, with the
//! accessors as named siblings of the `variable_expr`. Inside operations the
//! operands share one parent, so the walk stops at the first sibling that is
//! not an accessor.

use tree_sitter::Node;

use super::node_kinds as kinds;
use super::tree_sitter_utils::{child_of_kind, named_children, node_range, node_text};
use super::value::value_from_expression;
use crate::node::Value;
use crate::reference::{PathSegment, Reference};
use crate::types::{Location, Range};
use crate::uri::Uri;

/// Attributes whose traversals name provider configurations, not sections.
const PROVIDER_ATTRIBUTES: &[&str] = &["provider", "providers"];

/// Extract all references from a syntax tree, in source order.
pub fn extract_references(root: &Node, content: &[u8], uri: &Uri) -> Vec<Reference> {
    let mut references = Vec::new();
    extract_references_recursive(root, content, uri, &mut references);
    references
}

fn extract_references_recursive(
    node: &Node,
    content: &[u8],
    uri: &Uri,
    references: &mut Vec<Reference>,
) {
    if node.kind() == kinds::VARIABLE_EXPR {
        if let Some(reference) = reference_from_variable(node, content, uri) {
            references.push(reference);
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        extract_references_recursive(&child, content, uri, references);
    }
}

fn reference_from_variable(variable: &Node, content: &[u8], uri: &Uri) -> Option<Reference> {
    let root = node_text(variable, content)?;
    let mut segments = Vec::new();
    let mut last = *variable;

    let mut next = variable.next_named_sibling();
    while let Some(accessor) = next {
        match accessor.kind() {
            kinds::SPLAT => {
                segments.push(PathSegment::Splat);
                for splat in named_children(&accessor) {
                    segments.extend(
                        named_children(&splat)
                            .iter()
                            .filter_map(|step| accessor_segment(step, content)),
                    );
                }
            }
            _ => match accessor_segment(&accessor, content) {
                Some(segment) => segments.push(segment),
                None => break,
            },
        }
        last = accessor;
        next = accessor.next_named_sibling();
    }

    if is_bound_by_for(variable, root, content) || in_provider_attribute(variable, content) {
        return None;
    }

    let range = Range::new(node_range(variable).start, node_range(&last).end);
    Reference::from_traversal(
        root,
        &segments,
        Location {
            uri: uri.clone(),
            range,
        },
    )
}

/// Segment for a `get_attr` or `index` node.
fn accessor_segment(node: &Node, content: &[u8]) -> Option<PathSegment> {
    match node.kind() {
        kinds::GET_ATTR => child_of_kind(node, kinds::IDENTIFIER)
            .and_then(|id| node_text(&id, content))
            .map(|name| PathSegment::Attribute(name.to_string())),
        kinds::INDEX => Some(index_segment(node, content)),
        _ => None,
    }
}

fn index_segment(node: &Node, content: &[u8]) -> PathSegment {
    let inner = named_children(node).into_iter().next().unwrap_or(*node);
    if inner.kind() == kinds::LEGACY_INDEX {
        return PathSegment::Index(
            node_text(&inner, content).map(|t| t.trim_start_matches('.').to_string()),
        );
    }

    let expression = if inner.kind() == kinds::EXPRESSION {
        Some(inner)
    } else {
        // new_index: `[expression]`
        child_of_kind(&inner, kinds::EXPRESSION)
    };
    let key = expression.and_then(|e| match value_from_expression(&e, content) {
        Value::Number(n) => Some(n),
        Value::String(s) => Some(s),
        _ => None,
    });
    PathSegment::Index(key)
}

/// Whether `name` is an iteration variable of an enclosing `for` expression.
fn is_bound_by_for(node: &Node, name: &str, content: &[u8]) -> bool {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if matches!(ancestor.kind(), kinds::FOR_TUPLE_EXPR | kinds::FOR_OBJECT_EXPR) {
            let bound = child_of_kind(&ancestor, kinds::FOR_INTRO).is_some_and(|intro| {
                named_children(&intro)
                    .iter()
                    .filter(|c| c.kind() == kinds::IDENTIFIER)
                    .any(|c| node_text(c, content) == Some(name))
            });
            if bound {
                return true;
            }
        }
        current = ancestor.parent();
    }
    false
}

fn in_provider_attribute(node: &Node, content: &[u8]) -> bool {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if ancestor.kind() == kinds::ATTRIBUTE {
            let name = child_of_kind(&ancestor, kinds::IDENTIFIER).and_then(|n| node_text(&n, content));
            if name.is_some_and(|n| PROVIDER_ATTRIBUTES.contains(&n)) {
                return true;
            }
        }
        current = ancestor.parent();
    }
    false
}
