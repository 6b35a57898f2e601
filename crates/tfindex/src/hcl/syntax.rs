//! Syntax error collection.

use tree_sitter::Node;

use super::tree_sitter_utils::node_range;
use crate::diagnostics::Diagnostic;

/// Collect one diagnostic per `ERROR` or missing node, in document order.
///
/// Error nodes are not descended into: tree-sitter often nests several
/// error nodes for one mistake, and the outermost one has the useful range.
pub fn collect_errors(root: &Node) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    if root.has_error() {
        collect_recursive(root, &mut errors);
    }
    errors
}

fn collect_recursive(node: &Node, errors: &mut Vec<Diagnostic>) {
    if node.is_error() {
        errors.push(Diagnostic::error(node_range(node), "Syntax error"));
        return;
    }
    if node.is_missing() {
        errors.push(Diagnostic::error(
            node_range(node),
            format!("Syntax error: missing `{}`", display_kind(node.kind())),
        ));
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            collect_recursive(&child, errors);
        }
    }
}

/// Human spelling for grammar-internal token names.
fn display_kind(kind: &str) -> &str {
    match kind {
        "block_end" | "object_end" => "}",
        "block_start" | "object_start" => "{",
        "tuple_end" => "]",
        "tuple_start" => "[",
        "quoted_template_end" | "quoted_template_start" => "\"",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_hcl::LANGUAGE.into())
            .expect("Failed to load HCL grammar");
        parser.parse(code, None).expect("Failed to parse")
    }

    #[test]
    fn well_formed_document_has_no_errors() {
        let tree = parse("variable \"region\" {\n  default = \"us-east-1\"\n}\n");
        assert!(collect_errors(&tree.root_node()).is_empty());
    }

    #[test]
    fn unclosed_block_is_reported() {
        let tree = parse("resource \"aws_instance\" \"web\" {\n  ami = \"x\"\n");
        let errors = collect_errors(&tree.root_node());

        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.message.starts_with("Syntax error")));
    }
}
