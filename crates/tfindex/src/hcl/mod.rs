//! HCL parsing with tree-sitter.
//!
//! Turns document text into the raw material of a [`FileIndex`](crate::FileIndex):
//! sections declared by top-level blocks, references found in expressions,
//! and diagnostics for syntax and structural problems.
//!
//! ## Design
//!
//! Tree-sitter is error tolerant: it always yields a tree, marking broken
//! regions with `ERROR` and missing nodes. Extraction walks whatever is
//! well-formed so a half-typed document still indexes its valid blocks.

mod references;
mod sections;
mod syntax;
mod tree_sitter_utils;
mod value;

use crate::diagnostics::Diagnostic;
use crate::reference::Reference;
use crate::section::Section;
use crate::uri::Uri;

/// Tree-sitter node kind constants for the HCL grammar.
///
/// These match the node types defined in tree-sitter-hcl.
mod node_kinds {
    // Structure
    pub const CONFIG_FILE: &str = "config_file";
    pub const BODY: &str = "body";
    pub const BLOCK: &str = "block";
    pub const BLOCK_START: &str = "block_start";
    pub const ATTRIBUTE: &str = "attribute";
    pub const IDENTIFIER: &str = "identifier";

    // Expressions
    pub const EXPRESSION: &str = "expression";
    pub const LITERAL_VALUE: &str = "literal_value";
    pub const COLLECTION_VALUE: &str = "collection_value";
    pub const TEMPLATE_EXPR: &str = "template_expr";
    pub const VARIABLE_EXPR: &str = "variable_expr";
    pub const GET_ATTR: &str = "get_attr";
    pub const INDEX: &str = "index";
    pub const LEGACY_INDEX: &str = "legacy_index";
    pub const SPLAT: &str = "splat";
    pub const FOR_TUPLE_EXPR: &str = "for_tuple_expr";
    pub const FOR_OBJECT_EXPR: &str = "for_object_expr";
    pub const FOR_INTRO: &str = "for_intro";

    // Literals
    pub const NUMERIC_LIT: &str = "numeric_lit";
    pub const BOOL_LIT: &str = "bool_lit";
    pub const NULL_LIT: &str = "null_lit";
    pub const STRING_LIT: &str = "string_lit";
    pub const QUOTED_TEMPLATE: &str = "quoted_template";
    pub const QUOTED_TEMPLATE_START: &str = "quoted_template_start";
    pub const QUOTED_TEMPLATE_END: &str = "quoted_template_end";
    pub const TEMPLATE_LITERAL: &str = "template_literal";
    pub const TUPLE: &str = "tuple";
    pub const OBJECT: &str = "object";
    pub const OBJECT_ELEM: &str = "object_elem";
    pub const COMMENT: &str = "comment";
}

/// Everything extracted from one document.
#[derive(Debug, Default)]
pub(crate) struct Extraction {
    /// Declared sections, in source order
    pub sections: Vec<Section>,
    /// References, in source order
    pub references: Vec<Reference>,
    /// Diagnostics that belong to the file index
    pub diagnostics: Vec<Diagnostic>,
    /// The first syntax error, reported separately from the file index
    pub parse_diagnostic: Option<Diagnostic>,
}

/// Parse `text` and extract sections, references and diagnostics.
///
/// # Errors
///
/// Returns a message if tree-sitter could not produce a tree at all.
pub(crate) fn extract(uri: &Uri, text: &str) -> Result<Extraction, String> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_hcl::LANGUAGE.into())
        .map_err(|e| format!("failed to load HCL grammar: {e}"))?;

    let tree = parser
        .parse(text, None)
        .ok_or_else(|| "parser produced no syntax tree".to_string())?;
    let root = tree.root_node();
    let content = text.as_bytes();

    let mut syntax_errors = syntax::collect_errors(&root);
    let parse_diagnostic = if syntax_errors.is_empty() {
        None
    } else {
        Some(syntax_errors.remove(0))
    };

    let (sections, mut diagnostics) = sections::extract_sections(&root, content, uri);
    let references = references::extract_references(&root, content, uri);
    diagnostics.extend(syntax_errors);

    tracing::trace!(
        uri = %uri,
        sections = sections.len(),
        references = references.len(),
        diagnostics = diagnostics.len(),
        has_syntax_error = parse_diagnostic.is_some(),
        "Extracted HCL document"
    );

    Ok(Extraction {
        sections,
        references,
        diagnostics,
        parse_diagnostic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Uri {
        Uri::parse("file:///infra/main.tf").unwrap()
    }

    #[test]
    fn grammar_loads_into_the_runtime() {
        let mut parser = tree_sitter::Parser::new();
        assert!(
            parser
                .set_language(&tree_sitter_hcl::LANGUAGE.into())
                .is_ok()
        );
    }

    #[test]
    fn valid_document_extracts_without_syntax_errors() {
        let extraction = extract(
            &uri(),
            "variable \"region\" {}\noutput \"r\" {\n  value = var.region\n}\n",
        )
        .expect("grammar should load");

        assert!(extraction.parse_diagnostic.is_none());
        assert!(extraction.diagnostics.is_empty());
        assert_eq!(extraction.sections.len(), 2);
        assert_eq!(extraction.references.len(), 1);
        assert_eq!(extraction.references[0].target_id(), "var.region");
    }
}
