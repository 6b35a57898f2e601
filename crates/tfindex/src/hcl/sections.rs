//! Section extraction from top-level blocks.

use std::collections::HashSet;

use tree_sitter::Node;

use super::node_kinds as kinds;
use super::tree_sitter_utils::{child_of_kind, named_children, node_range, node_text};
use super::value::{attribute_from_node, block_header, body_from_node};
use crate::diagnostics::Diagnostic;
use crate::node::Body;
use crate::section::Section;
use crate::types::{Location, SectionType};
use crate::uri::Uri;

/// Extract sections from the top-level blocks of a document.
///
/// Returns the sections in source order together with structural
/// diagnostics: blocks with the wrong number of labels (which yield no
/// section) and identity keys declared twice in the same document.
pub fn extract_sections(root: &Node, content: &[u8], uri: &Uri) -> (Vec<Section>, Vec<Diagnostic>) {
    let mut sections = Vec::new();
    let mut diagnostics = Vec::new();

    let Some(body) = top_level_body(root) else {
        return (sections, diagnostics);
    };

    for block in named_children(&body)
        .into_iter()
        .filter(|n| n.kind() == kinds::BLOCK)
    {
        extract_block(&block, content, uri, &mut sections, &mut diagnostics);
    }

    let mut seen = HashSet::new();
    for section in &sections {
        if !seen.insert(section.id()) {
            diagnostics.push(Diagnostic::warning(
                section.name_range(),
                format!("duplicate declaration of `{}`", section.id()),
            ));
        }
    }

    (sections, diagnostics)
}

fn top_level_body<'tree>(root: &Node<'tree>) -> Option<Node<'tree>> {
    if root.kind() == kinds::BODY {
        return Some(*root);
    }
    if root.kind() != kinds::CONFIG_FILE {
        tracing::trace!(kind = root.kind(), "Unexpected root node kind");
    }
    child_of_kind(root, kinds::BODY)
}

fn extract_block(
    node: &Node,
    content: &[u8],
    uri: &Uri,
    sections: &mut Vec<Section>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(header) = block_header(node, content) else {
        return;
    };
    let Some(section_type) = SectionType::from_block_type(header.block_type) else {
        tracing::trace!(block_type = header.block_type, "Skipping block that declares no section");
        return;
    };

    if section_type == SectionType::Local {
        if let Some(body) = child_of_kind(node, kinds::BODY) {
            extract_locals(&body, content, uri, sections);
        }
        return;
    }

    let expected = section_type.label_count();
    if header.labels.len() != expected {
        diagnostics.push(Diagnostic::error(
            node_range(node),
            format!(
                "`{}` blocks require {expected} label{}, found {}",
                header.block_type,
                if expected == 1 { "" } else { "s" },
                header.labels.len()
            ),
        ));
        return;
    }

    let mut labels = header.labels.into_iter();
    let type_label = if expected == 2 {
        labels.next().map(|(label, _)| label)
    } else {
        None
    };
    let Some((name, name_range)) = labels.next() else {
        return;
    };

    let node_body = child_of_kind(node, kinds::BODY)
        .map(|b| body_from_node(&b, content))
        .unwrap_or_default();

    sections.push(Section::new(
        section_type,
        type_label,
        name,
        Location {
            uri: uri.clone(),
            range: node_range(node),
        },
        name_range,
        node_body,
    ));
}

/// Each attribute of a `locals` block declares one local.
fn extract_locals(body: &Node, content: &[u8], uri: &Uri, sections: &mut Vec<Section>) {
    for attr_node in named_children(body)
        .into_iter()
        .filter(|n| n.kind() == kinds::ATTRIBUTE)
    {
        let Some(attribute) = attribute_from_node(&attr_node, content) else {
            continue;
        };
        let name_range = child_of_kind(&attr_node, kinds::IDENTIFIER)
            .map_or(attribute.range, |n| node_range(&n));
        let Some(name) = child_of_kind(&attr_node, kinds::IDENTIFIER)
            .and_then(|n| node_text(&n, content))
            .map(str::to_string)
        else {
            continue;
        };

        sections.push(Section::new(
            SectionType::Local,
            None,
            name,
            Location {
                uri: uri.clone(),
                range: attribute.range,
            },
            name_range,
            Body {
                attributes: vec![attribute],
                blocks: Vec::new(),
            },
        ));
    }
}
