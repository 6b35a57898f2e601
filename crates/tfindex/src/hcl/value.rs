//! Conversion of tree-sitter bodies and expressions into owned [`Body`] trees.

use tree_sitter::Node;

use super::node_kinds as kinds;
use super::tree_sitter_utils::{child_of_kind, named_children, node_range, node_text};
use crate::node::{Attribute, Block, Body, Value};

/// Convert a `body` node.
pub fn body_from_node(node: &Node, content: &[u8]) -> Body {
    let mut body = Body::default();
    for child in named_children(node) {
        match child.kind() {
            kinds::ATTRIBUTE => {
                if let Some(attribute) = attribute_from_node(&child, content) {
                    body.attributes.push(attribute);
                }
            }
            kinds::BLOCK => {
                if let Some(block) = block_from_node(&child, content) {
                    body.blocks.push(block);
                }
            }
            _ => {}
        }
    }
    body
}

/// Convert an `attribute` node (`name = expression`).
pub fn attribute_from_node(node: &Node, content: &[u8]) -> Option<Attribute> {
    let name = child_of_kind(node, kinds::IDENTIFIER).and_then(|n| node_text(&n, content))?;
    let value = child_of_kind(node, kinds::EXPRESSION)
        .map_or(Value::Null, |expr| value_from_expression(&expr, content));
    Some(Attribute {
        name: name.to_string(),
        value,
        range: node_range(node),
    })
}

fn block_from_node(node: &Node, content: &[u8]) -> Option<Block> {
    let header = block_header(node, content)?;
    let body = child_of_kind(node, kinds::BODY)
        .map(|b| body_from_node(&b, content))
        .unwrap_or_default();
    Some(Block {
        block_type: header.block_type.to_string(),
        labels: header.labels.into_iter().map(|(label, _)| label).collect(),
        body,
        range: node_range(node),
    })
}

/// Keyword and labels of a `block` node.
pub struct BlockHeader<'a> {
    /// The block keyword, e.g. `resource`
    pub block_type: &'a str,
    /// Unquoted labels with the range of each label node
    pub labels: Vec<(String, crate::types::Range)>,
}

/// Read the keyword and labels that precede a block's opening brace.
pub fn block_header<'a>(node: &Node, content: &'a [u8]) -> Option<BlockHeader<'a>> {
    let children = named_children(node);
    let (keyword, rest) = children.split_first()?;
    if keyword.kind() != kinds::IDENTIFIER {
        return None;
    }
    let block_type = node_text(keyword, content)?;

    let labels = rest
        .iter()
        .take_while(|c| c.kind() != kinds::BLOCK_START)
        .filter_map(|label| {
            let text = match label.kind() {
                kinds::STRING_LIT => string_content(label, content)?,
                kinds::IDENTIFIER => node_text(label, content)?.to_string(),
                _ => return None,
            };
            Some((text, node_range(label)))
        })
        .collect();

    Some(BlockHeader { block_type, labels })
}

/// Convert an `expression` node.
///
/// Literals and collections become structured values; everything needing
/// evaluation is kept as its source text.
pub fn value_from_expression(node: &Node, content: &[u8]) -> Value {
    let inner = unwrap_wrappers(*node);
    let raw = || Value::Expression(node_text(node, content).unwrap_or_default().trim().to_string());

    match inner.kind() {
        kinds::NUMERIC_LIT => node_text(&inner, content)
            .map_or(Value::Null, |n| Value::Number(n.to_string())),
        kinds::BOOL_LIT => Value::Bool(node_text(&inner, content) == Some("true")),
        kinds::NULL_LIT => Value::Null,
        kinds::STRING_LIT | kinds::QUOTED_TEMPLATE => {
            string_content(&inner, content).map_or_else(raw, Value::String)
        }
        kinds::TUPLE => Value::Tuple(
            named_children(&inner)
                .iter()
                .filter(|c| c.kind() == kinds::EXPRESSION)
                .map(|c| value_from_expression(c, content))
                .collect(),
        ),
        kinds::OBJECT => Value::Object(
            named_children(&inner)
                .iter()
                .filter(|c| c.kind() == kinds::OBJECT_ELEM)
                .filter_map(|elem| object_entry(elem, content))
                .collect(),
        ),
        _ => raw(),
    }
}

fn object_entry(elem: &Node, content: &[u8]) -> Option<(String, Value)> {
    let expressions: Vec<Node> = named_children(elem)
        .into_iter()
        .filter(|c| c.kind() == kinds::EXPRESSION)
        .collect();
    let key_node = elem.child_by_field_name("key").or_else(|| expressions.first().copied())?;
    let val_node = elem.child_by_field_name("val").or_else(|| expressions.get(1).copied())?;

    let key = match value_from_expression(&key_node, content) {
        Value::String(s) => s,
        Value::Expression(text) | Value::Number(text) => text,
        other => format!("{other:?}"),
    };
    Some((key, value_from_expression(&val_node, content)))
}

/// Descend through single-child wrapper nodes down to the node that decides
/// the value's shape.
fn unwrap_wrappers(mut node: Node) -> Node {
    loop {
        let is_wrapper = matches!(
            node.kind(),
            kinds::EXPRESSION
                | kinds::LITERAL_VALUE
                | kinds::COLLECTION_VALUE
                | kinds::TEMPLATE_EXPR
        );
        if !is_wrapper {
            return node;
        }
        let children: Vec<Node> = named_children(&node)
            .into_iter()
            .filter(|c| c.kind() != kinds::COMMENT)
            .collect();
        match children.as_slice() {
            [only] => node = *only,
            _ => return node,
        }
    }
}

/// The text of a quoted string without interpolations.
///
/// Returns `None` when the string contains `${...}` or `%{...}` parts.
fn string_content(node: &Node, content: &[u8]) -> Option<String> {
    let mut text = String::new();
    for child in named_children(node) {
        match child.kind() {
            kinds::QUOTED_TEMPLATE_START | kinds::QUOTED_TEMPLATE_END => {}
            kinds::TEMPLATE_LITERAL => text.push_str(node_text(&child, content)?),
            _ => return None,
        }
    }
    Some(text)
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

    /// Parse `code` as a file and convert its top-level body.
    fn body_of(code: &str) -> Body {
        let tree = parse(code);
        let root = tree.root_node();
        let body = child_of_kind(&root, kinds::BODY).expect("document has a body");
        body_from_node(&body, code.as_bytes())
    }

    #[test]
    fn converts_literals() {
        let body = body_of("a = \"text\"\nb = 42\nc = true\nd = null\n");

        assert_eq!(body.find_value("a"), Some(&Value::String("text".into())));
        assert_eq!(body.find_value("b"), Some(&Value::Number("42".into())));
        assert_eq!(body.find_value("c"), Some(&Value::Bool(true)));
        assert_eq!(body.find_value("d"), Some(&Value::Null));
    }

    #[test]
    fn empty_string_is_a_string() {
        let body = body_of("a = \"\"\n");
        assert_eq!(body.find_value("a"), Some(&Value::String(String::new())));
    }

    #[test]
    fn interpolated_string_stays_an_expression() {
        let body = body_of("name = \"web-${var.env}\"\n");
        assert_eq!(
            body.find_value("name"),
            Some(&Value::Expression("\"web-${var.env}\"".into()))
        );
    }

    #[test]
    fn converts_collections() {
        let body = body_of("zones = [\"a\", \"b\"]\ntags = {\n  Name = \"web\"\n  \"env\" = \"prod\"\n}\n");

        assert_eq!(
            body.find_value("zones"),
            Some(&Value::Tuple(vec![
                Value::String("a".into()),
                Value::String("b".into())
            ]))
        );
        assert_eq!(
            body.find_value("tags"),
            Some(&Value::Object(vec![
                ("Name".into(), Value::String("web".into())),
                ("env".into(), Value::String("prod".into())),
            ]))
        );
    }

    #[test]
    fn traversals_are_kept_as_source_text() {
        let body = body_of("ami = data.aws_ami.ubuntu.id\n");
        assert_eq!(
            body.find_value("ami"),
            Some(&Value::Expression("data.aws_ami.ubuntu.id".into()))
        );
    }

    #[test]
    fn nested_blocks_keep_labels_and_bodies() {
        let body = body_of("terraform {\n  backend \"s3\" {\n    bucket = \"state\"\n  }\n}\n");

        let terraform = body.blocks_of_type("terraform").next().unwrap();
        let backend = terraform.body.blocks_of_type("backend").next().unwrap();
        assert_eq!(backend.labels, vec!["s3".to_string()]);
        assert_eq!(
            backend.body.find_value("bucket"),
            Some(&Value::String("state".into()))
        );
    }
}
