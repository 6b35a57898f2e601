//! Owned attribute trees extracted from block bodies.
//!
//! Tree-sitter nodes borrow the syntax tree, which does not outlive parsing,
//! so each section keeps a detached copy of its body for property lookups and
//! hover rendering.

use serde::{Deserialize, Serialize};

use crate::types::Range;

/// A literal or expression value on the right-hand side of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Quoted string without interpolations
    String(String),
    /// Numeric literal, kept in its source spelling
    Number(String),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
    /// `[a, b, c]`
    Tuple(Vec<Value>),
    /// `{ key = value }`, in source order
    Object(Vec<(String, Value)>),
    /// Anything that needs evaluation, as raw source text
    Expression(String),
}

impl Value {
    /// The string content of a plain string literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// `name = value` inside a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: Value,
    /// Span of the whole attribute
    pub range: Range,
}

/// A nested block such as `lifecycle {}` or `ingress {}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block keyword
    pub block_type: String,
    /// Block labels, unquoted
    pub labels: Vec<String>,
    /// Block contents
    pub body: Body,
    /// Span of the whole block
    pub range: Range,
}

/// The contents between a block's braces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
    /// Nested blocks in source order
    pub blocks: Vec<Block>,
}

impl Body {
    /// Look up a top-level attribute by name.
    ///
    /// When an attribute is repeated the last one wins, matching how
    /// Terraform reports the effective value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().rev().find(|a| a.name == name)
    }

    /// Look up a top-level attribute value by name.
    #[must_use]
    pub fn find_value(&self, name: &str) -> Option<&Value> {
        self.attribute(name).map(|a| &a.value)
    }

    /// Nested blocks with the given keyword.
    pub fn blocks_of_type<'a>(&'a self, block_type: &'a str) -> impl Iterator<Item = &'a Block> {
        self.blocks.iter().filter(move |b| b.block_type == block_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn attr(name: &str, value: Value) -> Attribute {
        Attribute {
            name: name.to_string(),
            value,
            range: Range::new(Position::new(0, 0), Position::new(0, 1)),
        }
    }

    #[test]
    fn find_value_prefers_last_assignment() {
        let body = Body {
            attributes: vec![
                attr("region", Value::String("us-east-1".into())),
                attr("region", Value::String("eu-west-1".into())),
            ],
            blocks: Vec::new(),
        };

        assert_eq!(
            body.find_value("region").and_then(Value::as_str),
            Some("eu-west-1")
        );
    }

    #[test]
    fn as_str_only_matches_plain_strings() {
        assert_eq!(Value::Expression("var.x".into()).as_str(), None);
        assert_eq!(Value::Number("3".into()).as_str(), None);
    }
}
