//! Hover text for references.
//!
//! Hovering a reference shows the value it most likely evaluates to:
//!
//! | Target   | Shows                                        |
//! |----------|----------------------------------------------|
//! | variable | its `default`                                |
//! | local    | its value                                    |
//! | other    | the attribute named right after the target   |
//!
//! Only one level is read: `module.vpc.ids[0]` shows `ids`.

use std::fmt::Write as _;

use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::index::Index;
use crate::node::Value;
use crate::reference::PathSegment;
use crate::types::{Position, Range, ReferenceQueryOptions, Scope, SectionType};
use crate::uri::Uri;

/// Markdown shown for a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    /// Range of the hovered reference
    pub range: Range,
    /// Markdown text
    pub contents: String,
}

impl Hover {
    /// Convert to the LSP wire representation.
    #[must_use]
    pub fn to_lsp(&self) -> lsp_types::Hover {
        lsp_types::Hover {
            contents: lsp_types::HoverContents::Markup(lsp_types::MarkupContent {
                kind: lsp_types::MarkupKind::Markdown,
                value: self.contents.clone(),
            }),
            range: Some(lsp_types::Range::new(
                lsp_types::Position::new(self.range.start.line, self.range.start.character),
                lsp_types::Position::new(self.range.end.line, self.range.end.character),
            )),
        }
    }
}

/// Hover for the reference at `position` in document `uri`.
///
/// Returns `None` when there is no reference at the position, or when the
/// reference does not name an attribute to show.
///
/// # Errors
///
/// Propagates query errors from the index.
pub fn hover<S: DiagnosticSink>(index: &Index<S>, uri: &Uri, position: Position) -> Result<Option<Hover>> {
    let references = index.query_references(
        Scope::File(uri),
        &ReferenceQueryOptions::new().position(position),
    )?;
    let Some(reference) = references.first() else {
        return Ok(None);
    };
    let range = reference.location().range;

    let Some(section) = index.resolve(reference) else {
        return Ok(Some(Hover {
            range,
            contents: format!("Unknown target `{}`", reference.target_id()),
        }));
    };

    let (label, key) = match section.section_type() {
        SectionType::Variable => ("default", "default"),
        SectionType::Local => (section.name(), section.name()),
        _ => match reference.value_path().first() {
            Some(PathSegment::Attribute(name)) => (name.as_str(), name.as_str()),
            _ => return Ok(None),
        },
    };

    let contents = match section.node().find_value(key) {
        Some(value) => format!("{label}: {}", render_value(value)),
        None => format!("`{label}` not specified"),
    };
    Ok(Some(Hover { range, contents }))
}

/// Render a value as inline HCL.
#[must_use]
pub fn render_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => {
            let _ = write!(out, "{s:?}");
        }
        Value::Number(n) => out.push_str(n),
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Null => out.push_str("null"),
        Value::Tuple(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(entries) if entries.is_empty() => out.push_str("{}"),
        Value::Object(entries) => {
            out.push_str("{ ");
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{key} = ");
                write_value(out, item);
            }
            out.push_str(" }");
        }
        Value::Expression(text) => out.push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::String("eu-west-1".into()), "\"eu-west-1\"")]
    #[case(Value::Number("3".into()), "3")]
    #[case(Value::Bool(false), "false")]
    #[case(Value::Null, "null")]
    #[case(Value::Expression("var.a".into()), "var.a")]
    #[case(Value::Object(Vec::new()), "{}")]
    fn renders_scalars(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(render_value(&value), expected);
    }

    #[test]
    fn renders_nested_collections() {
        let value = Value::Object(vec![
            ("Name".into(), Value::String("web".into())),
            (
                "ports".into(),
                Value::Tuple(vec![Value::Number("80".into()), Value::Number("443".into())]),
            ),
        ]);

        assert_eq!(render_value(&value), "{ Name = \"web\", ports = [80, 443] }");
    }

    #[test]
    fn lsp_hover_is_markdown() {
        let hover = Hover {
            range: Range::new(Position::new(1, 2), Position::new(1, 7)),
            contents: "default: 1".into(),
        };

        let lsp = hover.to_lsp();
        assert!(matches!(
            lsp.contents,
            lsp_types::HoverContents::Markup(ref m) if m.kind == lsp_types::MarkupKind::Markdown
        ));
        assert_eq!(lsp.range.map(|r| r.end.character), Some(7));
    }
}
