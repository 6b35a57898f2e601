//! Declared sections: resources, data sources, variables, locals, outputs,
//! modules and providers.

use serde::Serialize;

use crate::node::{Body, Value};
use crate::types::{Location, QueryOptions, Range, SectionType};

/// A declared, uniquely identified block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    id: String,
    section_type: SectionType,
    type_label: Option<String>,
    name: String,
    location: Location,
    name_range: Range,
    node: Body,
}

impl Section {
    /// Build a section and derive its identity key.
    ///
    /// `type_label` is the first label of `resource` and `data` blocks and
    /// ignored for other section types.
    #[must_use]
    pub(crate) fn new(
        section_type: SectionType,
        type_label: Option<String>,
        name: String,
        location: Location,
        name_range: Range,
        node: Body,
    ) -> Self {
        let type_label = match section_type {
            SectionType::Resource | SectionType::Data => type_label,
            _ => None,
        };
        let id = identity_key(section_type, type_label.as_deref(), &name, &node);
        Self {
            id,
            section_type,
            type_label,
            name,
            location,
            name_range,
            node,
        }
    }

    /// Identity key, unique within an aggregate.
    ///
    /// | Section  | Key                                    |
    /// |----------|----------------------------------------|
    /// | resource | `resource.<type>.<name>`               |
    /// | data     | `data.<type>.<name>`                   |
    /// | variable | `var.<name>`                           |
    /// | local    | `local.<name>`                         |
    /// | output   | `output.<name>`                        |
    /// | module   | `module.<name>`                        |
    /// | provider | `provider.<name>[.<alias>]`            |
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// What kind of block declared this section.
    #[must_use]
    pub fn section_type(&self) -> SectionType {
        self.section_type
    }

    /// Resource or data source type (e.g. `aws_instance`).
    #[must_use]
    pub fn type_label(&self) -> Option<&str> {
        self.type_label.as_deref()
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the whole block is declared.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Span of the name label.
    #[must_use]
    pub fn name_range(&self) -> Range {
        self.name_range
    }

    /// Parsed attributes of the block.
    ///
    /// For a local, the body holds the single attribute defining it.
    #[must_use]
    pub fn node(&self) -> &Body {
        &self.node
    }

    /// A top-level attribute whose value is a plain string.
    #[must_use]
    pub fn string_property(&self, key: &str) -> Option<&str> {
        self.node.find_value(key).and_then(Value::as_str)
    }

    /// Whether this section satisfies every filter in `options`.
    ///
    /// `unique` is a property of result lists and is not checked here.
    #[must_use]
    pub fn matches(&self, options: &QueryOptions) -> bool {
        if options
            .section_type
            .is_some_and(|t| t != self.section_type)
        {
            return false;
        }
        if let Some(type_label) = &options.type_label {
            if self.type_label.as_deref() != Some(type_label.as_str()) {
                return false;
            }
        }
        if options.name.as_ref().is_some_and(|n| *n != self.name) {
            return false;
        }
        if options
            .position
            .is_some_and(|p| !self.location.range.contains(p))
        {
            return false;
        }
        if options
            .name_position
            .is_some_and(|p| !self.name_range.contains(p))
        {
            return false;
        }
        true
    }
}

fn identity_key(section_type: SectionType, type_label: Option<&str>, name: &str, node: &Body) -> String {
    match section_type {
        SectionType::Resource => format!("resource.{}.{name}", type_label.unwrap_or_default()),
        SectionType::Data => format!("data.{}.{name}", type_label.unwrap_or_default()),
        SectionType::Variable => format!("var.{name}"),
        SectionType::Local => format!("local.{name}"),
        SectionType::Output => format!("output.{name}"),
        SectionType::Module => format!("module.{name}"),
        SectionType::Provider => match node.find_value("alias").and_then(Value::as_str) {
            Some(alias) => format!("provider.{name}.{alias}"),
            None => format!("provider.{name}"),
        },
    }
}
