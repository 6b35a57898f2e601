//! Reference sites and the lookups they imply.
//!
//! A reference is a traversal such as `var.region`, `module.vpc.subnet_ids`
//! or `aws_instance.web[0].private_ip`. Its textual form names the target by
//! type and name, which is not the identity key the target is stored under,
//! so resolving it means running the [`QueryOptions`] from
//! [`Reference::query`] rather than a map lookup.

use serde::Serialize;
use std::fmt;

use crate::types::{Location, QueryOptions, ReferenceQueryOptions, SectionType};

/// Roots that never name a declared section.
const BUILTIN_ROOTS: &[&str] = &["count", "each", "self", "path", "terraform"];

/// One step of a traversal after the target has been named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathSegment {
    /// `.name`
    Attribute(String),
    /// `[key]`; `None` when the key is not a literal
    Index(Option<String>),
    /// `.*` or `[*]`
    Splat,
}

impl PathSegment {
    /// The attribute name, if this is an attribute step.
    #[must_use]
    pub fn as_attribute(&self) -> Option<&str> {
        match self {
            Self::Attribute(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => write!(f, ".{name}"),
            Self::Index(Some(key)) => write!(f, "[{key}]"),
            Self::Index(None) => write!(f, "[?]"),
            Self::Splat => write!(f, ".*"),
        }
    }
}

/// A usage site naming a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    target_id: String,
    target_type: SectionType,
    target_type_label: Option<String>,
    target_name: String,
    location: Location,
    value_path: Vec<PathSegment>,
}

impl Reference {
    /// Classify a traversal rooted at `root`.
    ///
    /// Returns `None` for traversals that do not name a section: built-in
    /// roots (`count`, `each`, ...), bare identifiers, and roots missing the
    /// labels their section type needs (`var` without a name, `data.t`).
    #[must_use]
    pub fn from_traversal(root: &str, segments: &[PathSegment], location: Location) -> Option<Self> {
        if BUILTIN_ROOTS.contains(&root) {
            return None;
        }

        let attribute = |i: usize| segments.get(i).and_then(PathSegment::as_attribute);

        let (target_type, type_label, name, consumed) = match root {
            "var" => (SectionType::Variable, None, attribute(0)?, 1),
            "local" => (SectionType::Local, None, attribute(0)?, 1),
            "module" => (SectionType::Module, None, attribute(0)?, 1),
            "data" => (SectionType::Data, Some(attribute(0)?), attribute(1)?, 2),
            resource_type => (SectionType::Resource, Some(resource_type), attribute(0)?, 1),
        };

        let target_id = match (target_type, type_label) {
            (SectionType::Data, Some(t)) => format!("data.{t}.{name}"),
            (SectionType::Resource, Some(t)) => format!("{t}.{name}"),
            _ => format!("{root}.{name}"),
        };

        Some(Self {
            target_id,
            target_type,
            target_type_label: type_label.map(str::to_string),
            target_name: name.to_string(),
            location,
            value_path: segments[consumed..].to_vec(),
        })
    }

    /// The target as written, e.g. `var.region` or `aws_instance.web`.
    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Section type the reference points at.
    #[must_use]
    pub fn target_type(&self) -> SectionType {
        self.target_type
    }

    /// Name of the referenced section.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Where the traversal appears.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Steps into the target's value, after the target itself.
    ///
    /// For `module.vpc.subnet_ids[0]` this is `[.subnet_ids, [0]]`.
    #[must_use]
    pub fn value_path(&self) -> &[PathSegment] {
        &self.value_path
    }

    /// Criteria selecting the candidate target sections.
    #[must_use]
    pub fn query(&self) -> QueryOptions {
        let options = QueryOptions::new()
            .section_type(self.target_type)
            .name(self.target_name.clone());
        match &self.target_type_label {
            Some(type_label) => options.type_label(type_label.clone()),
            None => options,
        }
    }

    /// Whether this reference satisfies every filter in `options`.
    #[must_use]
    pub fn matches(&self, options: &ReferenceQueryOptions) -> bool {
        if options
            .target_id
            .as_ref()
            .is_some_and(|t| *t != self.target_id)
        {
            return false;
        }
        !options
            .position
            .is_some_and(|p| !self.location.range.contains(p))
    }
}
