//! Domain types shared by the file index, the aggregates and the queries.
//!
//! - **Locations**: `Position`, `Range`, `Location`
//! - **Classification**: `SectionType`
//! - **Queries**: `QueryOptions`, `ReferenceQueryOptions`, `Scope`
//! - **Inputs/Results**: `Document`, `ProviderInfo`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::uri::Uri;

// ============================================================================
// Locations
// ============================================================================

/// A point in a document.
///
/// Both fields are 0-indexed; `character` counts bytes from the line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line (0-indexed)
    pub line: u32,
    /// Byte column (0-indexed)
    pub character: u32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A start/end span in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Inclusive start
    pub start: Position,
    /// End position
    pub end: Position,
}

impl Range {
    /// Create a range.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `position` lies within the range, both ends included.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

/// A range inside a specific document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Document containing the range
    pub uri: Uri,
    /// Span inside the document
    pub range: Range,
}

// ============================================================================
// Classification
// ============================================================================

/// Top-level block kinds that declare a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    /// `resource "type" "name" {}`
    Resource,
    /// `data "type" "name" {}`
    Data,
    /// `variable "name" {}`
    Variable,
    /// One attribute of a `locals {}` block
    Local,
    /// `output "name" {}`
    Output,
    /// `module "name" {}`
    Module,
    /// `provider "name" {}`
    Provider,
}

impl SectionType {
    /// All section types in declaration order.
    pub const ALL: [SectionType; 7] = [
        Self::Resource,
        Self::Data,
        Self::Variable,
        Self::Local,
        Self::Output,
        Self::Module,
        Self::Provider,
    ];

    /// Keyword used in source and in identity keys.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Data => "data",
            Self::Variable => "variable",
            Self::Local => "local",
            Self::Output => "output",
            Self::Module => "module",
            Self::Provider => "provider",
        }
    }

    /// Map a block keyword to a section type.
    ///
    /// `locals` blocks hold many local sections, so the keyword `locals`
    /// maps to [`SectionType::Local`].
    #[must_use]
    pub fn from_block_type(keyword: &str) -> Option<Self> {
        match keyword {
            "resource" => Some(Self::Resource),
            "data" => Some(Self::Data),
            "variable" => Some(Self::Variable),
            "locals" => Some(Self::Local),
            "output" => Some(Self::Output),
            "module" => Some(Self::Module),
            "provider" => Some(Self::Provider),
            _ => None,
        }
    }

    /// Number of labels a block of this type must carry.
    #[must_use]
    pub fn label_count(&self) -> usize {
        match self {
            Self::Resource | Self::Data => 2,
            Self::Local => 0,
            Self::Variable | Self::Output | Self::Module | Self::Provider => 1,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resource" => Ok(Self::Resource),
            "data" => Ok(Self::Data),
            "variable" | "var" => Ok(Self::Variable),
            "local" | "locals" => Ok(Self::Local),
            "output" => Ok(Self::Output),
            "module" => Ok(Self::Module),
            "provider" => Ok(Self::Provider),
            other => Err(format!(
                "unknown section type '{other}'. Valid types: resource, data, variable, local, output, module, provider"
            )),
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Which files a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Every registered file, in registration order.
    AllFiles,
    /// A single document.
    File(&'a Uri),
}

impl<'a> From<&'a Uri> for Scope<'a> {
    fn from(uri: &'a Uri) -> Self {
        Self::File(uri)
    }
}

/// A conjunction of optional section filters.
///
/// ```
/// use tfindex::{QueryOptions, SectionType};
///
/// let options = QueryOptions::new()
///     .section_type(SectionType::Variable)
///     .name("region");
/// assert!(!options.has_position());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Only sections of this type
    pub section_type: Option<SectionType>,
    /// Only resources/data sources with this type label (e.g. `aws_instance`)
    pub type_label: Option<String>,
    /// Only sections with this name
    pub name: Option<String>,
    /// Only sections whose block contains this position
    pub position: Option<Position>,
    /// Only sections whose name label contains this position
    pub name_position: Option<Position>,
    /// Drop later sections that repeat an identity key
    pub unique: bool,
}

impl QueryOptions {
    /// An unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by section type.
    #[must_use]
    pub fn section_type(mut self, section_type: SectionType) -> Self {
        self.section_type = Some(section_type);
        self
    }

    /// Filter by resource/data type label.
    #[must_use]
    pub fn type_label(mut self, type_label: impl Into<String>) -> Self {
        self.type_label = Some(type_label.into());
        self
    }

    /// Filter by name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by a position inside the section.
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Filter by a position inside the section's name label.
    #[must_use]
    pub fn name_position(mut self, position: Position) -> Self {
        self.name_position = Some(position);
        self
    }

    /// Deduplicate by identity key.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Whether a position-based filter is set.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.position.is_some() || self.name_position.is_some()
    }
}

/// Filters for reference queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceQueryOptions {
    /// Only references with this textual target (e.g. `var.region`)
    pub target_id: Option<String>,
    /// Only references whose range contains this position
    pub position: Option<Position>,
}

impl ReferenceQueryOptions {
    /// An unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by target id.
    #[must_use]
    pub fn target_id(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    /// Filter by position.
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

// ============================================================================
// Inputs and results
// ============================================================================

/// An open document: identity plus current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Document identity
    pub uri: Uri,
    /// Full current text
    pub text: String,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(uri: Uri, text: impl Into<String>) -> Self {
        Self {
            uri,
            text: text.into(),
        }
    }
}

/// A provider declared in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g. `aws`)
    pub name: String,
    /// `alias` attribute, if set
    pub alias: Option<String>,
    /// `version` attribute, if set
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn range_contains_both_ends() {
        let range = Range::new(Position::new(1, 4), Position::new(3, 1));

        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(2, 100)));
        assert!(range.contains(Position::new(3, 1)));
        assert!(!range.contains(Position::new(1, 3)));
        assert!(!range.contains(Position::new(3, 2)));
    }

    #[rstest]
    #[case("resource", SectionType::Resource)]
    #[case("VAR", SectionType::Variable)]
    #[case("locals", SectionType::Local)]
    #[case("provider", SectionType::Provider)]
    fn section_type_parses_cli_spellings(#[case] input: &str, #[case] expected: SectionType) {
        assert_eq!(input.parse::<SectionType>(), Ok(expected));
    }

    #[test]
    fn unknown_section_type_lists_valid_types() {
        let err = "terraform".parse::<SectionType>().unwrap_err();
        assert!(err.contains("Valid types"));
    }

    #[test]
    fn label_counts_follow_block_grammar() {
        assert_eq!(SectionType::Resource.label_count(), 2);
        assert_eq!(SectionType::Data.label_count(), 2);
        assert_eq!(SectionType::Provider.label_count(), 1);
        assert_eq!(SectionType::Local.label_count(), 0);
    }

    #[test]
    fn name_position_counts_as_position_filter() {
        let options = QueryOptions::new().name_position(Position::new(0, 0));
        assert!(options.has_position());
        assert!(!QueryOptions::new().unique().has_position());
    }
}
