//! The per-document index.

use crate::diagnostics::Diagnostic;
use crate::hcl;
use crate::reference::Reference;
use crate::section::Section;
use crate::types::{Position, QueryOptions, Range, ReferenceQueryOptions};
use crate::uri::Uri;

/// Sections, references and diagnostics of one parsed document.
///
/// A file index is immutable: re-parsing a document produces a new one that
/// replaces the old one wholesale.
#[derive(Debug, Clone)]
pub struct FileIndex {
    uri: Uri,
    sections: Vec<Section>,
    references: Vec<Reference>,
    diagnostics: Vec<Diagnostic>,
}

impl FileIndex {
    /// Parse `text` into a file index.
    ///
    /// Returns the index (absent only if no syntax tree could be produced)
    /// and the first syntax error, if any. A document with syntax errors
    /// still yields an index of its well-formed blocks; further problems are
    /// attached to the index as [`diagnostics`](Self::diagnostics).
    #[must_use]
    pub fn from_string(uri: Uri, text: &str) -> (Option<FileIndex>, Option<Diagnostic>) {
        match hcl::extract(&uri, text) {
            Ok(extraction) => (
                Some(Self {
                    uri,
                    sections: extraction.sections,
                    references: extraction.references,
                    diagnostics: extraction.diagnostics,
                }),
                extraction.parse_diagnostic,
            ),
            Err(message) => {
                tracing::warn!(uri = %uri, error = %message, "Document could not be parsed");
                let start = Position::new(0, 0);
                (None, Some(Diagnostic::error(Range::new(start, start), message)))
            }
        }
    }

    /// The document this index was built from.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Declared sections in source order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// References in source order.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Structural and secondary syntax diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Sections matching `options`, in source order.
    ///
    /// `unique` is applied by the aggregates, which see results from
    /// several files.
    #[must_use]
    pub fn query(&self, options: &QueryOptions) -> Vec<&Section> {
        self.sections.iter().filter(|s| s.matches(options)).collect()
    }

    /// References matching `options`, in source order.
    #[must_use]
    pub fn query_references(&self, options: &ReferenceQueryOptions) -> Vec<&Reference> {
        self.references
            .iter()
            .filter(|r| r.matches(options))
            .collect()
    }
}
