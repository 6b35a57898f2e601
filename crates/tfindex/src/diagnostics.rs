//! Diagnostics produced while indexing and the sinks that receive them.
//!
//! The index publishes the complete diagnostic list of a document every time
//! it parses that document, replacing whatever the sink held for its URI.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::warn;

use crate::types::Range;
use crate::uri::Uri;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Syntax or structural error
    Error,
    /// Suspicious but indexable input
    Warning,
}

/// A problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Where the problem is
    pub range: Range,
    /// Human-readable description
    pub message: String,
    /// How serious it is
    pub severity: Severity,
}

impl Diagnostic {
    /// Create an error diagnostic.
    #[must_use]
    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Create a warning diagnostic.
    #[must_use]
    pub fn warning(range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// Convert to the LSP wire representation.
    #[must_use]
    pub fn to_lsp(&self) -> lsp_types::Diagnostic {
        lsp_types::Diagnostic {
            range: to_lsp_range(self.range),
            severity: Some(match self.severity {
                Severity::Error => lsp_types::DiagnosticSeverity::ERROR,
                Severity::Warning => lsp_types::DiagnosticSeverity::WARNING,
            }),
            source: Some("tfindex".to_string()),
            message: self.message.clone(),
            ..Default::default()
        }
    }
}

fn to_lsp_range(range: Range) -> lsp_types::Range {
    lsp_types::Range::new(
        lsp_types::Position::new(range.start.line, range.start.character),
        lsp_types::Position::new(range.end.line, range.end.character),
    )
}

/// Receives the diagnostics of a document, replacing any earlier set.
pub trait DiagnosticSink {
    /// Replace the diagnostics held for `uri`.
    fn set(&mut self, uri: &Uri, diagnostics: Vec<Diagnostic>);
}

/// In-memory diagnostics keyed by document.
#[derive(Debug, Default)]
pub struct DiagnosticCollection {
    entries: HashMap<Uri, Vec<Diagnostic>>,
}

impl DiagnosticCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics last published for `uri`, if any were published.
    #[must_use]
    pub fn get(&self, uri: &Uri) -> Option<&[Diagnostic]> {
        self.entries.get(uri).map(Vec::as_slice)
    }

    /// Number of documents with a published (possibly empty) set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was ever published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over documents and their diagnostics, sorted by URI.
    pub fn iter(&self) -> impl Iterator<Item = (&Uri, &[Diagnostic])> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(uri, d)| (uri, d.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    /// Total number of diagnostics across documents.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

impl DiagnosticSink for DiagnosticCollection {
    fn set(&mut self, uri: &Uri, diagnostics: Vec<Diagnostic>) {
        self.entries.insert(uri.clone(), diagnostics);
    }
}

/// Queues `textDocument/publishDiagnostics` notifications for a transport.
#[derive(Debug, Default)]
pub struct LspDiagnosticPublisher {
    pending: VecDeque<lsp_types::PublishDiagnosticsParams>,
}

impl LspDiagnosticPublisher {
    /// Create an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&mut self) -> Vec<lsp_types::PublishDiagnosticsParams> {
        self.pending.drain(..).collect()
    }
}

impl DiagnosticSink for LspDiagnosticPublisher {
    fn set(&mut self, uri: &Uri, diagnostics: Vec<Diagnostic>) {
        let lsp_uri = match uri.as_str().parse::<lsp_types::Uri>() {
            Ok(u) => u,
            Err(e) => {
                warn!(uri = %uri, error = %e, "Cannot publish diagnostics for URI");
                return;
            }
        };
        self.pending.push_back(lsp_types::PublishDiagnosticsParams::new(
            lsp_uri,
            diagnostics.iter().map(Diagnostic::to_lsp).collect(),
            None,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn range() -> Range {
        Range::new(Position::new(2, 0), Position::new(2, 8))
    }

    #[test]
    fn collection_replaces_previous_set() {
        let uri = Uri::parse("file:///infra/main.tf").unwrap();
        let mut collection = DiagnosticCollection::new();

        collection.set(&uri, vec![Diagnostic::error(range(), "first")]);
        collection.set(&uri, Vec::new());

        assert!(collection.get(&uri).is_some_and(<[Diagnostic]>::is_empty));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.total(), 0);
    }

    #[test]
    fn lsp_conversion_keeps_range_and_severity() {
        let lsp = Diagnostic::warning(range(), "duplicate").to_lsp();

        assert_eq!(lsp.severity, Some(lsp_types::DiagnosticSeverity::WARNING));
        assert_eq!(lsp.range.start.line, 2);
        assert_eq!(lsp.range.end.character, 8);
        assert_eq!(lsp.message, "duplicate");
    }

    #[test]
    fn publisher_queues_one_notification_per_set() {
        let uri = Uri::parse("file:///infra/main.tf").unwrap();
        let mut publisher = LspDiagnosticPublisher::new();

        publisher.set(&uri, vec![Diagnostic::error(range(), "syntax error")]);
        publisher.set(&uri, Vec::new());

        let sent = publisher.drain();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].diagnostics.len(), 1);
        assert!(sent[1].diagnostics.is_empty());
        assert!(publisher.drain().is_empty());
    }
}
