//! The workspace index: the entry point used by editor features.
//!
//! [`Index`] aggregates every document registered for one workspace folder,
//! parses documents on demand, publishes their diagnostics and notifies
//! subscribers after each mutation.
//!
//! ```
//! use tfindex::{Document, Index, IndexOptions, QueryOptions, Scope, SectionType, Uri};
//!
//! let mut index = Index::new();
//! let uri = Uri::parse("file:///infra/main.tf").unwrap();
//! index.index_document(
//!     &Document::new(uri, "variable \"region\" {\n  default = \"eu-west-1\"\n}\n"),
//!     &IndexOptions::new(),
//! );
//!
//! let variables = index
//!     .query(Scope::AllFiles, &QueryOptions::new().section_type(SectionType::Variable))
//!     .unwrap();
//! assert_eq!(variables[0].id(), "var.region");
//! ```

use std::rc::Rc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, warn};

use crate::aggregate::{AnyFile, SectionAggregate};
use crate::config::IndexOptions;
use crate::diagnostics::{DiagnosticCollection, DiagnosticSink};
use crate::error::Result;
use crate::events::{CancellationToken, ChangeEmitter, Subscription};
use crate::file_index::FileIndex;
use crate::group::IndexGroup;
use crate::reference::Reference;
use crate::section::Section;
use crate::types::{Document, ProviderInfo, QueryOptions, ReferenceQueryOptions, Scope, SectionType};
use crate::uri::Uri;

/// Name reported for an index without a workspace folder.
const UNTITLED: &str = "untitled";

/// What [`Index::index_document`] did with a document.
pub(crate) enum Outcome {
    /// Matched an exclude pattern; nothing changed.
    Excluded,
    /// Parsed; `file` is absent if no syntax tree could be built.
    Indexed {
        file: Option<Rc<FileIndex>>,
        diagnostics: usize,
    },
}

/// The folder an index covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFolder {
    /// Display name
    pub name: String,
    /// Folder URI; exclude patterns match paths relative to it
    pub uri: Uri,
}

impl WorkspaceFolder {
    /// Create a workspace folder.
    #[must_use]
    pub fn new(name: impl Into<String>, uri: Uri) -> Self {
        Self {
            name: name.into(),
            uri,
        }
    }
}

/// Workspace-wide symbol index.
#[derive(Debug)]
pub struct Index<S: DiagnosticSink = DiagnosticCollection> {
    folder: Option<WorkspaceFolder>,
    aggregate: SectionAggregate<AnyFile>,
    emitter: ChangeEmitter,
    diagnostics: S,
}

impl Index<DiagnosticCollection> {
    /// An index without a workspace folder, collecting diagnostics in memory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(None, DiagnosticCollection::new())
    }

    /// An index for `folder`, collecting diagnostics in memory.
    #[must_use]
    pub fn with_folder(folder: WorkspaceFolder) -> Self {
        Self::with_sink(Some(folder), DiagnosticCollection::new())
    }
}

impl Default for Index<DiagnosticCollection> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> Index<S> {
    /// An index publishing diagnostics to `sink`.
    pub fn with_sink(folder: Option<WorkspaceFolder>, sink: S) -> Self {
        Self {
            folder,
            aggregate: SectionAggregate::new(AnyFile),
            emitter: ChangeEmitter::new(),
            diagnostics: sink,
        }
    }

    /// The workspace folder name, or `"untitled"`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.folder.as_ref().map_or(UNTITLED, |f| f.name.as_str())
    }

    /// The workspace folder, if any.
    #[must_use]
    pub fn folder(&self) -> Option<&WorkspaceFolder> {
        self.folder.as_ref()
    }

    /// The diagnostics sink.
    #[must_use]
    pub fn diagnostics(&self) -> &S {
        &self.diagnostics
    }

    /// Mutable access to the diagnostics sink, e.g. to drain queued
    /// notifications.
    pub fn diagnostics_mut(&mut self) -> &mut S {
        &mut self.diagnostics
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Register `file`, replacing any earlier index of the same document, and
    /// notify subscribers.
    pub fn add(&mut self, file: impl Into<Rc<FileIndex>>) {
        let file = file.into();
        debug!(
            uri = %file.uri(),
            sections = file.sections().len(),
            references = file.references().len(),
            "Adding file to index"
        );
        self.aggregate.insert(file);
        self.emitter.fire();
    }

    /// Unregister the document at `uri` and notify subscribers.
    ///
    /// Subscribers are notified even if the document was not registered.
    pub fn delete(&mut self, uri: &Uri) {
        let removed = self.aggregate.remove(uri).is_some();
        debug!(uri = %uri, removed, "Deleting file from index");
        self.emitter.fire();
    }

    /// Drop every file. Subscribers are notified only when `silent` is false.
    pub fn clear(&mut self, silent: bool) {
        debug!(files = self.aggregate.len(), silent, "Clearing index");
        self.aggregate.clear();
        if !silent {
            self.emitter.fire();
        }
    }

    /// Subscribe to changes. The listener runs after every `add`, every
    /// `delete` and every non-silent `clear`.
    pub fn on_did_change(&mut self, listener: impl FnMut() + 'static) -> Subscription {
        self.emitter.subscribe(listener)
    }

    /// Remove a change listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.emitter.unsubscribe(subscription)
    }

    // ------------------------------------------------------------------------
    // Parse pipeline
    // ------------------------------------------------------------------------

    /// Parse `document`, register the result and publish its diagnostics.
    ///
    /// Exclude patterns are matched against
    /// [`relative_path`](Self::relative_path). Without a workspace folder
    /// that is the absolute path, so a pattern such as `*.bak.tf` only
    /// matches documents inside a folder; use `**/*.bak.tf` to match anywhere.
    ///
    /// An excluded document is skipped entirely: nothing is registered and
    /// diagnostics published earlier for it are left as they are. Otherwise
    /// the full diagnostic list of the document replaces the earlier one,
    /// even when parsing produced no index.
    pub fn index_document(
        &mut self,
        document: &Document,
        options: &IndexOptions,
    ) -> Option<Rc<FileIndex>> {
        match self.index_document_with_outcome(document, options) {
            Outcome::Excluded => None,
            Outcome::Indexed { file, .. } => file,
        }
    }

    pub(crate) fn index_document_with_outcome(
        &mut self,
        document: &Document,
        options: &IndexOptions,
    ) -> Outcome {
        let relative = self.relative_path(&document.uri);
        if options.is_excluded(&relative) {
            debug!(uri = %document.uri, path = %relative, "Document excluded from indexing");
            return Outcome::Excluded;
        }

        let (file, parse_diagnostic) = FileIndex::from_string(document.uri.clone(), &document.text);

        let mut diagnostics = Vec::new();
        diagnostics.extend(parse_diagnostic);
        let file = file.map(Rc::new);
        if let Some(file) = &file {
            diagnostics.extend(file.diagnostics().iter().cloned());
            self.add(Rc::clone(file));
        }

        let published = diagnostics.len();
        self.diagnostics.set(&document.uri, diagnostics);
        Outcome::Indexed {
            file,
            diagnostics: published,
        }
    }

    /// The registered index for `document`, parsing it only if it is not
    /// registered yet.
    ///
    /// The cached index is returned even if the document text changed; call
    /// [`delete`](Self::delete) or [`index_document`](Self::index_document)
    /// after an edit.
    pub fn get_or_index_document(
        &mut self,
        document: &Document,
        options: &IndexOptions,
    ) -> Option<Rc<FileIndex>> {
        if let Some(file) = self.aggregate.get(&document.uri) {
            return Some(Rc::clone(file));
        }
        self.index_document(document, options)
    }

    /// Path of `uri` relative to the workspace folder.
    ///
    /// Documents outside the folder (or any document when there is no
    /// folder) use their full decoded path, e.g. `/ws/x.bak.tf`.
    #[must_use]
    pub fn relative_path(&self, uri: &Uri) -> String {
        let path = uri.path();
        match &self.folder {
            Some(folder) if folder.uri.is_ancestor_of(uri) => {
                let base = folder.uri.path();
                match path.strip_prefix(base.as_str()) {
                    Some(rest) => rest.trim_start_matches('/').to_string(),
                    None => path,
                }
            }
            _ => path,
        }
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// The registered index for `uri`.
    #[must_use]
    pub fn get(&self, uri: &Uri) -> Option<&Rc<FileIndex>> {
        self.aggregate.get(uri)
    }

    /// Registered indices in scope, in registration order.
    #[must_use]
    pub fn indices(&self, scope: Scope<'_>) -> Vec<&Rc<FileIndex>> {
        self.aggregate.indices(scope)
    }

    /// The section registered under identity key `id`.
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.aggregate.section(id)
    }

    /// Sections matching `options`.
    ///
    /// # Errors
    ///
    /// [`Error::PositionRequiresFile`](crate::Error::PositionRequiresFile)
    /// for a position filter over all files.
    pub fn query(&self, scope: Scope<'_>, options: &QueryOptions) -> Result<Vec<&Section>> {
        self.aggregate.query(scope, options)
    }

    /// Like [`query`](Self::query), checking `token` between files.
    ///
    /// # Errors
    ///
    /// As `query`, plus [`Error::Cancelled`](crate::Error::Cancelled).
    pub fn query_with_cancellation(
        &self,
        scope: Scope<'_>,
        options: &QueryOptions,
        token: &CancellationToken,
    ) -> Result<Vec<&Section>> {
        self.aggregate.query_checked(scope, options, Some(token))
    }

    /// References matching `options`.
    ///
    /// # Errors
    ///
    /// [`Error::PositionRequiresFile`](crate::Error::PositionRequiresFile)
    /// for a position filter over all files.
    pub fn query_references(
        &self,
        scope: Scope<'_>,
        options: &ReferenceQueryOptions,
    ) -> Result<Vec<&Reference>> {
        self.aggregate.query_references(scope, options)
    }

    /// The section `reference` points at.
    ///
    /// When several sections match, the one from the earliest registered
    /// file wins. `None` means the target is unknown.
    #[must_use]
    pub fn resolve(&self, reference: &Reference) -> Option<&Section> {
        let options = reference.query();
        self.aggregate
            .indices(Scope::AllFiles)
            .into_iter()
            .find_map(|file| file.query(&options).into_iter().next())
    }

    /// Every `provider` block in the workspace, in registration order.
    #[must_use]
    pub fn get_provider_declarations(&self) -> Vec<ProviderInfo> {
        let options = QueryOptions::new().section_type(SectionType::Provider);
        self.aggregate
            .indices(Scope::AllFiles)
            .into_iter()
            .flat_map(|file| file.query(&options))
            .map(|section| ProviderInfo {
                name: section.name().to_string(),
                alias: section.string_property("alias").map(str::to_string),
                version: section.string_property("version").map(str::to_string),
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Module groups
    // ------------------------------------------------------------------------

    /// One group per directory holding registered files.
    ///
    /// Groups are ordered by the first registration in each directory.
    #[must_use]
    pub fn groups(&self) -> Vec<IndexGroup> {
        let mut groups: IndexMap<String, IndexGroup> = IndexMap::new();
        for file in self.aggregate.indices(Scope::AllFiles) {
            match groups.entry(file.uri().dirname().to_string()) {
                Entry::Occupied(mut entry) => {
                    if let Err(e) = entry.get_mut().add(Rc::clone(file)) {
                        warn!(error = %e, "File rejected by its own directory group");
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(IndexGroup::create_from_file_index(Rc::clone(file)));
                }
            }
        }
        groups.into_values().collect()
    }

    /// The group of the directory containing the registered document `uri`.
    #[must_use]
    pub fn group_for(&self, uri: &Uri) -> Option<IndexGroup> {
        self.aggregate.get(uri)?;
        let directory = uri.dirname();
        let mut members = self
            .aggregate
            .indices(Scope::AllFiles)
            .into_iter()
            .filter(|file| file.uri().dirname() == directory);

        let mut group = IndexGroup::create_from_file_index(Rc::clone(members.next()?));
        for file in members {
            if let Err(e) = group.add(Rc::clone(file)) {
                warn!(error = %e, "File rejected by its own directory group");
            }
        }
        Some(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::error::Error;
    use crate::types::Position;

    fn uri(path: &str) -> Uri {
        Uri::parse(&format!("file://{path}")).unwrap()
    }

    fn file(path: &str, code: &str) -> FileIndex {
        FileIndex::from_string(uri(path), code).0.expect("document should index")
    }

    fn counting(index: &mut Index) -> Rc<Cell<usize>> {
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        index.on_did_change(move || counter.set(counter.get() + 1));
        fired
    }

    #[test]
    fn add_and_delete_always_notify() {
        let mut index = Index::new();
        let fired = counting(&mut index);

        index.add(file("/ws/a.tf", "variable \"v\" {}\n"));
        index.delete(&uri("/ws/a.tf"));
        index.delete(&uri("/ws/a.tf"));

        assert_eq!(fired.get(), 3);
        assert!(index.section("var.v").is_none());
    }

    #[test]
    fn silent_clear_does_not_notify() {
        let mut index = Index::new();
        index.add(file("/ws/a.tf", "variable \"v\" {}\n"));
        let fired = counting(&mut index);

        index.clear(true);

        assert_eq!(fired.get(), 0);
        assert!(index.indices(Scope::AllFiles).is_empty());
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut index = Index::new();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let handle = index.on_did_change(move || counter.set(counter.get() + 1));

        index.add(file("/ws/a.tf", ""));
        assert!(index.unsubscribe(handle));
        index.add(file("/ws/b.tf", ""));

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn position_over_all_files_is_a_usage_error() {
        let mut index = Index::new();
        index.add(file("/ws/a.tf", "variable \"v\" {}\n"));
        let options = QueryOptions::new().position(Position::new(0, 0));

        assert!(matches!(
            index.query(Scope::AllFiles, &options),
            Err(Error::PositionRequiresFile)
        ));
        assert_eq!(index.query(Scope::File(&uri("/ws/a.tf")), &options).unwrap().len(), 1);
    }

    #[test]
    fn untitled_without_folder() {
        assert_eq!(Index::new().name(), "untitled");
        let index = Index::with_folder(WorkspaceFolder::new("infra", uri("/ws")));
        assert_eq!(index.name(), "infra");
    }

    #[test]
    fn relative_path_strips_the_folder() {
        let index = Index::with_folder(WorkspaceFolder::new("ws", uri("/ws")));

        assert_eq!(index.relative_path(&uri("/ws/modules/vpc/main.tf")), "modules/vpc/main.tf");
        assert_eq!(index.relative_path(&uri("/elsewhere/main.tf")), "/elsewhere/main.tf");
        assert_eq!(index.relative_path(&uri("/wsx/main.tf")), "/wsx/main.tf");
    }

    #[test]
    fn without_a_folder_excludes_match_the_absolute_path() {
        let mut index = Index::new();
        let file_name_only = IndexOptions::with_exclude(["*.bak.tf"]).unwrap();
        let anywhere = IndexOptions::with_exclude(["**/*.bak.tf"]).unwrap();
        let doc = Document::new(uri("/ws/x.bak.tf"), "variable \"b\" {}\n");

        assert_eq!(index.relative_path(&doc.uri), "/ws/x.bak.tf");
        assert!(index.index_document(&doc, &anywhere).is_none());
        assert!(index.index_document(&doc, &file_name_only).is_some());
    }

    #[test]
    fn get_or_index_document_returns_the_cached_file() {
        let mut index = Index::new();
        let first = Document::new(uri("/ws/a.tf"), "variable \"old\" {}\n");
        let edited = Document::new(uri("/ws/a.tf"), "variable \"new\" {}\n");

        let original = index.get_or_index_document(&first, &IndexOptions::new()).unwrap();
        let cached = index.get_or_index_document(&edited, &IndexOptions::new()).unwrap();

        assert!(Rc::ptr_eq(&original, &cached));
        assert!(index.section("var.old").is_some());
        assert!(index.section("var.new").is_none());
    }

    #[test]
    fn groups_follow_directories() {
        let mut index = Index::new();
        index.add(file("/ws/main.tf", "module \"vpc\" {}\n"));
        index.add(file("/ws/modules/vpc/main.tf", "variable \"cidr\" {}\n"));
        index.add(file("/ws/outputs.tf", "output \"id\" {}\n"));

        let groups = index.groups();
        let dirs: Vec<&str> = groups.iter().map(|g| g.uri().as_str()).collect();
        assert_eq!(dirs, vec!["file:///ws", "file:///ws/modules/vpc"]);
        assert_eq!(groups[0].len(), 2);

        let root = index.group_for(&uri("/ws/outputs.tf")).unwrap();
        assert!(root.section("module.vpc").is_some());
        assert!(root.section("var.cidr").is_none());
        assert!(index.group_for(&uri("/ws/unknown.tf")).is_none());
    }
}
