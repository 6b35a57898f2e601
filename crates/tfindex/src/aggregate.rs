//! Multi-file section aggregation shared by [`Index`](crate::Index) and
//! [`IndexGroup`](crate::IndexGroup).
//!
//! An aggregate owns two maps that must always agree:
//!
//! - **files**: uri → file index, in registration order
//! - **sections**: identity key → the slot (file, ordinal) that currently
//!   provides it
//!
//! Both are private and mutated only by [`SectionAggregate::insert`],
//! [`SectionAggregate::remove`] and [`SectionAggregate::clear`], so the
//! section map is always the union of the registered files' sections with
//! the most recently registered declaration winning each identity key.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::CancellationToken;
use crate::file_index::FileIndex;
use crate::reference::Reference;
use crate::section::Section;
use crate::types::{QueryOptions, ReferenceQueryOptions, Scope};
use crate::uri::Uri;

/// Decides which files an aggregate accepts.
pub(crate) trait Membership {
    /// Whether `file` belongs to this scope.
    fn admits(&self, file: &FileIndex) -> bool;
}

/// Workspace scope: every file belongs.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AnyFile;

impl Membership for AnyFile {
    fn admits(&self, _file: &FileIndex) -> bool {
        true
    }
}

/// Directory scope: files directly inside one directory belong.
///
/// Membership is exact; files in subdirectories do not belong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directory(pub Uri);

impl Membership for Directory {
    fn admits(&self, file: &FileIndex) -> bool {
        file.uri().dirname().as_str() == self.0.as_str()
    }
}

#[derive(Debug)]
struct FileEntry {
    file: Rc<FileIndex>,
    /// Registration sequence number; higher means registered later.
    seq: u64,
}

/// Which file currently provides an identity key, and where in it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionSlot {
    file: String,
    ordinal: usize,
}

/// Files and the sections they contribute, for one membership scope.
#[derive(Debug)]
pub(crate) struct SectionAggregate<M> {
    scope: M,
    files: IndexMap<String, FileEntry>,
    sections: HashMap<String, SectionSlot>,
    next_seq: u64,
}

impl<M: Membership> SectionAggregate<M> {
    /// Create an empty aggregate.
    pub fn new(scope: M) -> Self {
        Self {
            scope,
            files: IndexMap::new(),
            sections: HashMap::new(),
            next_seq: 0,
        }
    }

    /// The membership scope.
    pub fn scope(&self) -> &M {
        &self.scope
    }

    /// Whether `file` may be inserted.
    pub fn admits(&self, file: &FileIndex) -> bool {
        self.scope.admits(file)
    }

    /// Register `file`, replacing any file with the same uri.
    ///
    /// A replaced file keeps its position in registration order but its
    /// sections are withdrawn before the new ones are merged. Returns `false`
    /// and leaves the aggregate untouched if the scope does not admit `file`.
    pub fn insert(&mut self, file: Rc<FileIndex>) -> bool {
        if !self.scope.admits(&file) {
            return false;
        }
        let key = file.uri().to_string();
        if self.files.contains_key(&key) {
            self.detach_sections(&key);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let sections: Vec<String> = file.sections().iter().map(|s| s.id().to_string()).collect();
        self.files.insert(key.clone(), FileEntry { file, seq });

        for (ordinal, id) in sections.into_iter().enumerate() {
            let slot = SectionSlot {
                file: key.clone(),
                ordinal,
            };
            if let Some(previous) = self.sections.insert(id.clone(), slot) {
                if previous.file != key {
                    debug!(
                        id = %id,
                        previous = %previous.file,
                        file = %key,
                        "Section identity collision, keeping the latest registration"
                    );
                }
            }
        }
        true
    }

    /// Unregister the file at `uri` and withdraw its sections.
    ///
    /// Returns the removed file, or `None` if it was not registered.
    pub fn remove(&mut self, uri: &Uri) -> Option<Rc<FileIndex>> {
        let key = uri.to_string();
        if !self.files.contains_key(&key) {
            return None;
        }
        self.detach_sections(&key);
        self.files.shift_remove(&key).map(|entry| entry.file)
    }

    /// Drop all files and sections.
    pub fn clear(&mut self) {
        self.files.clear();
        self.sections.clear();
    }

    /// Withdraw the sections provided by `key`.
    ///
    /// An identity key that another registered file also declares falls back
    /// to that file's declaration (the most recently registered one).
    fn detach_sections(&mut self, key: &str) {
        let Some(entry) = self.files.get(key) else {
            return;
        };
        let owned: Vec<String> = entry
            .file
            .sections()
            .iter()
            .map(|s| s.id().to_string())
            .filter(|id| self.sections.get(id).is_some_and(|slot| slot.file == key))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        for id in owned {
            self.sections.remove(&id);
            if let Some(slot) = self.latest_declaration(&id, key) {
                self.sections.insert(id, slot);
            }
        }
    }

    /// The latest registered declaration of `id`, ignoring file `except`.
    fn latest_declaration(&self, id: &str, except: &str) -> Option<SectionSlot> {
        self.files
            .iter()
            .filter(|(key, _)| key.as_str() != except)
            .filter_map(|(key, entry)| {
                let ordinal = entry.file.sections().iter().rposition(|s| s.id() == id)?;
                Some((entry.seq, key, ordinal))
            })
            .max_by_key(|(seq, _, _)| *seq)
            .map(|(_, key, ordinal)| SectionSlot {
                file: key.clone(),
                ordinal,
            })
    }

    /// The registered file for `uri`.
    pub fn get(&self, uri: &Uri) -> Option<&Rc<FileIndex>> {
        self.files.get(uri.as_str()).map(|entry| &entry.file)
    }

    /// Files in scope, in registration order.
    pub fn indices(&self, scope: Scope<'_>) -> Vec<&Rc<FileIndex>> {
        match scope {
            Scope::AllFiles => self.files.values().map(|entry| &entry.file).collect(),
            Scope::File(uri) => self.get(uri).into_iter().collect(),
        }
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The section currently registered under identity key `id`.
    pub fn section(&self, id: &str) -> Option<&Section> {
        let slot = self.sections.get(id)?;
        self.files
            .get(&slot.file)
            .and_then(|entry| entry.file.sections().get(slot.ordinal))
    }

    /// Every identity key currently registered.
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Sections matching `options` across the files in `scope`.
    ///
    /// Results are concatenated in file registration order, then in source
    /// order within each file. With `unique`, later repeats of an identity
    /// key are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::PositionRequiresFile`] if a position filter is combined with
    /// [`Scope::AllFiles`].
    pub fn query(&self, scope: Scope<'_>, options: &QueryOptions) -> Result<Vec<&Section>> {
        self.query_checked(scope, options, None)
    }

    /// Like [`query`](Self::query), polling `token` before each file.
    ///
    /// # Errors
    ///
    /// As `query`, plus [`Error::Cancelled`] once the token is cancelled.
    pub fn query_checked(
        &self,
        scope: Scope<'_>,
        options: &QueryOptions,
        token: Option<&CancellationToken>,
    ) -> Result<Vec<&Section>> {
        if options.has_position() && scope == Scope::AllFiles {
            return Err(Error::PositionRequiresFile);
        }

        let mut sections = Vec::new();
        for file in self.indices(scope) {
            if token.is_some_and(CancellationToken::is_cancelled) {
                return Err(Error::Cancelled);
            }
            sections.extend(file.query(options));
        }

        if options.unique {
            let mut seen = HashSet::new();
            sections.retain(|s| seen.insert(s.id()));
        }
        Ok(sections)
    }

    /// References matching `options` across the files in `scope`.
    ///
    /// # Errors
    ///
    /// [`Error::PositionRequiresFile`] if a position filter is combined with
    /// [`Scope::AllFiles`].
    pub fn query_references(
        &self,
        scope: Scope<'_>,
        options: &ReferenceQueryOptions,
    ) -> Result<Vec<&Reference>> {
        if options.position.is_some() && scope == Scope::AllFiles {
            return Err(Error::PositionRequiresFile);
        }
        Ok(self
            .indices(scope)
            .into_iter()
            .flat_map(|file| file.query_references(options))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, code: &str) -> Rc<FileIndex> {
        let uri = Uri::parse(&format!("file://{path}")).unwrap();
        let (index, _) = FileIndex::from_string(uri, code);
        Rc::new(index.expect("document should index"))
    }

    fn origin<'a>(aggregate: &'a SectionAggregate<AnyFile>, id: &str) -> Option<&'a str> {
        aggregate.section(id).map(|s| s.location().uri.as_str())
    }

    #[test]
    fn replacing_a_file_withdraws_stale_sections() {
        let mut aggregate = SectionAggregate::new(AnyFile);
        aggregate.insert(file("/ws/a.tf", "variable \"old\" {}\n"));
        aggregate.insert(file("/ws/b.tf", "variable \"b\" {}\n"));
        aggregate.insert(file("/ws/a.tf", "variable \"new\" {}\n"));

        assert!(aggregate.section("var.old").is_none());
        assert!(aggregate.section("var.new").is_some());

        let order: Vec<&str> = aggregate
            .indices(Scope::AllFiles)
            .iter()
            .map(|f| f.uri().as_str())
            .collect();
        assert_eq!(order, vec!["file:///ws/a.tf", "file:///ws/b.tf"]);
    }

    #[test]
    fn removing_an_overwritten_file_keeps_the_winner() {
        let mut aggregate = SectionAggregate::new(AnyFile);
        aggregate.insert(file("/ws/a.tf", "provider \"aws\" {}\n"));
        aggregate.insert(file("/ws/b.tf", "provider \"aws\" {}\n"));

        aggregate.remove(&Uri::parse("file:///ws/a.tf").unwrap());

        assert_eq!(origin(&aggregate, "provider.aws"), Some("file:///ws/b.tf"));
    }

    #[test]
    fn removing_the_winner_restores_the_latest_remaining() {
        let mut aggregate = SectionAggregate::new(AnyFile);
        aggregate.insert(file("/ws/a.tf", "provider \"aws\" {}\n"));
        aggregate.insert(file("/ws/b.tf", "provider \"aws\" {}\n"));
        aggregate.insert(file("/ws/c.tf", "provider \"aws\" {}\n"));

        aggregate.remove(&Uri::parse("file:///ws/c.tf").unwrap());
        assert_eq!(origin(&aggregate, "provider.aws"), Some("file:///ws/b.tf"));

        aggregate.remove(&Uri::parse("file:///ws/b.tf").unwrap());
        assert_eq!(origin(&aggregate, "provider.aws"), Some("file:///ws/a.tf"));
    }

    #[test]
    fn last_declaration_within_a_file_wins() {
        let mut aggregate = SectionAggregate::new(AnyFile);
        aggregate.insert(file(
            "/ws/a.tf",
            "variable \"v\" {\n  default = 1\n}\nvariable \"v\" {\n  default = 2\n}\n",
        ));

        let section = aggregate.section("var.v").unwrap();
        assert_eq!(section.location().range.start.line, 3);
    }

    #[test]
    fn directory_membership_is_not_recursive() {
        let scope = Directory(Uri::parse("file:///ws").unwrap());

        assert!(scope.admits(&file("/ws/main.tf", "")));
        assert!(!scope.admits(&file("/ws/modules/vpc/main.tf", "")));
        assert!(!scope.admits(&file("/other/main.tf", "")));
    }

    #[test]
    fn insert_rejects_files_outside_the_directory() {
        let mut aggregate = SectionAggregate::new(Directory(Uri::parse("file:///ws").unwrap()));

        assert!(aggregate.insert(file("/ws/main.tf", "variable \"a\" {}\n")));
        assert!(!aggregate.insert(file("/ws/modules/vpc/main.tf", "variable \"b\" {}\n")));

        assert_eq!(aggregate.len(), 1);
        assert!(aggregate.section("var.b").is_none());
    }

    #[test]
    fn cancelled_token_stops_the_scan() {
        let mut aggregate = SectionAggregate::new(AnyFile);
        aggregate.insert(file("/ws/a.tf", "variable \"a\" {}\n"));
        let token = CancellationToken::new();
        token.cancel();

        let result = aggregate.query_checked(Scope::AllFiles, &QueryOptions::new(), Some(&token));
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
