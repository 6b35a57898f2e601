//! Directory-scoped aggregation.
//!
//! Terraform treats every `.tf` file directly inside one directory as part of
//! the same module, so declarations in any of them are visible to all of
//! them. An [`IndexGroup`] models that visibility.

use std::rc::Rc;

use tracing::debug;

use crate::aggregate::{Directory, SectionAggregate};
use crate::error::{Error, Result};
use crate::file_index::FileIndex;
use crate::reference::Reference;
use crate::section::Section;
use crate::types::{QueryOptions, ReferenceQueryOptions, Scope};
use crate::uri::Uri;

/// The file indices of one directory and the sections they declare.
#[derive(Debug)]
pub struct IndexGroup {
    aggregate: SectionAggregate<Directory>,
}

impl IndexGroup {
    /// Create a group for the directory of `file`, with `file` as its first
    /// member.
    #[must_use]
    pub fn create_from_file_index(file: impl Into<Rc<FileIndex>>) -> Self {
        let file = file.into();
        let mut aggregate = SectionAggregate::new(Directory(file.uri().dirname()));
        aggregate.insert(file);
        Self { aggregate }
    }

    /// The directory this group covers.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.aggregate.scope().0
    }

    /// Whether `file` lives directly inside this group's directory.
    #[must_use]
    pub fn belongs(&self, file: &FileIndex) -> bool {
        self.aggregate.admits(file)
    }

    /// Register `file`, replacing any earlier index for the same document.
    ///
    /// # Errors
    ///
    /// [`Error::NotInGroup`] if the file is not in this group's directory.
    pub fn add(&mut self, file: impl Into<Rc<FileIndex>>) -> Result<()> {
        let file = file.into();
        let uri = file.uri().clone();
        if !self.aggregate.insert(file) {
            return Err(Error::NotInGroup {
                group: self.uri().to_string(),
                file: uri.to_string(),
            });
        }
        debug!(group = %self.uri(), uri = %uri, "Added file to group");
        Ok(())
    }

    /// Unregister the document at `uri`. Does nothing if it is not a member.
    pub fn delete(&mut self, uri: &Uri) {
        if self.aggregate.remove(uri).is_some() {
            debug!(group = %self.uri(), uri = %uri, "Removed file from group");
        }
    }

    /// Drop every member.
    pub fn clear(&mut self) {
        self.aggregate.clear();
    }

    /// The member index for `uri`.
    #[must_use]
    pub fn get(&self, uri: &Uri) -> Option<&Rc<FileIndex>> {
        self.aggregate.get(uri)
    }

    /// Member indices in scope, in registration order.
    #[must_use]
    pub fn indices(&self, scope: Scope<'_>) -> Vec<&Rc<FileIndex>> {
        self.aggregate.indices(scope)
    }

    /// Number of member files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aggregate.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aggregate.is_empty()
    }

    /// The section registered under identity key `id`.
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.aggregate.section(id)
    }

    /// Number of distinct identity keys in the group.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.aggregate.section_ids().count()
    }

    /// Sections matching `options`. Results follow file registration order.
    ///
    /// # Errors
    ///
    /// [`Error::PositionRequiresFile`] for a position filter over all files.
    pub fn query(&self, scope: Scope<'_>, options: &QueryOptions) -> Result<Vec<&Section>> {
        self.aggregate.query(scope, options)
    }

    /// References matching `options`.
    ///
    /// # Errors
    ///
    /// [`Error::PositionRequiresFile`] for a position filter over all files.
    pub fn query_references(
        &self,
        scope: Scope<'_>,
        options: &ReferenceQueryOptions,
    ) -> Result<Vec<&Reference>> {
        self.aggregate.query_references(scope, options)
    }
}
