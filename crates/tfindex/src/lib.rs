//! # tfindex: Live Symbol Index for Terraform Configurations
//!
//! tfindex parses Terraform documents with tree-sitter, keeps the declared
//! sections (resources, data sources, variables, locals, outputs, modules,
//! providers) of a whole workspace in memory and resolves references such as
//! `var.region` or `module.vpc.subnet_ids` to their declarations. It backs
//! editor features: hover, go-to-definition and diagnostics.
//!
//! ## Design Philosophy
//!
//! - **Rebuilt from text** - Nothing is persisted; every index is derived from source
//! - **Error tolerant** - Broken documents still index their valid blocks
//! - **Synchronous** - Every mutation and query completes within the call
//! - **Two scopes** - Workspace-wide [`Index`], directory-wide [`IndexGroup`]
//!
//! ## Quick Start
//!
//! ```
//! use tfindex::{Document, Index, IndexOptions, ReferenceQueryOptions, Scope, Uri};
//!
//! let mut index = Index::new();
//! let options = IndexOptions::with_exclude(["**/*.bak.tf"])?;
//!
//! let vars = Uri::parse("file:///infra/variables.tf")?;
//! let main = Uri::parse("file:///infra/main.tf")?;
//! index.index_document(&Document::new(vars, "variable \"region\" {}\n"), &options);
//! index.index_document(
//!     &Document::new(main.clone(), "provider \"aws\" {\n  region = var.region\n}\n"),
//!     &options,
//! );
//!
//! let references = index.query_references(Scope::File(&main), &ReferenceQueryOptions::new())?;
//! let target = index.resolve(references[0]).expect("declared in variables.tf");
//! assert_eq!(target.location().uri.as_str(), "file:///infra/variables.tf");
//! # Ok::<(), tfindex::Error>(())
//! ```

mod aggregate;
mod config;
mod diagnostics;
mod error;
mod events;
mod file_index;
mod group;
mod hcl;
mod hover;
mod index;
mod node;
mod reference;
mod section;
mod types;
mod uri;
mod workspace;

pub use config::{CONFIG_FILE_NAME, Config, IndexOptions};
pub use diagnostics::{
    Diagnostic, DiagnosticCollection, DiagnosticSink, LspDiagnosticPublisher, Severity,
};
pub use error::{Error, LoadError, LoadErrorKind, Result};
pub use events::{CancellationToken, ChangeEmitter, Subscription};
pub use file_index::FileIndex;
pub use group::IndexGroup;
pub use hover::{Hover, hover, render_value};
pub use index::{Index, WorkspaceFolder};
pub use node::{Attribute, Block, Body, Value};
pub use reference::{PathSegment, Reference};
pub use section::Section;
pub use types::{
    Document, Location, Position, ProviderInfo, QueryOptions, Range, ReferenceQueryOptions,
    Scope, SectionType,
};
pub use uri::Uri;
pub use workspace::{LoadStats, load_workspace};
