//! Indexing options and the workspace configuration file.
//!
//! A workspace may carry a `.tfindex.yaml` at its root:
//!
//! ```yaml
//! exclude:
//!   - "*.bak.tf"
//!   - "vendor/**"
//! extensions: [tf]
//! ```

use std::path::Path;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Name of the configuration file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".tfindex.yaml";

/// Options for [`Index::index_document`](crate::Index::index_document).
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    patterns: Vec<String>,
    exclude: Option<GlobSet>,
}

impl IndexOptions {
    /// Options that index every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip documents whose workspace-relative path matches any of `patterns`.
    ///
    /// `*` does not match across `/`; use `**` for that. Documents outside
    /// the workspace folder, and every document of an index without one,
    /// are matched by their absolute path: `*.bak.tf` misses `/ws/x.bak.tf`
    /// while `**/*.bak.tf` matches it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGlob`] for the first pattern that does not compile.
    pub fn with_exclude<I, P>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(compile(pattern)?);
        }
        let set = builder.build().map_err(|source| Error::InvalidGlob {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self {
            patterns,
            exclude: Some(set),
        })
    }

    /// The exclude patterns as given.
    #[must_use]
    pub fn exclude_patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a workspace-relative path is excluded.
    #[must_use]
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|set| set.is_match(relative_path))
    }
}

fn compile(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| Error::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })
}

/// Workspace configuration read from [`CONFIG_FILE_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Glob patterns of workspace-relative paths to skip
    pub exclude: Vec<String>,
    /// File extensions (without the dot) that are indexed
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            extensions: vec!["tf".to_string()],
        }
    }
}

impl Config {
    /// Load the configuration of the workspace at `root`.
    ///
    /// Returns the defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file exists but cannot be read, [`Error::Config`]
    /// if it is not valid YAML for this structure.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Self::from_yaml(&text)
    }

    /// Parse configuration text.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the text is not a valid configuration.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Compile the exclude patterns.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGlob`] for an invalid pattern.
    pub fn index_options(&self) -> Result<IndexOptions> {
        IndexOptions::with_exclude(self.exclude.iter().cloned())
    }

    /// Whether `path` has one of the configured extensions.
    #[must_use]
    pub fn has_indexed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}
