//! Loading a workspace folder from disk.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::error::{LoadError, LoadErrorKind, Result};
use crate::index::{Index, Outcome};
use crate::types::Document;
use crate::uri::Uri;

/// Statistics from loading a workspace.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Files parsed and registered
    pub files_indexed: usize,
    /// Files matched by an exclude pattern
    pub files_excluded: usize,
    /// Files read but not parseable into an index
    pub files_failed: usize,
    /// Sections across registered files
    pub sections_found: usize,
    /// References across registered files
    pub references_found: usize,
    /// Diagnostics published
    pub diagnostics: usize,
    /// How long loading took
    pub duration: Duration,
    /// Directories that could not be read (path, error reason)
    pub directories_skipped: Vec<(PathBuf, String)>,
    /// Files that could not be read (non-fatal)
    pub errors: Vec<LoadError>,
}

/// Index every configured file under `root`.
///
/// Hidden directories and `.terraform` module caches are skipped. Files are
/// indexed in path order, so registration order (and with it the tie-break
/// between duplicate declarations) is stable across runs.
///
/// # Errors
///
/// [`Error::InvalidGlob`](crate::Error::InvalidGlob) if an exclude pattern
/// does not compile. Unreadable files and directories are collected in the
/// returned stats instead.
pub fn load_workspace<S: DiagnosticSink>(
    index: &mut Index<S>,
    root: &Path,
    config: &Config,
) -> Result<LoadStats> {
    let start = Instant::now();
    let options = config.index_options()?;
    let mut stats = LoadStats::default();

    let mut files = Vec::new();
    walk_dir(root, config, &mut files, &mut stats.directories_skipped);
    files.sort();
    debug!(root = %root.display(), files = files.len(), "Discovered workspace files");

    for path in files {
        let uri = match Uri::from_file_path(&path) {
            Ok(uri) => uri,
            Err(e) => {
                stats
                    .errors
                    .push(LoadError::new(path, LoadErrorKind::InvalidPath, e.to_string()));
                continue;
            }
        };
        let text = match std::fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    warn!(file = %path.display(), "File is not valid UTF-8, skipping");
                    stats.errors.push(LoadError::encoding_error(path));
                    continue;
                }
            },
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Cannot read file, skipping");
                stats.errors.push(LoadError::io_error(path, &e));
                continue;
            }
        };

        match index.index_document_with_outcome(&Document::new(uri, text), &options) {
            Outcome::Excluded => stats.files_excluded += 1,
            Outcome::Indexed {
                file: Some(file),
                diagnostics,
            } => {
                stats.files_indexed += 1;
                stats.sections_found += file.sections().len();
                stats.references_found += file.references().len();
                stats.diagnostics += diagnostics;
            }
            Outcome::Indexed {
                file: None,
                diagnostics,
            } => {
                stats.files_failed += 1;
                stats.diagnostics += diagnostics;
            }
        }
    }

    stats.duration = start.elapsed();
    info!(
        workspace = index.name(),
        files = stats.files_indexed,
        excluded = stats.files_excluded,
        sections = stats.sections_found,
        references = stats.references_found,
        errors = stats.errors.len(),
        "Workspace loaded"
    );
    Ok(stats)
}

fn walk_dir(
    dir: &Path,
    config: &Config,
    files: &mut Vec<PathBuf>,
    directories_skipped: &mut Vec<(PathBuf, String)>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(
                directory = %dir.display(),
                error = %e,
                "Cannot read directory, skipping"
            );
            directories_skipped.push((dir.to_path_buf(), e.to_string()));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    directory = %dir.display(),
                    error = %e,
                    "Failed to read directory entry, skipping"
                );
                continue;
            }
        };

        let path = entry.path();

        // Hidden directories include the `.terraform` module cache
        if path.is_dir() {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with('.'));
            if !hidden {
                walk_dir(&path, config, files, directories_skipped);
            }
        } else if path.is_file() && config.has_indexed_extension(&path) {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walk_skips_hidden_directories_and_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".terraform/modules/vpc")).unwrap();
        fs::create_dir_all(dir.path().join("modules/vpc")).unwrap();
        fs::write(dir.path().join("main.tf"), "").unwrap();
        fs::write(dir.path().join("terraform.tfvars"), "").unwrap();
        fs::write(dir.path().join("modules/vpc/main.tf"), "").unwrap();
        fs::write(dir.path().join(".terraform/modules/vpc/main.tf"), "").unwrap();

        let mut files = Vec::new();
        let mut skipped = Vec::new();
        walk_dir(dir.path(), &Config::default(), &mut files, &mut skipped);
        files.sort();

        assert_eq!(
            files,
            vec![dir.path().join("main.tf"), dir.path().join("modules/vpc/main.tf")]
        );
        assert!(skipped.is_empty());
    }
}
