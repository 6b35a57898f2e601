//! CLI command implementations.

mod display;

pub mod check;
pub mod hover;
pub mod index;
pub mod modules;
pub mod providers;
pub mod references;
pub mod sections;

use std::path::{Path, PathBuf};

use tfindex::{Config, DiagnosticSink, Index, LoadStats, Uri, WorkspaceFolder, load_workspace};

/// Load the workspace at `workspace` into a fresh index.
pub fn open_workspace<S: DiagnosticSink>(
    workspace: &Path,
    sink: S,
) -> Result<(Index<S>, LoadStats), tfindex::Error> {
    let root = std::fs::canonicalize(workspace)?;
    let config = Config::load(&root)?;

    let name = root
        .file_name()
        .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());
    let folder = WorkspaceFolder::new(name, Uri::from_file_path(&root)?);

    let mut index = Index::with_sink(Some(folder), sink);
    let stats = load_workspace(&mut index, &root, &config)?;
    Ok((index, stats))
}

/// Resolve a file argument against the workspace and build its URI.
pub fn document_uri(workspace: &Path, file: &Path) -> Result<Uri, tfindex::Error> {
    let path: PathBuf = if file.is_absolute() {
        file.to_path_buf()
    } else {
        workspace.join(file)
    };
    Uri::from_file_path(&std::fs::canonicalize(path)?)
}
