//! `tfindex check` command implementation.

use std::path::Path;

use tfindex::LspDiagnosticPublisher;

/// Run the check command.
///
/// Prints one `textDocument/publishDiagnostics` parameter object per file,
/// as a JSON array on stdout.
pub fn run(workspace: &Path) -> Result<(), tfindex::Error> {
    let (mut index, stats) = super::open_workspace(workspace, LspDiagnosticPublisher::new())?;
    let notifications = index.diagnostics_mut().drain();

    println!("{}", serde_json::to_string_pretty(&notifications)?);
    tracing::info!(
        files = notifications.len(),
        diagnostics = stats.diagnostics,
        "Diagnostics published"
    );

    Ok(())
}
