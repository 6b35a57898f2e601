//! `tfindex hover` command implementation.

use std::path::Path;

use colored::Colorize;
use tfindex::{DiagnosticCollection, Position};

/// Run the hover command. `line` and `column` are 1-based.
pub fn run(workspace: &Path, file: &Path, line: u32, column: u32) -> Result<(), tfindex::Error> {
    if line == 0 || column == 0 {
        return Err(tfindex::Error::Config(
            "line and column are 1-based".to_string(),
        ));
    }

    let (index, _) = super::open_workspace(workspace, DiagnosticCollection::new())?;
    let uri = super::document_uri(workspace, file)?;
    let position = Position::new(line - 1, column - 1);

    match tfindex::hover(&index, &uri, position)? {
        Some(hover) => println!("{}", hover.contents),
        None => println!("{}", "No hover information".dimmed()),
    }

    Ok(())
}
