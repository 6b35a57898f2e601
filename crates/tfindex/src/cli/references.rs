//! `tfindex references` command implementation.

use std::path::Path;

use colored::Colorize;
use tfindex::{DiagnosticCollection, ReferenceQueryOptions, Scope};

use super::display::format_location;

/// Run the references command.
pub fn run(workspace: &Path, file: &Path) -> Result<(), tfindex::Error> {
    let (index, _) = super::open_workspace(workspace, DiagnosticCollection::new())?;
    let uri = super::document_uri(workspace, file)?;

    if index.get(&uri).is_none() {
        println!("{} is not indexed", file.display());
        return Ok(());
    }

    let references = index.query_references(Scope::File(&uri), &ReferenceQueryOptions::new())?;
    if references.is_empty() {
        println!("No references in {}", file.display());
        return Ok(());
    }

    println!(
        "{} references in {}:",
        references.len().to_string().green().bold(),
        file.display().to_string().cyan()
    );
    println!();

    let mut unknown = 0;
    for reference in &references {
        let target = match index.resolve(reference) {
            Some(section) => format!("{} {}", "→".green(), format_location(&index, section.location())),
            None => {
                unknown += 1;
                format!("{} unknown target", "✗".red())
            }
        };
        println!(
            "  {}:{} {} {target}",
            reference.location().range.start.line + 1,
            reference.location().range.start.character + 1,
            reference.target_id().white().bold(),
        );
    }

    if unknown > 0 {
        println!();
        println!("{}: {unknown} unresolved", "Warning".yellow().bold());
    }

    Ok(())
}
