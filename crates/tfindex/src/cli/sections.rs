//! `tfindex sections` command implementation.

use std::path::Path;

use colored::Colorize;
use tfindex::{DiagnosticCollection, QueryOptions, Scope, SectionType};

use super::display::format_location;

/// Run the sections command.
pub fn run(
    workspace: &Path,
    type_filter: Option<&str>,
    name_filter: Option<&str>,
) -> Result<(), tfindex::Error> {
    let mut options = QueryOptions::new();
    if let Some(type_str) = type_filter {
        let section_type: SectionType = type_str.parse().map_err(tfindex::Error::Config)?;
        options = options.section_type(section_type);
    }
    if let Some(name) = name_filter {
        options = options.name(name);
    }

    let (index, _) = super::open_workspace(workspace, DiagnosticCollection::new())?;
    let sections = index.query(Scope::AllFiles, &options)?;

    if sections.is_empty() {
        println!("No sections found");
        if index.indices(Scope::AllFiles).is_empty() {
            println!(
                "\n{}: No Terraform files were found under {}.",
                "hint".dimmed(),
                workspace.display()
            );
        }
        return Ok(());
    }

    println!("Found {} sections:", sections.len().to_string().green().bold());
    println!();

    for section in &sections {
        println!(
            "  {} {}",
            section.id().white().bold(),
            format_location(&index, section.location()).dimmed()
        );
    }

    Ok(())
}
