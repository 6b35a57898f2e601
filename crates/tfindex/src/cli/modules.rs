//! `tfindex modules` command implementation.

use std::path::Path;

use colored::Colorize;
use tfindex::{DiagnosticCollection, QueryOptions, Scope, SectionType};

use super::display::{print_truncated, relative};

/// Run the modules command.
pub fn run(workspace: &Path) -> Result<(), tfindex::Error> {
    let (index, _) = super::open_workspace(workspace, DiagnosticCollection::new())?;
    let groups = index.groups();

    if groups.is_empty() {
        println!("No Terraform files found");
        return Ok(());
    }

    println!("{} ({}):", "Modules".cyan().bold(), groups.len());
    for group in &groups {
        let mut dir = relative(&index, group.uri());
        if dir.is_empty() {
            dir.push('.');
        }
        println!();
        println!(
            "  {} {} files, {} sections",
            dir.white().bold(),
            group.len(),
            group.section_count().to_string().green()
        );

        let calls: Vec<String> = group
            .query(
                Scope::AllFiles,
                &QueryOptions::new().section_type(SectionType::Module),
            )?
            .iter()
            .map(|module| match module.string_property("source") {
                Some(source) => format!("{} {} {source}", module.name(), "←".dimmed()),
                None => module.name().to_string(),
            })
            .collect();
        print_truncated(&calls, "no module calls");
    }

    Ok(())
}
