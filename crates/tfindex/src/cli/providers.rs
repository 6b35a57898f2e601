//! `tfindex providers` command implementation.

use std::path::Path;

use colored::Colorize;
use tfindex::DiagnosticCollection;

/// Run the providers command.
pub fn run(workspace: &Path) -> Result<(), tfindex::Error> {
    let (index, _) = super::open_workspace(workspace, DiagnosticCollection::new())?;
    let providers = index.get_provider_declarations();

    if providers.is_empty() {
        println!("No provider declarations");
        return Ok(());
    }

    println!("{}", "Providers".cyan().bold());
    println!();
    for provider in &providers {
        let mut line = provider.name.white().bold().to_string();
        if let Some(alias) = &provider.alias {
            line.push_str(&format!(" {} {alias}", "alias".dimmed()));
        }
        if let Some(version) = &provider.version {
            line.push_str(&format!(" {} {version}", "version".dimmed()));
        }
        println!("  {line}");
    }

    Ok(())
}
