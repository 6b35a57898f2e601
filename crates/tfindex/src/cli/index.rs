//! `tfindex index` command implementation.

use std::path::Path;

use colored::Colorize;
use tfindex::{DiagnosticCollection, Severity};

use super::display::{print_truncated, relative};

/// Run the index command.
pub fn run(workspace: &Path) -> Result<(), tfindex::Error> {
    println!("{} {}...", "Indexing".cyan().bold(), workspace.display());

    let (index, stats) = super::open_workspace(workspace, DiagnosticCollection::new())?;

    println!();
    println!(
        "{} {} files, found {} sections, {} references",
        "Indexed".green().bold(),
        stats.files_indexed,
        stats.sections_found,
        stats.references_found
    );
    println!("{}: {:.2?}", "Duration".dimmed(), stats.duration);

    if stats.files_excluded > 0 {
        println!(
            "{}: {} files (exclude patterns)",
            "Skipped".yellow(),
            stats.files_excluded
        );
    }

    if !stats.directories_skipped.is_empty() {
        println!(
            "{}: {} directories (unreadable)",
            "Skipped".yellow(),
            stats.directories_skipped.len()
        );
    }

    let diagnostics = index.diagnostics();
    if diagnostics.total() > 0 {
        let lines: Vec<String> = diagnostics
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(uri, list)| {
                let errors = list.iter().filter(|d| d.severity == Severity::Error).count();
                format!(
                    "{}: {} errors, {} warnings",
                    relative(&index, uri),
                    errors,
                    list.len() - errors
                )
            })
            .collect();
        println!();
        println!("{} ({}):", "Diagnostics".yellow().bold(), diagnostics.total());
        print_truncated(&lines, "none");
    }

    if !stats.errors.is_empty() {
        println!();
        println!("{} ({}):", "Errors".red().bold(), stats.errors.len());
        for err in stats.errors.iter().take(5) {
            println!("  {} {}: {}", "•".red(), err.path.display(), err.message);
        }
        if stats.errors.len() > 5 {
            println!("  ... and {} more", stats.errors.len() - 5);
        }
    }

    Ok(())
}
