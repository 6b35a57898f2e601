//! Common display utilities for CLI commands.

use colored::Colorize;
use tfindex::{Index, Location, Uri};

const MAX_DISPLAY_ITEMS: usize = 10;

/// `path:line:column` with the path relative to the workspace and 1-based
/// line and column.
pub fn format_location<S: tfindex::DiagnosticSink>(index: &Index<S>, location: &Location) -> String {
    format!(
        "{}:{}:{}",
        relative(index, &location.uri),
        location.range.start.line + 1,
        location.range.start.character + 1
    )
}

/// The document path relative to the workspace folder, when inside it.
pub fn relative<S: tfindex::DiagnosticSink>(index: &Index<S>, uri: &Uri) -> String {
    index.relative_path(uri)
}

/// Print up to `MAX_DISPLAY_ITEMS` lines, then "... and N more".
pub fn print_truncated(lines: &[String], empty_message: &str) {
    if lines.is_empty() {
        println!("    {}", empty_message.dimmed());
        return;
    }

    for line in lines.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {line}", "•".dimmed());
    }

    if lines.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            lines.len() - MAX_DISPLAY_ITEMS
        );
    }
}
