//! tfindex CLI - Terraform symbol index from the command line.
//!
//! Loads every `.tf` file of a workspace into an in-memory index and answers
//! queries about declarations, references and diagnostics.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// tfindex: Live symbol index for Terraform configurations.
#[derive(Parser)]
#[command(name = "tfindex")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Workspace root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the workspace and summarize the result
    Index,

    /// List declared sections
    Sections {
        /// Filter by section type (resource, data, variable, local, output, module, provider)
        #[arg(short = 't', long = "type")]
        section_type: Option<String>,

        /// Filter by name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List the references in a file and what they resolve to
    References {
        /// File path, relative to the workspace or absolute
        file: PathBuf,
    },

    /// Show the hover text at a position
    Hover {
        /// File path, relative to the workspace or absolute
        file: PathBuf,

        /// Line number (1-based)
        line: u32,

        /// Column number (1-based)
        column: u32,
    },

    /// List provider declarations
    Providers,

    /// List module directories and their declarations
    Modules,

    /// Print diagnostics as LSP `publishDiagnostics` JSON
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Determine workspace root
    let workspace = match cli.workspace {
        Some(w) => w,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };

    // Run the appropriate command
    let result = match cli.command {
        Commands::Index => cli::index::run(&workspace),
        Commands::Sections { section_type, name } => {
            cli::sections::run(&workspace, section_type.as_deref(), name.as_deref())
        }
        Commands::References { file } => cli::references::run(&workspace, &file),
        Commands::Hover { file, line, column } => cli::hover::run(&workspace, &file, line, column),
        Commands::Providers => cli::providers::run(&workspace),
        Commands::Modules => cli::modules::run(&workspace),
        Commands::Check => cli::check::run(&workspace),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
