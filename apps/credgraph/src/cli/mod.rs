//! # credgraph CLI
//!
//! Offline operations on project data and artifacts.
//!
//! ## Available Commands
//!
//! - `project` - Validate a project file and set up its directory
//! - `merge` - Merge graph artifacts into one
//! - `filter` - Filter a timeline cred artifact by node prefixes
//! - `clear` - Remove cached data or project directories
//! - `address` - Show the encodings of an address
//!
//! Loading from live sources goes through [`credgraph::load::load`], which
//! needs source implementations supplied by the embedding program.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use credgraph::config::default_directory;
use credgraph::error::LoadError;
use credgraph::project::ProjectDirectory;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// credgraph - contribution graphs and timeline cred
#[derive(Parser, Debug)]
#[command(name = "credgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Root data directory (default: $CREDGRAPH_DIRECTORY or <tmp>/credgraph)
    #[arg(short = 'D', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a project file and create its project directory
    Project {
        /// Path to the project TOML file
        #[arg(short, long, default_value = "credgraph.toml")]
        config: PathBuf,
    },

    /// Merge graph artifacts (format chosen by extension: .bin or JSON)
    Merge {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Input graph files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Filter a timeline cred artifact down to nodes under the given prefixes
    Filter {
        /// Timeline cred file (.bin or JSON)
        #[arg(short, long)]
        cred: PathBuf,

        /// Node prefix as '/'-separated parts; repeatable. An empty value
        /// matches every node.
        #[arg(short, long)]
        prefix: Vec<String>,

        /// Take prefixes from this project file when no --prefix is given
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the top N nodes by total cred instead of the full result
        #[arg(long)]
        top: Option<usize>,
    },

    /// Remove data under the root directory
    Clear {
        /// What to remove
        #[arg(value_enum)]
        scope: ClearTarget,

        /// Project id (with `project`)
        #[arg(long)]
        id: Option<String>,
    },

    /// Show the encodings of an address
    Address {
        /// Address kind
        #[arg(short, long, value_enum, default_value = "node")]
        kind: AddressKindArg,

        /// Address parts
        parts: Vec<String>,
    },
}

/// `clear` targets.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    /// The whole root directory
    All,
    /// The shared source cache
    Cache,
    /// One project directory (requires --id)
    Project,
}

/// `address --kind` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKindArg {
    Node,
    Edge,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), LoadError> {
    let directory = ProjectDirectory::new(cli.directory.unwrap_or_else(default_directory));
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Project { config } => cmd_project(&directory, &config, json_mode).await,
        Commands::Merge { output, inputs } => cmd_merge(&inputs, &output, json_mode).await,
        Commands::Filter {
            cred,
            prefix,
            config,
            output,
            top,
        } => cmd_filter(&cred, &prefix, config.as_deref(), output.as_deref(), top).await,
        Commands::Clear { scope, id } => cmd_clear(&directory, scope, id).await,
        Commands::Address { kind, parts } => cmd_address(kind, &parts, json_mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_filter_arguments() {
        let cli = Cli::try_parse_from([
            "credgraph", "filter", "--cred", "cred.json", "-p", "sourcecred/github", "-p", "",
        ])
        .expect("parse");
        match cli.command {
            Commands::Filter { prefix, .. } => {
                assert_eq!(prefix, vec!["sourcecred/github".to_string(), String::new()]);
            }
            other => unreachable!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_clear_project() {
        let cli = Cli::try_parse_from([
            "credgraph", "-D", "/data", "clear", "project", "--id", "example",
        ])
        .expect("parse");
        assert_eq!(cli.directory, Some(PathBuf::from("/data")));
        assert!(matches!(
            cli.command,
            Commands::Clear { scope: ClearTarget::Project, id: Some(_) }
        ));
    }
}
