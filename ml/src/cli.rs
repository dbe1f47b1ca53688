//! CLI argument parsing for maplineage

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ml")]
#[command(author, version, about = "Field-level lineage from mapping XML exports", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Trace lineage through the mapping's connectors and write one sheet
    Connectors {
        /// Mapping XML export
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Output workbook (.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop connectors that reference unknown instances instead of failing
        #[arg(long)]
        skip_unresolved: bool,
    },

    /// Infer lineage by matching target fields to transformation outputs and sources
    #[command(
        after_help = "Inference is best-effort: a target field is attributed to the first \
                      transformation OUTPUT port and the first source with the same field name."
    )]
    Infer {
        /// Mapping XML export
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Repository metadata XML export
        #[arg(short, long)]
        repo_metadata: Option<PathBuf>,

        /// Workflow session log
        #[arg(short, long)]
        session_log: Option<PathBuf>,

        /// Output workbook (.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print lineage for a mapping without writing a workbook
    Show {
        /// Mapping XML export
        #[arg(required = true)]
        mapping: PathBuf,

        /// Show inferred lineage instead of connector edges
        #[arg(short, long)]
        inferred: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration
    Config {
        /// Write it to this file instead of printing it
        #[arg(short, long)]
        write: Option<PathBuf>,
    },
}

/// Output format for `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
