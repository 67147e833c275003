//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Stepflow - run ordered workflows of steps.
#[derive(Debug, Parser)]
#[command(name = "stepflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "STEPFLOW_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a workflow file
    Run(RunArgs),

    /// List the steps of a workflow file
    List(ListArgs),

    /// Check a workflow file for problems
    Validate(ValidateArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Workflow file
    pub file: PathBuf,

    /// Base directory for run directories (overrides the file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Keep running after a failed step
    #[arg(long)]
    pub continue_on_error: bool,

    /// Do not create a directory per step
    #[arg(long)]
    pub no_step_dirs: bool,

    /// Steps to disable for this run
    #[arg(long, value_delimiter = ',', value_name = "ID")]
    pub disable: Vec<String>,

    /// Print a JSON report instead of log lines
    #[arg(long)]
    pub json: bool,

    /// Only print the summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Workflow file
    pub file: PathBuf,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ValidateArgs {
    /// Workflow file
    pub file: PathBuf,
}
