//! Command-line interface for Stepflow.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ListArgs, RunArgs, ValidateArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
