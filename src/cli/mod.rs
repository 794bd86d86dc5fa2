//! CLI module for garden-designer - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
