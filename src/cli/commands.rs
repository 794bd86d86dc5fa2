//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - ask: one design turn
//! - chat: interactive session with memory
//! - tools: print the tool descriptors
//! - layout: run the local layout tool

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// garden-designer - design a garden by describing it
#[derive(Parser, Debug)]
#[command(name = "garden-designer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Model identifier, overrides the config file
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask for one garden design and stream the answer
    Ask {
        /// What kind of garden you want
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// Interactive session that remembers earlier turns (default)
    Chat,

    /// Print the tool descriptors sent to the LLM
    Tools,

    /// Lay out plants locally without calling the LLM
    Layout {
        /// Garden theme used in the title
        #[arg(short, long)]
        theme: String,

        /// Plants in planting order
        #[arg(required = true, num_args = 1..)]
        plants: Vec<String>,
    },
}
