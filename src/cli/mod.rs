//! CLI module for HatchUp
//!
//! Provides command-line interface parsing for the hatchup binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HatchUp - VC research assistant
#[derive(Parser, Debug)]
#[command(
    name = "hatchup",
    author = "EchoLab <build@echolab.dev>",
    version,
    about = "HatchUp - VC research assistant",
    long_about = "Multi-source live research over MCP worker processes, plus LLM-backed\n\
                  pitch deck analysis and investment memo synthesis.",
    after_help = "EXAMPLES:\n    \
                  hatchup chat                      # Interactive research chat\n    \
                  hatchup research \"AI Agents\"      # One-shot research query\n    \
                  hatchup analyze deck.txt          # Deck -> data -> memo -> summary\n    \
                  hatchup workers                   # List configured retrieval workers"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "hatchup.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive research chat with live multi-source context
    Chat,

    /// Run one research query and print the sources and the answer
    Research {
        /// The research question
        query: String,

        /// Also print the raw compacted context block
        #[arg(long)]
        show_context: bool,
    },

    /// Analyze a pitch deck: extract data, write a memo and a summary
    Analyze {
        /// Path to a plain-text file with the deck contents
        file: PathBuf,
    },

    /// List the configured retrieval workers
    Workers,
}
