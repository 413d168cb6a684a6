//! CLI interface for VibeBot
//!
//! This module provides the command-line interface using clap's derive API.
//! Without a subcommand the interactive chat starts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VibeBot, a Hinglish Gen-Z chatbot
///
/// Every message goes through a five-stage pipeline: input, translation,
/// search decision, optional web search and the persona's reply.
#[derive(Parser, Debug)]
#[command(name = "vibebot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The subcommand to run; `chat` when none was given
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Chat { verbose: false })
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start an interactive chat (default)
    Chat {
        /// Print stage progress while a message is processed
        #[arg(short, long)]
        verbose: bool,
    },

    /// Send one message and print the reply
    Ask {
        /// The message to send
        message: String,

        /// Write the conversation log as JSON to this path
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Show the pipeline stages
    Stages,
}
