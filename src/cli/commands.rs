//! Command definitions for the study timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Study Timer CLI - countdown sessions from your terminal
#[derive(Parser, Debug)]
#[command(
    name = "studytimer",
    version,
    about = "Countdown timer for self-paced study sessions",
    long_about = "A single-screen countdown timer for self-paced study sessions.\n\
                  Configure a session length, run the countdown interactively,\n\
                  and accumulate lifetime statistics across sessions.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run an interactive study session
    Run(RunArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Session length in minutes (1-120)
    #[arg(
        short,
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub minutes: u32,

    /// Emit state snapshots as JSON lines instead of formatted text
    #[arg(long)]
    pub json: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            minutes: 25,
            json: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
