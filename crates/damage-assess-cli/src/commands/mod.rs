//! CLI command definitions and handlers.

pub mod assess;
pub mod models;

use clap::{Parser, Subcommand};

/// Damage Assess - Vehicle damage assessment and repair-cost estimation
#[derive(Parser)]
#[command(name = "damage-assess")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared assess arguments (paths, location, flags).
    #[command(flatten)]
    pub assess: assess::AssessArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Assess one incident's photos and estimate the repair cost
    Assess(assess::AssessArgs),
    /// Inspect the severity-model artifacts
    Models(models::ModelsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Both the severity model and vision analysis contributed.
    Success = 0,
    /// The assessment fell back somewhere.
    Degraded = 1,
    /// Nothing could be assessed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
