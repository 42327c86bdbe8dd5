//! Models command - inspect the severity-model artifacts.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use damage_assess_adapters::{artifact_status, artifacts_dir, ArtifactStatus};

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    /// Artifact directory to inspect (defaults to the data directory)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Models subcommands
#[derive(Subcommand)]
pub enum ModelsCommand {
    /// Show the artifact layout and file fingerprints
    List,
    /// Print the artifact directory path
    Path,
}

/// Run the models command.
#[allow(clippy::unnecessary_wraps)]
pub fn run(args: &ModelsArgs) -> Result<()> {
    let dir = args.models_dir.clone().unwrap_or_else(artifacts_dir);
    match args.command {
        ModelsCommand::List => {
            print!("{}", render_list(&artifact_status(&dir)));
            Ok(())
        }
        ModelsCommand::Path => {
            println!("{}", dir.display());
            Ok(())
        }
    }
}

fn render_list(status: &ArtifactStatus) -> String {
    let mut out = format!("Artifacts directory: {}\n\n", status.dir.display());

    match status.layout {
        Some(layout) => out.push_str(&format!("Layout: {layout}\n")),
        None => out.push_str("Layout: none (no voting_model.json or model.json)\n"),
    }
    out.push('\n');

    for file in &status.files {
        match &file.sha256 {
            Some(sha) => out.push_str(&format!("  ✓ {} sha256:{sha}\n", file.file)),
            None => out.push_str(&format!("  ✗ {}\n", file.file)),
        }
    }

    out.push('\n');
    if status.is_complete() {
        out.push_str("Severity model ready\n");
    } else {
        out.push_str("Severity model incomplete; assessments will be degraded\n");
    }
    out
}
