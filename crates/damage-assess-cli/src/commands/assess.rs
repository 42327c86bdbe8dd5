//! Assess command - assess one incident and estimate the repair cost.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use damage_assess_adapters::{artifacts_dir, load_classifier, FsImageSource, OpenAiCompletionService};
use damage_assess_core::{
    AssessmentPipeline, AssessmentReport, CompletionService, CostConfig, ImageSource,
    PipelineConfig, ResultOutput, StrategyKind, VisionConfig,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Shared arguments for incident assessment.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct AssessArgs {
    /// Photos or directories of photos for one incident
    pub paths: Vec<PathBuf>,

    /// City or region used for regional pricing
    #[arg(short, long, value_name = "CITY")]
    pub location: Option<String>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Severity-model artifact directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Skip vision analysis
    #[arg(long)]
    pub no_vision: bool,

    /// Price with the reference tables only
    #[arg(long)]
    pub rule_based: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl AssessArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// For boolean flags: CLI always wins. Config can enable/disable only
    /// when the CLI flag wasn't explicitly set.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if !args.no_vision {
            if let Some(enabled) = config.vision.enabled {
                args.no_vision = !enabled;
            }
        }

        if !args.rule_based {
            args.rule_based = config.cost.strategy == Some(StrategyKind::RuleBased);
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }

        args.config = Some(config.clone());

        args
    }

    /// Artifact directory with fallback to the default data directory.
    fn models_dir(&self) -> PathBuf {
        self.models_dir.clone().unwrap_or_else(artifacts_dir)
    }

    fn cost_config(&self) -> CostConfig {
        let base = self
            .config
            .as_ref()
            .map_or_else(CostConfig::default, AppConfig::cost_config);
        CostConfig {
            strategy: if self.rule_based {
                StrategyKind::RuleBased
            } else {
                base.strategy
            },
            ..base
        }
    }

    /// Completion service, only when something will call it.
    fn completion_service(&self) -> Option<Arc<dyn CompletionService>> {
        if self.no_vision && self.rule_based {
            debug!("Vision and AI pricing both disabled; skipping completion service");
            return None;
        }
        let config = self
            .config
            .as_ref()
            .map(AppConfig::completion_config)
            .unwrap_or_default();
        OpenAiCompletionService::from_env(&config)
            .map(|service| Arc::new(service) as Arc<dyn CompletionService>)
    }
}

/// Result of running the assess command.
pub struct AssessResult {
    /// The printed report.
    #[allow(dead_code)] // Exposed for programmatic use
    pub report: AssessmentReport,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the assess command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &AssessArgs) -> Result<AssessResult> {
    info!("Running assess command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let images = source.images();
    if images.is_empty() {
        anyhow::bail!("No supported images found in the given paths");
    }

    let models_dir = args.models_dir();
    debug!("Using severity artifacts from {}", models_dir.display());
    let classifier = load_classifier(&models_dir);

    let config = PipelineConfig {
        vision: VisionConfig {
            enabled: !args.no_vision,
        },
        cost: args.cost_config(),
        ..PipelineConfig::default()
    };
    let pipeline = AssessmentPipeline::new(classifier, args.completion_service(), config);

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    #[allow(clippy::cast_possible_truncation)]
    let progress = ProgressBar::new(images.len() as u64, args.quiet, show_progress);

    let mut report = pipeline.assess(&images, args.location.as_deref(), &progress);
    report.timestamp = Some(iso_timestamp());

    for degradation in &report.degradations {
        debug!("Degraded {:?}: {}", degradation.stage, degradation.reason);
    }

    let output = JsonOutput::stdout(args.pretty);
    output.write(&report)?;
    output.flush()?;

    let exit_code = if report.is_complete() {
        ExitCode::Success
    } else {
        ExitCode::Degraded
    };

    Ok(AssessResult { report, exit_code })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AssessArgs {
        AssessArgs {
            paths: vec![],
            location: None,
            recursive: false,
            models_dir: None,
            no_vision: false,
            rule_based: false,
            pretty: false,
            progress: false,
            quiet: true,
            config: None,
        }
    }

    fn config(toml: &str) -> AppConfig {
        toml::from_str(toml).unwrap_or_default()
    }

    #[test]
    fn test_config_fills_unset_flags() {
        let merged = AssessArgs::with_config(
            args(),
            &config(
                r#"
[general]
recursive = true

[vision]
enabled = false

[cost]
strategy = "rule-based"

[models]
dir = "/srv/severity"
"#,
            ),
        );
        assert!(merged.recursive);
        assert!(merged.no_vision);
        assert!(merged.rule_based);
        assert_eq!(merged.models_dir(), PathBuf::from("/srv/severity"));
        assert_eq!(merged.cost_config().strategy, StrategyKind::RuleBased);
    }

    #[test]
    fn test_cli_models_dir_wins() {
        let mut cli = args();
        cli.models_dir = Some(PathBuf::from("/cli/severity"));
        let merged = AssessArgs::with_config(cli, &config("[models]\ndir = \"/cfg\"\n"));
        assert_eq!(merged.models_dir(), PathBuf::from("/cli/severity"));
    }

    #[test]
    fn test_no_service_when_nothing_needs_it() {
        let mut cli = args();
        cli.no_vision = true;
        cli.rule_based = true;
        assert!(cli.completion_service().is_none());
    }

    #[test]
    fn test_default_models_dir() {
        assert!(args().models_dir().ends_with("damage-assess/severity"));
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
