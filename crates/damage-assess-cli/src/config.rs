//! Configuration file support for damage-assess.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/damage-assess/config.toml` (lowest priority)
//! - Project-local: `.damage-assess.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use damage_assess_adapters::CompletionConfig;
use damage_assess_core::{CostConfig, StrategyKind};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = ".damage-assess.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Severity-model settings.
    pub models: ModelsConfig,
    /// Vision analysis settings.
    pub vision: VisionSection,
    /// Cost estimation settings.
    pub cost: CostSection,
    /// Completion endpoint settings.
    pub completion: CompletionSection,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom severity artifact directory.
    pub dir: Option<PathBuf>,
}

/// Vision analysis configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct VisionSection {
    /// Enable/disable vision analysis.
    pub enabled: Option<bool>,
}

/// Cost estimation configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CostSection {
    /// "auto" or "rule-based".
    pub strategy: Option<StrategyKind>,
    /// GST rate (0.0-1.0).
    pub tax_rate: Option<f64>,
    /// Overhead rate (0.0-1.0).
    pub overhead_rate: Option<f64>,
    /// Accepted gap between an AI total and its breakdown.
    pub reconcile_tolerance: Option<f64>,
}

/// Completion endpoint configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSection {
    /// Chat-completions URL.
    pub endpoint: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Response token limit.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/damage-assess/config.toml`
    /// 2. Project-local: `.damage-assess.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("cost.tax_rate", self.cost.tax_rate),
            ("cost.overhead_rate", self.cost.overhead_rate),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(format!("{name} must be 0.0-1.0, got {v}"));
                }
            }
        }
        if let Some(t) = self.cost.reconcile_tolerance {
            if t < 0.0 {
                return Err(format!("cost.reconcile_tolerance must be >= 0, got {t}"));
            }
        }
        if let Some(t) = self.completion.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("completion.temperature must be 0.0-2.0, got {t}"));
            }
        }
        if self.completion.timeout_secs == Some(0) {
            return Err("completion.timeout_secs must be > 0".to_string());
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());

        self.vision.enabled = other.vision.enabled.or(self.vision.enabled);

        self.cost.strategy = other.cost.strategy.or(self.cost.strategy);
        self.cost.tax_rate = other.cost.tax_rate.or(self.cost.tax_rate);
        self.cost.overhead_rate = other.cost.overhead_rate.or(self.cost.overhead_rate);
        self.cost.reconcile_tolerance = other
            .cost
            .reconcile_tolerance
            .or(self.cost.reconcile_tolerance);

        let completion = &mut self.completion;
        completion.endpoint = other
            .completion
            .endpoint
            .or_else(|| completion.endpoint.take());
        completion.model = other.completion.model.or_else(|| completion.model.take());
        completion.api_key_env = other
            .completion
            .api_key_env
            .or_else(|| completion.api_key_env.take());
        completion.timeout_secs = other.completion.timeout_secs.or(completion.timeout_secs);
        completion.max_tokens = other.completion.max_tokens.or(completion.max_tokens);
        completion.temperature = other.completion.temperature.or(completion.temperature);

        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }

    /// Cost settings over hardcoded defaults. Out-of-range rates fall back
    /// to the defaults.
    #[must_use]
    pub fn cost_config(&self) -> CostConfig {
        let defaults = CostConfig::default();
        let rate = |v: Option<f64>, d: f64| v.filter(|r| (0.0..=1.0).contains(r)).unwrap_or(d);
        CostConfig {
            strategy: self.cost.strategy.unwrap_or(defaults.strategy),
            tax_rate: rate(self.cost.tax_rate, defaults.tax_rate),
            overhead_rate: rate(self.cost.overhead_rate, defaults.overhead_rate),
            reconcile_tolerance: self
                .cost
                .reconcile_tolerance
                .filter(|t| *t >= 0.0)
                .unwrap_or(defaults.reconcile_tolerance),
        }
    }

    /// Completion settings over hardcoded defaults.
    #[must_use]
    pub fn completion_config(&self) -> CompletionConfig {
        let defaults = CompletionConfig::default();
        let c = &self.completion;
        CompletionConfig {
            endpoint: c.endpoint.clone().unwrap_or(defaults.endpoint),
            model: c.model.clone().unwrap_or(defaults.model),
            api_key_env: c.api_key_env.clone().unwrap_or(defaults.api_key_env),
            timeout_secs: c
                .timeout_secs
                .filter(|t| *t > 0)
                .unwrap_or(defaults.timeout_secs),
            max_tokens: c.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: c.temperature.unwrap_or(defaults.temperature),
        }
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("damage-assess").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.damage-assess.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
