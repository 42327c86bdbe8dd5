//! Repair-cost estimation.
//!
//! Two strategies price a unified assessment:
//! - AI-assisted: asks the completion service for a structured estimate
//! - Rule-based: deterministic reference tables
//!
//! The engine prefers the AI strategy when one is configured and falls back
//! to the rule-based strategy on any failure.

mod ai;
mod rule_based;
mod tables;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{CostEstimate, CostRequest, CostStrategy, DegradeReason, Outcome, UnifiedAssessment};
use crate::ports::CompletionService;

pub use ai::AiCostStrategy;
pub use rule_based::{complexity_level, recommendations, RuleBasedStrategy, BASELINE_RECOMMENDATIONS};
pub use tables::{
    damage_rates, severity_multiplier, vehicle_rates, DamageRates, RegionClass, VehicleRates,
};

/// Which strategy the engine tries first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// AI when a completion service is available, else rule-based.
    #[default]
    Auto,
    /// Never call the completion service.
    RuleBased,
}

/// Rates and tolerances for cost estimation.
#[derive(Debug, Clone)]
pub struct CostConfig {
    /// Strategy selection.
    pub strategy: StrategyKind,
    /// GST rate applied to parts, labour and paint.
    pub tax_rate: f64,
    /// Workshop overhead rate applied to parts and labour.
    pub overhead_rate: f64,
    /// Largest accepted gap between an AI total and its breakdown sum.
    pub reconcile_tolerance: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Auto,
            tax_rate: 0.18,
            overhead_rate: 0.10,
            reconcile_tolerance: 1000.0,
        }
    }
}

/// Prices assessments with AI-then-rules fallback.
#[derive(Debug, Clone)]
pub struct CostEstimationEngine {
    ai: Option<AiCostStrategy>,
    rule_based: RuleBasedStrategy,
    strategy: StrategyKind,
}

impl CostEstimationEngine {
    /// Creates an engine. The AI strategy is used only when `service` is
    /// present and the configured strategy is `Auto`.
    #[must_use]
    pub fn new(service: Option<Arc<dyn CompletionService>>, config: CostConfig) -> Self {
        let strategy = config.strategy;
        let ai = match (strategy, service) {
            (StrategyKind::Auto, Some(service)) => Some(AiCostStrategy::new(service, config.clone())),
            _ => None,
        };
        Self {
            ai,
            rule_based: RuleBasedStrategy::new(config),
            strategy,
        }
    }

    /// Estimates the repair cost. Never fails.
    ///
    /// Returns `Degraded` when the AI strategy was wanted but could not be
    /// used; the carried estimate is then rule-based.
    #[must_use]
    pub fn estimate(&self, assessment: &UnifiedAssessment, location: Option<&str>) -> Outcome<CostEstimate> {
        let request = CostRequest {
            assessment,
            location,
        };

        let Some(ai) = &self.ai else {
            let estimate = self.rule_based.price(assessment, location);
            return match self.strategy {
                StrategyKind::RuleBased => Outcome::Ok(estimate),
                StrategyKind::Auto => Outcome::Degraded(estimate, DegradeReason::ServiceUnavailable),
            };
        };

        match ai.estimate(&request) {
            Ok(estimate) => Outcome::Ok(estimate),
            Err(reason) => {
                warn!("AI cost estimate failed ({reason}); using {}", self.rule_based.name());
                Outcome::Degraded(self.rule_based.price(assessment, location), reason)
            }
        }
    }
}
