//! Deterministic table-driven pricing.

use tracing::debug;

use super::tables::{damage_rates, severity_multiplier, vehicle_rates, RegionClass};
use super::CostConfig;
use crate::domain::{
    ComplexityLevel, CostBreakdown, CostEstimate, CostRequest, CostSource, CostStrategy,
    DamageType, DegradeReason, MarketAnalysis, PriceRange, Severity, UnifiedAssessment,
};

/// Recommendations included in every estimate.
pub const BASELINE_RECOMMENDATIONS: [&str; 2] = [
    "Get quotes from at least 3 different workshops",
    "Check for insurance coverage before proceeding",
];

/// Pricing from the reference tables.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedStrategy {
    config: CostConfig,
}

impl RuleBasedStrategy {
    /// Creates a strategy using the given rates.
    #[must_use]
    pub const fn new(config: CostConfig) -> Self {
        Self { config }
    }

    /// Prices an assessment. Infallible.
    ///
    /// The regional factor scales every component except taxes, so the
    /// reported components add up to the total.
    #[must_use]
    pub fn price(&self, assessment: &UnifiedAssessment, location: Option<&str>) -> CostEstimate {
        let vehicle = vehicle_rates(assessment.vehicle_type);
        let damage = damage_rates(assessment.damage_type);
        let multiplier = severity_multiplier(assessment.severity);
        let region = RegionClass::classify(location);
        let regional_factor = region.factor();

        let parts_cost = damage.parts_cost * vehicle.parts_multiplier * multiplier;
        let labor_hours = damage.labor_hours * multiplier;
        let labor_cost = labor_hours * vehicle.labor_rate * vehicle.complexity_factor;
        let paint_cost = if assessment.damage_type.involves_paint() {
            damage.paint_cost
        } else {
            0.0
        };
        let taxes = self.config.tax_rate * (parts_cost + labor_cost + paint_cost);
        let overhead_cost = self.config.overhead_rate * (parts_cost + labor_cost);
        let total_cost = (parts_cost + labor_cost + paint_cost + overhead_cost)
            .mul_add(regional_factor, taxes);

        debug!(
            "Rule-based price for {} {} ({}) in {region}: {total_cost:.2}",
            assessment.severity, assessment.damage_type, assessment.vehicle_type
        );

        let breakdown = CostBreakdown {
            parts_cost: round2(parts_cost * regional_factor),
            labor_cost: round2(labor_cost * regional_factor),
            paint_cost: round2(paint_cost * regional_factor),
            taxes: round2(taxes),
            overhead_cost: round2(overhead_cost * regional_factor),
            additional_costs: 0.0,
            total_cost: round2(total_cost),
        };

        CostEstimate {
            repair_time_days: repair_days(labor_hours),
            complexity_level: complexity_level(assessment.severity, assessment.damage_type),
            recommendations: recommendations(assessment, breakdown.total_cost),
            confidence_score: assessment.confidence.clamp(0.0, 1.0),
            market_analysis: MarketAnalysis {
                price_range: PriceRange::from_total(breakdown.total_cost),
                availability: "Moderate".to_string(),
                regional_factor,
            },
            breakdown,
            source: CostSource::RuleBased,
        }
    }
}

impl CostStrategy for RuleBasedStrategy {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    fn estimate(&self, request: &CostRequest<'_>) -> Result<CostEstimate, DegradeReason> {
        Ok(self.price(request.assessment, request.location))
    }
}

/// Rounds to two decimal places.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Whole working days (8 hours), at least one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn repair_days(labor_hours: f64) -> u32 {
    (labor_hours / 8.0).round().max(1.0) as u32
}

/// Workshop skill level needed for a repair.
#[must_use]
pub fn complexity_level(severity: Severity, damage_type: DamageType) -> ComplexityLevel {
    if severity == Severity::Critical || damage_type == DamageType::StructuralDamage {
        ComplexityLevel::Expert
    } else if severity == Severity::Severe || damage_type == DamageType::BrokenPart {
        ComplexityLevel::Complex
    } else if severity == Severity::Moderate {
        ComplexityLevel::Moderate
    } else {
        ComplexityLevel::Simple
    }
}

/// Ordered advice for the owner; always starts with the baseline pair.
#[must_use]
pub fn recommendations(assessment: &UnifiedAssessment, total_cost: f64) -> Vec<String> {
    let mut out: Vec<String> = BASELINE_RECOMMENDATIONS.iter().map(ToString::to_string).collect();
    let mut add = |items: &[&str]| out.extend(items.iter().map(ToString::to_string));

    if total_cost > 10_000.0 {
        add(&[
            "Consider filing an insurance claim",
            "Verify workshop is insurance-approved",
        ]);
    }
    if matches!(assessment.severity, Severity::Severe | Severity::Critical) {
        add(&[
            "Get a detailed inspection before repair",
            "Consider OEM parts for better quality",
        ]);
    }
    if assessment.damage_type.involves_paint() {
        add(&["Ask about paint matching guarantee"]);
    }
    if assessment.damage_type == DamageType::StructuralDamage {
        add(&[
            "Ensure structural integrity is maintained",
            "Get certification from authorized workshop",
        ]);
    }
    if assessment.vehicle_type.is_commercial() {
        add(&["Check for commercial vehicle insurance"]);
    }
    out
}
