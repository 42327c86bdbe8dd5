//! AI-assisted pricing through the completion service.

use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::rule_based::{round2, BASELINE_RECOMMENDATIONS};
use super::tables::RegionClass;
use super::CostConfig;
use crate::analysis::parsing::{as_f64, as_text, as_text_list, extract_json_object, numbers_in};
use crate::domain::{
    ComplexityLevel, CostBreakdown, CostEstimate, CostRequest, CostSource, CostStrategy,
    DegradeReason, MarketAnalysis, PriceRange,
};
use crate::ports::{CompletionRequest, CompletionService};

/// Confidence assumed when a JSON response omits one.
const DEFAULT_CONFIDENCE: f64 = 0.7;
/// Confidence of an estimate recovered from prose.
const TEXT_SCAN_CONFIDENCE: f64 = 0.6;
/// Share of a prose total assigned to parts, labour, paint, taxes and overhead.
const TEXT_SCAN_SPLIT: [f64; 5] = [0.4, 0.3, 0.1, 0.15, 0.05];
const TEXT_SCAN_DAYS: u32 = 3;
const TEXT_SCAN_RECOMMENDATIONS: [&str; 3] =
    ["Get multiple quotes", "Check warranty", "Verify parts quality"];

/// Pricing by asking the completion service for a structured estimate.
#[derive(Clone)]
pub struct AiCostStrategy {
    service: Arc<dyn CompletionService>,
    config: CostConfig,
}

impl std::fmt::Debug for AiCostStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiCostStrategy")
            .field("service", &self.service.name())
            .field("config", &self.config)
            .finish()
    }
}

impl AiCostStrategy {
    /// Creates a strategy backed by `service`.
    #[must_use]
    pub fn new(service: Arc<dyn CompletionService>, config: CostConfig) -> Self {
        Self { service, config }
    }

    /// Interprets a completion response.
    ///
    /// # Errors
    ///
    /// Returns `ParseFailed` when the text holds neither a usable JSON object
    /// nor any number above 100.
    pub fn parse(&self, text: &str, location: Option<&str>) -> Result<CostEstimate, DegradeReason> {
        let regional_factor = RegionClass::classify(location).factor();

        if let Some(estimate) = extract_json_object(text)
            .and_then(|map| self.read_json(&map, regional_factor))
        {
            return Ok(estimate);
        }
        debug!("No usable JSON cost object, scanning text for a total");
        from_text(text).ok_or_else(|| {
            DegradeReason::ParseFailed("no cost figures in completion response".into())
        })
    }

    fn read_json(&self, map: &Map<String, Value>, regional_factor: f64) -> Option<CostEstimate> {
        let number = |m: &Map<String, Value>, keys: &[&str]| {
            keys.iter()
                .find_map(|k| m.get(*k))
                .and_then(as_f64)
                .unwrap_or(0.0)
        };
        let empty = Map::new();
        let items = match map.get("cost_breakdown") {
            Some(Value::Object(items)) => items,
            _ => &empty,
        };

        let mut breakdown = CostBreakdown {
            parts_cost: number(items, &["parts_cost"]),
            labor_cost: number(items, &["labor_cost", "labour_cost"]),
            paint_cost: number(items, &["paint_cost"]),
            taxes: number(items, &["taxes_gst", "taxes"]),
            overhead_cost: number(items, &["overhead_cost"]),
            additional_costs: number(items, &["additional_costs"]),
            total_cost: number(map, &["total_cost"]),
        }
        .clamped();

        if breakdown.total_cost <= 0.0 && breakdown.component_sum() <= 0.0 {
            return None;
        }

        let stated = breakdown.total_cost;
        if breakdown.reconcile(self.config.reconcile_tolerance) {
            info!(
                "Stated total {stated:.2} differs from breakdown sum by more than {:.0}; using {:.2}",
                self.config.reconcile_tolerance, breakdown.total_cost
            );
        }
        breakdown.total_cost = round2(breakdown.total_cost);

        let market = match map.get("market_analysis") {
            Some(Value::Object(m)) => m,
            _ => &empty,
        };
        let market_analysis = MarketAnalysis {
            price_range: market
                .get("price_range")
                .and_then(as_text)
                .and_then(|s| PriceRange::canonicalize(&s))
                .unwrap_or_else(|| PriceRange::from_total(breakdown.total_cost)),
            availability: market
                .get("availability")
                .and_then(as_text)
                .unwrap_or_else(|| "Moderate".to_string()),
            regional_factor: market
                .get("regional_factor")
                .and_then(as_f64)
                .filter(|f| *f > 0.0)
                .unwrap_or(regional_factor),
        };

        let mut recommendations = map
            .get("recommendations")
            .map(as_text_list)
            .unwrap_or_default();
        if recommendations.is_empty() {
            recommendations = BASELINE_RECOMMENDATIONS.iter().map(ToString::to_string).collect();
        }

        Some(CostEstimate {
            breakdown,
            repair_time_days: whole_days(map.get("repair_time_days").and_then(as_f64)),
            complexity_level: map
                .get("complexity_level")
                .and_then(as_text)
                .map(|s| ComplexityLevel::canonicalize(&s))
                .unwrap_or_default(),
            recommendations,
            confidence_score: map
                .get("confidence_score")
                .and_then(as_f64)
                .unwrap_or(DEFAULT_CONFIDENCE)
                .clamp(0.0, 1.0),
            market_analysis,
            source: CostSource::Ai,
        })
    }
}

impl CostStrategy for AiCostStrategy {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn estimate(&self, request: &CostRequest<'_>) -> Result<CostEstimate, DegradeReason> {
        let prompt = build_prompt(request);
        debug!("Requesting cost estimate from {}", self.service.name());
        let text = self
            .service
            .complete(&CompletionRequest::text(prompt))
            .map_err(|e| DegradeReason::CallFailed(format!("{e:#}")))?;
        self.parse(&text, request.location)
    }
}

/// Number of days, at least one; missing values count as one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_days(value: Option<f64>) -> u32 {
    value.map_or(1.0, f64::round).clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Recovers an estimate from prose: the largest number above 100 is the total.
fn from_text(text: &str) -> Option<CostEstimate> {
    let total = numbers_in(text)
        .into_iter()
        .filter(|n| *n > 100.0)
        .fold(None, |max: Option<f64>, n| Some(max.map_or(n, |m| m.max(n))))?;

    let [parts, labor, paint, taxes, overhead] = TEXT_SCAN_SPLIT.map(|share| round2(total * share));
    Some(CostEstimate {
        breakdown: CostBreakdown {
            parts_cost: parts,
            labor_cost: labor,
            paint_cost: paint,
            taxes,
            overhead_cost: overhead,
            additional_costs: 0.0,
            total_cost: round2(total),
        },
        repair_time_days: TEXT_SCAN_DAYS,
        complexity_level: ComplexityLevel::Moderate,
        recommendations: TEXT_SCAN_RECOMMENDATIONS.iter().map(ToString::to_string).collect(),
        confidence_score: TEXT_SCAN_CONFIDENCE,
        market_analysis: MarketAnalysis {
            price_range: PriceRange::from_total(total),
            availability: "Moderate".to_string(),
            regional_factor: 1.0,
        },
        source: CostSource::Ai,
    })
}

fn build_prompt(request: &CostRequest<'_>) -> String {
    let a = request.assessment;
    let location = request.location.unwrap_or("India");
    let mut prompt = String::from(
        "As an expert automotive repair cost estimator in India, please provide a detailed \
         cost breakdown for the following vehicle damage:\n\n",
    );
    let _ = writeln!(prompt, "Vehicle Type: {}", a.vehicle_type);
    let _ = writeln!(prompt, "Damage Type: {}", a.damage_type);
    let _ = writeln!(prompt, "Severity: {}", a.severity);
    let _ = writeln!(prompt, "Location: {location}");
    let _ = writeln!(prompt, "Confidence Level: {:.2}", a.confidence);
    if !a.affected_areas.is_empty() {
        let _ = writeln!(prompt, "Affected Areas: {}", a.affected_areas.join(", "));
    }
    let _ = write!(
        prompt,
        r#"
Please provide a realistic cost estimate in Indian Rupees (INR) considering:
1. Current Indian market rates
2. Regional pricing variations
3. Labor costs in {location}
4. Parts availability and costs
5. GST (18%) and other taxes
6. Workshop overhead costs

Respond in the following JSON format:
{{
    "total_cost": 0,
    "cost_breakdown": {{
        "parts_cost": 0,
        "labor_cost": 0,
        "paint_cost": 0,
        "taxes_gst": 0,
        "overhead_cost": 0,
        "additional_costs": 0
    }},
    "repair_time_days": 0,
    "complexity_level": "Simple/Moderate/Complex/Expert",
    "market_analysis": {{
        "price_range": "Low/Medium/High/Premium",
        "availability": "Readily Available/Moderate/Scarce/Rare",
        "regional_factor": 1.0
    }},
    "recommendations": [
        "Specific repair recommendations",
        "Cost-saving tips",
        "Quality considerations"
    ],
    "confidence_score": 0.0
}}

Be realistic and consider Indian market conditions, local availability of parts, and regional labor costs."#
    );
    prompt
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::{DamageType, Severity, UnifiedAssessment, VehicleType};

    struct Canned(&'static str);

    impl CompletionService for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
            assert!(request.image.is_none());
            Ok(self.0.to_string())
        }
    }

    fn strategy(response: &'static str) -> AiCostStrategy {
        AiCostStrategy::new(Arc::new(Canned(response)), CostConfig::default())
    }

    fn assessment() -> UnifiedAssessment {
        UnifiedAssessment {
            vehicle_type: VehicleType::Suv,
            damage_type: DamageType::Dent,
            severity: Severity::Moderate,
            confidence: 0.75,
            ..UnifiedAssessment::error(1)
        }
    }

    fn estimate(response: &'static str) -> Result<CostEstimate, DegradeReason> {
        let a = assessment();
        strategy(response).estimate(&CostRequest {
            assessment: &a,
            location: Some("Pune"),
        })
    }

    #[test]
    fn test_stated_total_overridden_when_far_from_breakdown() {
        let e = estimate(
            r#"{"total_cost": 5000, "cost_breakdown": {"parts_cost": 3000, "labor_cost": 2000,
                "paint_cost": 500, "taxes_gst": 700, "overhead_cost": 300, "additional_costs": 0},
                "repair_time_days": 2, "complexity_level": "Moderate", "confidence_score": 0.8}"#,
        )
        .expect("estimate");
        assert!((e.total_cost() - 6500.0).abs() < 1e-9);
        assert_eq!(e.source, CostSource::Ai);
        assert_eq!(e.repair_time_days, 2);
    }

    #[test]
    fn test_stated_total_kept_within_tolerance() {
        let e = estimate(
            r#"{"total_cost": 6000, "cost_breakdown": {"parts_cost": 3000, "labor_cost": 2000,
                "paint_cost": 500, "taxes_gst": 700, "overhead_cost": 300}}"#,
        )
        .expect("estimate");
        assert!((e.total_cost() - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_coercion_and_clamping() {
        let e = estimate(
            r#"```json
            {"total_cost": "₹4,000", "cost_breakdown": {"parts_cost": "2500", "labor_cost": -300,
             "taxes_gst": "720"}, "repair_time_days": 0, "complexity_level": "Expert",
             "market_analysis": {"price_range": "premium", "availability": "Scarce"},
             "recommendations": [], "confidence_score": 3}
            ```"#,
        )
        .expect("estimate");

        assert!(e.breakdown.labor_cost.abs() < f64::EPSILON);
        assert!((e.breakdown.parts_cost - 2500.0).abs() < 1e-9);
        assert_eq!(e.repair_time_days, 1);
        assert_eq!(e.complexity_level, ComplexityLevel::Expert);
        assert_eq!(e.market_analysis.price_range, PriceRange::Premium);
        assert_eq!(e.market_analysis.availability, "Scarce");
        assert!((e.market_analysis.regional_factor - 1.1).abs() < f64::EPSILON);
        assert!((e.confidence_score - 1.0).abs() < f64::EPSILON);
        assert_eq!(e.recommendations, BASELINE_RECOMMENDATIONS);
    }

    #[test]
    fn test_quoted_negative_values_clamp_to_zero() {
        let e = estimate(
            r#"{"total_cost": "4000", "cost_breakdown": {"parts_cost": "-3000", "labor_cost": "2000"},
                "confidence_score": "-0.9"}"#,
        )
        .expect("estimate");

        assert!(e.breakdown.parts_cost.abs() < f64::EPSILON);
        assert!((e.breakdown.labor_cost - 2000.0).abs() < 1e-9);
        // 4000 stated against a 2000 breakdown is past the tolerance.
        assert!((e.total_cost() - 2000.0).abs() < 1e-9);
        assert!(e.confidence_score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_scan_uses_upper_end_of_range() {
        let e = estimate("Expect Rs 5,000-8,000 depending on the workshop.").expect("estimate");
        assert!((e.total_cost() - 8_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_scan_tier() {
        let e = estimate("I would expect around Rs. 12,000 for this, taking 2 to 3 days.")
            .expect("estimate");
        assert!((e.total_cost() - 12_000.0).abs() < 1e-9);
        assert!((e.breakdown.parts_cost - 4_800.0).abs() < 1e-9);
        assert!((e.breakdown.taxes - 1_800.0).abs() < 1e-9);
        assert!((e.breakdown.component_sum() - 12_000.0).abs() < 1e-6);
        assert_eq!(e.repair_time_days, 3);
        assert!((e.confidence_score - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unusable_response_is_parse_failure() {
        let result = estimate("Sorry, I can't help with that.");
        assert!(matches!(result, Err(DegradeReason::ParseFailed(_))));

        let empty_object = estimate("{}");
        assert!(matches!(empty_object, Err(DegradeReason::ParseFailed(_))));
    }

    #[test]
    fn test_prompt_mentions_assessment() {
        let a = assessment();
        let prompt = build_prompt(&CostRequest {
            assessment: &a,
            location: None,
        });
        assert!(prompt.contains("Vehicle Type: SUV"));
        assert!(prompt.contains("Damage Type: Dent"));
        assert!(prompt.contains("Confidence Level: 0.75"));
        assert!(prompt.contains("\"taxes_gst\": 0"));
    }
}
