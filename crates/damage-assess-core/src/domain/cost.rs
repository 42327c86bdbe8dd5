//! Repair-cost estimate types.

use serde::{Deserialize, Serialize};

/// Itemised repair cost. All components are non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Replacement parts.
    pub parts_cost: f64,
    /// Workshop labour.
    pub labor_cost: f64,
    /// Paint and finishing.
    pub paint_cost: f64,
    /// Taxes (GST).
    pub taxes: f64,
    /// Workshop overhead.
    pub overhead_cost: f64,
    /// Anything not covered above.
    pub additional_costs: f64,
    /// Total repair cost.
    pub total_cost: f64,
}

impl CostBreakdown {
    /// Sum of every component except the total.
    #[must_use]
    pub fn component_sum(&self) -> f64 {
        self.parts_cost
            + self.labor_cost
            + self.paint_cost
            + self.taxes
            + self.overhead_cost
            + self.additional_costs
    }

    /// Replaces `total_cost` with the component sum when they differ by more than `tolerance`.
    ///
    /// Returns true if the total was overridden.
    pub fn reconcile(&mut self, tolerance: f64) -> bool {
        let sum = self.component_sum();
        if (self.total_cost - sum).abs() > tolerance {
            self.total_cost = sum;
            true
        } else {
            false
        }
    }

    /// Clamps every component and the total to be non-negative and finite.
    #[must_use]
    pub fn clamped(self) -> Self {
        let c = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            parts_cost: c(self.parts_cost),
            labor_cost: c(self.labor_cost),
            paint_cost: c(self.paint_cost),
            taxes: c(self.taxes),
            overhead_cost: c(self.overhead_cost),
            additional_costs: c(self.additional_costs),
            total_cost: c(self.total_cost),
        }
    }
}

/// Which strategy produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostSource {
    /// Priced by the external completion service.
    #[serde(rename = "AI")]
    Ai,
    /// Priced by the deterministic reference tables.
    RuleBased,
}

/// Workshop skill level required for the repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityLevel {
    /// Routine repair.
    Simple,
    /// Standard repair.
    #[default]
    Moderate,
    /// Specialist repair.
    Complex,
    /// Certified specialist repair.
    Expert,
}

impl ComplexityLevel {
    /// Maps free text to a variant, defaulting to `Moderate`.
    #[must_use]
    pub fn canonicalize(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "simple" => Self::Simple,
            "complex" => Self::Complex,
            "expert" => Self::Expert,
            _ => Self::Moderate,
        }
    }
}

/// Price band of the total cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRange {
    /// Below 5,000.
    Low,
    /// 5,000 to 15,000.
    Medium,
    /// 15,000 to 50,000.
    High,
    /// 50,000 and above.
    Premium,
}

impl PriceRange {
    /// Classifies a total cost.
    #[must_use]
    pub fn from_total(total: f64) -> Self {
        if total < 5_000.0 {
            Self::Low
        } else if total < 15_000.0 {
            Self::Medium
        } else if total < 50_000.0 {
            Self::High
        } else {
            Self::Premium
        }
    }

    /// Maps a band name to a variant.
    #[must_use]
    pub fn canonicalize(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// Market context attached to an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    /// Price band of the total.
    pub price_range: PriceRange,
    /// Parts availability as reported or assumed.
    pub availability: String,
    /// Regional pricing factor applied.
    pub regional_factor: f64,
}

/// Complete repair-cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Itemised costs and reconciled total.
    pub breakdown: CostBreakdown,
    /// Expected repair duration, at least one day.
    pub repair_time_days: u32,
    /// Required workshop skill level.
    pub complexity_level: ComplexityLevel,
    /// Ordered advice for the vehicle owner.
    pub recommendations: Vec<String>,
    /// Confidence in the estimate (0.0 to 1.0).
    pub confidence_score: f64,
    /// Market context.
    pub market_analysis: MarketAnalysis,
    /// Strategy that produced the estimate.
    pub source: CostSource,
}

impl CostEstimate {
    /// Total repair cost.
    #[must_use]
    pub const fn total_cost(&self) -> f64 {
        self.breakdown.total_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown(total: f64) -> CostBreakdown {
        CostBreakdown {
            parts_cost: 3000.0,
            labor_cost: 2000.0,
            paint_cost: 500.0,
            taxes: 700.0,
            overhead_cost: 300.0,
            additional_costs: 0.0,
            total_cost: total,
        }
    }

    #[test]
    fn test_reconcile_overrides_large_gap() {
        let mut b = breakdown(5000.0);
        assert!(b.reconcile(1000.0));
        assert!((b.total_cost - 6500.0).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_keeps_total_within_tolerance() {
        let mut b = breakdown(6000.0);
        assert!(!b.reconcile(1000.0));
        assert!((b.total_cost - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_removes_negatives_and_nan() {
        let b = CostBreakdown {
            parts_cost: -10.0,
            labor_cost: f64::NAN,
            total_cost: 50.0,
            ..CostBreakdown::default()
        }
        .clamped();
        assert!(b.parts_cost.abs() < f64::EPSILON);
        assert!(b.labor_cost.abs() < f64::EPSILON);
        assert!((b.total_cost - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_price_range_bands() {
        assert_eq!(PriceRange::from_total(4999.0), PriceRange::Low);
        assert_eq!(PriceRange::from_total(5000.0), PriceRange::Medium);
        assert_eq!(PriceRange::from_total(15_000.0), PriceRange::High);
        assert_eq!(PriceRange::from_total(75_000.0), PriceRange::Premium);
    }

    #[test]
    fn test_complexity_level_canonicalize() {
        assert_eq!(ComplexityLevel::canonicalize("Expert"), ComplexityLevel::Expert);
        assert_eq!(ComplexityLevel::canonicalize("???"), ComplexityLevel::Moderate);
    }
}
