//! Reference pricing tables (INR).

use std::fmt;

use serde::Serialize;

use crate::domain::{DamageType, Severity, VehicleType};

/// Labour and parts pricing for a vehicle class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleRates {
    /// Workshop labour rate per hour.
    pub labor_rate: f64,
    /// Multiplier on intrinsic parts cost.
    pub parts_multiplier: f64,
    /// Multiplier on labour cost.
    pub complexity_factor: f64,
}

/// Intrinsic pricing for a damage category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRates {
    /// Parts cost before vehicle and severity multipliers.
    pub parts_cost: f64,
    /// Labour hours before the severity multiplier.
    pub labor_hours: f64,
    /// Flat paint cost, charged only for paint damage.
    pub paint_cost: f64,
}

const fn vehicle(labor_rate: f64, parts_multiplier: f64, complexity_factor: f64) -> VehicleRates {
    VehicleRates {
        labor_rate,
        parts_multiplier,
        complexity_factor,
    }
}

const fn damage(parts_cost: f64, labor_hours: f64, paint_cost: f64) -> DamageRates {
    DamageRates {
        parts_cost,
        labor_hours,
        paint_cost,
    }
}

/// Rates for a vehicle class. Vans are priced as cars.
#[must_use]
pub const fn vehicle_rates(vehicle_type: VehicleType) -> VehicleRates {
    match vehicle_type {
        VehicleType::Car | VehicleType::Van => vehicle(1200.0, 1.0, 1.0),
        VehicleType::Suv => vehicle(1400.0, 1.2, 1.1),
        VehicleType::Motorcycle => vehicle(600.0, 0.4, 0.7),
        VehicleType::Truck => vehicle(1800.0, 2.0, 1.5),
        VehicleType::Bus => vehicle(2000.0, 2.5, 1.8),
    }
}

/// Rates for a damage category. Unknown damage is priced as a scratch.
#[must_use]
pub const fn damage_rates(damage_type: DamageType) -> DamageRates {
    match damage_type {
        DamageType::Scratch | DamageType::Unknown => damage(800.0, 2.0, 0.0),
        DamageType::Dent => damage(1200.0, 3.0, 0.0),
        DamageType::PaintDamage => damage(1500.0, 2.5, 2000.0),
        DamageType::BumperDamage => damage(3500.0, 4.0, 0.0),
        DamageType::BrokenPart => damage(6000.0, 6.0, 0.0),
        DamageType::StructuralDamage | DamageType::MajorCollision => damage(15_000.0, 12.0, 0.0),
        DamageType::MinorDent => damage(1000.0, 2.0, 0.0),
        DamageType::SurfaceDamage => damage(500.0, 1.5, 0.0),
        DamageType::PanelDamage => damage(2000.0, 4.0, 0.0),
        DamageType::TotalLoss => damage(80_000.0, 40.0, 0.0),
    }
}

/// Cost multiplier for a severity level.
#[must_use]
pub const fn severity_multiplier(severity: Severity) -> f64 {
    match severity {
        Severity::Minor => 0.6,
        Severity::Moderate => 1.0,
        Severity::Severe => 1.6,
        Severity::Critical => 2.2,
    }
}

/// Local market tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionClass {
    /// Metropolitan cities.
    Metro,
    /// Large cities; also the default for unrecognised locations.
    #[default]
    Tier1,
    /// Smaller cities.
    Tier2,
}

const METRO: &[&str] = &["mumbai", "delhi", "bangalore", "chennai", "kolkata"];

const TIER1: &[&str] = &[
    "hyderabad",
    "pune",
    "ahmedabad",
    "jaipur",
    "lucknow",
    "kanpur",
    "nagpur",
    "indore",
    "thane",
    "bhopal",
    "visakhapatnam",
    "pimpri",
    "patna",
    "vadodara",
    "ghaziabad",
    "ludhiana",
];

const TIER2: &[&str] = &[
    "agra",
    "nashik",
    "faridabad",
    "meerut",
    "rajkot",
    "kalyan",
    "vasai",
    "varanasi",
    "srinagar",
];

impl RegionClass {
    /// Classifies a free-text location by city-name substring.
    ///
    /// Metro names are checked first. Missing or unmatched locations are `Tier1`.
    #[must_use]
    pub fn classify(location: Option<&str>) -> Self {
        let Some(location) = location else {
            return Self::default();
        };
        let location = location.to_lowercase();
        let matches = |cities: &[&str]| cities.iter().any(|c| location.contains(c));

        if matches(METRO) {
            Self::Metro
        } else if matches(TIER1) {
            Self::Tier1
        } else if matches(TIER2) {
            Self::Tier2
        } else {
            Self::default()
        }
    }

    /// Pricing factor for the tier.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Metro => 1.3,
            Self::Tier1 => 1.1,
            Self::Tier2 => 0.9,
        }
    }
}

impl fmt::Display for RegionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Metro => "metro",
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_lookup() {
        assert_eq!(RegionClass::classify(Some("Andheri, Mumbai")), RegionClass::Metro);
        assert_eq!(RegionClass::classify(Some("PUNE")), RegionClass::Tier1);
        assert_eq!(RegionClass::classify(Some("Agra, UP")), RegionClass::Tier2);
        assert_eq!(RegionClass::classify(Some("a rural district")), RegionClass::Tier1);
        assert_eq!(RegionClass::classify(Some("Atlantis")), RegionClass::Tier1);
        assert_eq!(RegionClass::classify(None), RegionClass::Tier1);
    }

    #[test]
    fn test_default_factor_is_tier1() {
        assert!((RegionClass::default().factor() - 1.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fallback_rows() {
        assert_eq!(vehicle_rates(VehicleType::Van), vehicle_rates(VehicleType::Car));
        assert_eq!(damage_rates(DamageType::Unknown), damage_rates(DamageType::Scratch));
    }

    #[test]
    fn test_only_paint_damage_has_paint_cost() {
        for d in DamageType::ALL {
            let rates = damage_rates(d);
            assert_eq!(rates.paint_cost > 0.0, d.involves_paint(), "{d}");
        }
    }

    #[test]
    fn test_severity_multipliers_increase() {
        let m: Vec<f64> = Severity::ALL.into_iter().map(severity_multiplier).collect();
        assert!(m.windows(2).all(|w| w[0] < w[1]));
    }
}
