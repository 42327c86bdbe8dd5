//! Closed vocabularies used across the pipeline.
//!
//! Every free-text value that enters the pipeline (model labels, AI responses,
//! configuration) passes through exactly one `canonicalize` function per field.
//! Unrecognised values map to the field's documented default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {kind}: '{value}'")]
pub struct UnknownVariant {
    /// Which vocabulary was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lowercases, trims, and folds `_`/`-` separators and repeated whitespace to single spaces.
fn normalize_key(s: &str) -> String {
    s.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == ',')
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordinal damage-intensity category.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    /// Cosmetic damage.
    #[default]
    Minor,
    /// Noticeable damage needing standard repair.
    Moderate,
    /// Extensive damage.
    Severe,
    /// Damage that threatens drivability or safety.
    Critical,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Self; 4] = [Self::Minor, Self::Moderate, Self::Severe, Self::Critical];

    /// Maps a free-text severity to a variant, defaulting to `Moderate`.
    ///
    /// Accepts model-style labels such as `"01-minor"` as well as plain names.
    #[must_use]
    pub fn canonicalize(s: &str) -> Self {
        s.parse().unwrap_or(Self::Moderate)
    }

    /// Returns the display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::Critical => "Critical",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        // "01 minor" after normalisation of "01-minor"
        let key = key.trim_start_matches(|c: char| c.is_ascii_digit()).trim();
        match key {
            "minor" => Ok(Self::Minor),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            "critical" => Ok(Self::Critical),
            _ => Err(UnknownVariant::new("severity", s)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle class recognised by the pricing tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    /// Passenger car.
    #[default]
    Car,
    /// Sport utility vehicle.
    #[serde(rename = "SUV")]
    Suv,
    /// Goods truck.
    Truck,
    /// Two-wheeler.
    Motorcycle,
    /// Passenger or cargo van.
    Van,
    /// Bus.
    Bus,
}

impl VehicleType {
    /// Maps a free-text vehicle type to a variant, defaulting to `Car`.
    #[must_use]
    pub fn canonicalize(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Returns the display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Suv => "SUV",
            Self::Truck => "Truck",
            Self::Motorcycle => "Motorcycle",
            Self::Van => "Van",
            Self::Bus => "Bus",
        }
    }

    /// Whether the vehicle is normally insured as a commercial vehicle.
    #[must_use]
    pub const fn is_commercial(self) -> bool {
        matches!(self, Self::Truck | Self::Bus)
    }
}

impl FromStr for VehicleType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "car" => Ok(Self::Car),
            "suv" => Ok(Self::Suv),
            "truck" => Ok(Self::Truck),
            "motorcycle" => Ok(Self::Motorcycle),
            "van" => Ok(Self::Van),
            "bus" => Ok(Self::Bus),
            _ => Err(UnknownVariant::new("vehicle type", s)),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of visible damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Surface scratch.
    Scratch,
    /// Body dent.
    Dent,
    /// Paint chipping, fading or peeling.
    #[serde(rename = "Paint Damage")]
    PaintDamage,
    /// Front or rear bumper damage.
    #[serde(rename = "Bumper Damage")]
    BumperDamage,
    /// A component broken off or shattered.
    #[serde(rename = "Broken Part")]
    BrokenPart,
    /// Heavy collision damage across several panels.
    #[serde(rename = "Major Collision")]
    MajorCollision,
    /// Frame or chassis damage.
    #[serde(rename = "Structural Damage")]
    StructuralDamage,
    /// Small dent.
    #[serde(rename = "Minor Dent")]
    MinorDent,
    /// Shallow surface marks.
    #[serde(rename = "Surface Damage")]
    SurfaceDamage,
    /// Damage confined to one body panel.
    #[serde(rename = "Panel Damage")]
    PanelDamage,
    /// Vehicle beyond economical repair.
    #[serde(rename = "Total Loss")]
    TotalLoss,
    /// Damage type could not be determined.
    #[default]
    Unknown,
}

impl DamageType {
    /// Every damage type, `Unknown` last.
    pub const ALL: [Self; 12] = [
        Self::Scratch,
        Self::Dent,
        Self::PaintDamage,
        Self::BumperDamage,
        Self::BrokenPart,
        Self::MajorCollision,
        Self::StructuralDamage,
        Self::MinorDent,
        Self::SurfaceDamage,
        Self::PanelDamage,
        Self::TotalLoss,
        Self::Unknown,
    ];

    /// Maps a free-text damage type to a variant, defaulting to `Unknown`.
    #[must_use]
    pub fn canonicalize(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Returns the display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scratch => "Scratch",
            Self::Dent => "Dent",
            Self::PaintDamage => "Paint Damage",
            Self::BumperDamage => "Bumper Damage",
            Self::BrokenPart => "Broken Part",
            Self::MajorCollision => "Major Collision",
            Self::StructuralDamage => "Structural Damage",
            Self::MinorDent => "Minor Dent",
            Self::SurfaceDamage => "Surface Damage",
            Self::PanelDamage => "Panel Damage",
            Self::TotalLoss => "Total Loss",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the display name mentions paint (case-insensitive substring match).
    #[must_use]
    pub fn involves_paint(self) -> bool {
        self.as_str().to_lowercase().contains("paint")
    }
}

impl FromStr for DamageType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().to_lowercase() == key)
            .ok_or_else(|| UnknownVariant::new("damage type", s))
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How soon the vehicle should be repaired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairUrgency {
    /// Can wait.
    Low,
    /// Repair soon.
    #[default]
    Medium,
    /// Repair before driving again.
    High,
}

impl RepairUrgency {
    /// Maps free text to a variant, defaulting to `Medium`.
    #[must_use]
    pub fn canonicalize(s: &str) -> Self {
        match normalize_key(s).as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

/// Estimated repair complexity reported by the vision analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairComplexity {
    /// Routine work.
    Simple,
    /// Standard workshop job.
    #[default]
    Moderate,
    /// Specialist work.
    Complex,
}

impl RepairComplexity {
    /// Maps free text to a variant, defaulting to `Moderate`.
    #[must_use]
    pub fn canonicalize(s: &str) -> Self {
        match normalize_key(s).as_str() {
            "simple" => Self::Simple,
            "complex" => Self::Complex,
            _ => Self::Moderate,
        }
    }
}

/// Safety impact of the damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyConcern {
    /// No safety impact.
    #[default]
    None,
    /// Limited safety impact.
    Minor,
    /// Vehicle should not be driven.
    Major,
}

impl SafetyConcern {
    /// Maps free text to a variant, defaulting to `None`.
    #[must_use]
    pub fn canonicalize(s: &str) -> Self {
        match normalize_key(s).as_str() {
            "minor" => Self::Minor,
            "major" => Self::Major,
            _ => Self::None,
        }
    }
}
