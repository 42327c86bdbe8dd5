//! Damage assessment results produced by the classifier, the vision analyzer and fusion.

use serde::{Deserialize, Serialize};

use super::{DamageType, RepairComplexity, RepairUrgency, SafetyConcern, Severity, VehicleType};

/// Severity predicted for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePrediction {
    /// Image reference (path or buffer name).
    pub image: String,
    /// Predicted severity.
    pub label: Severity,
    /// Probability of the predicted label (0.0 to 1.0).
    pub confidence: f64,
}

/// Aggregated severity for one incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityPrediction {
    /// Winning label of the confidence-weighted vote.
    pub label: Severity,
    /// Winner's share of the summed confidence (0.0 to 1.0).
    pub confidence: f64,
    /// Per-image predictions that took part in the vote.
    pub per_image: Vec<ImagePrediction>,
}

impl SeverityPrediction {
    /// Label returned when no image produced usable features.
    pub const NEUTRAL_LABEL: Severity = Severity::Minor;
    /// Confidence returned when no image produced usable features.
    pub const NEUTRAL_CONFIDENCE: f64 = 0.33;

    /// The neutral floor used when nothing could be classified.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            label: Self::NEUTRAL_LABEL,
            confidence: Self::NEUTRAL_CONFIDENCE,
            per_image: Vec::new(),
        }
    }
}

/// Structured damage assessment from the vision analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionAssessment {
    /// Vehicle class.
    pub vehicle_type: VehicleType,
    /// Damage category.
    pub damage_type: DamageType,
    /// Free-text description of the damage.
    pub description: String,
    /// Affected body parts.
    pub affected_areas: Vec<String>,
    /// Advisory severity; the classifier's label takes precedence when available.
    pub severity_hint: Severity,
    /// How soon to repair.
    pub repair_urgency: RepairUrgency,
    /// Expected repair complexity.
    pub complexity: RepairComplexity,
    /// Safety impact.
    pub safety_concern: SafetyConcern,
    /// Self-reported confidence (0.0 to 1.0).
    pub confidence: f64,
    /// False when this is the fallback object.
    pub available: bool,
}

impl VisionAssessment {
    /// Confidence carried by the fallback object.
    pub const FALLBACK_CONFIDENCE: f64 = 0.5;

    /// The fallback object returned when the analyzer cannot produce a result.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            vehicle_type: VehicleType::Car,
            damage_type: DamageType::Unknown,
            description: "Unable to analyze - vision service not available".to_string(),
            affected_areas: Vec::new(),
            severity_hint: Severity::Moderate,
            repair_urgency: RepairUrgency::Medium,
            complexity: RepairComplexity::Moderate,
            safety_concern: SafetyConcern::None,
            confidence: Self::FALLBACK_CONFIDENCE,
            available: false,
        }
    }
}

/// Which sources contributed to a unified assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMethod {
    /// Classifier severity plus vision damage type.
    #[serde(rename = "openai+severity")]
    VisionAndSeverity,
    /// Classifier only.
    #[serde(rename = "severity-only")]
    SeverityOnly,
    /// Vision only.
    #[serde(rename = "fallback")]
    Fallback,
    /// Neither source was available.
    #[serde(rename = "error")]
    Error,
}

impl AnalysisMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VisionAndSeverity => "openai+severity",
            Self::SeverityOnly => "severity-only",
            Self::Fallback => "fallback",
            Self::Error => "error",
        }
    }
}

/// Fused assessment handed to cost estimation. Always structurally complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedAssessment {
    /// Vehicle class.
    pub vehicle_type: VehicleType,
    /// Damage category.
    pub damage_type: DamageType,
    /// Severity label.
    pub severity: Severity,
    /// Combined confidence (0.0 to 1.0).
    pub confidence: f64,
    /// Sources that contributed.
    pub analysis_method: AnalysisMethod,
    /// Description from vision, when available.
    pub description: Option<String>,
    /// Affected body parts from vision.
    pub affected_areas: Vec<String>,
    /// Repair urgency from vision, or the default.
    pub repair_urgency: RepairUrgency,
    /// Repair complexity from vision, or the default.
    pub complexity: RepairComplexity,
    /// Safety concern from vision, or the default.
    pub safety_concern: SafetyConcern,
    /// Number of images submitted for the incident.
    pub total_images: usize,
    /// Per-image classifier predictions.
    pub severity_details: Vec<ImagePrediction>,
}

impl UnifiedAssessment {
    /// Assessment returned when no source could contribute.
    #[must_use]
    pub fn error(total_images: usize) -> Self {
        Self {
            vehicle_type: VehicleType::Car,
            damage_type: DamageType::Unknown,
            severity: Severity::Minor,
            confidence: 0.5,
            analysis_method: AnalysisMethod::Error,
            description: None,
            affected_areas: Vec::new(),
            repair_urgency: RepairUrgency::default(),
            complexity: RepairComplexity::default(),
            safety_concern: SafetyConcern::default(),
            total_images,
            severity_details: Vec::new(),
        }
    }
}
