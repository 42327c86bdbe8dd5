//! Fusion of classifier severity and vision damage type into one assessment.

use crate::domain::{
    AnalysisMethod, DamageType, SeverityPrediction, UnifiedAssessment, VehicleType,
    VisionAssessment,
};

/// Merges the two sources. Total: always returns a complete assessment.
///
/// `severity` is `None` when the classifier is unavailable; `vision` counts
/// as unavailable when it is the fallback object.
#[must_use]
pub fn fuse(
    severity: Option<&SeverityPrediction>,
    vision: &VisionAssessment,
    total_images: usize,
) -> UnifiedAssessment {
    let vision = vision.available.then_some(vision);

    match (severity, vision) {
        (Some(s), Some(v)) => UnifiedAssessment {
            severity: s.label,
            confidence: (s.confidence + v.confidence) / 2.0,
            analysis_method: AnalysisMethod::VisionAndSeverity,
            severity_details: s.per_image.clone(),
            ..from_vision(v, total_images)
        },
        (Some(s), None) => UnifiedAssessment {
            vehicle_type: VehicleType::Car,
            damage_type: DamageType::Unknown,
            severity: s.label,
            confidence: s.confidence,
            analysis_method: AnalysisMethod::SeverityOnly,
            severity_details: s.per_image.clone(),
            ..UnifiedAssessment::error(total_images)
        },
        (None, Some(v)) => from_vision(v, total_images),
        (None, None) => UnifiedAssessment::error(total_images),
    }
}

fn from_vision(v: &VisionAssessment, total_images: usize) -> UnifiedAssessment {
    UnifiedAssessment {
        vehicle_type: v.vehicle_type,
        damage_type: v.damage_type,
        severity: v.severity_hint,
        confidence: v.confidence,
        analysis_method: AnalysisMethod::Fallback,
        description: Some(v.description.clone()),
        affected_areas: v.affected_areas.clone(),
        repair_urgency: v.repair_urgency,
        complexity: v.complexity,
        safety_concern: v.safety_concern,
        total_images,
        severity_details: Vec::new(),
    }
}
