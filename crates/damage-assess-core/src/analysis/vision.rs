//! Damage-type analysis through an external vision-capable completion service.
//!
//! Only the first readable image of an incident is sent. The response is
//! parsed in two tiers (embedded JSON object, then labelled lines) and any
//! failure yields the fallback assessment.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::parsing::{as_f64, as_text, as_text_list, extract_json_object, labeled_value};
use crate::domain::{
    DamageType, DegradeReason, ImageInput, Outcome, RepairComplexity, RepairUrgency,
    SafetyConcern, Severity, VehicleType, VisionAssessment,
};
use crate::ports::{CompletionRequest, CompletionService, ImagePayload};

const VISION_PROMPT: &str = r#"Analyze this vehicle damage image and provide a detailed assessment.

Please respond with a JSON object containing:
{
    "vehicle_type": "Car/SUV/Truck/Motorcycle/Van/Bus",
    "damage_type": "Scratch/Dent/Paint Damage/Bumper Damage/Broken Part/Major Collision/Structural Damage/Minor Dent/Surface Damage/Panel Damage/Total Loss",
    "damage_description": "Detailed description of the damage",
    "severity": "Minor/Moderate/Severe/Critical",
    "affected_areas": ["List of affected body parts"],
    "repair_urgency": "Low/Medium/High",
    "estimated_repair_complexity": "Simple/Moderate/Complex",
    "safety_concerns": "None/Minor/Major",
    "confidence": 0.0-1.0
}

Focus on Indian market context and realistic assessment."#;

/// Confidence assumed when a response omits one.
const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Configuration for the vision analyzer.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Whether to call the completion service at all.
    pub enabled: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Vision-based damage analyzer.
#[derive(Clone)]
pub struct VisionDamageAnalyzer {
    service: Option<Arc<dyn CompletionService>>,
    config: VisionConfig,
}

impl std::fmt::Debug for VisionDamageAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionDamageAnalyzer")
            .field("service", &self.service.as_ref().map(|s| s.name().to_string()))
            .field("config", &self.config)
            .finish()
    }
}

impl VisionDamageAnalyzer {
    /// Creates an analyzer. `None` means no credentials were configured.
    #[must_use]
    pub fn new(service: Option<Arc<dyn CompletionService>>, config: VisionConfig) -> Self {
        Self { service, config }
    }

    /// Analyzes the first readable image of an incident.
    ///
    /// Never fails: every failure yields `VisionAssessment::fallback()` tagged
    /// with the reason.
    #[must_use]
    pub fn analyze(&self, images: &[ImageInput]) -> Outcome<VisionAssessment> {
        let service = match &self.service {
            Some(service) if self.config.enabled => service,
            _ => return degraded(DegradeReason::ServiceUnavailable),
        };
        if images.is_empty() {
            return degraded(DegradeReason::NoImages);
        }

        let Some((reference, data)) = images
            .iter()
            .find_map(|image| image.read_bytes().ok().map(|data| (image.reference(), data)))
        else {
            return degraded(DegradeReason::UnreadableImage(
                "no readable image for vision analysis".into(),
            ));
        };

        debug!("Sending {reference} to {} for damage analysis", service.name());
        let request = CompletionRequest::with_image(
            VISION_PROMPT,
            ImagePayload {
                mime_type: ImageInput::mime_type(&data),
                data,
            },
        );

        let text = match service.complete(&request) {
            Ok(text) => text,
            Err(e) => return degraded(DegradeReason::CallFailed(format!("{e:#}"))),
        };

        parse_response(&text).map_or_else(
            || degraded(DegradeReason::ParseFailed(truncate(&text, 120))),
            Outcome::Ok,
        )
    }
}

fn degraded(reason: DegradeReason) -> Outcome<VisionAssessment> {
    warn!("Vision analysis unavailable: {reason}");
    Outcome::Degraded(VisionAssessment::fallback(), reason)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Parses a completion response into an assessment.
///
/// Tries the embedded JSON object first, then a line scan for known field
/// labels. Returns `None` when neither tier finds anything.
#[must_use]
pub fn parse_response(text: &str) -> Option<VisionAssessment> {
    if let Some(map) = extract_json_object(text) {
        return Some(from_json(&map));
    }
    debug!("No JSON object in vision response, scanning lines");
    from_lines(text)
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k))
}

fn from_json(map: &Map<String, Value>) -> VisionAssessment {
    let text = |keys: &[&str]| field(map, keys).and_then(as_text);

    VisionAssessment {
        vehicle_type: text(&["vehicle_type"])
            .map(|s| VehicleType::canonicalize(&s))
            .unwrap_or_default(),
        damage_type: text(&["damage_type"])
            .map(|s| DamageType::canonicalize(&s))
            .unwrap_or_default(),
        description: text(&["damage_description", "description"])
            .unwrap_or_else(|| "Damage detected".to_string()),
        affected_areas: field(map, &["affected_areas"])
            .map(as_text_list)
            .unwrap_or_default(),
        severity_hint: text(&["severity"]).map_or(Severity::Moderate, |s| Severity::canonicalize(&s)),
        repair_urgency: text(&["repair_urgency"])
            .map(|s| RepairUrgency::canonicalize(&s))
            .unwrap_or_default(),
        complexity: text(&["estimated_repair_complexity", "complexity"])
            .map(|s| RepairComplexity::canonicalize(&s))
            .unwrap_or_default(),
        safety_concern: text(&["safety_concerns", "safety_concern"])
            .map(|s| SafetyConcern::canonicalize(&s))
            .unwrap_or_default(),
        confidence: clamp_confidence(field(map, &["confidence"]).and_then(as_f64)),
        available: true,
    }
}

fn from_lines(text: &str) -> Option<VisionAssessment> {
    let vehicle = labeled_value(text, "vehicle_type");
    let damage = labeled_value(text, "damage_type");
    let severity = labeled_value(text, "severity");
    let confidence = labeled_value(text, "confidence");

    if vehicle.is_none() && damage.is_none() && severity.is_none() && confidence.is_none() {
        return None;
    }

    Some(VisionAssessment {
        vehicle_type: vehicle
            .map(|s| VehicleType::canonicalize(&s))
            .unwrap_or_default(),
        damage_type: damage
            .map(|s| DamageType::canonicalize(&s))
            .unwrap_or_default(),
        description: "Damage detected".to_string(),
        affected_areas: Vec::new(),
        severity_hint: severity.map_or(Severity::Moderate, |s| Severity::canonicalize(&s)),
        repair_urgency: RepairUrgency::default(),
        complexity: RepairComplexity::default(),
        safety_concern: SafetyConcern::default(),
        confidence: clamp_confidence(confidence.and_then(|s| as_f64(&Value::String(s)))),
        available: true,
    })
}

fn clamp_confidence(value: Option<f64>) -> f64 {
    value.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    struct Fixed(Result<&'static str, &'static str>);

    impl CompletionService for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
            assert!(request.image.is_some());
            self.0
                .map(ToString::to_string)
                .map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn analyzer(response: Result<&'static str, &'static str>) -> VisionDamageAnalyzer {
        VisionDamageAnalyzer::new(Some(Arc::new(Fixed(response))), VisionConfig::default())
    }

    fn image() -> Vec<ImageInput> {
        vec![ImageInput::from_bytes("front.jpg", vec![0xFF, 0xD8, 0xFF])]
    }

    #[test]
    fn test_parses_embedded_json() {
        let outcome = analyzer(Ok(r#"Here you go:
            {"vehicle_type": "suv", "damage_type": "Bumper Damage", "severity": "Severe",
             "affected_areas": ["front bumper"], "repair_urgency": "High",
             "estimated_repair_complexity": "Complex", "safety_concerns": "Minor",
             "confidence": "0.85"}"#))
        .analyze(&image());

        assert!(!outcome.is_degraded());
        let a = outcome.into_inner();
        assert_eq!(a.vehicle_type, VehicleType::Suv);
        assert_eq!(a.damage_type, DamageType::BumperDamage);
        assert_eq!(a.severity_hint, Severity::Severe);
        assert_eq!(a.affected_areas, vec!["front bumper"]);
        assert_eq!(a.repair_urgency, RepairUrgency::High);
        assert_eq!(a.complexity, RepairComplexity::Complex);
        assert_eq!(a.safety_concern, SafetyConcern::Minor);
        assert!((a.confidence - 0.85).abs() < 1e-9);
        assert!(a.available);
    }

    #[test]
    fn test_unknown_values_get_defaults() {
        let a = parse_response(
            r#"{"vehicle_type": "Spaceship", "damage_type": "Melted", "confidence": 7}"#,
        )
        .expect("json tier");
        assert_eq!(a.vehicle_type, VehicleType::Car);
        assert_eq!(a.damage_type, DamageType::Unknown);
        assert_eq!(a.severity_hint, Severity::Moderate);
        assert!((a.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_confidence_clamps_to_zero() {
        let a = parse_response(r#"{"damage_type": "Dent", "confidence": "-0.4"}"#)
            .expect("json tier");
        assert!(a.confidence.abs() < f64::EPSILON);

        let a = parse_response("damage_type: Dent\nconfidence: -0.4").expect("line tier");
        assert!(a.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_scan_tier() {
        let a = parse_response("Vehicle type\nvehicle_type: Truck\ndamage_type: Dent\nconfidence: 0.4")
            .expect("line tier");
        assert_eq!(a.vehicle_type, VehicleType::Truck);
        assert_eq!(a.damage_type, DamageType::Dent);
        assert!((a.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_prose_without_fields_falls_back() {
        let outcome = analyzer(Ok("I cannot see any vehicle in this picture.")).analyze(&image());
        assert!(matches!(
            outcome.reason(),
            Some(DegradeReason::ParseFailed(_))
        ));
        let a = outcome.into_inner();
        assert!(!a.available);
        assert!((a.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_call_failure_falls_back() {
        let outcome = analyzer(Err("timed out")).analyze(&image());
        assert!(matches!(outcome.reason(), Some(DegradeReason::CallFailed(_))));
        assert!(!outcome.value().available);
    }

    #[test]
    fn test_missing_service_falls_back() {
        let analyzer = VisionDamageAnalyzer::new(None, VisionConfig::default());
        let outcome = analyzer.analyze(&image());
        assert_eq!(outcome.reason(), Some(&DegradeReason::ServiceUnavailable));
    }

    #[test]
    fn test_disabled_and_empty_inputs() {
        let disabled = VisionDamageAnalyzer::new(
            Some(Arc::new(Fixed(Ok("{}")))),
            VisionConfig { enabled: false },
        );
        assert_eq!(
            disabled.analyze(&image()).reason(),
            Some(&DegradeReason::ServiceUnavailable)
        );
        assert_eq!(
            analyzer(Ok("{}")).analyze(&[]).reason(),
            Some(&DegradeReason::NoImages)
        );
    }

    #[test]
    fn test_skips_unreadable_images() {
        let images = vec![
            ImageInput::Path("/nonexistent/first.jpg".into()),
            ImageInput::from_bytes("second.jpg", vec![1, 2, 3]),
        ];
        let outcome = analyzer(Ok(r#"{"damage_type": "Scratch"}"#)).analyze(&images);
        assert_eq!(outcome.value().damage_type, DamageType::Scratch);
    }
}
