//! End-to-end assessment of one incident.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{fuse, SeverityClassifier, VisionConfig, VisionDamageAnalyzer};
use crate::cost::{CostConfig, CostEstimationEngine};
use crate::domain::{
    AnalysisMethod, CostEstimate, DegradeReason, ImageInput, Outcome, UnifiedAssessment,
};
use crate::features::{FeatureConfig, FeatureExtractor, FeatureVector};
use crate::ports::{CompletionService, ProgressEvent, ProgressSink};

/// Pipeline stage that produced a degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Feature extraction.
    Features,
    /// Severity classification.
    Severity,
    /// Vision analysis.
    Vision,
    /// Cost estimation.
    Cost,
}

/// A fallback taken while assessing an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    /// Stage that fell back.
    pub stage: Stage,
    /// Image concerned, for per-image stages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Why it fell back.
    pub reason: DegradeReason,
}

/// Result of assessing one incident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    /// Fused damage assessment.
    pub assessment: UnifiedAssessment,
    /// Repair-cost estimate.
    pub estimate: CostEstimate,
    /// Location used for regional pricing.
    pub location: Option<String>,
    /// Image references in submission order.
    pub images: Vec<String>,
    /// Every fallback taken, in pipeline order.
    pub degradations: Vec<Degradation>,
    /// RFC 3339 time the report was produced, if stamped by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl AssessmentReport {
    /// True when both the classifier and the vision analyzer contributed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assessment.analysis_method == AnalysisMethod::VisionAndSeverity
    }
}

/// Configuration for every pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Feature extraction.
    pub features: FeatureConfig,
    /// Vision analysis.
    pub vision: VisionConfig,
    /// Cost estimation.
    pub cost: CostConfig,
}

/// The assessment-and-pricing pipeline.
///
/// Built once at startup; `assess` takes `&self` and may run concurrently
/// from many threads.
#[derive(Debug, Clone)]
pub struct AssessmentPipeline {
    extractor: FeatureExtractor,
    classifier: Option<SeverityClassifier>,
    vision: VisionDamageAnalyzer,
    cost: CostEstimationEngine,
}

impl AssessmentPipeline {
    /// Wires the stages.
    ///
    /// `classifier` is `None` when the severity artifacts failed to load;
    /// `service` is `None` when no completion credentials are configured.
    #[must_use]
    pub fn new(
        classifier: Option<SeverityClassifier>,
        service: Option<Arc<dyn CompletionService>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            extractor: FeatureExtractor::new(config.features),
            classifier,
            vision: VisionDamageAnalyzer::new(service.clone(), config.vision),
            cost: CostEstimationEngine::new(service, config.cost),
        }
    }

    /// Assesses one incident. Never fails.
    #[must_use]
    pub fn assess(
        &self,
        images: &[ImageInput],
        location: Option<&str>,
        progress: &dyn ProgressSink,
    ) -> AssessmentReport {
        let mut degradations = Vec::new();
        let references: Vec<String> = images.iter().map(ImageInput::reference).collect();

        let features = self.extract_all(images, &references, progress, &mut degradations);

        let severity = self.classifier.as_ref().map_or_else(
            || {
                degradations.push(Degradation {
                    stage: Stage::Severity,
                    image: None,
                    reason: DegradeReason::ModelUnavailable("severity model not loaded".into()),
                });
                None
            },
            |classifier| {
                Some(classifier.classify(
                    references.iter().map(String::as_str).zip(features.iter()),
                ))
            },
        );

        let vision = record(self.vision.analyze(images), Stage::Vision, &mut degradations);
        let assessment = fuse(severity.as_ref(), &vision, images.len());

        let estimate = record(
            self.cost.estimate(&assessment, location),
            Stage::Cost,
            &mut degradations,
        );

        info!(
            "Assessed {} image(s): {} {} ({}), estimate {:.2} via {:?}",
            images.len(),
            assessment.severity,
            assessment.damage_type,
            assessment.analysis_method.as_str(),
            estimate.total_cost(),
            estimate.source
        );

        AssessmentReport {
            assessment,
            estimate,
            location: location.map(ToString::to_string),
            images: references,
            degradations,
            timestamp: None,
        }
    }

    fn extract_all(
        &self,
        images: &[ImageInput],
        references: &[String],
        progress: &dyn ProgressSink,
        degradations: &mut Vec<Degradation>,
    ) -> Vec<FeatureVector> {
        let total = images.len();
        let mut extracted = 0;

        let features = images
            .iter()
            .zip(references)
            .enumerate()
            .map(|(index, (image, reference))| {
                progress.on_event(ProgressEvent::Started {
                    image: reference.clone(),
                    index,
                    total,
                });
                match self.extractor.extract(image) {
                    Outcome::Ok(vector) => {
                        extracted += 1;
                        progress.on_event(ProgressEvent::Extracted {
                            image: reference.clone(),
                        });
                        vector
                    }
                    Outcome::Degraded(vector, reason) => {
                        progress.on_event(ProgressEvent::Degraded {
                            image: reference.clone(),
                            reason: reason.to_string(),
                        });
                        degradations.push(Degradation {
                            stage: Stage::Features,
                            image: Some(reference.clone()),
                            reason,
                        });
                        vector
                    }
                }
            })
            .collect();

        if total > 0 && extracted == 0 {
            warn!("No usable features in any of {total} image(s)");
        }
        progress.on_event(ProgressEvent::Finished {
            extracted,
            degraded: total - extracted,
        });
        features
    }
}

fn record<T>(outcome: Outcome<T>, stage: Stage, degradations: &mut Vec<Degradation>) -> T {
    match outcome {
        Outcome::Ok(value) => value,
        Outcome::Degraded(value, reason) => {
            degradations.push(Degradation {
                stage,
                image: None,
                reason,
            });
            value
        }
    }
}
