//! Damage Assess Core - Domain logic and the assessment-and-pricing pipeline
//!
//! This crate contains the core domain types, the ports for external
//! collaborators, and the pipeline stages: feature extraction, severity
//! classification, vision analysis, result fusion and cost estimation.

pub mod analysis;
pub mod cost;
pub mod domain;
pub mod features;
pub mod inference;
pub mod pipeline;
pub mod ports;

pub use analysis::{SeverityClassifier, VisionConfig, VisionDamageAnalyzer};
pub use cost::{CostConfig, CostEstimationEngine, StrategyKind};
pub use domain::{
    AnalysisMethod, CostEstimate, DamageType, DegradeReason, ImageInput, Outcome, Severity,
    UnifiedAssessment, VehicleType,
};
pub use features::{FeatureConfig, FeatureExtractor, FeatureVector, FEATURE_LEN};
pub use inference::ArtifactError;
pub use pipeline::{AssessmentPipeline, AssessmentReport, PipelineConfig};
pub use ports::{CompletionService, ImageSource, ProgressEvent, ProgressSink, ResultOutput};
