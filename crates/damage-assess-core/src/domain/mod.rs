//! Core domain types for damage assessment and pricing.

mod assessment;
mod cost;
mod image;
mod outcome;
mod strategy;
mod taxonomy;

pub use assessment::{
    AnalysisMethod, ImagePrediction, SeverityPrediction, UnifiedAssessment, VisionAssessment,
};
pub use cost::{
    ComplexityLevel, CostBreakdown, CostEstimate, CostSource, MarketAnalysis, PriceRange,
};
pub use image::ImageInput;
pub use outcome::{DegradeReason, Outcome};
pub use strategy::{CostRequest, CostStrategy};
pub use taxonomy::{
    DamageType, RepairComplexity, RepairUrgency, SafetyConcern, Severity, UnknownVariant,
    VehicleType,
};
