//! Cost strategy trait for interchangeable pricing engines.

use super::{CostEstimate, DegradeReason, UnifiedAssessment};

/// Input to a cost strategy.
#[derive(Debug, Clone, Copy)]
pub struct CostRequest<'a> {
    /// Fused damage assessment.
    pub assessment: &'a UnifiedAssessment,
    /// Free-text location of the vehicle, if known.
    pub location: Option<&'a str>,
}

/// Trait for implementing repair-cost strategies.
///
/// Each strategy prices a fused assessment and tags the estimate with its
/// `CostSource`.
pub trait CostStrategy: Send + Sync {
    /// Returns the name of this strategy.
    fn name(&self) -> &'static str;

    /// Produces a cost estimate.
    ///
    /// # Errors
    ///
    /// Returns the reason the strategy could not price the request; callers
    /// are expected to fall back to another strategy.
    fn estimate(&self, request: &CostRequest<'_>) -> Result<CostEstimate, DegradeReason>;
}
