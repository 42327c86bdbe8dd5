//! Test support utilities for damage-assess.
//!
//! Provides mocks, synthetic image builders, and an artifact-directory
//! builder for testing the assessment pipeline.
//!
//! # Example
//!
//! ```
//! use damage_assess_test_support::{MockCompletionService, SyntheticImageBuilder};
//!
//! // Create a synthetic photo
//! let panel = SyntheticImageBuilder::scratched_panel(64, 64);
//!
//! // Script the completion service
//! let service = MockCompletionService::fixed(r#"{"damage_type": "Scratch"}"#);
//! ```

mod builders;
mod mocks;

pub use builders::{SeverityArtifactBuilder, SyntheticImageBuilder};
pub use mocks::{MockCompletionService, MockProgressSink};
