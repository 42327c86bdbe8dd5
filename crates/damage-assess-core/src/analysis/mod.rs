//! Assessment stages: severity classification, vision analysis and fusion.

mod fusion;
pub mod parsing;
mod severity;
mod vision;

pub use fusion::fuse;
pub use severity::{aggregate_votes, SeverityClassifier};
pub use vision::{parse_response, VisionConfig, VisionDamageAnalyzer};
