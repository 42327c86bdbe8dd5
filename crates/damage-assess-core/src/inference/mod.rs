//! Severity-model inference.
//!
//! Provides artifact loading and pure-Rust evaluation for:
//! - Logistic regression
//! - Random forest
//! - Gradient boosting
//! - Soft-voting ensembles of the above

mod artifacts;
mod estimator;
mod loader;

pub use artifacts::{
    ArtifactError, ArtifactFingerprint, LabelEncoder, ModelLayout, SeverityArtifacts,
    SeverityModel, LABEL_ENCODER_FILE, SCALER_FILE, SINGLE_MODEL_FILE, VOTING_MODEL_FILE,
};
pub use estimator::{
    DecisionTree, Estimator, GradientBoosting, LogisticRegression, RandomForest, StandardScaler,
    TreeNode, VotingEnsemble,
};
pub use loader::{load_json, sha256_hex, Loaded};
