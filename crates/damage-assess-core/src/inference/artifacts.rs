//! Severity-model artifact directory.
//!
//! A directory holds three JSON artifacts: the classifier (either
//! `voting_model.json` or `model.json`), `scaler.json` and
//! `label_encoder.json`. The voting layout is preferred.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::estimator::{Estimator, StandardScaler, VotingEnsemble};
use super::loader::{load_json, Loaded};
use crate::domain::Severity;
use crate::features::FEATURE_LEN;

/// File name of the multi-model classifier.
pub const VOTING_MODEL_FILE: &str = "voting_model.json";
/// File name of the single-model classifier.
pub const SINGLE_MODEL_FILE: &str = "model.json";
/// File name of the feature scaler.
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the ordered class labels.
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";

/// Errors that make the severity model unavailable for the process lifetime.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Neither classifier layout is present.
    #[error("no severity model in {}: expected voting_model.json or model.json", .0.display())]
    NoModel(PathBuf),
    /// A required artifact file is absent.
    #[error("missing artifact: {}", .0.display())]
    Missing(PathBuf),
    /// An artifact could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// An artifact is not valid JSON for its type.
    #[error("corrupt artifact {}", path.display())]
    Parse {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// A class label does not name a severity.
    #[error("unrecognised severity label '{0}'")]
    UnknownLabel(String),
    /// The artifacts disagree on feature or class counts.
    #[error("inconsistent artifacts: {0}")]
    Dimension(String),
}

/// Which classifier layout an artifact directory uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelLayout {
    /// `voting_model.json`: a soft-voting ensemble.
    Voting,
    /// `model.json`: one estimator.
    Single,
}

impl ModelLayout {
    /// Detects the layout present in `dir`, preferring `Voting`.
    #[must_use]
    pub fn detect(dir: &Path) -> Option<Self> {
        if dir.join(VOTING_MODEL_FILE).is_file() {
            Some(Self::Voting)
        } else if dir.join(SINGLE_MODEL_FILE).is_file() {
            Some(Self::Single)
        } else {
            None
        }
    }

    /// File name of the classifier artifact for this layout.
    #[must_use]
    pub const fn model_file(self) -> &'static str {
        match self {
            Self::Voting => VOTING_MODEL_FILE,
            Self::Single => SINGLE_MODEL_FILE,
        }
    }
}

impl fmt::Display for ModelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Voting => f.write_str("voting"),
            Self::Single => f.write_str("single"),
        }
    }
}

/// Ordered class labels as exported by the training script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Class labels in estimator output order.
    pub classes: Vec<String>,
}

/// The loaded classifier.
#[derive(Debug, Clone)]
pub enum SeverityModel {
    /// Soft-voting ensemble.
    Voting(VotingEnsemble),
    /// Single estimator.
    Single(Estimator),
}

impl SeverityModel {
    /// Class probabilities for one standardised vector.
    #[must_use]
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Self::Voting(m) => m.predict_proba(x),
            Self::Single(m) => m.predict_proba(x),
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        match self {
            Self::Voting(m) => m.validate(n_features, n_classes),
            Self::Single(m) => m.validate(n_features, n_classes),
        }
    }
}

/// SHA-256 of one artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFingerprint {
    /// File name within the artifact directory.
    pub file: &'static str,
    /// Lowercase hex digest.
    pub sha256: String,
}

/// A validated, immutable severity-model artifact set.
#[derive(Debug, Clone)]
pub struct SeverityArtifacts {
    /// Layout the classifier was loaded from.
    pub layout: ModelLayout,
    /// The classifier.
    pub model: SeverityModel,
    /// Feature standardisation.
    pub scaler: StandardScaler,
    /// Canonical labels in classifier output order.
    pub labels: Vec<Severity>,
    /// Fingerprints of the loaded files.
    pub fingerprints: Vec<ArtifactFingerprint>,
}

impl SeverityArtifacts {
    /// Loads and validates the artifact set in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither classifier layout is present
    /// - The scaler or label encoder is missing
    /// - Any file is unreadable or not valid JSON
    /// - A label is not a recognised severity
    /// - The scaler does not cover exactly 144 features, or the classifier
    ///   disagrees with the scaler or label set
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let layout =
            ModelLayout::detect(dir).ok_or_else(|| ArtifactError::NoModel(dir.to_path_buf()))?;
        let model_path = dir.join(layout.model_file());

        let (model, model_sha) = match layout {
            ModelLayout::Voting => {
                let Loaded { value, sha256 } = load_json::<VotingEnsemble>(&model_path)?;
                (SeverityModel::Voting(value), sha256)
            }
            ModelLayout::Single => {
                let Loaded { value, sha256 } = load_json::<Estimator>(&model_path)?;
                (SeverityModel::Single(value), sha256)
            }
        };
        let scaler = load_json::<StandardScaler>(&dir.join(SCALER_FILE))?;
        let encoder = load_json::<LabelEncoder>(&dir.join(LABEL_ENCODER_FILE))?;

        let labels = encoder
            .value
            .classes
            .iter()
            .map(|c| c.parse::<Severity>().map_err(|_| ArtifactError::UnknownLabel(c.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        if labels.is_empty() {
            return Err(ArtifactError::Dimension("label set is empty".into()));
        }

        let n_features = scaler.value.n_features();
        if n_features != FEATURE_LEN || scaler.value.scale.len() != FEATURE_LEN {
            return Err(ArtifactError::Dimension(format!(
                "scaler covers {n_features} features, expected {FEATURE_LEN}"
            )));
        }
        model
            .validate(n_features, labels.len())
            .map_err(ArtifactError::Dimension)?;

        let fingerprints = vec![
            ArtifactFingerprint {
                file: layout.model_file(),
                sha256: model_sha,
            },
            ArtifactFingerprint {
                file: SCALER_FILE,
                sha256: scaler.sha256,
            },
            ArtifactFingerprint {
                file: LABEL_ENCODER_FILE,
                sha256: encoder.sha256,
            },
        ];

        info!(
            "Loaded {layout} severity model from {} ({} classes, model sha256 {})",
            dir.display(),
            labels.len(),
            short_digest(&fingerprints[0].sha256)
        );

        Ok(Self {
            layout,
            model,
            scaler: scaler.value,
            labels,
            fingerprints,
        })
    }

    /// Standardises `features` and returns the most probable label with its probability.
    ///
    /// Ties go to the more severe label.
    #[must_use]
    pub fn predict(&self, features: &[f64]) -> (Severity, f64) {
        let scaled = self.scaler.transform(features);
        let proba = self.model.predict_proba(&scaled);
        self.labels
            .iter()
            .zip(proba)
            .fold((Severity::Minor, f64::NEG_INFINITY), |best, (&label, p)| {
                if p > best.1 || ((p - best.1).abs() < f64::EPSILON && label > best.0) {
                    (label, p)
                } else {
                    best
                }
            })
    }
}

fn short_digest(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::inference::estimator::LogisticRegression;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, value: &impl Serialize) {
        let json = serde_json::to_vec(value).expect("serialize");
        std::fs::write(dir.join(name), json).expect("write artifact");
    }

    fn uniform_lr(classes: usize) -> Estimator {
        Estimator::LogisticRegression(LogisticRegression {
            coef: vec![vec![0.0; FEATURE_LEN]; classes],
            intercept: (0..classes).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect(),
        })
    }

    fn write_common(dir: &Path, labels: &[&str]) {
        write(
            dir,
            SCALER_FILE,
            &StandardScaler {
                mean: vec![0.0; FEATURE_LEN],
                scale: vec![1.0; FEATURE_LEN],
            },
        );
        write(
            dir,
            LABEL_ENCODER_FILE,
            &LabelEncoder {
                classes: labels.iter().map(ToString::to_string).collect(),
            },
        );
    }

    #[test]
    fn test_empty_dir_has_no_model() {
        let dir = TempDir::new().expect("temp dir");
        let err = SeverityArtifacts::load(dir.path()).expect_err("should fail");
        assert!(matches!(err, ArtifactError::NoModel(_)));
    }

    #[test]
    fn test_single_layout_loads() {
        let dir = TempDir::new().expect("temp dir");
        write_common(dir.path(), &["01-minor", "02-moderate", "03-severe"]);
        write(dir.path(), SINGLE_MODEL_FILE, &uniform_lr(3));

        let artifacts = SeverityArtifacts::load(dir.path()).expect("load");
        assert_eq!(artifacts.layout, ModelLayout::Single);
        assert_eq!(
            artifacts.labels,
            vec![Severity::Minor, Severity::Moderate, Severity::Severe]
        );
        assert_eq!(artifacts.fingerprints.len(), 3);

        let (label, confidence) = artifacts.predict(&[0.0; FEATURE_LEN]);
        assert_eq!(label, Severity::Minor);
        assert!(confidence > 0.4);
    }

    #[test]
    fn test_voting_layout_preferred() {
        let dir = TempDir::new().expect("temp dir");
        write_common(dir.path(), &["minor", "severe"]);
        write(dir.path(), SINGLE_MODEL_FILE, &uniform_lr(2));
        write(
            dir.path(),
            VOTING_MODEL_FILE,
            &VotingEnsemble {
                estimators: vec![uniform_lr(2), uniform_lr(2)],
                weights: None,
            },
        );

        let artifacts = SeverityArtifacts::load(dir.path()).expect("load");
        assert_eq!(artifacts.layout, ModelLayout::Voting);
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        write_common(dir.path(), &["minor", "catastrophic"]);
        write(dir.path(), SINGLE_MODEL_FILE, &uniform_lr(2));

        let err = SeverityArtifacts::load(dir.path()).expect_err("should fail");
        assert!(matches!(err, ArtifactError::UnknownLabel(l) if l == "catastrophic"));
    }

    #[test]
    fn test_class_count_mismatch_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        write_common(dir.path(), &["minor", "moderate", "severe", "critical"]);
        write(dir.path(), SINGLE_MODEL_FILE, &uniform_lr(3));

        let err = SeverityArtifacts::load(dir.path()).expect_err("should fail");
        assert!(matches!(err, ArtifactError::Dimension(_)));
    }

    #[test]
    fn test_missing_scaler_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), SINGLE_MODEL_FILE, &uniform_lr(2));
        write(
            dir.path(),
            LABEL_ENCODER_FILE,
            &LabelEncoder {
                classes: vec!["minor".into(), "severe".into()],
            },
        );

        let err = SeverityArtifacts::load(dir.path()).expect_err("should fail");
        assert!(matches!(err, ArtifactError::Missing(p) if p.ends_with(SCALER_FILE)));
    }

    #[test]
    fn test_tie_prefers_more_severe_label() {
        let dir = TempDir::new().expect("temp dir");
        write_common(dir.path(), &["minor", "critical"]);
        write(
            dir.path(),
            SINGLE_MODEL_FILE,
            &Estimator::LogisticRegression(LogisticRegression {
                coef: vec![vec![0.0; FEATURE_LEN]; 2],
                intercept: vec![0.0, 0.0],
            }),
        );

        let artifacts = SeverityArtifacts::load(dir.path()).expect("load");
        let (label, confidence) = artifacts.predict(&[0.0; FEATURE_LEN]);
        assert_eq!(label, Severity::Critical);
        assert!((confidence - 0.5).abs() < 1e-9);
    }
}
