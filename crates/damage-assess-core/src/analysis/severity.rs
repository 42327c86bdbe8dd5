//! Severity classification with a confidence-weighted vote across images.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{ImagePrediction, Severity, SeverityPrediction};
use crate::features::FeatureVector;
use crate::inference::{ArtifactError, ArtifactFingerprint, ModelLayout, SeverityArtifacts};

/// Pretrained severity classifier.
///
/// Cheap to clone; clones share the immutable artifact set.
#[derive(Debug, Clone)]
pub struct SeverityClassifier {
    artifacts: Arc<SeverityArtifacts>,
}

impl SeverityClassifier {
    /// Loads the artifact set from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an `ArtifactError` if the artifacts are missing, corrupt or
    /// inconsistent. Callers treat this as "severity unavailable".
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        SeverityArtifacts::load(dir).map(Self::from_artifacts)
    }

    /// Wraps an already-loaded artifact set.
    #[must_use]
    pub fn from_artifacts(artifacts: SeverityArtifacts) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
        }
    }

    /// Layout the model was loaded from.
    #[must_use]
    pub fn layout(&self) -> ModelLayout {
        self.artifacts.layout
    }

    /// Fingerprints of the loaded artifact files.
    #[must_use]
    pub fn fingerprints(&self) -> &[ArtifactFingerprint] {
        &self.artifacts.fingerprints
    }

    /// Predicts one image. Degraded (all-zero) vectors are not classified.
    #[must_use]
    pub fn predict_image(&self, image: &str, features: &FeatureVector) -> Option<ImagePrediction> {
        if features.is_degraded() {
            debug!("Skipping degraded features for {image}");
            return None;
        }
        let (label, confidence) = self.artifacts.predict(features.as_slice());
        debug!("{image}: {label} ({confidence:.3})");
        Some(ImagePrediction {
            image: image.to_string(),
            label,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    /// Classifies every image of an incident and aggregates the result.
    #[must_use]
    pub fn classify<'a, I>(&self, images: I) -> SeverityPrediction
    where
        I: IntoIterator<Item = (&'a str, &'a FeatureVector)>,
    {
        let predictions = images
            .into_iter()
            .filter_map(|(image, features)| self.predict_image(image, features))
            .collect();
        aggregate_votes(predictions)
    }
}

/// Confidence-weighted majority vote.
///
/// Each label scores the sum of the confidences of the images predicting it.
/// The winner's confidence is its share of the total score. Ties go to the
/// more severe label. No predictions yields the neutral floor.
#[must_use]
pub fn aggregate_votes(predictions: Vec<ImagePrediction>) -> SeverityPrediction {
    if predictions.is_empty() {
        return SeverityPrediction::neutral();
    }

    let mut scores = [None::<f64>; Severity::ALL.len()];
    for p in &predictions {
        *scores[p.label as usize].get_or_insert(0.0) += p.confidence;
    }
    let total: f64 = scores.iter().flatten().sum();

    // Iterating in ascending order with >= lets the more severe label win ties
    let (label, score) = Severity::ALL
        .into_iter()
        .zip(scores)
        .filter_map(|(label, score)| score.map(|s| (label, s)))
        .fold((Severity::Minor, f64::NEG_INFINITY), |best, (label, score)| {
            if score >= best.1 {
                (label, score)
            } else {
                best
            }
        });

    let confidence = if total > 0.0 { score / total } else { 0.5 };

    SeverityPrediction {
        label,
        confidence,
        per_image: predictions,
    }
}
