//! Synthetic image and artifact builders for testing.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use damage_assess_core::inference::{
    Estimator, LabelEncoder, LogisticRegression, ModelLayout, StandardScaler, VotingEnsemble,
    LABEL_ENCODER_FILE, SCALER_FILE,
};
use damage_assess_core::{ImageInput, FEATURE_LEN};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Builder for creating synthetic vehicle photographs.
///
/// Images are encoded in memory so they can be handed to the pipeline as
/// byte buffers or written to disk for the CLI.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a two-colour checkerboard (dense edges, like crumpled panels).
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> DynamicImage {
        let cell = cell_size.max(1);
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([230, 230, 230])
            } else {
                Rgb([20, 20, 20])
            }
        }))
    }

    /// Creates a silver panel with a dark diagonal scratch.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn scratched_panel(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x as i64 - y as i64).abs() <= 1 {
                Rgb([40, 35, 30])
            } else {
                Rgb([192, 192, 200])
            }
        }))
    }

    /// Encodes an image as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .context("Failed to encode PNG")?;
        Ok(out.into_inner())
    }

    /// Encodes an image as an in-memory pipeline input.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn input(name: &str, image: &DynamicImage) -> Result<ImageInput> {
        Ok(ImageInput::from_bytes(name, Self::png_bytes(image)?))
    }

    /// Bytes that no decoder accepts.
    #[must_use]
    pub fn corrupt_bytes() -> Vec<u8> {
        b"this is not an image".to_vec()
    }

    /// Writes an image as PNG to `dir/name` and returns the path.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn write_png(dir: &Path, name: &str, image: &DynamicImage) -> Result<PathBuf> {
        let path = dir.join(name);
        std::fs::write(&path, Self::png_bytes(image)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Writes a valid severity-model artifact directory.
///
/// The classifier is a logistic regression with zero coefficients, so every
/// image is assigned the favoured label with the same probability.
#[derive(Debug, Clone)]
pub struct SeverityArtifactBuilder {
    labels: Vec<String>,
    favored: usize,
    margin: f64,
    layout: ModelLayout,
    features: usize,
}

impl Default for SeverityArtifactBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SeverityArtifactBuilder {
    /// Three training-style labels, favouring `02-moderate`, voting layout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            labels: vec!["01-minor".into(), "02-moderate".into(), "03-severe".into()],
            favored: 1,
            margin: 2.0,
            layout: ModelLayout::Voting,
            features: FEATURE_LEN,
        }
    }

    /// Replaces the label set.
    #[must_use]
    pub fn labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(ToString::to_string).collect();
        self
    }

    /// Favours the label at `index` by `margin` logits.
    #[must_use]
    pub const fn favoring(mut self, index: usize, margin: f64) -> Self {
        self.favored = index;
        self.margin = margin;
        self
    }

    /// Selects the classifier layout.
    #[must_use]
    pub const fn layout(mut self, layout: ModelLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Overrides the feature width, for dimension-mismatch tests.
    #[must_use]
    pub const fn features(mut self, features: usize) -> Self {
        self.features = features;
        self
    }

    fn estimator(&self) -> Estimator {
        let n = self.labels.len();
        Estimator::LogisticRegression(LogisticRegression {
            coef: vec![vec![0.0; self.features]; n],
            intercept: (0..n)
                .map(|i| if i == self.favored { self.margin } else { 0.0 })
                .collect(),
        })
    }

    /// Writes the three artifact files into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let model = match self.layout {
            ModelLayout::Voting => serde_json::to_vec_pretty(&VotingEnsemble {
                estimators: vec![self.estimator(), self.estimator()],
                weights: None,
            }),
            ModelLayout::Single => serde_json::to_vec_pretty(&self.estimator()),
        }
        .context("Failed to serialize model")?;
        write_file(dir, self.layout.model_file(), &model)?;

        let scaler = StandardScaler {
            mean: vec![0.0; self.features],
            scale: vec![1.0; self.features],
        };
        write_file(
            dir,
            SCALER_FILE,
            &serde_json::to_vec_pretty(&scaler).context("Failed to serialize scaler")?,
        )?;

        let encoder = LabelEncoder {
            classes: self.labels.clone(),
        };
        write_file(
            dir,
            LABEL_ENCODER_FILE,
            &serde_json::to_vec_pretty(&encoder).context("Failed to serialize labels")?,
        )
    }
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use damage_assess_core::{Severity, SeverityClassifier};
    use tempfile::TempDir;

    #[test]
    fn test_png_round_trips_through_decoder() {
        let image = SyntheticImageBuilder::checkerboard(32, 16, 4);
        let bytes = SyntheticImageBuilder::png_bytes(&image).expect("encode");
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 16);
    }

    #[test]
    fn test_corrupt_bytes_do_not_decode() {
        assert!(image::load_from_memory(&SyntheticImageBuilder::corrupt_bytes()).is_err());
    }

    #[test]
    fn test_scratched_panel_has_dark_diagonal() {
        let rgb = SyntheticImageBuilder::scratched_panel(20, 20).to_rgb8();
        assert_eq!(rgb.get_pixel(5, 5).0, [40, 35, 30]);
        assert_eq!(rgb.get_pixel(15, 2).0, [192, 192, 200]);
    }

    #[test]
    fn test_written_artifacts_load() {
        let dir = TempDir::new().expect("tempdir");
        SeverityArtifactBuilder::new()
            .favoring(2, 3.0)
            .write(dir.path())
            .expect("write artifacts");

        let classifier = SeverityClassifier::load(dir.path()).expect("load artifacts");
        assert_eq!(classifier.layout(), ModelLayout::Voting);
        assert_eq!(classifier.fingerprints().len(), 3);

        let features = damage_assess_core::FeatureVector::from_values([1.0; FEATURE_LEN]);
        let prediction = classifier
            .predict_image("front.jpg", &features)
            .expect("non-degraded vector votes");
        assert_eq!(prediction.label, Severity::Severe);
    }
}
