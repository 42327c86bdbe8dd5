//! Deterministic image feature extraction.
//!
//! Every image becomes a fixed-length vector of 144 values:
//! - 96 RGB histogram counts (3 channels × 32 bins)
//! - 4 grayscale statistics (mean, std, variance, median)
//! - 1 edge density
//! - 2 gradient statistics (mean, std)
//! - 41 leading values of the HSV histograms (3 × 32 bins, truncated)
//!
//! The same layout is used by the offline training script, so changing any
//! constant here invalidates existing severity artifacts.

mod gradient;
mod histogram;
mod resize;

use image::RgbImage;
use tracing::{debug, warn};

use crate::domain::{DegradeReason, ImageInput, Outcome};

pub use gradient::GradientField;
pub use histogram::{BinnedHistogram, LumaHistogram, HISTOGRAM_BINS};
pub use resize::resize_linear;

/// Number of values in every feature vector.
pub const FEATURE_LEN: usize = 144;

/// Fixed-length feature vector for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    /// The all-zero vector used for unreadable images.
    #[must_use]
    pub const fn zeros() -> Self {
        Self([0.0; FEATURE_LEN])
    }

    /// Builds a vector from arbitrary values, truncating or zero-padding to `FEATURE_LEN`.
    /// Non-finite values become zero.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut out = [0.0; FEATURE_LEN];
        for (slot, v) in out.iter_mut().zip(values) {
            *slot = if v.is_finite() { v } else { 0.0 };
        }
        Self(out)
    }

    /// Returns the values.
    #[must_use]
    pub const fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// True for the all-zero vector produced by a failed extraction.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

/// Configuration for feature extraction.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// Side length of the canonical square raster.
    pub canonical_size: u32,
    /// Gradient magnitude above which a pixel counts as an edge.
    pub edge_threshold: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            canonical_size: 224,
            edge_threshold: 150.0,
        }
    }
}

/// Image → feature vector extractor. Pure and deterministic for identical bytes.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    /// Creates an extractor with the given configuration.
    #[must_use]
    pub const fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Extracts features from an image reference.
    ///
    /// Never fails: unreadable or undecodable images yield a degraded all-zero vector.
    #[must_use]
    pub fn extract(&self, input: &ImageInput) -> Outcome<FeatureVector> {
        let reference = input.reference();
        match input.read_bytes().and_then(|bytes| self.extract_bytes(&bytes)) {
            Ok(features) => {
                debug!("Extracted features from {reference}");
                Outcome::Ok(features)
            }
            Err(e) => {
                warn!("Feature extraction failed for {reference}: {e:#}");
                Outcome::Degraded(
                    FeatureVector::zeros(),
                    DegradeReason::UnreadableImage(format!("{e:#}")),
                )
            }
        }
    }

    /// Decodes encoded image bytes and extracts features.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded or the image is empty.
    pub fn extract_bytes(&self, bytes: &[u8]) -> anyhow::Result<FeatureVector> {
        let decoded = image::load_from_memory(bytes)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            anyhow::bail!("image has zero area");
        }
        Ok(self.extract_rgb(&decoded.to_rgb8()))
    }

    /// Extracts features from an already-decoded RGB raster.
    #[must_use]
    pub fn extract_rgb(&self, rgb: &RgbImage) -> FeatureVector {
        let size = self.config.canonical_size;
        let resized = resize_linear(rgb, size, size);
        let side = size as usize;

        let mut values: Vec<f64> = Vec::with_capacity(FEATURE_LEN + 2 * HISTOGRAM_BINS);

        // RGB histograms
        for channel in 0..3 {
            let hist = BinnedHistogram::closed_range(resized.pixels().map(|p| p.0[channel]));
            values.extend(hist.values());
        }

        // Grayscale statistics
        let gray: Vec<u8> = resized.pixels().map(|p| luma(p.0)).collect();
        let luma_hist = LumaHistogram::from_samples(&gray);
        values.extend([
            luma_hist.mean(),
            luma_hist.std_dev(),
            luma_hist.variance(),
            luma_hist.median(),
        ]);

        // Edges and gradients
        let field = GradientField::sobel(&gray, side, side);
        values.push(field.edge_density(self.config.edge_threshold));
        values.extend([field.mean(), field.std_dev()]);

        // HSV histograms fill the remaining slots
        let hsv: Vec<[u8; 3]> = resized.pixels().map(|p| to_hsv(p.0)).collect();
        for channel in 0..3 {
            let hist = BinnedHistogram::half_open_range(hsv.iter().map(|p| p[channel]));
            values.extend(hist.values());
        }

        FeatureVector::from_values(values)
    }
}

/// ITU-R BT.601 luma, rounded.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn luma([r, g, b]: [u8; 3]) -> u8 {
    let y = 0.114f64.mul_add(
        f64::from(b),
        0.299f64.mul_add(f64::from(r), 0.587 * f64::from(g)),
    );
    y.round().clamp(0.0, 255.0) as u8
}

/// 8-bit HSV: hue in `[0, 180)`, saturation and value in `[0, 255]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if (max - rf).abs() < f64::EPSILON {
        60.0 * (gf - bf) / delta
    } else if (max - gf).abs() < f64::EPSILON {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h8 = (h / 2.0).round();
    // 359.x degrees rounds up to 180, which wraps to 0
    let h8 = if h8 >= 180.0 { 0.0 } else { h8 };

    [
        h8 as u8,
        s.round().clamp(0.0, 255.0) as u8,
        max as u8,
    ]
}
