//! Histograms and intensity statistics used by feature extraction.

/// Number of bins in every colour histogram.
pub const HISTOGRAM_BINS: usize = 32;

/// Fixed-width 32-bin histogram of 8-bit channel values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinnedHistogram {
    counts: [u64; HISTOGRAM_BINS],
}

impl BinnedHistogram {
    /// Bins values over `[0, 255]`; 255 lands in the last bin.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn closed_range(values: impl Iterator<Item = u8>) -> Self {
        let mut counts = [0u64; HISTOGRAM_BINS];
        let scale = HISTOGRAM_BINS as f64 / 255.0;
        for v in values {
            let bin = ((f64::from(v) * scale) as usize).min(HISTOGRAM_BINS - 1);
            counts[bin] += 1;
        }
        Self { counts }
    }

    /// Bins values over `[0, 256)` in equal steps of eight.
    pub fn half_open_range(values: impl Iterator<Item = u8>) -> Self {
        let mut counts = [0u64; HISTOGRAM_BINS];
        for v in values {
            counts[usize::from(v / 8)] += 1;
        }
        Self { counts }
    }

    /// Bin counts in ascending order.
    #[must_use]
    pub const fn counts(&self) -> &[u64; HISTOGRAM_BINS] {
        &self.counts
    }

    /// Bin counts as feature values.
    #[allow(clippy::cast_precision_loss)]
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.counts.iter().map(|&c| c as f64)
    }
}

/// 256-bin histogram of luminance values.
#[derive(Debug, Clone)]
pub struct LumaHistogram {
    bins: [u64; 256],
    total: u64,
}

impl LumaHistogram {
    /// Compute histogram from luminance samples.
    #[must_use]
    pub fn from_samples(samples: &[u8]) -> Self {
        let mut bins = [0u64; 256];
        for &s in samples {
            bins[usize::from(s)] += 1;
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    /// Returns the total sample count.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Calculate mean luminance.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .bins
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as u64) * count)
            .sum();
        sum as f64 / self.total as f64
    }

    /// Population variance of luminance.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let mean = self.mean();
        self.bins
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let diff = (i as f64) - mean;
                diff * diff * (count as f64)
            })
            .sum::<f64>()
            / (self.total as f64)
    }

    /// Population standard deviation of luminance.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Median luminance; the mean of the two middle samples for even counts.
    #[must_use]
    pub fn median(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let upper = self.value_at_rank(self.total / 2);
        if self.total % 2 == 1 {
            f64::from(upper)
        } else {
            let lower = self.value_at_rank(self.total / 2 - 1);
            (f64::from(lower) + f64::from(upper)) / 2.0
        }
    }

    /// Value of the sample at `rank` (0-based) in sorted order.
    #[allow(clippy::cast_possible_truncation)]
    fn value_at_rank(&self, rank: u64) -> u8 {
        let mut cumulative = 0u64;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            if cumulative > rank {
                // i is a bin index, always 0-255
                return i as u8;
            }
        }
        255
    }
}
