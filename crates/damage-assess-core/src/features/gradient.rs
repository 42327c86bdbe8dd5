//! Sobel gradient magnitudes over a grayscale raster.

/// Gradient magnitudes of a `width × height` raster.
#[derive(Debug, Clone)]
pub struct GradientField {
    magnitudes: Vec<f64>,
}

/// Mirror index without repeating the edge sample (`dcb|abcd|cba`).
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
const fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i as usize
}

impl GradientField {
    /// Computes 3×3 Sobel magnitudes with reflect-101 borders.
    ///
    /// `gray` is row-major and must hold `width * height` samples.
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn sobel(gray: &[u8], width: usize, height: usize) -> Self {
        let mut magnitudes = Vec::with_capacity(width * height);
        if gray.len() < width * height {
            return Self { magnitudes };
        }

        let at = |x: isize, y: isize| -> f64 {
            let xi = reflect_101(x, width);
            let yi = reflect_101(y, height);
            f64::from(gray[yi * width + xi])
        };

        for y in 0..height as isize {
            for x in 0..width as isize {
                let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
                let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
                magnitudes.push(gx.hypot(gy));
            }
        }

        Self { magnitudes }
    }

    /// Fraction of pixels whose magnitude exceeds `threshold`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn edge_density(&self, threshold: f64) -> f64 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        let edges = self.magnitudes.iter().filter(|&&m| m > threshold).count();
        edges as f64 / self.magnitudes.len() as f64
    }

    /// Mean gradient magnitude.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        self.magnitudes.iter().sum::<f64>() / self.magnitudes.len() as f64
    }

    /// Population standard deviation of gradient magnitude.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .magnitudes
            .iter()
            .map(|m| (m - mean).powi(2))
            .sum::<f64>()
            / self.magnitudes.len() as f64;
        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(0, 5), 0);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(-1, 1), 0);
    }

    #[test]
    fn test_flat_image_has_no_gradient() {
        let gray = vec![128u8; 16 * 16];
        let field = GradientField::sobel(&gray, 16, 16);
        assert!(field.mean().abs() < f64::EPSILON);
        assert!(field.std_dev().abs() < f64::EPSILON);
        assert!(field.edge_density(150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_vertical_step_is_an_edge() {
        // Left half black, right half white
        let (w, h) = (16usize, 8usize);
        let gray: Vec<u8> = (0..w * h)
            .map(|i| if i % w < w / 2 { 0 } else { 255 })
            .collect();
        let field = GradientField::sobel(&gray, w, h);

        // Two columns either side of the step respond with 4 * 255 = 1020
        let density = field.edge_density(150.0);
        assert!((density - 2.0 / 16.0).abs() < 1e-9, "density={density}");
        assert!(field.mean() > 0.0);
    }

    #[test]
    fn test_short_buffer_yields_empty_field() {
        let field = GradientField::sobel(&[1, 2, 3], 4, 4);
        assert!(field.mean().abs() < f64::EPSILON);
    }
}
