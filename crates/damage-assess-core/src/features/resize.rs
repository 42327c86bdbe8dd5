//! Bilinear resampling with half-pixel centres.
//!
//! Sample positions follow the OpenCV `INTER_LINEAR` convention the severity
//! artifacts were trained with: destination pixel `d` maps to source
//! coordinate `(d + 0.5) * scale - 0.5`, clamped to the image edges. Unlike
//! `image::imageops::resize`, the kernel never widens when downscaling.

use image::{Rgb, RgbImage};

/// One axis of the resampling: left source index, right source index, weight of the right one.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tap {
    lo: u32,
    hi: u32,
    frac: f64,
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn taps(src_len: u32, dst_len: u32) -> Vec<Tap> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    let last = src_len - 1;
    (0..dst_len)
        .map(|d| {
            let pos = (f64::from(d) + 0.5).mul_add(scale, -0.5);
            let floor = pos.floor();
            if floor < 0.0 {
                Tap { lo: 0, hi: 0, frac: 0.0 }
            } else if floor as u32 >= last {
                Tap { lo: last, hi: last, frac: 0.0 }
            } else {
                let lo = floor as u32;
                Tap { lo, hi: lo + 1, frac: pos - floor }
            }
        })
        .collect()
}

/// Resizes `src` to `width` × `height`. Both source dimensions must be non-zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn resize_linear(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let xs = taps(src.width(), width);
    let ys = taps(src.height(), height);

    RgbImage::from_fn(width, height, |x, y| {
        let tx = xs[x as usize];
        let ty = ys[y as usize];
        let p00 = src.get_pixel(tx.lo, ty.lo).0;
        let p01 = src.get_pixel(tx.hi, ty.lo).0;
        let p10 = src.get_pixel(tx.lo, ty.hi).0;
        let p11 = src.get_pixel(tx.hi, ty.hi).0;

        let mut out = [0u8; 3];
        for (c, value) in out.iter_mut().enumerate() {
            let top = (f64::from(p01[c]) - f64::from(p00[c])).mul_add(tx.frac, f64::from(p00[c]));
            let bottom =
                (f64::from(p11[c]) - f64::from(p10[c])).mul_add(tx.frac, f64::from(p10[c]));
            *value = (bottom - top).mul_add(ty.frac, top).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[u8]) -> RgbImage {
        RgbImage::from_fn(values.len() as u32, 1, |x, _| {
            let v = values[x as usize];
            Rgb([v, v, v])
        })
    }

    fn reds(img: &RgbImage) -> Vec<u8> {
        img.pixels().map(|p| p.0[0]).collect()
    }

    #[test]
    fn test_same_size_is_identity() {
        let src = row(&[3, 90, 250, 17]);
        assert_eq!(resize_linear(&src, 4, 1), src);
    }

    #[test]
    fn test_halving_averages_neighbours() {
        let src = row(&[0, 200, 40, 60]);
        assert_eq!(reds(&resize_linear(&src, 2, 1)), vec![100, 50]);
    }

    #[test]
    fn test_upscale_clamps_at_edges() {
        // Centres at -0.25, 0.25, 0.75, 1.25 in source pixels
        let src = row(&[0, 200]);
        assert_eq!(reds(&resize_linear(&src, 4, 1)), vec![0, 50, 150, 200]);
    }

    #[test]
    fn test_downscale_does_not_widen_kernel() {
        // 8 -> 2: centres at 1.5 and 5.5, so pixels 0 and 7 never contribute
        let src = row(&[255, 10, 30, 0, 0, 50, 70, 255]);
        assert_eq!(reds(&resize_linear(&src, 2, 1)), vec![20, 60]);
    }
}
