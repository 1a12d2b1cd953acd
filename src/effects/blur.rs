//! Separable Gaussian blur over float images.

use rayon::prelude::*;

use crate::buffer::pixel::FloatImage;
use crate::foundation::error::{RasterFxError, RasterFxResult};

/// Sigma derived from the kernel size when none is given.
pub fn auto_sigma(ksize: u32) -> f64 {
    0.3 * ((f64::from(ksize) - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian of odd length `ksize`. A non-positive `sigma` is derived from `ksize`.
pub fn gaussian_kernel(ksize: u32, sigma: f64) -> RasterFxResult<Vec<f32>> {
    if ksize == 0 || ksize % 2 == 0 {
        return Err(RasterFxError::validation(format!(
            "gaussian kernel size must be odd and positive, got {ksize}"
        )));
    }
    if !sigma.is_finite() {
        return Err(RasterFxError::validation("gaussian sigma must be finite"));
    }
    if ksize == 1 {
        return Ok(vec![1.0]);
    }
    let sigma = if sigma > 0.0 { sigma } else { auto_sigma(ksize) };

    let r = (ksize / 2) as i64;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(RasterFxError::compute("gaussian kernel sum is zero"));
    }
    Ok(weights.into_iter().map(|w| (w / sum) as f32).collect())
}

/// Separable Gaussian blur with reflect-101 borders (`dcb|abcd|cba`).
///
/// Sigmas follow the usual convention: a zero `sigma_y` copies `sigma_x`, then each remaining
/// non-positive sigma is derived from its kernel size.
pub fn gaussian_blur(
    src: &FloatImage,
    ksize: (u32, u32),
    sigma: (f64, f64),
) -> RasterFxResult<FloatImage> {
    let (sigma_x, sigma_y) = (sigma.0, if sigma.1 == 0.0 { sigma.0 } else { sigma.1 });
    let kx = gaussian_kernel(ksize.0, sigma_x)?;
    let ky = gaussian_kernel(ksize.1, sigma_y)?;
    if src.width == 0 || src.height == 0 {
        return Ok(src.clone());
    }

    let tmp = horizontal_pass(src, &kx);
    Ok(vertical_pass(&tmp, &ky))
}

/// Reflect-101 index into `0..n`.
pub(crate) fn reflect101(i: i64, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as i64;
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m }) as usize
}

fn horizontal_pass(src: &FloatImage, k: &[f32]) -> FloatImage {
    let mut out = FloatImage::new(src.width, src.height, src.channels);
    let radius = (k.len() / 2) as i64;
    let w = src.width as usize;
    let ch = src.channels;
    let row_len = src.row_len();
    out.data
        .par_chunks_mut(row_len)
        .zip(src.data.par_chunks(row_len))
        .for_each(|(dst, row)| {
            for x in 0..w {
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = reflect101(x as i64 + ki as i64 - radius, w);
                    for c in 0..ch {
                        dst[x * ch + c] += kw * row[sx * ch + c];
                    }
                }
            }
        });
    out
}

fn vertical_pass(src: &FloatImage, k: &[f32]) -> FloatImage {
    let mut out = FloatImage::new(src.width, src.height, src.channels);
    let radius = (k.len() / 2) as i64;
    let h = src.height as usize;
    let row_len = src.row_len();
    out.data
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, dst)| {
            for (ki, &kw) in k.iter().enumerate() {
                let sy = reflect101(y as i64 + ki as i64 - radius, h);
                let row = &src.data[sy * row_len..(sy + 1) * row_len];
                for (d, &s) in dst.iter_mut().zip(row) {
                    *d += kw * s;
                }
            }
        });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
