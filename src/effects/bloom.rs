//! Pyramid glow built from the blur and resampling primitives.

use crate::buffer::pixel::FloatImage;
use crate::effects::blur::gaussian_blur;
use crate::effects::resample::{resize_area, resize_linear};
use crate::foundation::error::RasterFxResult;

/// Multi-scale glow.
///
/// Builds a pyramid of up to `level + 1` half-resolution copies (stopping once a side reaches
/// one pixel), blurs each with a `(2 * radius + 1)` Gaussian, then folds the pyramid back,
/// upsampling each coarser level and adding it to the next finer one.
#[tracing::instrument(skip(img), fields(width = img.width, height = img.height))]
pub fn bloom(img: &FloatImage, level: u32, radius: u32) -> RasterFxResult<FloatImage> {
    if img.width == 0 || img.height == 0 {
        return Ok(img.clone());
    }
    let ksize = radius * 2 + 1;

    let mut pyramid = Vec::with_capacity(level as usize + 1);
    let mut cur = img.clone();
    for i in 0..=level {
        if i > 0 {
            cur = resize_area(&cur, cur.width / 2, cur.height / 2)?;
        }
        pyramid.push(gaussian_blur(&cur, (ksize, ksize), (0.0, 0.0))?);
        if cur.width <= 1 || cur.height <= 1 {
            break;
        }
    }
    tracing::trace!(levels = pyramid.len(), "bloom pyramid built");

    let mut acc = match pyramid.pop() {
        Some(top) => top,
        None => return Ok(img.clone()),
    };
    while let Some(mut finer) = pyramid.pop() {
        let up = resize_linear(&acc, finer.width, finer.height)?;
        finer.add_assign(&up)?;
        acc = finer;
    }
    Ok(acc)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/bloom.rs"]
mod tests;
