//! Image resizing: area averaging for reduction, bilinear and clamped bicubic for enlargement.
//!
//! All three use pixel-center alignment: destination pixel `d` maps to source coordinate
//! `(d + 0.5) * src / dst - 0.5`.

use rayon::prelude::*;

use crate::buffer::pixel::FloatImage;
use crate::foundation::error::{RasterFxError, RasterFxResult};

/// Bicubic kernel coefficient.
const CUBIC_A: f32 = -0.75;

fn check(src: &FloatImage, width: u32, height: u32) -> RasterFxResult<()> {
    if src.width == 0 || src.height == 0 {
        return Err(RasterFxError::validation("cannot resample an empty image"));
    }
    if width == 0 || height == 0 {
        return Err(RasterFxError::validation("resample target must be non-empty"));
    }
    Ok(())
}

/// Box-filter reduction: each destination pixel averages the source area it covers.
pub fn resize_area(src: &FloatImage, width: u32, height: u32) -> RasterFxResult<FloatImage> {
    check(src, width, height)?;
    let wx = area_weights(src.width, width);
    let wy = area_weights(src.height, height);
    Ok(separable(src, width, height, &wx, &wy))
}

/// Bilinear interpolation with edge clamping.
pub fn resize_linear(src: &FloatImage, width: u32, height: u32) -> RasterFxResult<FloatImage> {
    check(src, width, height)?;
    let wx = linear_weights(src.width, width);
    let wy = linear_weights(src.height, height);
    Ok(separable(src, width, height, &wx, &wy))
}

/// Bicubic interpolation with edge replication.
///
/// Every output sample is clamped into the range of the 16 source samples it was built from,
/// so the result never overshoots its neighborhood.
pub fn resize_cubic(src: &FloatImage, width: u32, height: u32) -> RasterFxResult<FloatImage> {
    check(src, width, height)?;
    let tx = cubic_taps(src.width, width);
    let ty = cubic_taps(src.height, height);
    let ch = src.channels;
    let sw = src.width as usize;
    let mut out = FloatImage::new(width, height, ch);
    let row_len = out.row_len();

    out.data
        .par_chunks_mut(row_len)
        .zip(ty.par_iter())
        .for_each(|(dst, (yi, yw))| {
            for (x, (xi, xw)) in tx.iter().enumerate() {
                for c in 0..ch {
                    let mut acc = 0.0f32;
                    let mut lo = f32::INFINITY;
                    let mut hi = f32::NEG_INFINITY;
                    for (&sy, &wy) in yi.iter().zip(yw) {
                        for (&sx, &wx) in xi.iter().zip(xw) {
                            let v = src.data[(sy * sw + sx) * ch + c];
                            acc += wx * wy * v;
                            lo = lo.min(v);
                            hi = hi.max(v);
                        }
                    }
                    dst[x * ch + c] = acc.clamp(lo, hi);
                }
            }
        });
    Ok(out)
}

/// Per-destination list of `(source index, weight)` pairs along one axis.
type AxisWeights = Vec<Vec<(usize, f32)>>;

fn source_coord(d: u32, src: u32, dst: u32) -> f64 {
    (f64::from(d) + 0.5) * f64::from(src) / f64::from(dst) - 0.5
}

fn area_weights(src: u32, dst: u32) -> AxisWeights {
    let scale = f64::from(src) / f64::from(dst);
    (0..dst)
        .map(|d| {
            let lo = f64::from(d) * scale;
            let hi = lo + scale;
            let first = lo.floor() as usize;
            let last = (hi.ceil() as usize).min(src as usize);
            (first..last)
                .filter_map(|s| {
                    let cover = (hi.min(s as f64 + 1.0) - lo.max(s as f64)).max(0.0);
                    (cover > 0.0).then_some((s, (cover / scale) as f32))
                })
                .collect()
        })
        .collect()
}

fn linear_weights(src: u32, dst: u32) -> AxisWeights {
    let last = src as usize - 1;
    (0..dst)
        .map(|d| {
            let s = source_coord(d, src, dst).max(0.0);
            let i = (s.floor() as usize).min(last);
            let t = (s - i as f64) as f32;
            if i >= last || t <= 0.0 {
                vec![(i, 1.0)]
            } else {
                vec![(i, 1.0 - t), (i + 1, t)]
            }
        })
        .collect()
}

fn cubic_weights(t: f32) -> [f32; 4] {
    let a = CUBIC_A;
    let w0 = ((a * (t + 1.0) - 5.0 * a) * (t + 1.0) + 8.0 * a) * (t + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let u = 1.0 - t;
    let w2 = ((a + 2.0) * u - (a + 3.0)) * u * u + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

fn cubic_taps(src: u32, dst: u32) -> Vec<([usize; 4], [f32; 4])> {
    let last = i64::from(src) - 1;
    (0..dst)
        .map(|d| {
            let s = source_coord(d, src, dst);
            let base = s.floor();
            let t = (s - base) as f32;
            let base = base as i64;
            let idx = [-1, 0, 1, 2].map(|o| (base + o).clamp(0, last) as usize);
            (idx, cubic_weights(t))
        })
        .collect()
}

fn separable(src: &FloatImage, width: u32, height: u32, wx: &AxisWeights, wy: &AxisWeights) -> FloatImage {
    let ch = src.channels;

    // Rows first: src.height rows of the new width.
    let mut tmp = FloatImage::new(width, src.height, ch);
    let tmp_row = tmp.row_len();
    let src_row = src.row_len();
    tmp.data
        .par_chunks_mut(tmp_row)
        .zip(src.data.par_chunks(src_row))
        .for_each(|(dst, row)| {
            for (x, taps) in wx.iter().enumerate() {
                for &(sx, w) in taps {
                    for c in 0..ch {
                        dst[x * ch + c] += w * row[sx * ch + c];
                    }
                }
            }
        });

    let mut out = FloatImage::new(width, height, ch);
    out.data
        .par_chunks_mut(tmp_row)
        .zip(wy.par_iter())
        .for_each(|(dst, taps)| {
            for &(sy, w) in taps {
                let row = &tmp.data[sy * tmp_row..(sy + 1) * tmp_row];
                for (d, &s) in dst.iter_mut().zip(row) {
                    *d += w * s;
                }
            }
        });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/resample.rs"]
mod tests;
