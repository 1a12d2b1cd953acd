//! Seeded uniform noise fields and their multi-octave sum.

use rand::Rng;

use crate::buffer::pixel::FloatImage;
use crate::effects::resample::resize_cubic;
use crate::foundation::error::{RasterFxError, RasterFxResult};

/// Octave `i` is a `2 << i` grid on a side, so the last one allowed is 4096 wide.
pub const MAX_OCTAVES: u32 = 12;

/// Independent uniform samples in `[low, high)`.
///
/// A collapsed range (`low >= high`) fills with `low`. Bounds must be finite and their
/// difference representable.
pub fn salt_and_pepper<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    channels: usize,
    low: f32,
    high: f32,
) -> RasterFxResult<FloatImage> {
    if !(low.is_finite() && high.is_finite() && (high - low).is_finite()) {
        return Err(RasterFxError::validation(format!(
            "noise range [{low}, {high}) is not finite"
        )));
    }
    let mut img = FloatImage::new(width, height, channels);
    if low >= high {
        img.data.fill(low);
        return Ok(img);
    }
    for v in &mut img.data {
        *v = rng.gen_range(low..high);
    }
    Ok(img)
}

/// Sum of uniform fields at doubling resolution, each upscaled to `width x height`.
///
/// Octave `i` is a `(2 << i)`-square field in `[-|amplitudes[i]|, |amplitudes[i]|)`.
pub fn octave_noise<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    channels: usize,
    amplitudes: &[f32],
) -> RasterFxResult<FloatImage> {
    if amplitudes.len() > MAX_OCTAVES as usize {
        return Err(RasterFxError::validation(format!(
            "at most {MAX_OCTAVES} octaves are supported"
        )));
    }
    let out_of_range = |a: &&f32| !a.is_finite() || (2.0 * a.abs()).is_infinite();
    if let Some(amp) = amplitudes.iter().find(out_of_range) {
        return Err(RasterFxError::validation(format!(
            "octave amplitude {amp} is out of range"
        )));
    }
    let mut acc = FloatImage::new(width, height, channels);
    if width == 0 || height == 0 {
        return Ok(acc);
    }
    for (i, amp) in amplitudes.iter().enumerate() {
        let side = 2u32 << i;
        let range = amp.abs();
        let field = salt_and_pepper(rng, side, side, channels, -range, range)?;
        let layer = resize_cubic(&field, width, height)?;
        acc.add_assign(&layer)?;
    }
    Ok(acc)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/noise.rs"]
mod tests;
