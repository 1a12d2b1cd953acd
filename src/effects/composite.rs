//! Premultiplied "over" compositing with sub-pixel placement.

use crate::buffer::pixel::{CHANNELS, Channel, Depth, PixelBuffer};
use crate::foundation::core::Point;
use crate::foundation::error::{RasterFxError, RasterFxResult};
use crate::foundation::math::{lerp4, wrap_index};

/// Bilinear sample at `pos`, raw channel units, with out-of-range taps wrapping around.
pub fn sample_bilinear_wrap(src: &PixelBuffer, pos: Point) -> [f32; 4] {
    if src.is_empty() {
        return [0.0; 4];
    }
    let (w, h) = (src.width(), src.height());
    match (src.channels::<u8>(), src.channels::<u16>()) {
        (Some(px), _) => sample::<u8>(px, w, h, pos),
        (None, Some(px)) => sample::<u16>(px, w, h, pos),
        (None, None) => [0.0; 4],
    }
}

fn sample<C: Channel>(px: &[C], width: u32, height: u32, pos: Point) -> [f32; 4] {
    let (w, h) = (width as usize, height as usize);
    let fx = pos.x.floor();
    let fy = pos.y.floor();
    let tx = (pos.x - fx) as f32;
    let ty = (pos.y - fy) as f32;
    let x0 = wrap_index(fx as i64, w);
    let y0 = wrap_index(fy as i64, h);
    let x1 = wrap_index(fx as i64 + 1, w);
    let y1 = wrap_index(fy as i64 + 1, h);

    let at = |x: usize, y: usize| -> [f32; 4] {
        let i = (y * w + x) * CHANNELS;
        [
            px[i].to_f32(),
            px[i + 1].to_f32(),
            px[i + 2].to_f32(),
            px[i + 3].to_f32(),
        ]
    };
    let top = lerp4(at(x0, y0), at(x1, y0), tx);
    let bottom = lerp4(at(x0, y1), at(x1, y1), tx);
    lerp4(top, bottom, ty)
}

/// Premultiplied "over" of one pixel in raw units: `d * (max - sa) / max + s`, saturated.
pub fn over<C: Channel>(dst: [C; 4], src: [C; 4]) -> [C; 4] {
    let max = f64::from(C::MAX.to_f32());
    let inv = max - f64::from(src[3].to_f32());
    let mut out = dst;
    for c in 0..CHANNELS {
        let d = (f64::from(dst[c].to_f32()) * inv / max).floor();
        out[c] = C::from_f32((d + f64::from(src[c].to_f32())) as f32);
    }
    out
}

/// Composite `src` over `dst` with its top-left corner at `pos`.
///
/// The integer part of `pos` places the image; the fractional part is resampled bilinearly.
/// Pixels outside `dst` are clipped. Buffers of different depths leave `dst` unchanged.
pub fn composite_over(dst: &mut PixelBuffer, src: &PixelBuffer, pos: Point) -> RasterFxResult<()> {
    if dst.depth() != src.depth() {
        tracing::debug!(dst = ?dst.depth(), src = ?src.depth(), "mixed depths; nothing composited");
        return Ok(());
    }
    if !(pos.x.is_finite() && pos.y.is_finite()) {
        return Err(RasterFxError::validation("composite position must be finite"));
    }
    if src.is_empty() || dst.is_empty() {
        return Ok(());
    }
    let frac = Point::new(pos.x - pos.x.floor(), pos.y - pos.y.floor());
    let ox = pos.x.floor() as i64;
    let oy = pos.y.floor() as i64;
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));

    if ox >= dw || oy >= dh || ox + sw <= 0 || oy + sh <= 0 {
        return Ok(());
    }
    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = (ox + sw).min(dw);
    let y1 = (oy + sh).min(dh);

    let (dw, sw, sh) = (dw as u32, sw as u32, sh as u32);
    match src.depth() {
        Depth::U8 => blit::<u8>(dst, src, (sw, sh), dw, (ox, oy), (x0, y0, x1, y1), frac),
        Depth::U16 => blit::<u16>(dst, src, (sw, sh), dw, (ox, oy), (x0, y0, x1, y1), frac),
    }
    Ok(())
}

fn blit<C: Channel>(
    dst: &mut PixelBuffer,
    src: &PixelBuffer,
    (sw, sh): (u32, u32),
    dw: u32,
    (ox, oy): (i64, i64),
    (x0, y0, x1, y1): (i64, i64, i64, i64),
    frac: Point,
) {
    let Some(sp) = src.channels::<C>() else {
        return;
    };
    let Some(dp) = dst.channels_mut::<C>() else {
        return;
    };
    let exact = frac.x == 0.0 && frac.y == 0.0;
    for y in y0..y1 {
        for x in x0..x1 {
            let (sx, sy) = (x - ox, y - oy);
            let s = if exact {
                let i = (sy as usize * sw as usize + sx as usize) * CHANNELS;
                [sp[i], sp[i + 1], sp[i + 2], sp[i + 3]]
            } else {
                let pos = Point::new(sx as f64 - frac.x, sy as f64 - frac.y);
                sample::<C>(sp, sw, sh, pos).map(C::from_f32)
            };
            let i = (y as usize * dw as usize + x as usize) * CHANNELS;
            let d = [dp[i], dp[i + 1], dp[i + 2], dp[i + 3]];
            dp[i..i + CHANNELS].copy_from_slice(&over(d, s));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
