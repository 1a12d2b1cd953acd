//! Image file decoding and PNG export for [`PixelBuffer`]s.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::buffer::pixel::{Depth, PixelBuffer};
use crate::foundation::error::RasterFxResult;

/// Decode encoded image bytes into premultiplied BGRA at `depth`.
pub fn decode_image(bytes: &[u8], depth: Depth) -> RasterFxResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    from_dynamic(&dyn_img, depth)
}

/// Read and decode an image file into premultiplied BGRA at `depth`.
pub fn load_image(path: &Path, depth: Depth) -> RasterFxResult<PixelBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    decode_image(&bytes, depth)
}

/// Convert a decoded image to premultiplied BGRA at `depth`.
pub fn from_dynamic(img: &image::DynamicImage, depth: Depth) -> RasterFxResult<PixelBuffer> {
    match depth {
        Depth::U8 => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let mut data = rgba.into_raw();
            swizzle_premultiply(&mut data, |c, a| {
                ((u16::from(c) * u16::from(a) + 127) / 255) as u8
            });
            PixelBuffer::from_u8(width, height, data)
        }
        Depth::U16 => {
            let rgba = img.to_rgba16();
            let (width, height) = rgba.dimensions();
            let mut data = rgba.into_raw();
            swizzle_premultiply(&mut data, |c, a| {
                ((u32::from(c) * u32::from(a) + 32767) / 65535) as u16
            });
            PixelBuffer::from_u16(width, height, data)
        }
    }
}

/// Straight-alpha RGBA copy of a premultiplied BGRA buffer.
pub fn to_dynamic(buf: &PixelBuffer) -> RasterFxResult<image::DynamicImage> {
    let (w, h) = (buf.width(), buf.height());
    match buf.depth() {
        Depth::U8 => {
            let mut data = buf.channels::<u8>().unwrap_or_default().to_vec();
            swizzle_unpremultiply(&mut data, |c, a| {
                ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8
            });
            let img = image::RgbaImage::from_raw(w, h, data)
                .context("pixel data does not match dimensions")?;
            Ok(image::DynamicImage::ImageRgba8(img))
        }
        Depth::U16 => {
            let mut data = buf.channels::<u16>().unwrap_or_default().to_vec();
            swizzle_unpremultiply(&mut data, |c, a| {
                ((u32::from(c) * 65535 + u32::from(a) / 2) / u32::from(a)).min(65535) as u16
            });
            let img = image::ImageBuffer::<image::Rgba<u16>, _>::from_raw(w, h, data)
                .context("pixel data does not match dimensions")?;
            Ok(image::DynamicImage::ImageRgba16(img))
        }
    }
}

/// Encode a buffer as straight-alpha RGBA PNG bytes at its own depth.
pub fn encode_png(buf: &PixelBuffer) -> RasterFxResult<Vec<u8>> {
    let mut out = Vec::new();
    to_dynamic(buf)?
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

/// Write a buffer to `path` as PNG.
pub fn save_png(buf: &PixelBuffer, path: &Path) -> RasterFxResult<()> {
    let bytes = encode_png(buf)?;
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// RGBA straight -> BGRA premultiplied, in place.
fn swizzle_premultiply<C: Copy + Default + PartialEq>(px: &mut [C], mul: impl Fn(C, C) -> C) {
    for p in px.chunks_exact_mut(4) {
        let a = p[3];
        if a == C::default() {
            p[0] = C::default();
            p[1] = C::default();
            p[2] = C::default();
            continue;
        }
        let (r, g, b) = (p[0], p[1], p[2]);
        p[0] = mul(b, a);
        p[1] = mul(g, a);
        p[2] = mul(r, a);
    }
}

/// BGRA premultiplied -> RGBA straight, in place.
fn swizzle_unpremultiply<C: Copy + Default + PartialEq>(px: &mut [C], div: impl Fn(C, C) -> C) {
    for p in px.chunks_exact_mut(4) {
        let a = p[3];
        if a == C::default() {
            p[0] = C::default();
            p[1] = C::default();
            p[2] = C::default();
            continue;
        }
        let (b, g, r) = (p[0], p[1], p[2]);
        p[0] = div(r, a);
        p[1] = div(g, a);
        p[2] = div(b, a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/image_io.rs"]
mod tests;
