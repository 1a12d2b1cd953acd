//! Owned pixel storage: 8 or 16 bit premultiplied BGRA, plus a float working image.

use crate::foundation::error::{RasterFxError, RasterFxResult};

/// Number of interleaved channels per pixel, always B, G, R, A.
pub const CHANNELS: usize = 4;

/// Per-channel storage depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Depth {
    /// One byte per channel.
    U8,
    /// Two bytes per channel, native endianness.
    U16,
}

impl Depth {
    /// Storage size of one channel.
    pub fn bytes_per_channel(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
        }
    }

    /// Storage size of one BGRA pixel.
    pub fn bytes_per_pixel(self) -> usize {
        self.bytes_per_channel() * CHANNELS
    }

    /// Largest channel value, as a float.
    pub fn max_value(self) -> f32 {
        match self {
            Self::U8 => f32::from(u8::MAX),
            Self::U16 => f32::from(u16::MAX),
        }
    }
}

/// An unsigned channel type a [`PixelBuffer`] can hold.
pub trait Channel: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Full-scale value.
    const MAX: Self;
    /// Depth tag for this channel type.
    const DEPTH: Depth;

    /// Channel value as a float in raw units.
    fn to_f32(self) -> f32;

    /// Round to nearest and clamp into `0..=MAX`. NaN maps to zero.
    fn from_f32(v: f32) -> Self;

    /// Borrow `data` as this channel type, if it holds it.
    fn view(data: &PixelData) -> Option<&[Self]>;
    /// Mutable counterpart of [`Channel::view`].
    fn view_mut(data: &mut PixelData) -> Option<&mut [Self]>;
}

impl Channel for u8 {
    const MAX: Self = u8::MAX;
    const DEPTH: Depth = Depth::U8;

    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn from_f32(v: f32) -> Self {
        v.round().clamp(0.0, 255.0) as u8
    }

    fn view(data: &PixelData) -> Option<&[Self]> {
        match data {
            PixelData::U8(v) => Some(v),
            PixelData::U16(_) => None,
        }
    }

    fn view_mut(data: &mut PixelData) -> Option<&mut [Self]> {
        match data {
            PixelData::U8(v) => Some(v),
            PixelData::U16(_) => None,
        }
    }
}

impl Channel for u16 {
    const MAX: Self = u16::MAX;
    const DEPTH: Depth = Depth::U16;

    fn to_f32(self) -> f32 {
        f32::from(self)
    }

    fn from_f32(v: f32) -> Self {
        v.round().clamp(0.0, 65535.0) as u16
    }

    fn view(data: &PixelData) -> Option<&[Self]> {
        match data {
            PixelData::U16(v) => Some(v),
            PixelData::U8(_) => None,
        }
    }

    fn view_mut(data: &mut PixelData) -> Option<&mut [Self]> {
        match data {
            PixelData::U16(v) => Some(v),
            PixelData::U8(_) => None,
        }
    }
}

/// Scale a unit-range value to the full range of `C`, saturating.
pub fn normalize_cast<C: Channel>(unit: f32) -> C {
    C::from_f32(unit * C::MAX.to_f32())
}

/// Channel storage of a [`PixelBuffer`].
#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    /// 8-bit channels.
    U8(Vec<u8>),
    /// 16-bit channels.
    U16(Vec<u16>),
}

/// Rectangular BGRA image with premultiplied alpha, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: PixelData,
}

impl PixelBuffer {
    /// Zero-initialized (transparent black) buffer.
    pub fn new(width: u32, height: u32, depth: Depth) -> Self {
        let len = sample_count(width, height);
        let data = match depth {
            Depth::U8 => PixelData::U8(vec![0; len]),
            Depth::U16 => PixelData::U16(vec![0; len]),
        };
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap 8-bit BGRA samples; the length must match the dimensions.
    pub fn from_u8(width: u32, height: u32, data: Vec<u8>) -> RasterFxResult<Self> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data: PixelData::U8(data),
        })
    }

    /// Wrap 16-bit BGRA samples; the length must match the dimensions.
    pub fn from_u16(width: u32, height: u32, data: Vec<u16>) -> RasterFxResult<Self> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data: PixelData::U16(data),
        })
    }

    /// Buffer filled with a single premultiplied pixel given in unit floats.
    pub fn filled(width: u32, height: u32, depth: Depth, px: [f32; 4]) -> Self {
        let mut out = Self::new(width, height, depth);
        for y in 0..height {
            for x in 0..width {
                out.set_pixel_unit(x, y, px);
            }
        }
        out
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel depth.
    pub fn depth(&self) -> Depth {
        match self.data {
            PixelData::U8(_) => Depth::U8,
            PixelData::U16(_) => Depth::U16,
        }
    }

    /// Return `true` when the buffer has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Underlying channel storage.
    pub fn data(&self) -> &PixelData {
        &self.data
    }

    /// Mutable channel storage.
    pub fn data_mut(&mut self) -> &mut PixelData {
        &mut self.data
    }

    /// Samples as `C`, or `None` when the depth differs.
    pub fn channels<C: Channel>(&self) -> Option<&[C]> {
        C::view(&self.data)
    }

    /// Mutable samples as `C`, or `None` when the depth differs.
    pub fn channels_mut<C: Channel>(&mut self) -> Option<&mut [C]> {
        C::view_mut(&mut self.data)
    }

    /// Raw bytes in native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            PixelData::U8(v) => v,
            PixelData::U16(v) => bytemuck::cast_slice(v),
        }
    }

    /// Size of the sample data in bytes.
    pub fn byte_len(&self) -> usize {
        sample_count(self.width, self.height) * self.depth().bytes_per_channel()
    }

    /// Pixel in raw channel units (0..=255 or 0..=65535).
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = self.index(x, y);
        match &self.data {
            PixelData::U8(v) => read_px(v, i),
            PixelData::U16(v) => read_px(v, i),
        }
    }

    /// Store a pixel given in raw channel units, saturating.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: [f32; 4]) {
        let i = self.index(x, y);
        match &mut self.data {
            PixelData::U8(v) => write_px(v, i, px),
            PixelData::U16(v) => write_px(v, i, px),
        }
    }

    /// Pixel scaled into `0.0..=1.0`.
    pub fn pixel_unit(&self, x: u32, y: u32) -> [f32; 4] {
        let max = self.depth().max_value();
        self.pixel(x, y).map(|c| c / max)
    }

    /// Store a pixel given in `0.0..=1.0`, saturating.
    pub fn set_pixel_unit(&mut self, x: u32, y: u32, px: [f32; 4]) {
        let max = self.depth().max_value();
        self.set_pixel(x, y, px.map(|c| c * max));
    }

    /// Copy (no blending) `src` so its top-left lands at `(x, y)`, clipped to `self`.
    pub fn paste(&mut self, src: &PixelBuffer, x: i64, y: i64) -> RasterFxResult<()> {
        if src.depth() != self.depth() {
            return Err(RasterFxError::validation(
                "paste expects buffers of the same depth",
            ));
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(src.width)).min(i64::from(self.width));
        let y1 = (y + i64::from(src.height)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }
        let run = (x1 - x0) as usize * CHANNELS;
        for dy in y0..y1 {
            let sy = (dy - y) as u32;
            let sx = (x0 - x) as u32;
            let s = src.index(sx, sy);
            let d = self.index(x0 as u32, dy as u32);
            match (&mut self.data, &src.data) {
                (PixelData::U8(dv), PixelData::U8(sv)) => {
                    dv[d..d + run].copy_from_slice(&sv[s..s + run]);
                }
                (PixelData::U16(dv), PixelData::U16(sv)) => {
                    dv[d..d + run].copy_from_slice(&sv[s..s + run]);
                }
                _ => unreachable!("depths checked above"),
            }
        }
        Ok(())
    }

    /// Float copy in raw channel units.
    pub fn to_float(&self) -> FloatImage {
        let data = match &self.data {
            PixelData::U8(v) => v.iter().map(|&c| c.to_f32()).collect(),
            PixelData::U16(v) => v.iter().map(|&c| c.to_f32()).collect(),
        };
        FloatImage {
            width: self.width,
            height: self.height,
            channels: CHANNELS,
            data,
        }
    }

    /// Saturating conversion of a 4-channel float image in raw channel units.
    pub fn from_float(img: &FloatImage, depth: Depth) -> RasterFxResult<Self> {
        if img.channels != CHANNELS {
            return Err(RasterFxError::validation(
                "PixelBuffer::from_float expects a 4-channel image",
            ));
        }
        let data = match depth {
            Depth::U8 => PixelData::U8(img.data.iter().map(|&v| u8::from_f32(v)).collect()),
            Depth::U16 => PixelData::U16(img.data.iter().map(|&v| u16::from_f32(v)).collect()),
        };
        Ok(Self {
            width: img.width,
            height: img.height,
            data,
        })
    }

    /// Same image rescaled to another channel depth.
    pub fn to_depth(&self, depth: Depth) -> Self {
        if depth == self.depth() {
            return self.clone();
        }
        let k = depth.max_value() / self.depth().max_value();
        let data = match (&self.data, depth) {
            (PixelData::U8(v), Depth::U16) => {
                PixelData::U16(v.iter().map(|&c| u16::from_f32(c.to_f32() * k)).collect())
            }
            (PixelData::U16(v), Depth::U8) => {
                PixelData::U8(v.iter().map(|&c| u8::from_f32(c.to_f32() * k)).collect())
            }
            _ => self.data.clone(),
        };
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS
    }
}

/// Multi-channel `f32` image used by the synthesis primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Interleaved values per pixel.
    pub channels: usize,
    /// Row-major samples, `width * height * channels` long.
    pub data: Vec<f32>,
}

impl FloatImage {
    /// Zero-filled image.
    pub fn new(width: u32, height: u32, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0.0; (width as usize) * (height as usize) * channels],
        }
    }

    /// Wrap existing samples; the length must match the dimensions.
    pub fn from_vec(
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<f32>,
    ) -> RasterFxResult<Self> {
        if data.len() != (width as usize) * (height as usize) * channels {
            return Err(RasterFxError::validation(
                "FloatImage data must match width*height*channels",
            ));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Channels of the pixel at `(x, y)`.
    pub fn at(&self, x: u32, y: u32) -> &[f32] {
        let i = self.offset(x, y);
        &self.data[i..i + self.channels]
    }

    /// Mutable channels of the pixel at `(x, y)`.
    pub fn at_mut(&mut self, x: u32, y: u32) -> &mut [f32] {
        let i = self.offset(x, y);
        &mut self.data[i..i + self.channels]
    }

    /// Values per row.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels
    }

    /// `self += other`, element-wise.
    pub fn add_assign(&mut self, other: &FloatImage) -> RasterFxResult<()> {
        if self.width != other.width
            || self.height != other.height
            || self.channels != other.channels
        {
            return Err(RasterFxError::validation(
                "FloatImage::add_assign expects images of identical shape",
            ));
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += *b;
        }
        Ok(())
    }

    /// Multiply every value by `k`.
    pub fn scale(&mut self, k: f32) {
        for v in &mut self.data {
            *v *= k;
        }
    }

    /// Smallest and largest value, or `None` for an empty image.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * self.channels
    }
}

fn sample_count(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * CHANNELS
}

fn check_len(width: u32, height: u32, len: usize) -> RasterFxResult<()> {
    if len != sample_count(width, height) {
        return Err(RasterFxError::validation(
            "pixel data must match width*height*4",
        ));
    }
    Ok(())
}

fn read_px<C: Channel>(v: &[C], i: usize) -> [f32; 4] {
    [
        v[i].to_f32(),
        v[i + 1].to_f32(),
        v[i + 2].to_f32(),
        v[i + 3].to_f32(),
    ]
}

fn write_px<C: Channel>(v: &mut [C], i: usize, px: [f32; 4]) {
    for (c, value) in px.into_iter().enumerate() {
        v[i + c] = C::from_f32(value);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/pixel.rs"]
mod tests;
