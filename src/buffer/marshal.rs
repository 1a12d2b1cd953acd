//! Copies between host-owned strided tile memory and [`PixelBuffer`]s.
//!
//! Every access to raw tile memory goes through [`TileLock`], which releases the host lock when
//! dropped, so early returns cannot leak it.

use crate::buffer::pixel::{CHANNELS, Depth, PixelBuffer};
use crate::foundation::core::{HostRect, Rect};
use crate::foundation::error::{RasterFxError, RasterFxResult};

/// Element layout reported by a host tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 32 bits per pixel, 8 bits per BGRA channel.
    Rgba32,
    /// 64 bits per pixel, 16 bits per BGRA channel.
    Rgba64,
    /// Anything else the host may hand out; never marshaled.
    Other(i32),
}

impl ElementType {
    /// Channel depth for the two marshalable layouts.
    pub fn depth(self) -> Option<Depth> {
        match self {
            Self::Rgba32 => Some(Depth::U8),
            Self::Rgba64 => Some(Depth::U16),
            Self::Other(_) => None,
        }
    }

    /// Element type holding pixels of `depth`.
    pub fn from_depth(depth: Depth) -> Self {
        match depth {
            Depth::U8 => Self::Rgba32,
            Depth::U16 => Self::Rgba64,
        }
    }

    /// Element type matching a rendering bit depth (32 or 64 bits per pixel).
    pub fn from_bpp(bpp: i32) -> Self {
        match bpp {
            32 => Self::Rgba32,
            64 => Self::Rgba64,
            other => Self::Other(other),
        }
    }
}

/// Host tile storage: a rectangle of strided BGRA memory.
pub trait TileStorage {
    /// Rectangle this tile covers, in the host's coordinate space.
    fn rect(&self) -> HostRect;

    /// Pixel layout of the tile memory.
    fn element_type(&self) -> ElementType;

    /// Row stride in bytes.
    fn raw_stride(&self) -> usize;

    /// Lock the tile and expose its raw bytes.
    ///
    /// Returns `None` when the memory is unmapped or write-locked elsewhere. Callers must pair
    /// every call with [`TileStorage::safen`], whatever the outcome.
    fn raw_bytes(&mut self) -> Option<&mut [u8]>;

    /// Release the lock taken by `raw_bytes`.
    fn safen(&mut self);
}

/// Scoped acquisition of a tile's raw memory.
pub struct TileLock<'a, S: TileStorage + ?Sized> {
    tile: &'a mut S,
}

impl<'a, S: TileStorage + ?Sized> TileLock<'a, S> {
    /// Wrap `tile`; the lock is released when the guard drops.
    pub fn new(tile: &'a mut S) -> Self {
        Self { tile }
    }

    /// Lock the tile and borrow its bytes; `None` when unavailable.
    pub fn bytes(&mut self) -> Option<&mut [u8]> {
        self.tile.raw_bytes()
    }
}

impl<S: TileStorage + ?Sized> Drop for TileLock<'_, S> {
    fn drop(&mut self) {
        self.tile.safen();
    }
}

/// Copy a whole tile into a fresh buffer.
pub fn load<S: TileStorage + ?Sized>(tile: &mut S) -> RasterFxResult<PixelBuffer> {
    let element_type = tile.element_type();
    let depth = element_type
        .depth()
        .ok_or(RasterFxError::UnsupportedPixelFormat(element_type))?;

    let rect = tile.rect();
    let width = extent(rect.width());
    let height = extent(rect.height());
    let bpc = depth.bytes_per_channel();
    let stride = tile.raw_stride() / bpc;
    let row = width as usize * CHANNELS;

    let mut lock = TileLock::new(tile);
    let Some(bytes) = lock.bytes() else {
        return Err(RasterFxError::marshal("tile memory unavailable for reading"));
    };
    check_span(bytes.len(), stride, row, height as usize, bpc)?;

    match depth {
        Depth::U8 => {
            let mut out = vec![0u8; row * height as usize];
            for (y, dst) in out.chunks_exact_mut(row.max(1)).enumerate() {
                let p = y * stride;
                dst.copy_from_slice(&bytes[p..p + row]);
            }
            PixelBuffer::from_u8(width, height, out)
        }
        Depth::U16 => {
            let mut out = vec![0u16; row * height as usize];
            for (y, dst) in out.chunks_exact_mut(row.max(1)).enumerate() {
                for (x, v) in dst.iter_mut().enumerate() {
                    let p = (y * stride + x) * 2;
                    *v = u16::from_ne_bytes([bytes[p], bytes[p + 1]]);
                }
            }
            PixelBuffer::from_u16(width, height, out)
        }
    }
}

/// Write `buf`, which covers `target`, into the part of `tile` that overlaps `target`.
///
/// An empty overlap is a successful no-op.
pub fn store<S: TileStorage + ?Sized>(
    tile: &mut S,
    target: Rect,
    buf: &PixelBuffer,
) -> RasterFxResult<()> {
    let element_type = tile.element_type();
    let depth = element_type
        .depth()
        .ok_or(RasterFxError::UnsupportedPixelFormat(element_type))?;
    if depth != buf.depth() {
        return Err(RasterFxError::marshal(format!(
            "buffer depth {:?} does not match tile element type {element_type:?}",
            buf.depth()
        )));
    }

    let rect = tile.rect();
    let roi = Rect::new(
        rect.x0.max(target.x0),
        rect.y0.max(target.y0),
        rect.x1.min(target.x1),
        rect.y1.min(target.y1),
    );
    if !(roi.width() > 0.0 && roi.height() > 0.0) {
        return Ok(());
    }

    let src_x = ((roi.x0 - target.x0) as i64).max(0) as usize;
    let src_y = ((roi.y0 - target.y0) as i64).max(0) as usize;
    let dst_x = ((roi.x0 - rect.x0) as i64).max(0) as usize;
    let dst_y = ((roi.y0 - rect.y0) as i64).max(0) as usize;

    let tile_w = extent(rect.width()) as usize;
    let tile_h = extent(rect.height()) as usize;
    let w = (extent(roi.width()) as usize)
        .min((buf.width() as usize).saturating_sub(src_x))
        .min(tile_w.saturating_sub(dst_x));
    let h = (extent(roi.height()) as usize)
        .min((buf.height() as usize).saturating_sub(src_y))
        .min(tile_h.saturating_sub(dst_y));
    if w == 0 || h == 0 {
        return Ok(());
    }

    let bpc = depth.bytes_per_channel();
    let stride = tile.raw_stride() / bpc;
    let src_row = buf.width() as usize * CHANNELS;

    let mut lock = TileLock::new(tile);
    let Some(bytes) = lock.bytes() else {
        return Err(RasterFxError::marshal("tile memory unavailable for writing"));
    };
    check_span(
        bytes.len(),
        stride,
        (dst_x + w) * CHANNELS,
        dst_y + h,
        bpc,
    )?;

    for y in 0..h {
        let s = (src_y + y) * src_row + src_x * CHANNELS;
        let q = (dst_y + y) * stride + dst_x * CHANNELS;
        let n = w * CHANNELS;
        match depth {
            Depth::U8 => {
                let src = buf.channels::<u8>().ok_or_else(depth_mismatch)?;
                bytes[q..q + n].copy_from_slice(&src[s..s + n]);
            }
            Depth::U16 => {
                let src = buf.channels::<u16>().ok_or_else(depth_mismatch)?;
                for (i, v) in src[s..s + n].iter().enumerate() {
                    let p = (q + i) * 2;
                    bytes[p..p + 2].copy_from_slice(&v.to_ne_bytes());
                }
            }
        }
    }
    Ok(())
}

/// Integer extent of a host span, truncated the way the host sizes its tiles.
pub(crate) fn extent(len: f64) -> u32 {
    if len.is_finite() && len > 0.0 {
        len as u32
    } else {
        0
    }
}

fn check_span(len: usize, stride: usize, row: usize, rows: usize, bpc: usize) -> RasterFxResult<()> {
    if rows == 0 || row == 0 {
        return Ok(());
    }
    if stride < row {
        return Err(RasterFxError::marshal(format!(
            "tile stride {stride} is shorter than a row of {row} channels"
        )));
    }
    let needed = ((rows - 1) * stride + row) * bpc;
    if len < needed {
        return Err(RasterFxError::marshal(format!(
            "tile memory holds {len} bytes, {needed} required"
        )));
    }
    Ok(())
}

fn depth_mismatch() -> RasterFxError {
    RasterFxError::marshal("buffer channel type changed during store")
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/marshal.rs"]
mod tests;
