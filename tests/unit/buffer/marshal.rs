use super::*;
use crate::host::memory::MemoryTile;

fn tile(x0: f64, y0: f64, x1: f64, y1: f64, et: ElementType) -> MemoryTile {
    MemoryTile::new(HostRect::new(x0, y0, x1, y1), et).unwrap()
}

#[test]
fn element_type_mapping() {
    assert_eq!(ElementType::from_bpp(32), ElementType::Rgba32);
    assert_eq!(ElementType::from_bpp(64), ElementType::Rgba64);
    assert_eq!(ElementType::from_bpp(48).depth(), None);
    assert_eq!(ElementType::from_depth(Depth::U16).depth(), Some(Depth::U16));
}

#[test]
fn load_skips_row_padding() {
    let mut t =
        MemoryTile::with_row_padding(HostRect::new(0.0, 0.0, 2.0, 2.0), ElementType::Rgba32, 5)
            .unwrap();
    let mut src = PixelBuffer::new(2, 2, Depth::U8);
    src.set_pixel(1, 1, [1.0, 2.0, 3.0, 4.0]);
    store(&mut t, Rect::new(0.0, 0.0, 2.0, 2.0), &src).unwrap();

    assert_eq!(t.raw_stride(), 13);
    let back = load(&mut t).unwrap();
    assert_eq!(back, src);
    assert!(!t.is_locked());
}

#[test]
fn unmapped_tile_fails_and_still_releases() {
    let mut t = tile(0.0, 0.0, 2.0, 2.0, ElementType::Rgba32).unmapped();
    assert!(matches!(load(&mut t), Err(RasterFxError::BufferMarshal(_))));
    let buf = PixelBuffer::new(2, 2, Depth::U8);
    assert!(store(&mut t, Rect::new(0.0, 0.0, 2.0, 2.0), &buf).is_err());
    assert_eq!(t.lock_counts(), (2, 2));
}

#[test]
fn store_writes_only_the_overlap() {
    let mut t = tile(10.0, 10.0, 14.0, 14.0, ElementType::Rgba32);
    let src = PixelBuffer::filled(4, 4, Depth::U8, [1.0; 4]);
    store(&mut t, Rect::new(12.0, 8.0, 16.0, 12.0), &src).unwrap();

    let out = t.to_buffer().unwrap();
    for y in 0..4 {
        for x in 0..4 {
            let expect = if x >= 2 && y < 2 { 255.0 } else { 0.0 };
            assert_eq!(out.pixel(x, y)[3], expect, "pixel ({x},{y})");
        }
    }
}

#[test]
fn store_with_no_overlap_is_a_no_op() {
    let mut t = tile(0.0, 0.0, 2.0, 2.0, ElementType::Rgba32);
    let src = PixelBuffer::filled(2, 2, Depth::U8, [1.0; 4]);
    store(&mut t, Rect::new(5.0, 5.0, 7.0, 7.0), &src).unwrap();
    assert!(t.raw().iter().all(|&b| b == 0));
    assert_eq!(t.lock_counts(), (0, 0));
}

#[test]
fn store_rejects_depth_mismatch() {
    let mut t = tile(0.0, 0.0, 1.0, 1.0, ElementType::Rgba64);
    let src = PixelBuffer::new(1, 1, Depth::U8);
    assert!(store(&mut t, Rect::new(0.0, 0.0, 1.0, 1.0), &src).is_err());
}

#[test]
fn unsupported_element_type_is_rejected() {
    let mut t = tile(0.0, 0.0, 1.0, 1.0, ElementType::Other(48));
    assert!(matches!(
        load(&mut t),
        Err(RasterFxError::UnsupportedPixelFormat(ElementType::Other(48)))
    ));
}

#[test]
fn sixteen_bit_values_survive_the_tile() {
    let mut t = tile(-3.0, -3.0, 0.0, -1.0, ElementType::Rgba64);
    let mut src = PixelBuffer::new(3, 2, Depth::U16);
    src.set_pixel(2, 1, [1.0, 300.0, 40000.0, 65535.0]);
    store(&mut t, Rect::new(-3.0, -3.0, 0.0, -1.0), &src).unwrap();
    assert_eq!(load(&mut t).unwrap(), src);
}

#[test]
fn extent_truncates_and_rejects_non_finite() {
    assert_eq!(extent(3.9), 3);
    assert_eq!(extent(-1.0), 0);
    assert_eq!(extent(f64::INFINITY), 0);
}
