use super::*;
use crate::buffer::pixel::Depth;
use crate::foundation::core::Point;
use crate::fx::context::RenderSettings;

fn ctx() -> RenderContext {
    RenderContext::new(&RenderSettings::default(), 0.0)
}

fn params(kw: f64, kh: f64) -> Params {
    let mut p = Params::defaults(&META);
    p.set(KSIZE_WIDTH, kw);
    p.set(KSIZE_HEIGHT, kh);
    p
}

#[test]
fn enlarge_grows_by_the_kernel() {
    let mut rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    Blur.enlarge(&ctx(), &Params::defaults(&META), &mut rect)
        .unwrap();
    // ksize 101: 50 before, 51 after
    assert_eq!(rect, Rect::new(-50.0, -50.0, 61.0, 61.0));

    let mut rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    Blur.enlarge(&ctx(), &params(2.0, 0.0), &mut rect).unwrap();
    assert_eq!(rect, Rect::new(-2.0, 0.0, 13.0, 11.0));
}

#[test]
fn kernel_size_is_held_to_the_declared_range() {
    assert_eq!(Blur::ksize(&params(3e9, -7.0)), (201, 1));
    assert_eq!(Blur::ksize(&params(f64::NAN, 1e300)), (1, 201));
}

#[test]
fn missing_input_leaves_output_untouched() {
    let mut out = PixelBuffer::filled(3, 3, Depth::U8, [0.1, 0.2, 0.3, 0.4]);
    let before = out.clone();
    Blur.compute(&ctx(), &params(1.0, 1.0), &Ports::new(1), &mut out)
        .unwrap();
    assert_eq!(out, before);
}

#[test]
fn unit_kernel_only_pastes() {
    let mut src = PixelBuffer::new(2, 2, Depth::U8);
    src.set_pixel(0, 0, [10.0, 20.0, 30.0, 40.0]);
    src.set_pixel(1, 1, [50.0, 60.0, 70.0, 80.0]);
    let mut ports = Ports::new(1);
    ports.set(PORT_INPUT, src, Point::new(1.0, 1.0));

    let mut out = PixelBuffer::new(4, 4, Depth::U8);
    Blur.compute(&ctx(), &params(0.0, 0.0), &ports, &mut out)
        .unwrap();
    assert_eq!(out.pixel(1, 1), [10.0, 20.0, 30.0, 40.0]);
    assert_eq!(out.pixel(2, 2), [50.0, 60.0, 70.0, 80.0]);
    assert_eq!(out.pixel(0, 0), [0.0; 4]);
    assert_eq!(out.pixel(3, 3), [0.0; 4]);
}

#[test]
fn flat_input_stays_flat() {
    let src = PixelBuffer::filled(6, 6, Depth::U16, [0.5, 0.5, 0.5, 1.0]);
    let expected = src.pixel(0, 0);
    let mut ports = Ports::new(1);
    ports.set(PORT_INPUT, src, Point::ZERO);

    let mut out = PixelBuffer::new(6, 6, Depth::U16);
    Blur.compute(&ctx(), &params(2.0, 3.0), &ports, &mut out)
        .unwrap();
    for y in 0..6 {
        for x in 0..6 {
            assert_eq!(out.pixel(x, y), expected, "({x}, {y})");
        }
    }
}

#[test]
fn blur_spreads_a_dot() {
    let mut src = PixelBuffer::new(5, 5, Depth::U8);
    src.set_pixel(2, 2, [255.0; 4]);
    let mut ports = Ports::new(1);
    ports.set(PORT_INPUT, src, Point::ZERO);

    let mut out = PixelBuffer::new(5, 5, Depth::U8);
    Blur.compute(&ctx(), &params(1.0, 1.0), &ports, &mut out)
        .unwrap();
    let center = out.pixel(2, 2)[3];
    let side = out.pixel(1, 2)[3];
    assert!(center < 255.0);
    assert!(side > 0.0 && side < center);
    assert_eq!(out.pixel(0, 0)[3], 0.0);
}
