use super::*;

fn constant(w: u32, h: u32, v: f32) -> FloatImage {
    FloatImage::from_vec(w, h, 1, vec![v; (w * h) as usize]).unwrap()
}

#[test]
fn level_zero_is_a_plain_blur() {
    let mut img = FloatImage::new(7, 5, 4);
    img.at_mut(3, 2).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
    let got = bloom(&img, 0, 2).unwrap();
    let want = gaussian_blur(&img, (5, 5), (0.0, 0.0)).unwrap();
    assert_eq!(got, want);
}

#[test]
fn constant_image_accumulates_once_per_level() {
    let out = bloom(&constant(16, 16, 0.25), 2, 1).unwrap();
    assert_eq!((out.width, out.height), (16, 16));
    for v in out.data {
        assert!((v - 0.75).abs() < 1e-4, "{v}");
    }
}

#[test]
fn pyramid_stops_at_one_pixel() {
    // 4 -> 2 -> 1: only three levels exist however many are requested.
    let out = bloom(&constant(4, 4, 1.0), 9, 0).unwrap();
    for v in out.data {
        assert!((v - 3.0).abs() < 1e-4, "{v}");
    }
}

#[test]
fn glow_spreads_beyond_the_source() {
    let mut img = FloatImage::new(32, 32, 1);
    img.at_mut(16, 16)[0] = 100.0;
    let out = bloom(&img, 3, 1).unwrap();
    assert!(out.at(16, 16)[0] > 0.0);
    assert!(out.at(24, 16)[0] > 0.0);
}

#[test]
fn empty_image_passes_through() {
    let img = FloatImage::new(0, 4, 4);
    assert_eq!(bloom(&img, 3, 1).unwrap(), img);
}
