use super::*;

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
    assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
    assert_eq!(
        lerp4([0.0, 10.0, 20.0, 30.0], [10.0; 4], 0.5),
        [5.0, 10.0, 15.0, 20.0]
    );
}

#[test]
fn angle_conversions_invert() {
    assert!((to_radian(180.0) - std::f64::consts::PI).abs() < 1e-12);
    assert!((to_degree(to_radian(37.5)) - 37.5).abs() < 1e-12);
    assert_eq!(square(-3.0), 9.0);
}

#[test]
fn bit_reverse_moves_low_bit_to_top() {
    assert_eq!(bit_reverse(1), 1u64 << 63);
    assert_eq!(bit_reverse(2), 1u64 << 62);
    assert_eq!(bit_reverse(3), (1u64 << 63) | (1u64 << 62));
    assert_eq!(bit_reverse(bit_reverse(0xdead_beef)), 0xdead_beef);
}

#[test]
fn wrap_index_handles_negative_and_overflow() {
    assert_eq!(wrap_index(-1, 4), 3);
    assert_eq!(wrap_index(4, 4), 0);
    assert_eq!(wrap_index(9, 4), 1);
    assert_eq!(wrap_index(2, 4), 2);
}

#[test]
fn meet_walks_along_the_ray() {
    assert_eq!(meet([1.0, 2.0, 3.0], [0.0, 1.0, -2.0], 2.5), [1.0, 4.5, -2.0]);
}

#[test]
fn reflect_mirrors_about_the_normal() {
    let up = [0.0, 1.0, 0.0];
    assert_eq!(reflect([1.0, -1.0, 0.0], up), [1.0, 1.0, 0.0]);
    assert_eq!(reflect([0.0, 0.0, 1.0], up), [0.0, 0.0, 1.0]);
}

#[test]
fn refract_bends_toward_the_normal_and_reflects_totally() {
    let n = [0.0, 1.0, 0.0];
    let straight = refract([0.0, -1.0, 0.0], n, 1.0 / 1.5);
    assert!(straight[0].abs() < 1e-12 && (straight[1] + 1.0).abs() < 1e-12);

    let s = std::f64::consts::FRAC_1_SQRT_2;
    let i = [s, -s, 0.0];
    let t = refract(i, n, 1.0 / 1.5);
    assert!(t[0] > 0.0 && t[0] < i[0]);
    assert!((dot3(t, t) - 1.0).abs() < 1e-12);

    assert_eq!(refract(i, n, 1.5), [0.0; 3]);
}
