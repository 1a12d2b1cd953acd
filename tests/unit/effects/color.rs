use proptest::prelude::*;

use super::*;

#[test]
fn zero_maps_to_zero() {
    assert_eq!(to_linear(0.0, 2.0, 2.2), 0.0);
    assert_eq!(to_nonlinear(0.0, 2.0, 2.2), 0.0);
}

#[test]
fn converter_rejects_bad_parameters() {
    assert!(ColorSpaceConverter::new(0.0, 1.0).is_err());
    assert!(ColorSpaceConverter::new(1.0, -2.0).is_err());
    assert!(ColorSpaceConverter::new(1.0, f64::NAN).is_err());
}

#[test]
fn table_samples_bin_centers() {
    let t = LinearTable::new(8, 1.5, 2.0).unwrap();
    assert_eq!(t.len(), 256);
    let want = to_linear(0.5 / 256.0, 1.5, 2.0) as f32;
    assert!((t[0] - want).abs() < 1e-7);
    assert!(t[255].is_finite());
    assert_eq!(t.get(10_000), t[255]);
}

#[test]
fn table_rejects_out_of_range_depth() {
    assert!(LinearTable::new(0, 1.0, 1.0).is_err());
    assert!(LinearTable::new(17, 1.0, 1.0).is_err());
}

#[test]
fn cached_tables_are_reused() {
    let cache = TableCache::new(TABLE_CACHE_CAPACITY);
    let a = cache.get_or_build(10, 3.0, 1.25).unwrap();
    let b = cache.get_or_build(10, 3.0, 1.25).unwrap();
    let c = cache.get_or_build(10, 3.0, 1.5).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn cache_evicts_the_least_recently_used_table() {
    let cache = TableCache::new(2);
    let a = cache.get_or_build(8, 1.0, 2.2).unwrap();
    cache.get_or_build(8, 2.0, 2.2).unwrap();
    assert!(Arc::ptr_eq(&a, &cache.get_or_build(8, 1.0, 2.2).unwrap()));
    cache.get_or_build(8, 3.0, 2.2).unwrap();
    assert_eq!(cache.len(), 2);
    // 1.0 was touched last, so 2.0 went
    assert!(Arc::ptr_eq(&a, &cache.get_or_build(8, 1.0, 2.2).unwrap()));
    assert_eq!(a.len(), 256);
}

#[test]
fn animated_exposure_keeps_the_shared_cache_bounded() {
    for i in 0..200 {
        LinearTable::shared(16, 1.0 + i as f32 * 0.01, 2.2).unwrap();
    }
    let cache = LinearTable::shared_cache();
    assert_eq!(cache.capacity(), TABLE_CACHE_CAPACITY);
    assert!(cache.len() <= TABLE_CACHE_CAPACITY);
}

#[test]
fn cached_table_is_safe_to_build_concurrently() {
    let cache = TableCache::new(TABLE_CACHE_CAPACITY);
    let tables: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| cache.get_or_build(12, 0.75, 1.1).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(tables.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn gray_weights() {
    assert!((to_gray([0.0, 0.0, 1.0, 1.0]) - 0.306).abs() < 1e-6);
    assert!((to_gray([1.0, 1.0, 1.0, 0.0]) - 1.024).abs() < 1e-6);
}

#[test]
fn xyz_round_trip_is_close() {
    let px = [0.2, 0.5, 0.8, 0.6];
    let back = to_bgr(to_xyz(px));
    for c in 0..4 {
        assert!((back[c] - px[c]).abs() < 0.01, "channel {c}: {back:?}");
    }
}

proptest! {
    #[test]
    fn nonlinear_inverts_linear(x in 0.0f64..0.99, exposure in 0.1f64..8.0, gamma in 0.3f64..3.0) {
        let y = to_nonlinear(to_linear(x, exposure, gamma), exposure, gamma);
        prop_assert!((y - x).abs() < 1e-9, "{x} -> {y}");
    }
}
