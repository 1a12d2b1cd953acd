use super::*;

#[test]
fn settings_deserialize_with_defaults() {
    let s: RenderSettings = serde_json::from_str(r#"{ "bpp": 64, "gamma": 2.2 }"#).unwrap();
    assert_eq!(s.bpp, 64);
    assert_eq!(s.gamma, 2.2);
    assert_eq!(s.affine, Affine::IDENTITY);
    assert_eq!(s.max_tile_size, 4096);
    assert_eq!(s.element_type(), ElementType::Rgba64);
}

#[test]
fn settings_round_trip_json() {
    let s = RenderSettings {
        affine: Affine::translate((3.0, -4.0)),
        is_swatch: true,
        ..RenderSettings::default()
    };
    let json = serde_json::to_string(&s).unwrap();
    let back: RenderSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}

#[test]
fn context_truncates_frame() {
    let ctx = RenderContext::new(&RenderSettings::default(), 12.75);
    assert_eq!(ctx.frame, 12);
    assert_eq!(ctx.bpp, 32);
}
