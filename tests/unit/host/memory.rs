use super::*;

#[test]
fn tile_lock_refuses_reentry() {
    let mut t = MemoryTile::new(HostRect::new(0.0, 0.0, 1.0, 1.0), ElementType::Rgba32).unwrap();
    assert!(t.raw_bytes().is_some());
    assert!(t.is_locked());
    assert!(t.raw_bytes().is_none());
    t.safen();
    assert!(!t.is_locked());
    assert_eq!(t.lock_counts(), (2, 1));
}

#[test]
fn tile_rejects_unbounded_rect() {
    assert!(MemoryTile::new(HostRect::UNBOUNDED, ElementType::Rgba32).is_err());
}

#[test]
fn source_bbox_and_render() {
    let mut host = MemoryHost::new();
    let img = PixelBuffer::filled(2, 2, Depth::U8, [0.0, 0.0, 1.0, 1.0]);
    let src = host.add_source(img, Point::new(5.0, 6.0));
    let settings = RenderSettings::default();

    assert_eq!(
        host.upstream_bbox(src, &settings, 0.0),
        Some(HostRect::new(5.0, 6.0, 7.0, 8.0))
    );

    let mut tile = host
        .render(src, &settings, 0.0, HostRect::new(4.0, 4.0, 8.0, 8.0))
        .unwrap();
    let out = tile.to_buffer().unwrap();
    assert_eq!(out.pixel(0, 0), [0.0; 4]);
    assert_eq!(out.pixel(1, 2), [0.0, 0.0, 255.0, 255.0]);
}

#[test]
fn source_is_widened_to_sixteen_bit_tiles() {
    let mut host = MemoryHost::new();
    let src = host.add_source(
        PixelBuffer::filled(1, 1, Depth::U8, [1.0; 4]),
        Point::ZERO,
    );
    let settings = RenderSettings {
        bpp: 64,
        ..RenderSettings::default()
    };
    let mut tile = host
        .render(src, &settings, 0.0, HostRect::new(0.0, 0.0, 1.0, 1.0))
        .unwrap();
    assert_eq!(tile.to_buffer().unwrap().pixel(0, 0), [65535.0; 4]);
}

#[test]
fn fill_is_unbounded() {
    let mut host = MemoryHost::new();
    let fill = host.add_fill([0.5, 0.5, 0.5, 1.0]);
    let settings = RenderSettings::default();
    assert_eq!(host.bbox(fill, &settings, 0.0), Some(HostRect::UNBOUNDED));
    let tile = host.compute_upstream(fill, &settings, 0.0, HostRect::new(0.0, 0.0, 3.0, 1.0));
    assert!(tile.is_some());
}

#[test]
fn user_data_slots() {
    let host = MemoryHost::new();
    assert_eq!(host.user_data(NodeId(3)), None);
    host.set_user_data(NodeId(3), Some(InstanceId(9)));
    assert_eq!(host.user_data(NodeId(3)), Some(InstanceId(9)));
    host.set_user_data(NodeId(3), None);
    assert_eq!(host.user_data(NodeId(3)), None);
}

#[test]
fn ports_of_non_effect_nodes_are_missing() {
    let mut host = MemoryHost::new();
    let src = host.add_source(PixelBuffer::new(1, 1, Depth::U8), Point::ZERO);
    assert_eq!(host.input_port(src, "Source"), PortLink::Missing);
    assert_eq!(host.param_value(src, "radius", 0.0), None);
}

#[test]
fn duplicate_parameter_names_are_rejected_by_setup() {
    use crate::fx::contract::ParamPrototype;
    use crate::host::ParamGroup;

    let p = ParamPrototype::new("a", 0, 0.0, 0.0, 1.0);
    let pages = [ParamPage {
        label: "Properties",
        groups: vec![ParamGroup {
            label: "g",
            params: vec![p, p],
        }],
    }];
    let mut sink = NodeSetup::default();
    let err = sink.set_parameter_pages(NodeId(1), &pages).unwrap_err();
    assert_eq!(err.entry.as_deref(), Some("a"));
}
