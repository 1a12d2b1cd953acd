use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::buffer::marshal::ElementType;
use crate::buffer::pixel::{Depth, PixelBuffer};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::RasterFxError;
use crate::fx::builtin::Builtin;
use crate::fx::context::RenderContext;
use crate::fx::contract::{ParamPrototype, Params, Ports};
use crate::host::SetupRejection;
use crate::host::memory::{MemoryHost, MemoryTile};

static FRAMES: AtomicUsize = AtomicUsize::new(0);

const INSPECT_META: EffectMeta = EffectMeta {
    ports: &["Fore", "Back"],
    param_groups: &["Shape", "Color"],
    params: &[
        ParamPrototype::new("size", 0, 1.0, 0.0, 2.0),
        ParamPrototype::new("hue", 1, 0.0, 0.0, 360.0),
        ParamPrototype::new("angle", 0, 0.0, -180.0, 180.0),
    ],
};

struct Inspector;

impl Effect for Inspector {
    fn meta(&self) -> EffectMeta {
        INSPECT_META
    }

    fn begin_frame(&mut self) -> RasterFxResult<()> {
        FRAMES.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn end_render(&mut self) -> RasterFxResult<()> {
        Err(RasterFxError::compute("end_render refused"))
    }

    fn compute(
        &mut self,
        _ctx: &RenderContext,
        _params: &Params,
        _ports: &Ports,
        _out: &mut PixelBuffer,
    ) -> RasterFxResult<()> {
        Err(RasterFxError::compute("inspector never draws"))
    }
}

fn inspector() -> Arc<FxPlugin> {
    FxPlugin::shared(PluginInfo::new("inspector", "test", "records calls"), || {
        Box::new(Inspector)
    })
}

#[derive(Default)]
struct RecordingSink {
    pages: Vec<ParamPage>,
    ports: Vec<String>,
    reject: bool,
}

impl SetupSink for RecordingSink {
    fn set_parameter_pages(
        &mut self,
        _node: NodeId,
        pages: &[ParamPage],
    ) -> Result<(), SetupRejection> {
        if self.reject {
            return Err(SetupRejection {
                reason: 7,
                entry: Some("hue".to_owned()),
            });
        }
        self.pages = pages.to_vec();
        Ok(())
    }

    fn add_input_port(&mut self, _node: NodeId, name: &str) {
        self.ports.push(name.to_owned());
    }
}

#[test]
fn info_identifier_joins_vendor_and_name() {
    let plugin = inspector();
    assert_eq!(plugin.info().identifier, "test_inspector");
    assert_eq!(plugin.info().version, (1, 0));
    assert!(format!("{plugin:?}").contains("test_inspector"));
}

#[test]
fn setup_groups_parameters_and_declares_ports() {
    let mut sink = RecordingSink::default();
    assert_eq!(inspector().setup(&mut sink, NodeId(1)), Status::Ok);

    assert_eq!(sink.pages.len(), 1);
    let page = &sink.pages[0];
    assert_eq!(page.label, PARAM_PAGE);
    let labels: Vec<_> = page.groups.iter().map(|g| g.label).collect();
    assert_eq!(labels, ["Shape", "Color"]);
    let shape: Vec<_> = page.groups[0].params.iter().map(|p| p.name).collect();
    assert_eq!(shape, ["size", "angle"]);
    assert_eq!(page.groups[1].params[0].name, "hue");
    assert_eq!(sink.ports, ["Fore", "Back"]);
}

#[test]
fn rejected_layout_still_declares_ports() {
    let mut sink = RecordingSink {
        reject: true,
        ..RecordingSink::default()
    };
    assert_eq!(inspector().setup(&mut sink, NodeId(1)), Status::Ok);
    assert!(sink.pages.is_empty());
    assert_eq!(sink.ports.len(), 2);
}

#[test]
fn clones_share_and_only_the_owner_releases() {
    let plugin = inspector();
    let mut host = MemoryHost::new();
    let node = host.add_fx(Arc::clone(&plugin)).unwrap();
    assert_eq!(plugin.instance_count(), 1);
    let id = host.user_data(node);
    assert!(id.is_some());

    let clone = host.clone_node(node).unwrap();
    assert_eq!(host.user_data(clone), id);
    assert_eq!(plugin.instance_count(), 1);

    host.remove_node(clone).unwrap();
    assert_eq!(plugin.instance_count(), 1);
    assert_eq!(plugin.start_render(&host, node), Status::Ok);

    host.remove_node(node).unwrap();
    assert_eq!(plugin.instance_count(), 0);
    assert_eq!(host.user_data(node), None);
}

#[test]
fn orphaned_clone_has_no_instance() {
    let plugin = inspector();
    let mut host = MemoryHost::new();
    let node = host.add_fx(Arc::clone(&plugin)).unwrap();
    let clone = host.clone_node(node).unwrap();
    host.remove_node(node).unwrap();

    assert_eq!(plugin.start_render(&host, clone), Status::Failed);
    assert_eq!(plugin.node_destroy(&host, clone), Status::Ok);
}

#[test]
fn lifecycle_callbacks_reach_the_instance() {
    let plugin = inspector();
    let mut host = MemoryHost::new();
    let node = host.add_fx(Arc::clone(&plugin)).unwrap();
    let settings = RenderSettings::default();

    let before = FRAMES.load(Ordering::SeqCst);
    assert_eq!(plugin.on_new_frame(&host, node, &settings, 3.0), Status::Ok);
    assert!(FRAMES.load(Ordering::SeqCst) > before);
    assert_eq!(plugin.on_end_frame(&host, node, &settings, 3.0), Status::Ok);
    assert_eq!(plugin.start_render(&host, node), Status::Ok);
    assert_eq!(plugin.end_render(&host, node), Status::Failed);
    assert_eq!(plugin.can_handle(&host, node, &settings), Status::Ok);
}

#[test]
fn callbacks_without_instance_fail() {
    let plugin = inspector();
    let host = MemoryHost::new();
    let settings = RenderSettings::default();
    let ghost = NodeId(42);
    assert_eq!(plugin.start_render(&host, ghost), Status::Failed);
    assert_eq!(plugin.get_bbox(&host, ghost, &settings, 0.0), Err(Status::Failed));
    let mut tile = MemoryTile::new(HostRect::new(0.0, 0.0, 1.0, 1.0), ElementType::Rgba32).unwrap();
    assert_eq!(
        plugin.compute(&host, ghost, &settings, 0.0, &mut tile),
        Status::Failed
    );
}

#[test]
fn bbox_of_builtins() {
    let settings = RenderSettings::default();
    let mut host = MemoryHost::new();
    let src = host.add_source(PixelBuffer::new(4, 4, Depth::U8), Point::new(10.0, 10.0));

    let blur = Arc::new(Builtin::Blur.plugin());
    let b = host.add_fx(Arc::clone(&blur)).unwrap();
    host.set_param(b, "ksize_width", 1.0).unwrap();
    host.set_param(b, "ksize_height", 2.0).unwrap();
    assert_eq!(blur.get_bbox(&host, b, &settings, 0.0), Err(Status::Failed));
    host.connect(b, "Input", src).unwrap();
    assert_eq!(
        blur.get_bbox(&host, b, &settings, 0.0),
        Ok(HostRect::new(9.0, 8.0, 16.0, 17.0))
    );

    let snp = Arc::new(Builtin::SaltAndPepper.plugin());
    let s = host.add_fx(Arc::clone(&snp)).unwrap();
    host.connect(s, "Input", src).unwrap();
    assert_eq!(snp.get_bbox(&host, s, &settings, 0.0), Ok(HostRect::UNBOUNDED));
}

#[test]
fn memory_estimate_follows_bpp() {
    let plugin = inspector();
    let host = MemoryHost::new();
    let mut settings = RenderSettings::default();
    let rect = HostRect::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(plugin.memory_requirement(&host, NodeId(1), &settings, 0.0, rect), 400);
    settings.bpp = 64;
    assert_eq!(plugin.memory_requirement(&host, NodeId(1), &settings, 0.0, rect), 800);

    let partial = HostRect::new(0.0, 0.0, 2.5, 1.0);
    assert_eq!(plugin.memory_requirement(&host, NodeId(1), &settings, 0.0, partial), 24);
    let unbounded = HostRect::UNBOUNDED;
    assert_eq!(plugin.memory_requirement(&host, NodeId(1), &settings, 0.0, unbounded), 0);
}

#[test]
fn failed_compute_reports_ok_and_writes_nothing() {
    let plugin = inspector();
    let mut host = MemoryHost::new();
    let node = host.add_fx(Arc::clone(&plugin)).unwrap();
    let src = host.add_source(
        PixelBuffer::filled(2, 2, Depth::U8, [1.0; 4]),
        Point::ZERO,
    );
    host.connect(node, "Fore", src).unwrap();

    let mut tile = MemoryTile::new(HostRect::new(0.0, 0.0, 2.0, 2.0), ElementType::Rgba32).unwrap();
    let status = plugin.compute(&host, node, &RenderSettings::default(), 0.0, &mut tile);
    assert_eq!(status, Status::Ok);
    assert!(tile.raw().iter().all(|&b| b == 0));
}

#[test]
fn compute_with_nothing_connected_is_ok() {
    let plugin = inspector();
    let mut host = MemoryHost::new();
    let node = host.add_fx(Arc::clone(&plugin)).unwrap();
    let mut tile = MemoryTile::new(
        HostRect::from_rect(Rect::new(0.0, 0.0, 1.0, 1.0)),
        ElementType::Rgba32,
    )
    .unwrap();
    let status = plugin.compute(&host, node, &RenderSettings::default(), 0.0, &mut tile);
    assert_eq!(status, Status::Ok);
}

#[test]
fn status_codes() {
    assert_eq!(Status::Ok.code(), 0);
    assert_eq!(Status::Failed.code(), 1);
    assert_eq!(Status::FailedToCreate.code(), -12);
    assert!(Status::Ok.is_ok());
    assert!(!Status::Failed.is_ok());
}
