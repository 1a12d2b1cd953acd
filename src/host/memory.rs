//! A self-contained [`Host`] that keeps the node graph, parameters and tiles in memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::buffer::marshal::{self, ElementType, TileStorage, extent};
use crate::buffer::pixel::{Depth, PixelBuffer};
use crate::foundation::core::{HostRect, Point, Rect, Size};
use crate::foundation::error::{RasterFxError, RasterFxResult};
use crate::fx::context::RenderSettings;
use crate::host::{
    Host, InstanceId, NodeId, ParamPage, PortLink, SetupRejection, SetupSink,
};
use crate::render::plugin::FxPlugin;

/// Largest tile the memory host agrees to allocate, in pixels.
pub const MAX_TILE_PIXELS: u64 = 1 << 28;

/// Strided BGRA tile backed by a `Vec<u8>`.
#[derive(Clone, Debug)]
pub struct MemoryTile {
    rect: HostRect,
    element_type: ElementType,
    stride: usize,
    data: Vec<u8>,
    mapped: bool,
    locked: bool,
    acquired: usize,
    released: usize,
}

impl MemoryTile {
    /// Zeroed tile covering `rect`, rows tightly packed.
    pub fn new(rect: HostRect, element_type: ElementType) -> RasterFxResult<Self> {
        Self::with_row_padding(rect, element_type, 0)
    }

    /// Zeroed tile whose rows carry `padding` extra bytes.
    pub fn with_row_padding(
        rect: HostRect,
        element_type: ElementType,
        padding: usize,
    ) -> RasterFxResult<Self> {
        let (w, h) = (rect.width(), rect.height());
        if !(w.is_finite() && h.is_finite()) {
            return Err(RasterFxError::validation("tile rect must be finite"));
        }
        let (w, h) = (extent(w), extent(h));
        if u64::from(w) * u64::from(h) > MAX_TILE_PIXELS {
            return Err(RasterFxError::validation(format!(
                "tile of {w}x{h} pixels exceeds the allocation limit"
            )));
        }
        let bpp = element_type.depth().unwrap_or(Depth::U8).bytes_per_pixel();
        let stride = w as usize * bpp + padding;
        Ok(Self {
            rect,
            element_type,
            stride,
            data: vec![0; stride * h as usize],
            mapped: true,
            locked: false,
            acquired: 0,
            released: 0,
        })
    }

    /// Same tile, but its memory refuses to be locked.
    pub fn unmapped(mut self) -> Self {
        self.mapped = false;
        self
    }

    /// Return `true` while the raw memory is borrowed.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// `(lock attempts, releases)` so far.
    pub fn lock_counts(&self) -> (usize, usize) {
        (self.acquired, self.released)
    }

    /// Raw strided bytes, row padding included.
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    /// Copy the tile contents out into a packed buffer.
    pub fn to_buffer(&mut self) -> RasterFxResult<PixelBuffer> {
        marshal::load(self)
    }
}

impl TileStorage for MemoryTile {
    fn rect(&self) -> HostRect {
        self.rect
    }

    fn element_type(&self) -> ElementType {
        self.element_type
    }

    fn raw_stride(&self) -> usize {
        self.stride
    }

    fn raw_bytes(&mut self) -> Option<&mut [u8]> {
        self.acquired += 1;
        if !self.mapped || self.locked {
            return None;
        }
        self.locked = true;
        Some(&mut self.data)
    }

    fn safen(&mut self) {
        self.released += 1;
        self.locked = false;
    }
}

enum NodeKind {
    /// A positioned image.
    Source { image: PixelBuffer, origin: Point },
    /// A solid color covering the whole plane.
    Fill { px: [f32; 4] },
    Fx {
        plugin: Arc<FxPlugin>,
        ports: BTreeMap<String, Option<NodeId>>,
        params: HashMap<String, f64>,
    },
}

/// Host graph held entirely in memory.
#[derive(Default)]
pub struct MemoryHost {
    nodes: BTreeMap<NodeId, NodeKind>,
    user_data: Mutex<HashMap<NodeId, InstanceId>>,
    next_id: u64,
}

#[derive(Default)]
struct NodeSetup {
    ports: Vec<String>,
    pages: Vec<ParamPage>,
}

impl SetupSink for NodeSetup {
    fn set_parameter_pages(
        &mut self,
        _node: NodeId,
        pages: &[ParamPage],
    ) -> Result<(), SetupRejection> {
        let mut seen = std::collections::HashSet::new();
        for param in pages.iter().flat_map(|p| &p.groups).flat_map(|g| &g.params) {
            if !seen.insert(param.name) {
                return Err(SetupRejection {
                    reason: 1,
                    entry: Some(param.name.to_owned()),
                });
            }
        }
        self.pages = pages.to_vec();
        Ok(())
    }

    fn add_input_port(&mut self, _node: NodeId, name: &str) {
        self.ports.push(name.to_owned());
    }
}

impl MemoryHost {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    /// Node producing `image` with its top-left at `origin`.
    pub fn add_source(&mut self, image: PixelBuffer, origin: Point) -> NodeId {
        let id = self.allocate_id();
        self.nodes.insert(id, NodeKind::Source { image, origin });
        id
    }

    /// Node covering the whole plane with one premultiplied color, in unit floats.
    pub fn add_fill(&mut self, px: [f32; 4]) -> NodeId {
        let id = self.allocate_id();
        self.nodes.insert(id, NodeKind::Fill { px });
        id
    }

    /// Declare a node running `plugin`: run setup, seed parameter defaults, create its instance.
    pub fn add_fx(&mut self, plugin: Arc<FxPlugin>) -> RasterFxResult<NodeId> {
        let id = self.allocate_id();
        let mut setup = NodeSetup::default();
        let status = plugin.setup(&mut setup, id);
        if !status.is_ok() {
            return Err(RasterFxError::instance(format!(
                "setup failed with status {}",
                status.code()
            )));
        }
        let params = setup
            .pages
            .iter()
            .flat_map(|p| &p.groups)
            .flat_map(|g| &g.params)
            .map(|p| (p.name.to_owned(), p.default))
            .collect();
        let ports = setup.ports.into_iter().map(|p| (p, None)).collect();
        self.nodes.insert(
            id,
            NodeKind::Fx {
                plugin: Arc::clone(&plugin),
                ports,
                params,
            },
        );
        let status = plugin.node_create(self, id);
        if !status.is_ok() {
            self.nodes.remove(&id);
            return Err(RasterFxError::instance(format!(
                "node creation failed with status {}",
                status.code()
            )));
        }
        Ok(id)
    }

    /// Plug `upstream` into `port` of `node`.
    pub fn connect(&mut self, node: NodeId, port: &str, upstream: NodeId) -> RasterFxResult<()> {
        if !self.nodes.contains_key(&upstream) {
            return Err(RasterFxError::validation(format!(
                "unknown upstream node {upstream:?}"
            )));
        }
        *self.port_slot(node, port)? = Some(upstream);
        Ok(())
    }

    /// Unplug `port` of `node`.
    pub fn disconnect(&mut self, node: NodeId, port: &str) -> RasterFxResult<()> {
        *self.port_slot(node, port)? = None;
        Ok(())
    }

    fn port_slot(&mut self, node: NodeId, port: &str) -> RasterFxResult<&mut Option<NodeId>> {
        match self.nodes.get_mut(&node) {
            Some(NodeKind::Fx { ports, .. }) => ports
                .get_mut(port)
                .ok_or_else(|| RasterFxError::InvalidPort {
                    port: port.to_owned(),
                }),
            _ => Err(RasterFxError::validation(format!(
                "{node:?} is not an effect node"
            ))),
        }
    }

    /// Set a parameter value; the engine clamps it when fetching.
    pub fn set_param(&mut self, node: NodeId, name: &str, value: f64) -> RasterFxResult<()> {
        match self.nodes.get_mut(&node) {
            Some(NodeKind::Fx { params, .. }) => match params.get_mut(name) {
                Some(v) => {
                    *v = value;
                    Ok(())
                }
                None => Err(RasterFxError::MissingParam(name.to_owned())),
            },
            _ => Err(RasterFxError::validation(format!(
                "{node:?} is not an effect node"
            ))),
        }
    }

    /// Drop a parameter from a node, as a host with a stale layout would.
    pub fn remove_param(&mut self, node: NodeId, name: &str) {
        if let Some(NodeKind::Fx { params, .. }) = self.nodes.get_mut(&node) {
            params.remove(name);
        }
    }

    /// Duplicate a node's definition and user data, then notify the plugin.
    pub fn clone_node(&mut self, node: NodeId) -> RasterFxResult<NodeId> {
        let kind = match self.nodes.get(&node) {
            Some(NodeKind::Source { image, origin }) => NodeKind::Source {
                image: image.clone(),
                origin: *origin,
            },
            Some(NodeKind::Fill { px }) => NodeKind::Fill { px: *px },
            Some(NodeKind::Fx {
                plugin,
                ports,
                params,
            }) => NodeKind::Fx {
                plugin: Arc::clone(plugin),
                ports: ports.clone(),
                params: params.clone(),
            },
            None => {
                return Err(RasterFxError::validation(format!("unknown node {node:?}")));
            }
        };
        let id = self.allocate_id();
        let plugin = match &kind {
            NodeKind::Fx { plugin, .. } => Some(Arc::clone(plugin)),
            _ => None,
        };
        self.nodes.insert(id, kind);
        let data = self.user_data(node);
        self.set_user_data(id, data);
        if let Some(plugin) = plugin {
            let status = plugin.node_create(self, id);
            if !status.is_ok() {
                return Err(RasterFxError::instance(format!(
                    "clone creation failed with status {}",
                    status.code()
                )));
            }
        }
        Ok(id)
    }

    /// Remove a node, letting its plugin release the instance it owns.
    pub fn remove_node(&mut self, node: NodeId) -> RasterFxResult<()> {
        if let Some(plugin) = self.plugin(node) {
            let status = plugin.node_destroy(self, node);
            if !status.is_ok() {
                return Err(RasterFxError::instance(format!(
                    "node destruction failed with status {}",
                    status.code()
                )));
            }
        }
        self.nodes
            .remove(&node)
            .ok_or_else(|| RasterFxError::validation(format!("unknown node {node:?}")))?;
        self.set_user_data(node, None);
        Ok(())
    }

    /// Plugin running on `node`, for effect nodes.
    pub fn plugin(&self, node: NodeId) -> Option<Arc<FxPlugin>> {
        match self.nodes.get(&node) {
            Some(NodeKind::Fx { plugin, .. }) => Some(Arc::clone(plugin)),
            _ => None,
        }
    }

    /// Render `node` into a fresh tile covering `rect`.
    pub fn render(
        &self,
        node: NodeId,
        settings: &RenderSettings,
        frame: f64,
        rect: HostRect,
    ) -> RasterFxResult<MemoryTile> {
        let mut tile = MemoryTile::new(rect, settings.element_type())?;
        self.render_into(node, settings, frame, &mut tile)?;
        Ok(tile)
    }

    /// Render `node` into an existing tile.
    pub fn render_into(
        &self,
        node: NodeId,
        settings: &RenderSettings,
        frame: f64,
        tile: &mut dyn TileStorage,
    ) -> RasterFxResult<()> {
        let element_type = tile.element_type();
        match self.nodes.get(&node) {
            Some(NodeKind::Source { image, origin }) => {
                let depth = element_type
                    .depth()
                    .ok_or(RasterFxError::UnsupportedPixelFormat(element_type))?;
                let size = Size::new(f64::from(image.width()), f64::from(image.height()));
                let target = Rect::from_origin_size(*origin, size);
                marshal::store(tile, target, &image.to_depth(depth))
            }
            Some(NodeKind::Fill { px }) => {
                let depth = element_type
                    .depth()
                    .ok_or(RasterFxError::UnsupportedPixelFormat(element_type))?;
                let rect = tile.rect();
                let fill = PixelBuffer::filled(
                    extent(rect.width()),
                    extent(rect.height()),
                    depth,
                    *px,
                );
                marshal::store(tile, rect.to_rect(), &fill)
            }
            Some(NodeKind::Fx { plugin, .. }) => {
                let status = plugin.compute(self, node, settings, frame, tile);
                if status.is_ok() {
                    Ok(())
                } else {
                    Err(RasterFxError::instance(format!(
                        "compute on {node:?} returned status {}",
                        status.code()
                    )))
                }
            }
            None => Err(RasterFxError::validation(format!("unknown node {node:?}"))),
        }
    }

    /// Bbox of `node` as the host would report it.
    pub fn bbox(&self, node: NodeId, settings: &RenderSettings, frame: f64) -> Option<HostRect> {
        match self.nodes.get(&node)? {
            NodeKind::Source { image, origin } => Some(HostRect::new(
                origin.x,
                origin.y,
                origin.x + f64::from(image.width()),
                origin.y + f64::from(image.height()),
            )),
            NodeKind::Fill { .. } => Some(HostRect::UNBOUNDED),
            NodeKind::Fx { plugin, .. } => plugin.get_bbox(self, node, settings, frame).ok(),
        }
    }
}

impl Host for MemoryHost {
    fn input_port(&self, node: NodeId, port: &str) -> PortLink {
        let Some(NodeKind::Fx { ports, .. }) = self.nodes.get(&node) else {
            return PortLink::Missing;
        };
        match ports.get(port) {
            None => PortLink::Missing,
            Some(None) => PortLink::Disconnected,
            Some(Some(up)) if self.nodes.contains_key(up) => PortLink::Connected(*up),
            Some(Some(_)) => PortLink::Dangling,
        }
    }

    fn param_value(&self, node: NodeId, name: &str, _frame: f64) -> Option<f64> {
        match self.nodes.get(&node) {
            Some(NodeKind::Fx { params, .. }) => params.get(name).copied(),
            _ => None,
        }
    }

    fn user_data(&self, node: NodeId) -> Option<InstanceId> {
        let slots = self.user_data.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(&node).copied()
    }

    fn set_user_data(&self, node: NodeId, data: Option<InstanceId>) {
        let mut slots = self.user_data.lock().unwrap_or_else(|e| e.into_inner());
        match data {
            Some(id) => slots.insert(node, id),
            None => slots.remove(&node),
        };
    }

    fn upstream_bbox(
        &self,
        upstream: NodeId,
        settings: &RenderSettings,
        frame: f64,
    ) -> Option<HostRect> {
        self.bbox(upstream, settings, frame)
    }

    fn compute_upstream(
        &self,
        upstream: NodeId,
        settings: &RenderSettings,
        frame: f64,
        rect: HostRect,
    ) -> Option<Box<dyn TileStorage + Send>> {
        let mut tile = match MemoryTile::new(rect, settings.element_type()) {
            Ok(tile) => tile,
            Err(e) => {
                tracing::debug!(?upstream, error = %e, "cannot allocate upstream tile");
                return None;
            }
        };
        if let Err(e) = self.render_into(upstream, settings, frame, &mut tile) {
            tracing::debug!(?upstream, error = %e, "upstream render failed; tile left blank");
        }
        Some(Box::new(tile))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/memory.rs"]
mod tests;
