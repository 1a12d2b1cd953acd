//! The callback surface a host drives: node lifecycle, bbox queries, compute.

use std::sync::Arc;

use crate::buffer::marshal::TileStorage;
use crate::foundation::core::{HostRect, Region};
use crate::foundation::error::RasterFxResult;
use crate::fx::context::RenderSettings;
use crate::fx::contract::{Effect, EffectMeta};
use crate::fx::registry::{InstanceRegistry, InstanceSlot, Removal};
use crate::host::{Host, NodeId, ParamGroup, ParamPage, SetupSink, Status};
use crate::render::bbox::resolve;
use crate::render::executor::{Outcome, execute};

/// Label of the single parameter page every plugin declares.
pub const PARAM_PAGE: &str = "Properties";

/// Builds a fresh effect instance.
pub type EffectFactory = fn() -> Box<dyn Effect>;

/// Identification a host shows for a plugin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginInfo {
    /// Display name.
    pub name: String,
    /// Vendor name.
    pub vendor: String,
    /// `vendor_name`, unique per plugin.
    pub identifier: String,
    /// One-line description.
    pub note: String,
    /// Documentation link, empty when there is none.
    pub help_url: String,
    /// `(major, minor)`.
    pub version: (u32, u32),
}

impl PluginInfo {
    /// Describe a plugin; the identifier is derived from vendor and name.
    pub fn new(name: &str, vendor: &str, note: &str) -> Self {
        Self {
            name: name.to_owned(),
            vendor: vendor.to_owned(),
            identifier: format!("{vendor}_{name}"),
            note: note.to_owned(),
            help_url: String::new(),
            version: (1, 0),
        }
    }
}

/// One effect type exposed to a host, plus the instances its nodes own.
pub struct FxPlugin {
    info: PluginInfo,
    factory: EffectFactory,
    meta: EffectMeta,
    instances: InstanceRegistry,
}

impl std::fmt::Debug for FxPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FxPlugin")
            .field("info", &self.info)
            .field("instances", &self.instances.len())
            .finish_non_exhaustive()
    }
}

impl FxPlugin {
    /// Plugin building its instances with `factory`.
    pub fn new(info: PluginInfo, factory: EffectFactory) -> Self {
        let meta = factory().meta();
        Self {
            info,
            factory,
            meta,
            instances: InstanceRegistry::new(),
        }
    }

    /// [`FxPlugin::new`], ready to share between nodes and threads.
    pub fn shared(info: PluginInfo, factory: EffectFactory) -> Arc<Self> {
        Arc::new(Self::new(info, factory))
    }

    /// Identification shown by the host.
    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    /// Ports and parameters of the effect type.
    pub fn meta(&self) -> &EffectMeta {
        &self.meta
    }

    /// Number of live instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn slot(&self, host: &dyn Host, node: NodeId) -> Option<Arc<InstanceSlot>> {
        let slot = host.user_data(node).and_then(|id| self.instances.get(id));
        if slot.is_none() {
            tracing::debug!(node = node.0, plugin = %self.info.identifier, "no instance for node");
        }
        slot
    }

    /// Run `step` on the node's instance, mapping failure to a status.
    fn with_instance(
        &self,
        host: &dyn Host,
        node: NodeId,
        what: &str,
        step: impl FnOnce(&mut dyn Effect) -> RasterFxResult<()>,
    ) -> Status {
        let Some(slot) = self.slot(host, node) else {
            return Status::Failed;
        };
        let result = slot.lock().and_then(|mut fx| step(&mut **fx));
        match result {
            Ok(()) => Status::Ok,
            Err(e) => {
                tracing::warn!(node = node.0, error = %e, "{what} failed");
                Status::Failed
            }
        }
    }

    /// Declare the parameter page and input ports of `node`.
    pub fn setup(&self, sink: &mut dyn SetupSink, node: NodeId) -> Status {
        let groups = self
            .meta
            .param_groups
            .iter()
            .enumerate()
            .map(|(i, &label)| ParamGroup {
                label,
                params: self
                    .meta
                    .params
                    .iter()
                    .filter(|p| p.group == i)
                    .copied()
                    .collect(),
            })
            .collect();
        let page = ParamPage {
            label: PARAM_PAGE,
            groups,
        };
        if let Err(rejection) = sink.set_parameter_pages(node, &[page]) {
            tracing::warn!(
                node = node.0,
                reason = rejection.reason,
                entry = rejection.entry.as_deref().unwrap_or("-"),
                "host rejected the parameter layout"
            );
        }
        for &port in self.meta.ports {
            sink.add_input_port(node, port);
        }
        Status::Ok
    }

    /// Create the node's instance, or re-initialize the one it already points at (a clone).
    pub fn node_create(&self, host: &dyn Host, node: NodeId) -> Status {
        if let Some(id) = host.user_data(node)
            && let Some(slot) = self.instances.get(id)
        {
            tracing::debug!(node = node.0, owner = slot.owner().0, "node cloned; sharing instance");
            return self.with_instance(host, node, "init", |fx| fx.init());
        }
        let id = match self.instances.insert(node, (self.factory)()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(node = node.0, error = %e, "cannot register instance");
                return Status::FailedToCreate;
            }
        };
        host.set_user_data(node, Some(id));
        tracing::debug!(node = node.0, instance = id.0, "instance created");
        self.with_instance(host, node, "init", |fx| fx.init())
    }

    /// Release the node's instance if the node created it; clones leave it alone.
    pub fn node_destroy(&self, host: &dyn Host, node: NodeId) -> Status {
        let Some(id) = host.user_data(node) else {
            return Status::Ok;
        };
        match self.instances.remove_if_owner(id, node) {
            Ok(Removal::Removed) => {
                host.set_user_data(node, None);
                tracing::debug!(node = node.0, instance = id.0, "instance released");
            }
            Ok(Removal::NotOwner(owner)) => {
                tracing::debug!(node = node.0, owner = owner.0, "clone destroyed; instance kept");
            }
            Ok(Removal::Missing) => {
                tracing::debug!(node = node.0, instance = id.0, "instance already gone");
            }
            Err(e) => {
                tracing::warn!(node = node.0, error = %e, "cannot release instance");
                return Status::Failed;
            }
        }
        Status::Ok
    }

    /// Notify the instance that a render pass starts.
    pub fn start_render(&self, host: &dyn Host, node: NodeId) -> Status {
        self.with_instance(host, node, "begin_render", |fx| fx.begin_render())
    }

    /// Notify the instance that a render pass ended.
    pub fn end_render(&self, host: &dyn Host, node: NodeId) -> Status {
        self.with_instance(host, node, "end_render", |fx| fx.end_render())
    }

    /// Notify the instance that a frame starts.
    pub fn on_new_frame(
        &self,
        host: &dyn Host,
        node: NodeId,
        _settings: &RenderSettings,
        _frame: f64,
    ) -> Status {
        self.with_instance(host, node, "begin_frame", |fx| fx.begin_frame())
    }

    /// Notify the instance that a frame ended.
    pub fn on_end_frame(
        &self,
        host: &dyn Host,
        node: NodeId,
        _settings: &RenderSettings,
        _frame: f64,
    ) -> Status {
        self.with_instance(host, node, "end_frame", |fx| fx.end_frame())
    }

    /// Every configuration is accepted.
    pub fn can_handle(&self, _host: &dyn Host, _node: NodeId, _settings: &RenderSettings) -> Status {
        Status::Ok
    }

    /// Region of effect in host form. `Err(Status::Failed)` means "no bbox".
    pub fn get_bbox(
        &self,
        host: &dyn Host,
        node: NodeId,
        settings: &RenderSettings,
        frame: f64,
    ) -> Result<HostRect, Status> {
        let slot = self.slot(host, node).ok_or(Status::Failed)?;
        match resolve(host, &slot, &self.meta, node, settings, frame, None) {
            Ok(region) => region.to_host().ok_or(Status::Failed),
            Err(e) => {
                tracing::warn!(node = node.0, error = %e, "bbox query failed");
                Err(Status::Failed)
            }
        }
    }

    /// Bytes the engine expects to need for a tile of `rect`.
    pub fn memory_requirement(
        &self,
        _host: &dyn Host,
        _node: NodeId,
        settings: &RenderSettings,
        _frame: f64,
        rect: HostRect,
    ) -> usize {
        match Region::from_host(rect) {
            Region::Bounded(r) => {
                let w = r.width().ceil() as usize;
                let h = r.height().ceil() as usize;
                w.saturating_mul(h)
                    .saturating_mul(settings.bpp.max(0) as usize)
                    / 8
            }
            Region::Empty | Region::Unbounded => 0,
        }
    }

    /// Render `node` into `tile`. Failures are logged and leave the tile as it was.
    pub fn compute(
        &self,
        host: &dyn Host,
        node: NodeId,
        settings: &RenderSettings,
        frame: f64,
        tile: &mut dyn TileStorage,
    ) -> Status {
        let Some(slot) = self.slot(host, node) else {
            return Status::Failed;
        };
        match execute(host, &slot, &self.meta, node, settings, frame, tile) {
            Ok(Outcome::Written(rect)) => {
                tracing::trace!(node = node.0, ?rect, "computed");
            }
            Ok(Outcome::NoOutput) => {}
            Err(e) => {
                tracing::warn!(node = node.0, error = %e, "compute skipped");
            }
        }
        Status::Ok
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plugin.rs"]
mod tests;
