//! Boundary to the compositing application that owns the node graph.
//!
//! Everything the engine needs from its host goes through [`Host`] and [`SetupSink`]; the
//! engine never sees the host's graph directly.

pub mod memory;

use crate::buffer::marshal::TileStorage;
use crate::foundation::core::HostRect;
use crate::fx::contract::ParamPrototype;
use crate::fx::context::RenderSettings;

/// Host handle of a node in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Registry key of an effect instance, stored in a node's user-data slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// What a named input port of a node is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortLink {
    /// The node has no port with that name.
    Missing,
    /// The port exists but nothing is plugged in.
    Disconnected,
    /// The port is plugged into something that is no longer a valid node.
    Dangling,
    /// The port is fed by this upstream node.
    Connected(NodeId),
}

/// Host services used while rendering.
///
/// Implementations must tolerate calls from several threads for different nodes at once.
pub trait Host: Sync {
    /// What `port` of `node` is attached to.
    fn input_port(&self, node: NodeId, port: &str) -> PortLink;

    /// Parameter value at `frame`, `None` if the node has no such parameter.
    fn param_value(&self, node: NodeId, name: &str, frame: f64) -> Option<f64>;

    /// Instance id stored on `node`, if any.
    fn user_data(&self, node: NodeId) -> Option<InstanceId>;

    /// Store (or clear) the instance id of `node`.
    fn set_user_data(&self, node: NodeId, data: Option<InstanceId>);

    /// Region of effect of an upstream node in host form, `None` when the host cannot tell.
    fn upstream_bbox(
        &self,
        upstream: NodeId,
        settings: &RenderSettings,
        frame: f64,
    ) -> Option<HostRect>;

    /// Allocate a tile covering `rect` and render `upstream` into it.
    ///
    /// `None` when the host cannot create the tile.
    fn compute_upstream(
        &self,
        upstream: NodeId,
        settings: &RenderSettings,
        frame: f64,
        rect: HostRect,
    ) -> Option<Box<dyn TileStorage + Send>>;
}

/// Integer status returned through the host callback boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Success.
    Ok,
    /// Generic failure, also used for "no bbox".
    Failed,
    /// The node's instance could not be created.
    FailedToCreate,
}

impl Status {
    /// Integer code handed to the host.
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Failed => 1,
            Self::FailedToCreate => -12,
        }
    }

    /// Return `true` for [`Status::Ok`].
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// Labeled group of parameters on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamGroup {
    /// Group label.
    pub label: &'static str,
    /// Parameters in display order.
    pub params: Vec<ParamPrototype>,
}

/// One page of the host's parameter UI.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamPage {
    /// Page label.
    pub label: &'static str,
    /// Groups in display order.
    pub groups: Vec<ParamGroup>,
}

/// Why the host refused a parameter layout, and which entry it choked on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupRejection {
    /// Host error code.
    pub reason: i32,
    /// Name of the offending parameter, when known.
    pub entry: Option<String>,
}

/// Host services used once per node at setup time.
pub trait SetupSink {
    /// Publish the parameter layout of `node`.
    fn set_parameter_pages(
        &mut self,
        node: NodeId,
        pages: &[ParamPage],
    ) -> Result<(), SetupRejection>;

    /// Declare an input port on `node`.
    fn add_input_port(&mut self, node: NodeId, name: &str);
}
