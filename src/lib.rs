//! rasterfx is an image-effect execution engine for node-based compositing hosts.
//!
//! A host owns the node graph; the engine owns effect instances and runs them:
//!
//! - Wrap an [`Effect`] in an [`FxPlugin`] (or use a [`Builtin`])
//! - Drive its callbacks through a [`Host`] implementation such as [`MemoryHost`]
//! - Each `compute` pulls inputs, resolves the output [`Region`], runs the effect and writes the
//!   destination tile
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod buffer;
pub mod effects;
pub mod foundation;
pub mod fx;
pub mod host;
pub mod render;

pub use crate::buffer::marshal::{ElementType, TileStorage};
pub use crate::buffer::pixel::{Depth, FloatImage, PixelBuffer};
pub use crate::foundation::core::{Affine, HostRect, Point, Rect, Region, Size, Vec2};
pub use crate::foundation::error::{RasterFxError, RasterFxResult};
pub use crate::fx::builtin::Builtin;
pub use crate::fx::context::{RenderContext, RenderSettings};
pub use crate::fx::contract::{Effect, EffectMeta, ParamPrototype, Params, Ports};
pub use crate::host::memory::{MemoryHost, MemoryTile};
pub use crate::host::{Host, NodeId, Status};
pub use crate::render::plugin::{FxPlugin, PluginInfo};
