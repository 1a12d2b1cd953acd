//! What an effect declares and implements, and the inputs it is handed.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::buffer::pixel::PixelBuffer;
use crate::foundation::core::{Point, Rect, Size};
use crate::foundation::error::RasterFxResult;
use crate::foundation::math::to_radian;
use crate::fx::context::RenderContext;

/// Static description of one numeric parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamPrototype {
    /// Name the host stores the value under.
    pub name: &'static str,
    /// Index into [`EffectMeta::param_groups`].
    pub group: usize,
    /// Initial value.
    pub default: f64,
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl ParamPrototype {
    /// Describe a parameter.
    pub const fn new(name: &'static str, group: usize, default: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            group,
            default,
            min,
            max,
        }
    }

    /// Bring a host-supplied value into `[min, max]`; NaN falls back to the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.max(self.min).min(self.max)
        }
    }
}

/// Ports and parameters an effect type declares. Identical for every instance of the type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectMeta {
    /// Input port names, in index order.
    pub ports: &'static [&'static str],
    /// Group labels on the parameter page.
    pub param_groups: &'static [&'static str],
    /// Parameters, in index order.
    pub params: &'static [ParamPrototype],
}

impl EffectMeta {
    /// Number of input ports.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Name of port `i`.
    pub fn port_name(&self, i: usize) -> Option<&'static str> {
        self.ports.get(i).copied()
    }

    /// Number of parameter groups.
    pub fn param_group_count(&self) -> usize {
        self.param_groups.len()
    }

    /// Label of group `i`.
    pub fn param_group_name(&self, i: usize) -> Option<&'static str> {
        self.param_groups.get(i).copied()
    }

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Prototype of parameter `i`.
    pub fn param_prototype(&self, i: usize) -> Option<&ParamPrototype> {
        self.params.get(i)
    }

    /// Index of the parameter called `name`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

/// Integer types a unit-range parameter can be scaled into for seeding.
pub trait SeedInt: Copy {
    /// Scale `v` in `[0, 1]` to the full range of the type.
    fn from_unit(v: f64) -> Self;
}

impl SeedInt for u32 {
    fn from_unit(v: f64) -> Self {
        (v * f64::from(u32::MAX)) as u32
    }
}

impl SeedInt for u64 {
    fn from_unit(v: f64) -> Self {
        (v * u64::MAX as f64) as u64
    }
}

/// Parameter values fetched for one call, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: Vec<f64>,
}

impl Params {
    /// `count` parameters, all zero.
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![0.0; count],
        }
    }

    /// Wrap values already in declaration order.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Every parameter at its declared default.
    pub fn defaults(meta: &EffectMeta) -> Self {
        Self::from_values(meta.params.iter().map(|p| p.default).collect())
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` when there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in declaration order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Overwrite value `i`.
    pub fn set(&mut self, i: usize, value: f64) {
        self.values[i] = value;
    }

    /// Value `i` as fetched.
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Value `i` narrowed to `f32`.
    pub fn get_f32(&self, i: usize) -> f32 {
        self.values[i] as f32
    }

    /// Rounded to the nearest integer.
    pub fn get_int(&self, i: usize) -> i32 {
        self.values[i].round() as i32
    }

    /// Value `i` read as a switch: on from `0.5` up.
    pub fn get_bool(&self, i: usize) -> bool {
        self.values[i] >= 0.5
    }

    /// Value `i` multiplied by `scale`.
    pub fn scaled(&self, i: usize, scale: f64) -> f64 {
        self.values[i] * scale
    }

    /// Value `i` multiplied by `scale`, then rounded.
    pub fn scaled_int(&self, i: usize, scale: f64) -> i32 {
        (self.values[i] * scale).round() as i32
    }

    /// Value interpreted as degrees, returned in radians.
    pub fn radian(&self, i: usize) -> f64 {
        to_radian(self.values[i])
    }

    /// Unit-range value scaled to the full range of `T`.
    pub fn seed<T: SeedInt>(&self, i: usize) -> T {
        T::from_unit(self.values[i])
    }

    /// Deterministic generator seeded from parameter `i`.
    pub fn rng(&self, i: usize) -> StdRng {
        StdRng::seed_from_u64(self.seed::<u64>(i))
    }
}

impl std::ops::Index<usize> for Params {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

/// Pixels pulled from one input port, with the position of their top-left corner.
#[derive(Clone, Debug, PartialEq)]
pub struct PortInput {
    /// Pixels rendered by the upstream node.
    pub image: PixelBuffer,
    /// Relative to the output buffer once handed to `compute`.
    pub offset: Point,
}

/// Per-call input set, indexed like [`EffectMeta::ports`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ports {
    slots: Vec<Option<PortInput>>,
}

impl Ports {
    /// `count` ports, none of them valid yet.
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// Fill port `i`.
    pub fn set(&mut self, i: usize, image: PixelBuffer, offset: Point) {
        self.slots[i] = Some(PortInput { image, offset });
    }

    /// Number of declared ports.
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Return `true` when port `i` received an image.
    pub fn is_valid(&self, i: usize) -> bool {
        matches!(self.slots.get(i), Some(Some(_)))
    }

    /// Return `true` when port `i` is absent or rejected.
    pub fn is_invalid(&self, i: usize) -> bool {
        !self.is_valid(i)
    }

    /// Image and offset of port `i`.
    pub fn input(&self, i: usize) -> Option<&PortInput> {
        self.slots.get(i).and_then(Option::as_ref)
    }

    /// Image of port `i`.
    pub fn get(&self, i: usize) -> Option<&PixelBuffer> {
        self.input(i).map(|p| &p.image)
    }

    /// Offset of port `i` from the output origin.
    pub fn offset(&self, i: usize) -> Option<Point> {
        self.input(i).map(|p| p.offset)
    }

    /// Mutable offset of port `i`.
    pub fn offset_mut(&mut self, i: usize) -> Option<&mut Point> {
        self.slots
            .get_mut(i)
            .and_then(Option::as_mut)
            .map(|p| &mut p.offset)
    }

    /// Pixel size of port `i`.
    pub fn size(&self, i: usize) -> Option<Size> {
        self.get(i)
            .map(|b| Size::new(f64::from(b.width()), f64::from(b.height())))
    }

    /// Area port `i` covers relative to the output origin.
    pub fn rect(&self, i: usize) -> Option<Rect> {
        let input = self.input(i)?;
        let size = Size::new(
            f64::from(input.image.width()),
            f64::from(input.image.height()),
        );
        Some(Rect::from_origin_size(input.offset, size))
    }

    /// Express every offset relative to `origin`.
    pub(crate) fn rebase(&mut self, origin: Point) {
        for input in self.slots.iter_mut().flatten() {
            input.offset = Point::new(input.offset.x - origin.x, input.offset.y - origin.y);
        }
    }
}

/// An image effect type.
///
/// One instance exists per node. The engine serializes access to an instance; different
/// instances may run concurrently on different threads.
pub trait Effect: Send {
    /// Ports and parameters of this effect type.
    fn meta(&self) -> EffectMeta;

    /// Called once the node exists, and again when it is cloned.
    fn init(&mut self) -> RasterFxResult<()> {
        Ok(())
    }

    /// Called before a render pass starts.
    fn begin_render(&mut self) -> RasterFxResult<()> {
        Ok(())
    }

    /// Called after a render pass ends.
    fn end_render(&mut self) -> RasterFxResult<()> {
        Ok(())
    }

    /// Called before each frame of a render pass.
    fn begin_frame(&mut self) -> RasterFxResult<()> {
        Ok(())
    }

    /// Called after each frame of a render pass.
    fn end_frame(&mut self) -> RasterFxResult<()> {
        Ok(())
    }

    /// Grow (or replace) the union of the input regions into this node's output region.
    ///
    /// `rect` may arrive as the empty-union rectangle (`+inf..-inf`) or the infinite one; an
    /// effect that covers the whole frame writes [`crate::foundation::core::infinite_rect`].
    fn enlarge(&self, _ctx: &RenderContext, _params: &Params, _rect: &mut Rect) -> RasterFxResult<()> {
        Ok(())
    }

    /// Render into `out`, whose top-left corner is the origin of every port offset.
    ///
    /// `out` starts zeroed and has the depth of the destination tile.
    fn compute(
        &mut self,
        ctx: &RenderContext,
        params: &Params,
        ports: &Ports,
        out: &mut PixelBuffer,
    ) -> RasterFxResult<()>;
}

#[cfg(test)]
#[path = "../../tests/unit/fx/contract.rs"]
mod tests;
