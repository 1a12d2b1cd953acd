//! One compute call: pull inputs, size the output, run the effect, write back.

use crate::buffer::marshal::{self, ElementType, TileStorage, extent};
use crate::buffer::pixel::PixelBuffer;
use crate::foundation::core::{HostRect, Rect, Region};
use crate::foundation::error::{RasterFxError, RasterFxResult};
use crate::fx::context::{RenderContext, RenderSettings};
use crate::fx::contract::{EffectMeta, Ports};
use crate::fx::registry::InstanceSlot;
use crate::host::{Host, NodeId};
use crate::render::bbox::{connected_upstream, enlarge_union, fetch_params};

/// What a compute call did to the destination tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// The effect ran; its output covering this rectangle was written (clipped to the tile).
    Written(Rect),
    /// The effect failed; the tile was left untouched.
    NoOutput,
}

/// Compute `node` into `tile`.
///
/// Port-level problems drop the port and carry on. Errors returned from here mean nothing was
/// computed; a failing effect is reported as [`Outcome::NoOutput`].
#[tracing::instrument(skip(host, slot, meta, settings, tile), fields(node = node.0))]
pub fn execute(
    host: &dyn Host,
    slot: &InstanceSlot,
    meta: &EffectMeta,
    node: NodeId,
    settings: &RenderSettings,
    frame: f64,
    tile: &mut dyn TileStorage,
) -> RasterFxResult<Outcome> {
    let element_type = tile.element_type();
    let depth = element_type
        .depth()
        .ok_or(RasterFxError::UnsupportedPixelFormat(element_type))?;
    let params = fetch_params(host, meta, node, frame)?;
    let ctx = RenderContext::new(settings, frame);
    let tile_rect = tile.rect().to_rect();

    let mut ports = Ports::new(meta.port_count());
    let mut union = Region::Empty;
    for (i, &port) in meta.ports.iter().enumerate() {
        match pull_input(host, node, port, settings, frame, tile_rect, element_type) {
            Ok((rect, image)) => {
                union = union.union(Region::from_rect(rect));
                ports.set(i, image, rect.origin());
            }
            Err(e) => tracing::warn!(port, error = %e, "input rejected"),
        }
    }

    let out_rect = match enlarge_union(slot, &ctx, &params, union)? {
        Region::Empty => return Err(RasterFxError::EmptyOrDegenerateRegion),
        Region::Unbounded => tile_rect,
        Region::Bounded(rect) => rect,
    };
    ports.rebase(out_rect.origin());

    let width = extent(out_rect.width().ceil());
    let height = extent(out_rect.height().ceil());
    let mut out = PixelBuffer::new(width, height, depth);
    let computed = slot.lock()?.compute(&ctx, &params, &ports, &mut out);
    if let Err(e) = computed {
        tracing::warn!(error = %e, "effect failed; no output this frame");
        return Ok(Outcome::NoOutput);
    }

    marshal::store(tile, out_rect, &out)?;
    tracing::trace!(?out_rect, "output stored");
    Ok(Outcome::Written(out_rect))
}

/// Render the upstream of `port` over its region and copy it out.
///
/// An unbounded upstream is rendered over `fallback` (the destination tile) instead.
fn pull_input(
    host: &dyn Host,
    node: NodeId,
    port: &str,
    settings: &RenderSettings,
    frame: f64,
    fallback: Rect,
    element_type: ElementType,
) -> RasterFxResult<(Rect, PixelBuffer)> {
    let upstream = connected_upstream(host, node, port)?;
    let region = host
        .upstream_bbox(upstream, settings, frame)
        .map(Region::from_host)
        .ok_or_else(|| RasterFxError::BBoxUnavailable {
            port: port.to_owned(),
        })?;
    let rect = region
        .or_fallback(fallback)
        .ok_or_else(|| RasterFxError::BBoxUnavailable {
            port: port.to_owned(),
        })?;
    if region.is_unbounded() {
        tracing::debug!(port, "unbounded input clipped to the tile");
    }

    let mut input = host
        .compute_upstream(upstream, settings, frame, HostRect::from_rect(rect))
        .ok_or_else(|| RasterFxError::marshal(format!("no input tile for port '{port}'")))?;
    let input_type = input.element_type();
    if input_type.depth().is_none() {
        return Err(RasterFxError::UnsupportedPixelFormat(input_type));
    }
    if input_type != element_type {
        return Err(RasterFxError::marshal(format!(
            "input tile is {input_type:?} but the destination is {element_type:?}"
        )));
    }
    let image = marshal::load(&mut *input)?;
    Ok((rect, image))
}

#[cfg(test)]
#[path = "../../tests/unit/render/executor.rs"]
mod tests;
