//! Region-of-effect resolution for one node.

use crate::foundation::core::{Rect, Region};
use crate::foundation::error::{RasterFxError, RasterFxResult};
use crate::fx::context::{RenderContext, RenderSettings};
use crate::fx::contract::{EffectMeta, Params};
use crate::fx::registry::InstanceSlot;
use crate::host::{Host, NodeId, PortLink};

/// Fetch every declared parameter of `node` at `frame`, clamped into its declared range.
pub(crate) fn fetch_params(
    host: &dyn Host,
    meta: &EffectMeta,
    node: NodeId,
    frame: f64,
) -> RasterFxResult<Params> {
    meta.params
        .iter()
        .map(|p| {
            host.param_value(node, p.name, frame)
                .map(|v| p.clamp(v))
                .ok_or_else(|| RasterFxError::MissingParam(p.name.to_owned()))
        })
        .collect::<RasterFxResult<Vec<f64>>>()
        .map(Params::from_values)
}

/// Upstream node plugged into `port`, or the reason there is none.
pub(crate) fn connected_upstream(
    host: &dyn Host,
    node: NodeId,
    port: &str,
) -> RasterFxResult<NodeId> {
    match host.input_port(node, port) {
        PortLink::Connected(up) => Ok(up),
        PortLink::Disconnected => Err(RasterFxError::DisconnectedPort {
            port: port.to_owned(),
        }),
        PortLink::Missing | PortLink::Dangling => Err(RasterFxError::InvalidPort {
            port: port.to_owned(),
        }),
    }
}

/// Region reported by whatever feeds `port`.
pub(crate) fn input_region(
    host: &dyn Host,
    node: NodeId,
    port: &str,
    settings: &RenderSettings,
    frame: f64,
) -> RasterFxResult<Region> {
    let upstream = connected_upstream(host, node, port)?;
    host.upstream_bbox(upstream, settings, frame)
        .map(Region::from_host)
        .ok_or_else(|| RasterFxError::BBoxUnavailable {
            port: port.to_owned(),
        })
}

/// Let the effect grow the union of its inputs, then classify the result.
pub(crate) fn enlarge_union(
    slot: &InstanceSlot,
    ctx: &RenderContext,
    params: &Params,
    union: Region,
) -> RasterFxResult<Region> {
    let mut rect = union.to_rect();
    slot.lock()?.enlarge(ctx, params, &mut rect)?;
    Ok(Region::from_rect(rect))
}

/// Output region of `node`.
///
/// Inputs that are disconnected, invalid, or cannot report a region are left out of the
/// union. With a `fallback`, an unbounded input contributes the fallback rectangle instead of
/// making the whole union unbounded; that is the compute-time view, where the fallback is the
/// destination tile.
#[tracing::instrument(skip(host, slot, meta, settings), fields(node = node.0))]
pub fn resolve(
    host: &dyn Host,
    slot: &InstanceSlot,
    meta: &EffectMeta,
    node: NodeId,
    settings: &RenderSettings,
    frame: f64,
    fallback: Option<Rect>,
) -> RasterFxResult<Region> {
    let params = fetch_params(host, meta, node, frame)?;
    let ctx = RenderContext::new(settings, frame);

    let mut union = Region::Empty;
    for &port in meta.ports {
        let region = match input_region(host, node, port, settings, frame) {
            Ok(region) => region,
            Err(e) => {
                tracing::debug!(port, error = %e, "input left out of bbox");
                continue;
            }
        };
        let region = match (region, fallback) {
            (Region::Unbounded, Some(tile)) => Region::from_rect(tile),
            (region, _) => region,
        };
        union = union.union(region);
    }

    enlarge_union(slot, &ctx, &params, union)
}

#[cfg(test)]
#[path = "../../tests/unit/render/bbox.rs"]
mod tests;
