//! Glow effect over the single input, computed in linear light.

use crate::buffer::pixel::{CHANNELS, Depth, FloatImage, PixelBuffer};
use crate::effects::bloom::bloom;
use crate::effects::color::{ColorSpaceConverter, LinearTable};
use crate::effects::composite::composite_over;
use crate::foundation::error::RasterFxResult;
use crate::fx::context::RenderContext;
use crate::fx::contract::{Effect, EffectMeta, ParamPrototype, Params, Ports};

const PORT_INPUT: usize = 0;

const LEVEL: usize = 0;
const RADIUS: usize = 1;
const GAIN: usize = 2;
const EXPOSURE: usize = 3;

pub(crate) const META: EffectMeta = EffectMeta {
    ports: &["Input"],
    param_groups: &["Default"],
    params: &[
        ParamPrototype::new("level", 0, 4.0, 0.0, 10.0),
        ParamPrototype::new("radius", 0, 1.0, 0.0, 20.0),
        ParamPrototype::new("gain", 0, 1.0, 0.0, 10.0),
        ParamPrototype::new("exposure", 0, 1.0, 0.1, 10.0),
    ],
};

/// Adds a multi-scale glow to the input, in linear light.
#[derive(Debug, Default)]
pub struct Bloom;

fn bit_depth(depth: Depth) -> u32 {
    depth.bytes_per_channel() as u32 * 8
}

/// Color channels to linear light, alpha scaled to unit range.
fn linearize(img: &FloatImage, table: &LinearTable, max: f32) -> FloatImage {
    let mut lin = img.clone();
    for px in lin.data.chunks_exact_mut(CHANNELS) {
        for c in &mut px[..3] {
            let code = c.round().max(0.0) as usize;
            *c = if code == 0 { 0.0 } else { table.get(code) };
        }
        px[3] /= max;
    }
    lin
}

impl Effect for Bloom {
    fn meta(&self) -> EffectMeta {
        META
    }

    fn compute(
        &mut self,
        ctx: &RenderContext,
        params: &Params,
        ports: &Ports,
        out: &mut PixelBuffer,
    ) -> RasterFxResult<()> {
        let Some(input) = ports.input(PORT_INPUT) else {
            return Ok(());
        };
        composite_over(out, &input.image, input.offset)?;

        let gamma = if ctx.gamma.is_finite() && ctx.gamma > 0.0 {
            ctx.gamma
        } else {
            1.0
        };
        let conv = ColorSpaceConverter::new(params.get(EXPOSURE), gamma)?;
        let depth = out.depth();
        let max = depth.max_value();
        let table = conv.table(bit_depth(depth))?;

        let lin = linearize(&out.to_float(), &table, max);
        let level = params.get_int(LEVEL).max(0) as u32;
        let radius = params.get_int(RADIUS).max(0) as u32;
        let glow = bloom(&lin, level, radius)?;
        let gain = params.get_f32(GAIN).max(0.0);

        let mut result = lin;
        for (px, g) in result
            .data
            .chunks_exact_mut(CHANNELS)
            .zip(glow.data.chunks_exact(CHANNELS))
        {
            let mut peak = 0.0f32;
            for i in 0..3 {
                let v = conv.to_nonlinear(f64::from(px[i] + gain * g[i])) as f32;
                let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
                peak = peak.max(v);
                px[i] = v * max;
            }
            let alpha = (px[3] + gain * g[3]).clamp(0.0, 1.0).max(peak);
            px[3] = alpha * max;
        }
        *out = PixelBuffer::from_float(&result, depth)?;
        tracing::trace!(level, radius, gain, "bloom applied");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/fx/builtin/bloom.rs"]
mod tests;
