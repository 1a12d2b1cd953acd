//! Input-less multi-octave noise generator.

use once_cell::sync::Lazy;

use crate::buffer::pixel::PixelBuffer;
use crate::effects::noise::{MAX_OCTAVES, octave_noise};
use crate::foundation::core::{Rect, infinite_rect};
use crate::foundation::error::RasterFxResult;
use crate::fx::context::RenderContext;
use crate::fx::contract::{Effect, EffectMeta, ParamPrototype, Params, Ports};

const OCTAVES: usize = 0;
const AMPLITUDE: usize = 1;
const PERSISTENCE: usize = 2;
const SEED: usize = 3;
const ALPHA: usize = 4;

/// Upper bound on octaves, overridable with `RASTERFX_OCTAVES_MAX`.
pub static OCTAVES_MAX: Lazy<u32> = Lazy::new(|| {
    std::env::var("RASTERFX_OCTAVES_MAX")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|&n| n > 0)
        .map(|n| n.min(MAX_OCTAVES))
        .unwrap_or(MAX_OCTAVES)
});

pub(crate) const META: EffectMeta = EffectMeta {
    ports: &[],
    param_groups: &["Default"],
    params: &[
        ParamPrototype::new("octaves", 0, 4.0, 1.0, 8.0),
        ParamPrototype::new("amplitude", 0, 0.5, 0.0, 1.0),
        ParamPrototype::new("persistence", 0, 0.5, 0.0, 1.0),
        ParamPrototype::new("seed", 0, 0.5, 0.0, 1.0),
        ParamPrototype::new("alpha", 0, 1.0, 0.0, 1.0),
    ],
};

/// Gray multi-octave noise filling the whole frame.
#[derive(Debug, Default)]
pub struct OctaveNoise;

/// Per-octave amplitudes `amplitude * persistence^i`, at most `cap` of them.
pub(crate) fn amplitudes(params: &Params, cap: u32) -> Vec<f32> {
    let octaves = (params.get_int(OCTAVES).max(1) as u32).min(cap);
    let amplitude = params.get_f32(AMPLITUDE);
    let persistence = params.get_f32(PERSISTENCE);
    (0..octaves as i32)
        .map(|i| amplitude * persistence.powi(i))
        .collect()
}

impl Effect for OctaveNoise {
    fn meta(&self) -> EffectMeta {
        META
    }

    fn enlarge(&self, _ctx: &RenderContext, _params: &Params, rect: &mut Rect) -> RasterFxResult<()> {
        *rect = infinite_rect();
        Ok(())
    }

    fn compute(
        &mut self,
        _ctx: &RenderContext,
        params: &Params,
        _ports: &Ports,
        out: &mut PixelBuffer,
    ) -> RasterFxResult<()> {
        let amps = amplitudes(params, *OCTAVES_MAX);
        let alpha = params.get_f32(ALPHA).clamp(0.0, 1.0);
        let mut rng = params.rng(SEED);
        let field = octave_noise(&mut rng, out.width(), out.height(), 1, &amps)?;
        for y in 0..out.height() {
            for x in 0..out.width() {
                let v = (0.5 + field.at(x, y)[0]).clamp(0.0, 1.0) * alpha;
                out.set_pixel_unit(x, y, [v, v, v, alpha]);
            }
        }
        tracing::trace!(octaves = amps.len(), "noise generated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/fx/builtin/noise.rs"]
mod tests;
