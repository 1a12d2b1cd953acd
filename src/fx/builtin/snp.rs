//! Salt-and-pepper effect: a seeded random subset of pixels is inverted.

use rand::Rng;
use rand::distributions::Bernoulli;

use crate::buffer::pixel::{CHANNELS, Channel, Depth, PixelBuffer};
use crate::effects::composite::composite_over;
use crate::foundation::core::{Rect, infinite_rect};
use crate::foundation::error::{RasterFxError, RasterFxResult};
use crate::fx::context::RenderContext;
use crate::fx::contract::{Effect, EffectMeta, ParamPrototype, Params, Ports};

const PORT_INPUT: usize = 0;

const P: usize = 0;
const SEED: usize = 1;

pub(crate) const META: EffectMeta = EffectMeta {
    ports: &["Input"],
    param_groups: &["Default"],
    params: &[
        ParamPrototype::new("p", 0, 0.5, 0.0, 1.0),
        ParamPrototype::new("seed", 0, 0.5, 0.0, 1.0),
    ],
};

/// Inverts the color of randomly chosen pixels against their alpha.
#[derive(Debug, Default)]
pub struct SaltAndPepper;

fn invert_some<C: Channel, R: Rng>(px: &mut [C], coin: Bernoulli, rng: &mut R) {
    for p in px.chunks_exact_mut(CHANNELS) {
        if rng.sample(coin) {
            let alpha = p[3].to_f32();
            for c in &mut p[..3] {
                *c = C::from_f32(alpha - c.to_f32());
            }
        }
    }
}

impl Effect for SaltAndPepper {
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
        ports: &Ports,
        out: &mut PixelBuffer,
    ) -> RasterFxResult<()> {
        let Some(input) = ports.input(PORT_INPUT) else {
            return Ok(());
        };
        let coin = Bernoulli::new(params.get(P).clamp(0.0, 1.0))
            .map_err(|e| RasterFxError::compute(format!("bad probability: {e}")))?;
        let mut rng = params.rng(SEED);

        composite_over(out, &input.image, input.offset)?;
        match out.depth() {
            Depth::U8 => {
                if let Some(px) = out.channels_mut::<u8>() {
                    invert_some(px, coin, &mut rng);
                }
            }
            Depth::U16 => {
                if let Some(px) = out.channels_mut::<u16>() {
                    invert_some(px, coin, &mut rng);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/fx/builtin/snp.rs"]
mod tests;
