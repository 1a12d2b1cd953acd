//! Gaussian blur effect with kernel-size and sigma parameters.

use crate::buffer::pixel::PixelBuffer;
use crate::effects::blur::gaussian_blur;
use crate::foundation::core::Rect;
use crate::foundation::error::RasterFxResult;
use crate::fx::context::RenderContext;
use crate::fx::contract::{Effect, EffectMeta, ParamPrototype, Params, Ports};

const PORT_INPUT: usize = 0;

const KSIZE_WIDTH: usize = 0;
const KSIZE_HEIGHT: usize = 1;
const SIGMA_X: usize = 2;
const SIGMA_Y: usize = 3;

pub(crate) const META: EffectMeta = EffectMeta {
    ports: &["Input"],
    param_groups: &["Default"],
    params: &[
        ParamPrototype::new("ksize_width", 0, 50.0, 0.0, 100.0),
        ParamPrototype::new("ksize_height", 0, 50.0, 0.0, 100.0),
        ParamPrototype::new("sigmaX", 0, 0.0, 0.0, 100.0),
        ParamPrototype::new("sigmaY", 0, 0.0, 0.0, 100.0),
    ],
};

/// Gaussian blur of the single input.
#[derive(Debug, Default)]
pub struct Blur;

impl Blur {
    /// Odd kernel extents `2 * half + 1` from the half-size parameters.
    ///
    /// Half sizes are held to the declared parameter range.
    fn ksize(params: &Params) -> (u32, u32) {
        let k = |i: usize| {
            let max = META.params[i].max as i32;
            params.get_int(i).clamp(0, max) as u32 * 2 + 1
        };
        (k(KSIZE_WIDTH), k(KSIZE_HEIGHT))
    }
}

impl Effect for Blur {
    fn meta(&self) -> EffectMeta {
        META
    }

    fn enlarge(&self, _ctx: &RenderContext, params: &Params, rect: &mut Rect) -> RasterFxResult<()> {
        let (kw, kh) = Self::ksize(params);
        let (kw, kh) = (f64::from(kw), f64::from(kh));
        let (hw, hh) = ((kw / 2.0).floor(), (kh / 2.0).floor());
        rect.x0 -= hw;
        rect.y0 -= hh;
        rect.x1 += kw - hw;
        rect.y1 += kh - hh;
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
        out.paste(
            &input.image,
            input.offset.x.round() as i64,
            input.offset.y.round() as i64,
        )?;
        let sigma = (params.get(SIGMA_X), params.get(SIGMA_Y));
        let blurred = gaussian_blur(&out.to_float(), Self::ksize(params), sigma)?;
        *out = PixelBuffer::from_float(&blurred, out.depth())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/fx/builtin/blur.rs"]
mod tests;
