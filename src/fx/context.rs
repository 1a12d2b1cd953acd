//! Render configuration and the per-call context derived from it.

use crate::buffer::marshal::ElementType;
use crate::foundation::core::Affine;

/// Host-side rendering configuration, as handed to every callback.
///
/// Loadable from JSON; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Camera-to-output transform.
    pub affine: Affine,
    /// Display gamma of the output.
    pub gamma: f64,
    /// Source frame rate of a time stretch.
    pub time_stretch_from: f64,
    /// Target frame rate of a time stretch.
    pub time_stretch_to: f64,
    /// Horizontal eye offset for stereoscopic renders.
    pub stereoscopic_shift: f64,
    /// Bits per pixel of the destination tiles: 32 or 64.
    pub bpp: i32,
    /// Largest tile side the host hands out, in pixels.
    pub max_tile_size: i32,
    /// Host render quality level.
    pub quality: i32,
    /// Interlaced field order.
    pub field_prevalence: i32,
    /// Non-zero for stereoscopic renders.
    pub stereoscopic: i32,
    /// Rendering a small preview swatch.
    pub is_swatch: bool,
    /// The host may cache the result.
    pub user_cachable: bool,
    /// Viewer shrink applies to this render.
    pub apply_shrink_to_viewer: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            affine: Affine::IDENTITY,
            gamma: 1.0,
            time_stretch_from: 25.0,
            time_stretch_to: 25.0,
            stereoscopic_shift: 0.0,
            bpp: 32,
            max_tile_size: 4096,
            quality: 0,
            field_prevalence: 0,
            stereoscopic: 0,
            is_swatch: false,
            user_cachable: false,
            apply_shrink_to_viewer: false,
        }
    }
}

impl RenderSettings {
    /// Tile layout implied by [`RenderSettings::bpp`].
    pub fn element_type(&self) -> ElementType {
        ElementType::from_bpp(self.bpp)
    }
}

/// Immutable snapshot of the settings for one render call, plus the integral frame number.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    /// Camera-to-output transform.
    pub affine: Affine,
    /// Display gamma of the output.
    pub gamma: f64,
    /// Source frame rate of a time stretch.
    pub time_stretch_from: f64,
    /// Target frame rate of a time stretch.
    pub time_stretch_to: f64,
    /// Horizontal eye offset for stereoscopic renders.
    pub stereoscopic_shift: f64,
    /// Bits per pixel of the destination tiles.
    pub bpp: i32,
    /// Largest tile side the host hands out, in pixels.
    pub max_tile_size: i32,
    /// Host render quality level.
    pub quality: i32,
    /// Interlaced field order.
    pub field_prevalence: i32,
    /// Non-zero for stereoscopic renders.
    pub stereoscopic: i32,
    /// Rendering a small preview swatch.
    pub is_swatch: bool,
    /// The host may cache the result.
    pub user_cachable: bool,
    /// Viewer shrink applies to this render.
    pub apply_shrink_to_viewer: bool,
    /// Frame number, truncated.
    pub frame: i32,
}

impl RenderContext {
    /// The fractional part of `frame` is dropped.
    pub fn new(settings: &RenderSettings, frame: f64) -> Self {
        Self {
            affine: settings.affine,
            gamma: settings.gamma,
            time_stretch_from: settings.time_stretch_from,
            time_stretch_to: settings.time_stretch_to,
            stereoscopic_shift: settings.stereoscopic_shift,
            bpp: settings.bpp,
            max_tile_size: settings.max_tile_size,
            quality: settings.quality,
            field_prevalence: settings.field_prevalence,
            stereoscopic: settings.stereoscopic,
            is_swatch: settings.is_swatch,
            user_cachable: settings.user_cachable,
            apply_shrink_to_viewer: settings.apply_shrink_to_viewer,
            frame: frame as i32,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fx/context.rs"]
mod tests;
