//! Image-processing primitives the built-in effects are assembled from.

pub mod bloom;
pub mod blur;
pub mod color;
pub mod composite;
pub mod hash;
pub mod noise;
pub mod resample;
