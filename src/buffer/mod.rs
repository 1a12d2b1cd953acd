//! Pixel storage and its exchange with host tiles and image files.

pub mod image_io;
pub mod marshal;
pub mod pixel;
