//! Driving effect instances: bbox resolution, compute, and the host callback surface.

pub mod bbox;
pub mod executor;
pub mod plugin;
