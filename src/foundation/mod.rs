//! Core types, errors and numeric helpers.

pub mod core;
pub mod error;
pub mod math;
