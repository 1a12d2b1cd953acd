//! The effect contract, its built-in implementations and instance ownership.

pub mod builtin;
pub mod context;
pub mod contract;
pub mod registry;
