//! Configuration types
//!
//! Display configuration is fixed at compile time: one of two resolution
//! presets plus a packing policy. Nothing here changes at runtime.

pub mod mode;
pub mod types;

pub use mode::*;
pub use types::*;
