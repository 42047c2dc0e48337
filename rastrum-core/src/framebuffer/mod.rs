//! Framebuffer storage and pixel packing
//!
//! The framebuffer is written in place by application code while the
//! scanout loop streams it out. There is no lock: every storage word is
//! an atomic cell accessed with relaxed ordering, so a concurrent read
//! sees either the old or the new word. A frame that mixes old and new
//! pixels (tearing) is accepted.

pub mod color;
pub mod packer;
pub mod store;
pub mod word;

pub use color::Color;
pub use packer::{PixelAddress, PixelPacker};
pub use store::{Framebuffer, PixelStore};
pub use word::StorageWord;
