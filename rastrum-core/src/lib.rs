//! Board-agnostic core logic for the VGA scanout firmware
//!
//! This crate contains all scanout logic that does not depend on
//! specific hardware implementations:
//!
//! - Display configuration (video modes, packing policy, timing constants)
//! - Framebuffer storage and the pixel packing scheme
//! - The streamer/rearmer scanout loop, as a synchronous state machine
//!   and as a pair of cooperating async tasks
//! - The ordered start-up sequence
//! - A demo pattern generator for exercising the write path

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod framebuffer;
pub mod pattern;
pub mod scanout;
pub mod startup;
