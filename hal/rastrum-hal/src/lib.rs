//! Rastrum Hardware Abstraction Layer
//!
//! This crate defines the interfaces the scanout core needs from the
//! display timing hardware and from the transfer engine that feeds it.
//! Chip-specific HALs implement them; host tests implement them with
//! simulated channels.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (rastrum-firmware, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rastrum-core (packing, scanout loop)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rastrum-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ rastrum-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`timing::TimingChannel`] - One fixed-rate counter (hsync, vsync, color)
//! - [`timing::TimingGroup`] - The three channels, started in lock-step
//! - [`transfer::TransferRing`] - Streamer/rearmer pair replaying the framebuffer

#![no_std]
#![deny(unsafe_code)]

pub mod timing;
pub mod transfer;

// Re-export key traits at crate root for convenience
pub use timing::{ChannelRole, TimingChannel, TimingError, TimingGroup};
pub use transfer::{TransferError, TransferRing};
