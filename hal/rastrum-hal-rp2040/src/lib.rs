//! RP2040-specific HAL for the VGA scanout firmware
//!
//! This crate implements the `rastrum-hal` traits on RP2040 hardware:
//!
//! - Pin assignment for the resistor-ladder VGA connector
//! - PIO programs for the hsync, vsync and color timing channels
//! - Synchronous start of the three state machines ([`timing::VgaTiming`])
//! - The self-restarting streamer/rearmer DMA pair ([`dma::DmaRing`])

#![no_std]

pub mod dma;
pub mod pins;
pub mod pio;
pub mod timing;

// Re-export shared traits from rastrum-hal for convenience
pub use rastrum_hal::{TimingGroup, TransferRing};
