//! Storage word types
//!
//! The transfer engine moves fixed-width units: bytes for wide packing,
//! 32-bit words for dense packing. Each unit is backed by an atomic cell
//! so the writer and the streamer can share it without a lock.

use core::fmt::Debug;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u32 {}
}

/// A fixed-width framebuffer storage unit
///
/// Only plain loads and stores are used, which Cortex-M0+ supports for
/// both widths without compare-and-swap.
pub trait StorageWord: Copy + Eq + Default + Debug + sealed::Sealed + 'static {
    /// Atomic cell holding one word
    type Cell: Sync;

    /// Width of the word in bits
    const BITS: u32;

    /// Create a zeroed cell
    fn zeroed() -> Self::Cell;

    /// Relaxed load
    fn load(cell: &Self::Cell) -> Self;

    /// Relaxed store
    fn store(cell: &Self::Cell, value: Self);

    /// Widen to 32 bits
    fn to_bits(self) -> u32;

    /// Truncate from 32 bits
    fn from_bits(bits: u32) -> Self;
}

impl StorageWord for u8 {
    type Cell = AtomicU8;
    const BITS: u32 = 8;

    fn zeroed() -> AtomicU8 {
        AtomicU8::new(0)
    }

    fn load(cell: &AtomicU8) -> u8 {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &AtomicU8, value: u8) {
        cell.store(value, Ordering::Relaxed)
    }

    fn to_bits(self) -> u32 {
        self as u32
    }

    fn from_bits(bits: u32) -> u8 {
        bits as u8
    }
}

impl StorageWord for u32 {
    type Cell = AtomicU32;
    const BITS: u32 = 32;

    fn zeroed() -> AtomicU32 {
        AtomicU32::new(0)
    }

    fn load(cell: &AtomicU32) -> u32 {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &AtomicU32, value: u32) {
        cell.store(value, Ordering::Relaxed)
    }

    fn to_bits(self) -> u32 {
        self
    }

    fn from_bits(bits: u32) -> u32 {
        bits
    }
}
