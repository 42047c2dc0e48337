//! Inter-task communication
//!
//! Static embassy-sync primitives shared between the pattern task and the
//! main task's scanout monitor.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Number of completed pattern passes, signalled after each full frame
pub static PATTERN_PASSES: Signal<CriticalSectionRawMutex, u32> = Signal::new();
