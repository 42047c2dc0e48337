//! Synchronous scanout engine
//!
//! Drives the streamer/rearmer cycle one consumer request at a time. This
//! is the host model of the chained transfer units, and the reference the
//! async pipeline and the RP2040 DMA ring are checked against.

use rastrum_hal::{TransferError, TransferRing};

use super::rearmer::Rearmer;
use super::streamer::{Streamer, StreamerState};
use crate::framebuffer::{PixelStore, StorageWord};

/// Which unit is doing the work right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    /// Not started yet
    Idle,
    /// Streamer is emitting words
    Draining,
    /// Streamer is parked and the rearmer is resetting it
    Rearming,
}

/// Scanout counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanoutStats {
    /// Words handed to the color channel
    pub words_streamed: u64,
    /// Completed passes over the store
    pub passes: u32,
    /// Rearm hand-offs
    pub rearms: u32,
    /// Consumer requests that found no word ready
    pub underruns: u32,
}

/// Streamer and rearmer linked in a closed cycle over one store
///
/// Once started, every consumer request either gets the next word or, if
/// the rearm hand-off is still in flight, counts an underrun. An underrun
/// shifts the picture for one pass and then corrects itself; it is never
/// an error.
pub struct ScanoutEngine<'a, W: StorageWord> {
    store: PixelStore<'a, W>,
    streamer: Streamer,
    rearmer: Rearmer,
    /// Consumer requests a rearm takes to land
    rearm_latency: u32,
    rearm_countdown: u32,
    streamer_configured: bool,
    rearmer_configured: bool,
    stats: ScanoutStats,
}

impl<'a, W: StorageWord> ScanoutEngine<'a, W> {
    /// Create an engine over `store`; the rearm lands before the next request
    pub fn new(store: PixelStore<'a, W>) -> Self {
        Self {
            store,
            streamer: Streamer::new(store.len()),
            rearmer: Rearmer::new(store.len()),
            rearm_latency: 0,
            rearm_countdown: 0,
            streamer_configured: false,
            rearmer_configured: false,
            stats: ScanoutStats::default(),
        }
    }

    /// Simulate a slow rearm that misses `requests` consumer requests
    pub fn with_rearm_latency(mut self, requests: u32) -> Self {
        self.rearm_latency = requests;
        self
    }

    /// Serve one consumer request
    ///
    /// Returns `None` before start, and while a late rearm is pending.
    pub fn on_request(&mut self) -> Option<W> {
        if self.streamer.state() == StreamerState::Idle {
            return None;
        }

        if self.streamer.is_exhausted() {
            if self.rearm_countdown > 0 {
                self.rearm_countdown -= 1;
                self.stats.underruns = self.stats.underruns.wrapping_add(1);
                return None;
            }
            self.rearm();
        }

        let word = self.streamer.next_word(&self.store)?;
        self.stats.words_streamed = self.stats.words_streamed.wrapping_add(1);

        if self.streamer.is_exhausted() {
            self.stats.passes = self.stats.passes.wrapping_add(1);
            self.rearm_countdown = self.rearm_latency;
            if self.rearm_countdown == 0 {
                self.rearm();
            }
        }

        Some(word)
    }

    fn rearm(&mut self) {
        let reload = self.rearmer.on_exhausted();
        if self.streamer.apply(reload) {
            self.stats.rearms = self.stats.rearms.wrapping_add(1);
        }
    }

    /// Which unit is active
    pub fn activity(&self) -> Activity {
        match self.streamer.state() {
            StreamerState::Idle => Activity::Idle,
            StreamerState::Armed | StreamerState::Draining => Activity::Draining,
            StreamerState::PendingRearm => Activity::Rearming,
        }
    }

    /// Counters since start
    pub fn stats(&self) -> ScanoutStats {
        self.stats
    }

    /// The streamer, for inspecting its cursor
    pub fn streamer(&self) -> &Streamer {
        &self.streamer
    }

    /// The store being replayed
    pub fn store(&self) -> PixelStore<'a, W> {
        self.store
    }
}

impl<'a, W: StorageWord> TransferRing for ScanoutEngine<'a, W> {
    fn words_per_pass(&self) -> usize {
        self.store.len()
    }

    fn configure_streamer(&mut self) -> Result<(), TransferError> {
        if self.is_started() {
            return Err(TransferError::AlreadyStarted);
        }
        if self.store.is_empty() {
            return Err(TransferError::EmptySource);
        }
        self.streamer_configured = true;
        Ok(())
    }

    fn configure_rearmer(&mut self) -> Result<(), TransferError> {
        if self.is_started() {
            return Err(TransferError::AlreadyStarted);
        }
        if !self.streamer_configured {
            return Err(TransferError::StreamerNotConfigured);
        }
        self.rearmer_configured = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), TransferError> {
        if !self.streamer_configured {
            return Err(TransferError::StreamerNotConfigured);
        }
        if !self.rearmer_configured {
            return Err(TransferError::RearmerNotConfigured);
        }
        self.streamer.start()
    }

    fn is_started(&self) -> bool {
        self.streamer.state() != StreamerState::Idle
    }
}
