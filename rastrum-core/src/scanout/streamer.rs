//! Streamer: copies consecutive store words to the color channel

use rastrum_hal::TransferError;

use super::rearmer::Reload;
use crate::framebuffer::{PixelStore, StorageWord};

/// Streamer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamerState {
    /// Never started
    Idle,
    /// Loaded with a cursor and count, nothing emitted yet this pass
    Armed,
    /// Emitting words
    Draining,
    /// Pass finished; waiting for the rearmer
    PendingRearm,
}

/// Counter-driven copy loop over the pixel store
///
/// Each consumer request takes one word at `cursor`. When `remaining`
/// reaches zero the streamer parks in [`StreamerState::PendingRearm`]
/// until a [`Reload`] is applied.
#[derive(Debug, Clone)]
pub struct Streamer {
    state: StreamerState,
    cursor: usize,
    remaining: usize,
    words_per_pass: usize,
}

impl Streamer {
    /// Create an idle streamer for a store of `words_per_pass` words
    pub const fn new(words_per_pass: usize) -> Self {
        Self {
            state: StreamerState::Idle,
            cursor: 0,
            remaining: 0,
            words_per_pass,
        }
    }

    /// Arm the first pass
    ///
    /// Only valid from [`StreamerState::Idle`]; there is no restart.
    pub fn start(&mut self) -> Result<(), TransferError> {
        if self.words_per_pass == 0 {
            return Err(TransferError::EmptySource);
        }
        if self.state != StreamerState::Idle {
            return Err(TransferError::AlreadyStarted);
        }
        self.load(Reload {
            cursor: 0,
            count: self.words_per_pass,
        });
        Ok(())
    }

    /// Emit the next word, or `None` if idle or waiting for a rearm
    pub fn next_word<W: StorageWord>(&mut self, store: &PixelStore<'_, W>) -> Option<W> {
        if !matches!(self.state, StreamerState::Armed | StreamerState::Draining) {
            return None;
        }

        let Some(word) = store.get(self.cursor) else {
            // Cursor ran off a short store; treat as end of pass
            self.remaining = 0;
            self.state = StreamerState::PendingRearm;
            return None;
        };

        self.cursor += 1;
        self.remaining -= 1;
        self.state = if self.remaining == 0 {
            StreamerState::PendingRearm
        } else {
            StreamerState::Draining
        };
        Some(word)
    }

    /// Apply a rearm
    ///
    /// Returns `false` (and changes nothing) unless the streamer is
    /// waiting for one.
    pub fn apply(&mut self, reload: Reload) -> bool {
        if self.state != StreamerState::PendingRearm {
            return false;
        }
        self.load(reload);
        true
    }

    fn load(&mut self, reload: Reload) {
        self.cursor = reload.cursor;
        self.remaining = reload.count;
        self.state = StreamerState::Armed;
    }

    /// Current state
    pub fn state(&self) -> StreamerState {
        self.state
    }

    /// Check if the pass is over and a rearm is due
    pub fn is_exhausted(&self) -> bool {
        self.state == StreamerState::PendingRearm
    }

    /// Index of the next word to emit
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Words left in this pass
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Words per full pass
    pub fn words_per_pass(&self) -> usize {
        self.words_per_pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicU32;

    fn store_of(cells: &[AtomicU32]) -> PixelStore<'_, u32> {
        let store = PixelStore::new(cells);
        for i in 0..cells.len() {
            store.set(i, i as u32 + 1);
        }
        store
    }

    #[test]
    fn test_start_rules() {
        let mut empty = Streamer::new(0);
        assert_eq!(empty.start(), Err(TransferError::EmptySource));

        let mut streamer = Streamer::new(3);
        assert_eq!(streamer.state(), StreamerState::Idle);
        streamer.start().unwrap();
        assert_eq!(streamer.state(), StreamerState::Armed);
        assert_eq!(streamer.start(), Err(TransferError::AlreadyStarted));
    }

    #[test]
    fn test_idle_streamer_emits_nothing() {
        let cells: Vec<AtomicU32> = (0..3).map(|_| AtomicU32::new(0)).collect();
        let store = store_of(&cells);
        let mut streamer = Streamer::new(3);
        assert_eq!(streamer.next_word(&store), None);
    }

    #[test]
    fn test_one_pass_then_park() {
        let cells: Vec<AtomicU32> = (0..3).map(|_| AtomicU32::new(0)).collect();
        let store = store_of(&cells);
        let mut streamer = Streamer::new(3);
        streamer.start().unwrap();

        assert_eq!(streamer.next_word(&store), Some(1));
        assert_eq!(streamer.state(), StreamerState::Draining);
        assert_eq!(streamer.next_word(&store), Some(2));
        assert_eq!(streamer.next_word(&store), Some(3));
        assert!(streamer.is_exhausted());
        assert_eq!(streamer.next_word(&store), None);

        assert!(streamer.apply(Reload { cursor: 0, count: 3 }));
        assert_eq!(streamer.cursor(), 0);
        assert_eq!(streamer.remaining(), 3);
        assert_eq!(streamer.next_word(&store), Some(1));
    }

    #[test]
    fn test_reload_ignored_mid_pass() {
        let cells: Vec<AtomicU32> = (0..3).map(|_| AtomicU32::new(0)).collect();
        let store = store_of(&cells);
        let mut streamer = Streamer::new(3);
        streamer.start().unwrap();
        streamer.next_word(&store);

        assert!(!streamer.apply(Reload { cursor: 0, count: 3 }));
        assert_eq!(streamer.cursor(), 1);
    }

    #[test]
    fn test_short_store_ends_pass() {
        let cells: Vec<AtomicU32> = (0..2).map(|_| AtomicU32::new(0)).collect();
        let store = store_of(&cells);
        let mut streamer = Streamer::new(5);
        streamer.start().unwrap();

        assert_eq!(streamer.next_word(&store), Some(1));
        assert_eq!(streamer.next_word(&store), Some(2));
        assert_eq!(streamer.next_word(&store), None);
        assert!(streamer.is_exhausted());
    }
}
