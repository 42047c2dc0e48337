//! Async scanout pipeline
//!
//! The streamer/rearmer cycle as cooperating tasks. The streamer task
//! pushes store words into a bounded channel that the color channel task
//! drains at its own pace. On exhaustion the streamer parks on a signal
//! until the rearmer task hands back a [`Reload`]. Exactly one of the two
//! is doing work at any time.

use core::cell::Cell;
use core::convert::Infallible;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use rastrum_hal::TransferError;

use super::engine::{Activity, ScanoutStats};
use super::rearmer::{Rearmer, Reload};
use super::streamer::Streamer;
use crate::framebuffer::{PixelStore, StorageWord};

/// Shared state between the scanout tasks
///
/// `N` is the depth of the color channel's input queue.
pub struct ScanoutLink<M: RawMutex, W, const N: usize> {
    fifo: Channel<M, W, N>,
    exhausted: Signal<M, ()>,
    reload: Signal<M, Reload>,
    activity: Mutex<M, Cell<Activity>>,
    stats: Mutex<M, Cell<ScanoutStats>>,
}

impl<M: RawMutex, W, const N: usize> ScanoutLink<M, W, N> {
    /// Create an idle link
    pub const fn new() -> Self {
        Self {
            fifo: Channel::new(),
            exhausted: Signal::new(),
            reload: Signal::new(),
            activity: Mutex::new(Cell::new(Activity::Idle)),
            stats: Mutex::new(Cell::new(ScanoutStats {
                words_streamed: 0,
                passes: 0,
                rearms: 0,
                underruns: 0,
            })),
        }
    }

    /// Which task is doing the work
    pub fn activity(&self) -> Activity {
        self.activity.lock(|a| a.get())
    }

    /// Counters since start
    pub fn stats(&self) -> ScanoutStats {
        self.stats.lock(|s| s.get())
    }

    fn set_activity(&self, activity: Activity) {
        self.activity.lock(|a| a.set(activity));
    }

    fn record(&self, f: impl FnOnce(&mut ScanoutStats)) {
        self.stats.lock(|cell| {
            let mut stats = cell.get();
            f(&mut stats);
            cell.set(stats);
        });
    }
}

impl<M: RawMutex, W, const N: usize> Default for ScanoutLink<M, W, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay `store` into the link forever
///
/// Only returns if the store is empty.
pub async fn streamer_task<M: RawMutex, W: StorageWord, const N: usize>(
    link: &ScanoutLink<M, W, N>,
    store: PixelStore<'_, W>,
) -> Result<Infallible, TransferError> {
    let mut streamer = Streamer::new(store.len());
    streamer.start()?;
    link.set_activity(Activity::Draining);

    loop {
        while let Some(word) = streamer.next_word(&store) {
            link.fifo.send(word).await;
            link.record(|s| s.words_streamed = s.words_streamed.wrapping_add(1));
        }

        link.set_activity(Activity::Rearming);
        link.record(|s| s.passes = s.passes.wrapping_add(1));
        link.exhausted.signal(());

        let reload = link.reload.wait().await;
        if streamer.apply(reload) {
            link.set_activity(Activity::Draining);
        }
    }
}

/// Reset the streamer after every pass
pub async fn rearmer_task<M: RawMutex, W, const N: usize>(
    link: &ScanoutLink<M, W, N>,
    words_per_pass: usize,
) -> Infallible {
    let mut rearmer = Rearmer::new(words_per_pass);

    loop {
        link.exhausted.wait().await;
        let reload = rearmer.on_exhausted();
        link.record(|s| s.rearms = s.rearms.wrapping_add(1));
        link.reload.signal(reload);
    }
}

/// Paced consumer standing in for the color timing channel
///
/// Takes one word per tick and hands it to `sink`; stops when `sink`
/// returns `false`. A tick that finds the queue empty counts an underrun,
/// then waits for the next word.
pub async fn color_channel_task<M: RawMutex, W, const N: usize>(
    link: &ScanoutLink<M, W, N>,
    mut sink: impl FnMut(W) -> bool,
) {
    loop {
        let word = match link.fifo.try_receive() {
            Ok(word) => word,
            Err(_) => {
                link.record(|s| s.underruns = s.underruns.wrapping_add(1));
                link.fifo.receive().await
            }
        };

        if !sink(word) {
            return;
        }
        yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::AtomicU32;
    use embassy_futures::block_on;
    use embassy_futures::select::{select3, Either3};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn numbered(cells: &[AtomicU32]) -> PixelStore<'_, u32> {
        let store = PixelStore::new(cells);
        for i in 0..cells.len() {
            store.set(i, i as u32 + 1);
        }
        store
    }

    fn run<const N: usize>(store: PixelStore<'_, u32>, count: usize) -> (Vec<u32>, ScanoutStats) {
        let link: ScanoutLink<NoopRawMutex, u32, N> = ScanoutLink::new();
        let mut seen = Vec::new();

        let result = block_on(select3(
            streamer_task(&link, store),
            rearmer_task(&link, store.len()),
            color_channel_task(&link, |word| {
                seen.push(word);
                seen.len() < count
            }),
        ));
        match result {
            Either3::Third(()) => {}
            Either3::First(Err(e)) => panic!("streamer stopped: {:?}", e),
            _ => panic!("scanout task returned"),
        }

        (seen, link.stats())
    }

    #[test]
    fn test_pipeline_ring_sequence() {
        let cells: Vec<AtomicU32> = (0..5).map(|_| AtomicU32::new(0)).collect();
        let (seen, stats) = run::<2>(numbered(&cells), 12);

        assert_eq!(seen, [1, 2, 3, 4, 5, 1, 2, 3, 4, 5, 1, 2]);
        assert!(stats.passes >= 2);
        assert!(stats.rearms >= 2);
    }

    #[test]
    fn test_pipeline_queue_deeper_than_store() {
        let cells: Vec<AtomicU32> = (0..3).map(|_| AtomicU32::new(0)).collect();
        let (seen, _) = run::<8>(numbered(&cells), 10);
        assert_eq!(seen, [1, 2, 3, 1, 2, 3, 1, 2, 3, 1]);
    }

    #[test]
    fn test_pipeline_sees_new_writes() {
        let cells: Vec<AtomicU32> = (0..4).map(|_| AtomicU32::new(0)).collect();
        let store = numbered(&cells);
        let link: ScanoutLink<NoopRawMutex, u32, 1> = ScanoutLink::new();
        let mut seen = Vec::new();

        block_on(select3(
            streamer_task(&link, store),
            rearmer_task(&link, store.len()),
            color_channel_task(&link, |word| {
                seen.push(word);
                if seen.len() == 2 {
                    store.set(3, 99);
                }
                seen.len() < 8
            }),
        ));

        // The first pass may have fetched word 3 before the write
        assert_eq!(seen[4..], [1, 2, 3, 99]);
    }

    #[test]
    fn test_empty_store_stops_streamer() {
        let cells: Vec<AtomicU32> = Vec::new();
        let store = PixelStore::<u32>::new(&cells);
        let link: ScanoutLink<NoopRawMutex, u32, 2> = ScanoutLink::new();

        let result = block_on(streamer_task(&link, store));
        assert_eq!(result.err(), Some(TransferError::EmptySource));
        assert_eq!(link.activity(), Activity::Idle);
    }
}
