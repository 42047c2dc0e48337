//! Ordered start-up sequence
//!
//! Bringing the display up is a fixed six-step sequence:
//!
//! 1. allocate and zero the pixel store ([`Framebuffer::new`])
//! 2. load the period constant into all three timing channels
//! 3. configure the streamer (store → color channel, chain to rearmer)
//! 4. configure the rearmer (restart address → streamer, chain to streamer)
//! 5. start the three timing channels in one atomic action
//! 6. start the streamer
//!
//! [`Startup`] enforces the order: each step checks the phase the previous
//! one left behind, and any failure stops the sequence before the timing
//! channels are started.

use rastrum_hal::{ChannelRole, TimingError, TimingGroup, TransferError, TransferRing};

use crate::config::{ConfigError, TimingParameters};
use crate::framebuffer::{Framebuffer, StorageWord};

/// How far start-up has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupPhase {
    /// Pixel store allocated and zeroed
    Allocated,
    /// All three period constants loaded
    ChannelsConfigured,
    /// Streamer programmed, not running
    StreamerConfigured,
    /// Rearmer programmed, not running
    RearmerConfigured,
    /// Timing channels running in lock-step
    ChannelsRunning,
    /// Streamer running; scanout sustains itself from here on
    Streaming,
}

impl StartupPhase {
    /// The phase after this one
    pub fn next(self) -> Option<StartupPhase> {
        use StartupPhase::*;
        match self {
            Allocated => Some(ChannelsConfigured),
            ChannelsConfigured => Some(StreamerConfigured),
            StreamerConfigured => Some(RearmerConfigured),
            RearmerConfigured => Some(ChannelsRunning),
            ChannelsRunning => Some(Streaming),
            Streaming => None,
        }
    }
}

/// Start-up failures; all are fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// Display configuration is inconsistent
    Config(ConfigError),
    /// A timing channel rejected its period or the synchronous start
    Timing(TimingError),
    /// The transfer ring could not be configured or started
    Transfer(TransferError),
    /// A step was called in the wrong phase
    OutOfOrder {
        expected: StartupPhase,
        found: StartupPhase,
    },
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        StartupError::Config(e)
    }
}

impl From<TimingError> for StartupError {
    fn from(e: TimingError) -> Self {
        StartupError::Timing(e)
    }
}

impl From<TransferError> for StartupError {
    fn from(e: TransferError) -> Self {
        StartupError::Transfer(e)
    }
}

/// Start-up sequencer over a timing group and a transfer ring
pub struct Startup<T: TimingGroup, R: TransferRing> {
    timing: T,
    ring: R,
    params: TimingParameters,
    phase: StartupPhase,
}

impl<T: TimingGroup, R: TransferRing> Startup<T, R> {
    /// Begin start-up for an allocated framebuffer
    ///
    /// Checks the timing constants against the video mode and the ring's
    /// pass length against the store.
    pub fn new<W: StorageWord>(
        framebuffer: &Framebuffer<'_, W>,
        timing: T,
        ring: R,
    ) -> Result<Self, StartupError> {
        let config = framebuffer.config();
        let params = config.timing();
        params.validate(&config.mode())?;

        let expected = framebuffer.store().len();
        let actual = ring.words_per_pass();
        if actual != expected {
            return Err(ConfigError::StoreSizeMismatch { expected, actual }.into());
        }

        Ok(Self {
            timing,
            ring,
            params,
            phase: StartupPhase::Allocated,
        })
    }

    /// Current phase
    pub fn phase(&self) -> StartupPhase {
        self.phase
    }

    /// The timing group
    pub fn timing(&self) -> &T {
        &self.timing
    }

    /// The transfer ring
    pub fn ring(&self) -> &R {
        &self.ring
    }

    /// Period constants that will be loaded
    pub fn params(&self) -> &TimingParameters {
        &self.params
    }

    fn expect(&self, phase: StartupPhase) -> Result<(), StartupError> {
        if self.phase != phase {
            return Err(StartupError::OutOfOrder {
                expected: phase,
                found: self.phase,
            });
        }
        Ok(())
    }

    fn advance(&mut self) {
        if let Some(next) = self.phase.next() {
            self.phase = next;
        }
    }

    /// Step 2: load every timing channel's period constant
    pub fn configure_channels(&mut self) -> Result<(), StartupError> {
        self.expect(StartupPhase::Allocated)?;
        for role in ChannelRole::ALL {
            self.timing.configure(role, self.params.period(role))?;
        }
        self.advance();
        Ok(())
    }

    /// Step 3: program the streamer
    pub fn configure_streamer(&mut self) -> Result<(), StartupError> {
        self.expect(StartupPhase::ChannelsConfigured)?;
        self.ring.configure_streamer()?;
        self.advance();
        Ok(())
    }

    /// Step 4: program the rearmer
    pub fn configure_rearmer(&mut self) -> Result<(), StartupError> {
        self.expect(StartupPhase::StreamerConfigured)?;
        self.ring.configure_rearmer()?;
        self.advance();
        Ok(())
    }

    /// Step 5: start all timing channels on the same clock edge
    pub fn start_channels(&mut self) -> Result<(), StartupError> {
        self.expect(StartupPhase::RearmerConfigured)?;
        if let Some(role) = self.timing.first_unconfigured() {
            return Err(TimingError::NotConfigured(role).into());
        }
        self.timing.start_all()?;
        self.advance();
        Ok(())
    }

    /// Step 6: start the streamer
    pub fn start_streamer(&mut self) -> Result<(), StartupError> {
        self.expect(StartupPhase::ChannelsRunning)?;
        self.ring.start()?;
        self.advance();
        Ok(())
    }

    /// Run the remaining steps in order
    pub fn run(mut self) -> Result<Running<T, R>, StartupError> {
        while self.phase != StartupPhase::Streaming {
            match self.phase {
                StartupPhase::Allocated => self.configure_channels()?,
                StartupPhase::ChannelsConfigured => self.configure_streamer()?,
                StartupPhase::StreamerConfigured => self.configure_rearmer()?,
                StartupPhase::RearmerConfigured => self.start_channels()?,
                StartupPhase::ChannelsRunning => self.start_streamer()?,
                StartupPhase::Streaming => {}
            }
        }
        self.finish()
    }

    /// Hand over the running hardware once every step is done
    pub fn finish(self) -> Result<Running<T, R>, StartupError> {
        self.expect(StartupPhase::Streaming)?;
        Ok(Running {
            timing: self.timing,
            ring: self.ring,
        })
    }
}

/// A display that has completed start-up
///
/// There is no stop: the timing channels and the ring run until reset.
pub struct Running<T: TimingGroup, R: TransferRing> {
    timing: T,
    ring: R,
}

impl<T: TimingGroup, R: TransferRing> Running<T, R> {
    /// The running timing group
    pub fn timing(&self) -> &T {
        &self.timing
    }

    /// The running transfer ring
    pub fn ring(&self) -> &R {
        &self.ring
    }

    /// Mutable access to the ring (for driving a simulated consumer)
    pub fn ring_mut(&mut self) -> &mut R {
        &mut self.ring
    }

    /// Take the parts back
    pub fn into_parts(self) -> (T, R) {
        (self.timing, self.ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::scanout::ScanoutEngine;
    use core::sync::atomic::AtomicU32;

    /// Records the order of timing operations
    #[derive(Default)]
    struct SimTiming {
        periods: [Option<u32>; 3],
        running: bool,
        reject: Option<ChannelRole>,
    }

    impl TimingGroup for SimTiming {
        fn configure(&mut self, role: ChannelRole, period: u32) -> Result<(), TimingError> {
            if self.running {
                return Err(TimingError::AlreadyRunning);
            }
            if self.reject == Some(role) {
                return Err(TimingError::PeriodOutOfRange(role));
            }
            self.periods[role.index()] = Some(period);
            Ok(())
        }

        fn is_configured(&self, role: ChannelRole) -> bool {
            self.periods[role.index()].is_some()
        }

        fn start_all(&mut self) -> Result<(), TimingError> {
            if self.running {
                return Err(TimingError::AlreadyRunning);
            }
            if let Some(role) = self.first_unconfigured() {
                return Err(TimingError::NotConfigured(role));
            }
            self.running = true;
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    fn frame_cells(config: &DisplayConfig) -> Vec<AtomicU32> {
        (0..config.words_per_frame(32))
            .map(|_| AtomicU32::new(0))
            .collect()
    }

    #[test]
    fn test_full_sequence_350() {
        let config = DisplayConfig::VGA_640X350_DENSE;
        let cells = frame_cells(&config);
        let mut fb = Framebuffer::<u32>::new(&config, &cells).unwrap();
        let engine = ScanoutEngine::new(fb.store());

        let startup = Startup::new(&fb, SimTiming::default(), engine).unwrap();
        let mut running = startup.run().unwrap();

        assert!(running.timing().is_running());
        assert_eq!(running.timing().periods, [Some(655), Some(349), Some(639)]);
        assert!(running.ring().is_started());

        fb.set_pixel(0, 0, 63u8);
        assert_eq!(running.ring_mut().on_request(), Some(0b111111 << 26));
    }

    #[test]
    fn test_period_constants_480() {
        let config = DisplayConfig::VGA_640X480_WIDE;
        let cells: Vec<_> = (0..config.words_per_frame(8))
            .map(|_| core::sync::atomic::AtomicU8::new(0))
            .collect();
        let fb = Framebuffer::<u8>::new(&config, &cells).unwrap();
        let engine = ScanoutEngine::new(fb.store());

        let running = Startup::new(&fb, SimTiming::default(), engine)
            .unwrap()
            .run()
            .unwrap();
        let (timing, _) = running.into_parts();
        assert_eq!(timing.periods, [Some(655), Some(479), Some(639)]);
    }

    #[test]
    fn test_steps_out_of_order() {
        let config = DisplayConfig::VGA_640X350_DENSE;
        let cells = frame_cells(&config);
        let fb = Framebuffer::<u32>::new(&config, &cells).unwrap();
        let engine = ScanoutEngine::new(fb.store());
        let mut startup = Startup::new(&fb, SimTiming::default(), engine).unwrap();

        assert_eq!(
            startup.start_channels(),
            Err(StartupError::OutOfOrder {
                expected: StartupPhase::RearmerConfigured,
                found: StartupPhase::Allocated,
            })
        );
        assert_eq!(
            startup.configure_streamer(),
            Err(StartupError::OutOfOrder {
                expected: StartupPhase::ChannelsConfigured,
                found: StartupPhase::Allocated,
            })
        );
        assert!(!startup.timing().is_running());

        startup.configure_channels().unwrap();
        startup.configure_streamer().unwrap();
        assert_eq!(startup.phase(), StartupPhase::StreamerConfigured);
        assert!(startup.finish().is_err());
    }

    #[test]
    fn test_timing_failure_stops_before_start() {
        let config = DisplayConfig::VGA_640X350_DENSE;
        let cells = frame_cells(&config);
        let fb = Framebuffer::<u32>::new(&config, &cells).unwrap();
        let engine = ScanoutEngine::new(fb.store());
        let timing = SimTiming {
            reject: Some(ChannelRole::Vertical),
            ..Default::default()
        };
        let mut startup = Startup::new(&fb, timing, engine).unwrap();

        assert_eq!(
            startup.configure_channels(),
            Err(StartupError::Timing(TimingError::PeriodOutOfRange(
                ChannelRole::Vertical
            )))
        );
        assert_eq!(startup.phase(), StartupPhase::Allocated);
        assert!(!startup.timing().is_running());
        assert!(!startup.ring().is_started());
    }

    #[test]
    fn test_ring_size_mismatch() {
        let config = DisplayConfig::VGA_640X350_DENSE;
        let cells = frame_cells(&config);
        let fb = Framebuffer::<u32>::new(&config, &cells).unwrap();

        let short: Vec<AtomicU32> = (0..5).map(|_| AtomicU32::new(0)).collect();
        let engine = ScanoutEngine::new(crate::framebuffer::PixelStore::<u32>::new(&short));

        assert_eq!(
            Startup::new(&fb, SimTiming::default(), engine).err(),
            Some(StartupError::Config(ConfigError::StoreSizeMismatch {
                expected: 44_800,
                actual: 5
            }))
        );
    }

    #[test]
    fn test_phase_order() {
        let mut phase = StartupPhase::Allocated;
        let mut count = 1;
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            count += 1;
        }
        assert_eq!(phase, StartupPhase::Streaming);
        assert_eq!(count, 6);
    }
}
