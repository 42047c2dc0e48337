//! PIO timing channels
//!
//! [`VgaTiming`] owns the three PIO0 state machines that generate the
//! VGA signal and implements [`TimingGroup`] for them: period constants
//! go into each TX FIFO, and all three machines are released with one
//! write to the PIO control register.

use embassy_rp::gpio::Level;
use embassy_rp::pac;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, ShiftConfig, ShiftDirection,
    StateMachine,
};

use rastrum_core::config::{DisplayConfig, PackingPolicy, Polarity};
use rastrum_hal::{ChannelRole, TimingChannel, TimingError, TimingGroup};

use crate::pins::{PinMap, VgaPins};
use crate::pio::{
    color_clock_divider, hsync_program, rgb_program, rgb_pull_threshold, sync_clock_divider,
    vsync_program,
};

/// The hsync, vsync and rgb state machines of PIO0
pub struct VgaTiming<'d> {
    common: Common<'d, PIO0>,
    hsync: StateMachine<'d, PIO0, 0>,
    vsync: StateMachine<'d, PIO0, 1>,
    rgb: StateMachine<'d, PIO0, 2>,
    /// Roles that have their period constant (bit per [`ChannelRole::mask`])
    configured: u8,
    running: bool,
}

impl<'d> VgaTiming<'d> {
    /// Load the programs and configure the state machines for `display`
    ///
    /// The machines are left disabled; nothing is output until
    /// [`TimingGroup::start_all`].
    pub fn new(
        mut common: Common<'d, PIO0>,
        mut hsync: StateMachine<'d, PIO0, 0>,
        mut vsync: StateMachine<'d, PIO0, 1>,
        mut rgb: StateMachine<'d, PIO0, 2>,
        pins: VgaPins<'d>,
        display: &DisplayConfig,
        sys_clk_hz: u32,
    ) -> Self {
        let mode = display.mode();
        let map = PinMap::DEFAULT;

        let hsync_pin = common.make_pio_pin(pins.hsync);
        let vsync_pin = common.make_pio_pin(pins.vsync);
        let color_pins = [
            common.make_pio_pin(pins.red0),
            common.make_pio_pin(pins.red1),
            common.make_pio_pin(pins.green0),
            common.make_pio_pin(pins.green1),
            common.make_pio_pin(pins.blue0),
            common.make_pio_pin(pins.blue1),
        ];
        let color_refs: [_; 6] = core::array::from_fn(|i| &color_pins[i]);

        set_polarity(map.hsync_pin, mode.hsync_polarity);
        set_polarity(map.vsync_pin, mode.vsync_polarity);

        // hsync: set pin, runs at the pixel clock
        let program = common.load_program(&hsync_program());
        let mut cfg = Config::default();
        cfg.use_program(&program, &[]);
        cfg.set_set_pins(&[&hsync_pin]);
        cfg.clock_divider = sync_clock_divider(sys_clk_hz, mode.pixel_clock_hz);
        hsync.set_config(&cfg);
        hsync.set_pins(Level::High, &[&hsync_pin]);
        hsync.set_pin_dirs(PioDirection::Out, &[&hsync_pin]);

        // vsync: side-set pin, counts hsync IRQs
        let program = common.load_program(&vsync_program(display.resolution));
        let mut cfg = Config::default();
        cfg.use_program(&program, &[&vsync_pin]);
        cfg.clock_divider = sync_clock_divider(sys_clk_hz, mode.pixel_clock_hz);
        vsync.set_config(&cfg);
        vsync.set_pins(Level::High, &[&vsync_pin]);
        vsync.set_pin_dirs(PioDirection::Out, &[&vsync_pin]);

        // rgb: six out pins, autopull, deep TX FIFO for the streamer
        let program = common.load_program(&rgb_program(display.packing));
        let mut cfg = Config::default();
        cfg.use_program(&program, &[]);
        cfg.set_out_pins(&color_refs);
        cfg.shift_out = ShiftConfig {
            threshold: rgb_pull_threshold(display.packing),
            direction: match display.packing {
                PackingPolicy::Wide => ShiftDirection::Right,
                PackingPolicy::Dense => ShiftDirection::Left,
            },
            auto_fill: true,
        };
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.clock_divider = color_clock_divider(sys_clk_hz, mode.pixel_clock_hz);
        rgb.set_config(&cfg);
        rgb.set_pins(Level::Low, &color_refs);
        rgb.set_pin_dirs(PioDirection::Out, &color_refs);

        Self {
            common,
            hsync,
            vsync,
            rgb,
            configured: 0,
            running: false,
        }
    }
}

impl<'d> VgaTiming<'d> {
    /// One state machine viewed as a single timing channel
    pub fn channel(&mut self, role: ChannelRole) -> VgaChannel<'_, 'd> {
        VgaChannel { timing: self, role }
    }
}

/// A single state machine of a [`VgaTiming`]
pub struct VgaChannel<'a, 'd> {
    timing: &'a mut VgaTiming<'d>,
    role: ChannelRole,
}

impl<'a, 'd> TimingChannel for VgaChannel<'a, 'd> {
    fn role(&self) -> ChannelRole {
        self.role
    }

    fn configure(&mut self, period: u32) -> Result<(), TimingError> {
        let role = self.role;
        if self.timing.running {
            return Err(TimingError::AlreadyRunning);
        }
        if period == 0 {
            return Err(TimingError::PeriodOutOfRange(role));
        }

        // Picked up by each program's leading `pull block`
        let accepted = match role {
            ChannelRole::Horizontal => self.timing.hsync.tx().try_push(period),
            ChannelRole::Vertical => self.timing.vsync.tx().try_push(period),
            ChannelRole::Color => self.timing.rgb.tx().try_push(period),
        };
        if !accepted {
            return Err(TimingError::QueueFull(role));
        }

        self.timing.configured |= role.mask();
        #[cfg(feature = "defmt")]
        defmt::debug!("timing: {} period {}", role, period);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.timing.configured & self.role.mask() != 0
    }
}

/// Invert a sync pin for positive-polarity modes
fn set_polarity(gpio: u8, polarity: Polarity) {
    let outover = match polarity {
        Polarity::Negative => pac::io::vals::Outover::NORMAL,
        Polarity::Positive => pac::io::vals::Outover::INVERT,
    };
    pac::IO_BANK0
        .gpio(gpio as usize)
        .ctrl()
        .modify(|w| w.set_outover(outover));
}

impl<'d> TimingGroup for VgaTiming<'d> {
    fn configure(&mut self, role: ChannelRole, period: u32) -> Result<(), TimingError> {
        self.channel(role).configure(period)
    }

    fn is_configured(&self, role: ChannelRole) -> bool {
        self.configured & role.mask() != 0
    }

    fn start_all(&mut self) -> Result<(), TimingError> {
        if self.running {
            return Err(TimingError::AlreadyRunning);
        }
        if let Some(role) = self.first_unconfigured() {
            return Err(TimingError::NotConfigured(role));
        }

        let (hsync, vsync, rgb) = (&mut self.hsync, &mut self.vsync, &mut self.rgb);
        self.common.apply_sm_batch(|batch| {
            batch.restart(hsync);
            batch.restart(vsync);
            batch.restart(rgb);
            batch.restart_clockdiv(hsync);
            batch.restart_clockdiv(vsync);
            batch.restart_clockdiv(rgb);
            batch.set_enable(hsync, true);
            batch.set_enable(vsync, true);
            batch.set_enable(rgb, true);
        });

        self.running = true;
        #[cfg(feature = "defmt")]
        defmt::info!("timing: hsync, vsync and rgb started in sync");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
