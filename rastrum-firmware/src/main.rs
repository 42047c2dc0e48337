//! Rastrum - Continuous VGA Scanout Firmware
//!
//! Drives a VGA monitor from an RP2040: three PIO state machines generate
//! hsync, vsync and the pixel stream, and a pair of chained DMA channels
//! replays the framebuffer into the pixel state machine forever. Drawing
//! is a plain `set_pixel` into the live framebuffer.
//!
//! Wiring (resistor ladder, two bits per color):
//!
//! ```text
//! GPIO 0-1  red      GPIO 6  hsync
//! GPIO 2-3  green    GPIO 7  vsync
//! GPIO 4-5  blue
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_time::{Duration, Ticker};
use {defmt_rtt as _, panic_probe as _};

use rastrum_core::framebuffer::Framebuffer;
use rastrum_core::startup::Startup;
use rastrum_hal::TimingGroup;
use rastrum_hal_rp2040::dma::DmaRing;
use rastrum_hal_rp2040::timing::VgaTiming;
use rastrum_hal_rp2040::vga_pins;

use crate::channels::PATTERN_PASSES;
use crate::display_config::{FrameCell, FrameWord, DISPLAY, WORDS_PER_FRAME};

mod channels;
mod tasks;

mod display_config {
    include!(concat!(env!("OUT_DIR"), "/display_config.rs"));
}

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// The framebuffer, streamed by DMA for as long as the firmware runs
static FRAME: [FrameCell; WORDS_PER_FRAME] = [const { FrameCell::new(0) }; WORDS_PER_FRAME];

/// Scanout monitor interval in seconds
const MONITOR_INTERVAL_S: u64 = 10;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Rastrum firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mode = DISPLAY.mode();
    info!(
        "Display: {}x{} {}, {} words per frame",
        DISPLAY.width(),
        DISPLAY.height(),
        DISPLAY.packing,
        WORDS_PER_FRAME
    );

    let framebuffer = match Framebuffer::<FrameWord>::new(&DISPLAY, &FRAME) {
        Ok(framebuffer) => framebuffer,
        Err(e) => defmt::panic!("Display configuration rejected: {}", e),
    };

    // Timing channels: hsync, vsync and rgb state machines in PIO0
    let Pio {
        common,
        sm0,
        sm1,
        sm2,
        ..
    } = Pio::new(p.PIO0, Irqs);

    let sys_clk_hz = embassy_rp::clocks::clk_sys_freq();
    let timing = VgaTiming::new(
        common,
        sm0,
        sm1,
        sm2,
        vga_pins!(p),
        &DISPLAY,
        sys_clk_hz,
    );
    info!(
        "PIO timing loaded (sys {} Hz, pixel {} Hz)",
        sys_clk_hz, mode.pixel_clock_hz
    );

    // Streamer on DMA channel 0, rearmer on channel 1
    let ring = DmaRing::new(p.DMA_CH0, p.DMA_CH1, framebuffer.store());

    let startup = match Startup::new(&framebuffer, timing, ring) {
        Ok(startup) => startup,
        Err(e) => defmt::panic!("Scanout start-up rejected: {}", e),
    };
    let params = *startup.params();
    let running = match startup.run() {
        Ok(running) => running,
        Err(e) => defmt::panic!("Scanout start-up failed: {}", e),
    };
    info!(
        "Scanout running: periods h={} v={} rgb={}",
        params.horizontal_active, params.vertical_active, params.color_active
    );

    unwrap!(spawner.spawn(tasks::pattern_task(framebuffer)));
    info!("All tasks spawned, firmware running");

    // Nothing is needed from the CPU to keep the display fed; just report
    let mut ticker = Ticker::every(Duration::from_secs(MONITOR_INTERVAL_S));
    let mut passes = 0;
    loop {
        ticker.next().await;
        if let Some(latest) = PATTERN_PASSES.try_take() {
            passes = latest;
        }
        debug!(
            "Scanout: timing running={}, {} words left in pass, streamer busy={}, {} pattern passes",
            running.timing().is_running(),
            running.ring().remaining(),
            running.ring().streamer_busy(),
            passes
        );
    }
}
