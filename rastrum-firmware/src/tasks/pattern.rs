//! Demo pattern task
//!
//! Redraws the diagonal color pattern forever through `set_pixel`, shifting
//! the palette by one step per pass so live updates are visible on screen.

use defmt::*;
use embassy_futures::yield_now;
use embassy_time::{Duration, Timer};

use rastrum_core::framebuffer::{Color, Framebuffer};
use rastrum_core::pattern::DiagonalPattern;

use crate::channels::PATTERN_PASSES;
use crate::display_config::FrameWord;

/// Pause between passes
const PASS_INTERVAL_MS: u64 = 500;

/// Pattern task - draws one full frame per pass
#[embassy_executor::task]
pub async fn pattern_task(mut framebuffer: Framebuffer<'static, FrameWord>) {
    info!(
        "Pattern task started ({}x{})",
        framebuffer.width(),
        framebuffer.height()
    );

    let (width, height) = (framebuffer.width(), framebuffer.height());
    let mut passes: u32 = 0;

    loop {
        let shift = (passes % 64) as u8;
        for (x, y, color) in DiagonalPattern::new(width, height) {
            framebuffer.set_pixel(x as i32, y as i32, Color::new(color.code() + shift));

            // Let the main task run once per line
            if x + 1 == width {
                yield_now().await;
            }
        }

        passes = passes.wrapping_add(1);
        PATTERN_PASSES.signal(passes);
        trace!("Pattern pass {} drawn", passes);

        Timer::after(Duration::from_millis(PASS_INTERVAL_MS)).await;
    }
}
