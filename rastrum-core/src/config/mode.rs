//! Video mode and timing constant definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rastrum_hal::ChannelRole;

use super::types::ConfigError;

/// Polarity of a sync pulse, and, by implication, the idle state of the
/// sync signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Pulse is high, idle is low
    Positive,
    /// Pulse is low, idle is high
    Negative,
}

/// Horizontal and vertical timing for one video mode
///
/// Horizontal values are in pixel clocks, vertical values in scanlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VideoMode {
    /// Visible pixels per line
    pub width: u16,
    /// Visible lines per frame
    pub height: u16,
    /// Pixels between end of video and start of hsync
    pub h_front_porch: u16,
    /// Length of hsync pulse
    pub h_sync: u16,
    /// Pixels between end of hsync and start of video
    pub h_back_porch: u16,
    /// Lines between end of video and start of vsync
    pub v_front_porch: u16,
    /// Length of vsync pulse
    pub v_sync: u16,
    /// Lines between end of vsync and start of video
    pub v_back_porch: u16,
    /// Polarity of horizontal sync pulse
    pub hsync_polarity: Polarity,
    /// Polarity of vertical sync pulse
    pub vsync_polarity: Polarity,
    /// Nominal pixel clock in Hz
    pub pixel_clock_hz: u32,
}

impl VideoMode {
    /// 640x350 @ 70Hz (EGA-style text mode timing)
    pub const VGA_640X350: VideoMode = VideoMode {
        width: 640,
        height: 350,
        h_front_porch: 16,
        h_sync: 96,
        h_back_porch: 48,
        v_front_porch: 37,
        v_sync: 2,
        v_back_porch: 60,
        hsync_polarity: Polarity::Positive,
        vsync_polarity: Polarity::Negative,
        pixel_clock_hz: 25_000_000,
    };

    /// 640x480 @ 60Hz (industry standard timing)
    pub const VGA_640X480: VideoMode = VideoMode {
        width: 640,
        height: 480,
        h_front_porch: 16,
        h_sync: 96,
        h_back_porch: 48,
        v_front_porch: 10,
        v_sync: 2,
        v_back_porch: 33,
        hsync_polarity: Polarity::Negative,
        vsync_polarity: Polarity::Negative,
        pixel_clock_hz: 25_000_000,
    };

    /// Total pixel clocks per line, including blanking
    pub const fn line_pixels(&self) -> u32 {
        self.width as u32 + self.h_front_porch as u32 + self.h_sync as u32 + self.h_back_porch as u32
    }

    /// Total lines per frame, including blanking
    pub const fn frame_lines(&self) -> u32 {
        self.height as u32 + self.v_front_porch as u32 + self.v_sync as u32 + self.v_back_porch as u32
    }

    /// Number of visible pixels
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Refresh rate in millihertz
    pub const fn refresh_mhz(&self) -> u32 {
        let clocks_per_frame = self.line_pixels() as u64 * self.frame_lines() as u64;
        (self.pixel_clock_hz as u64 * 1000 / clocks_per_frame) as u32
    }

    /// Period constants for the three timing channels
    pub const fn timing(&self) -> TimingParameters {
        TimingParameters::for_mode(self)
    }
}

/// Period constants loaded into the timing channels at start-up
///
/// Each value is "ticks until this channel's counter wraps". The counters
/// run down to zero inclusive, hence the `- 1` in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingParameters {
    /// Pixel clocks of active video plus front porch, per line
    pub horizontal_active: u32,
    /// Active lines per frame
    pub vertical_active: u32,
    /// Color units per line
    pub color_active: u32,
}

impl TimingParameters {
    /// Derive the period constants for a video mode
    pub const fn for_mode(mode: &VideoMode) -> Self {
        Self {
            horizontal_active: mode.width as u32 + mode.h_front_porch as u32 - 1,
            vertical_active: mode.height as u32 - 1,
            color_active: mode.width as u32 - 1,
        }
    }

    /// Period constant for one channel
    pub fn period(&self, role: ChannelRole) -> u32 {
        match role {
            ChannelRole::Horizontal => self.horizontal_active,
            ChannelRole::Vertical => self.vertical_active,
            ChannelRole::Color => self.color_active,
        }
    }

    /// Check that these constants keep the channels in lock-step for `mode`
    ///
    /// The color channel must wrap exactly once per visible line, the
    /// vertical channel once per visible frame, and the horizontal channel
    /// must cover the active line without reaching into the sync pulse.
    pub fn validate(&self, mode: &VideoMode) -> Result<(), ConfigError> {
        let width = mode.width as u32;
        let height = mode.height as u32;

        if width == 0 || self.color_active + 1 != width {
            return Err(ConfigError::TimingMismatch(ChannelRole::Color));
        }
        if height == 0 || self.vertical_active + 1 != height {
            return Err(ConfigError::TimingMismatch(ChannelRole::Vertical));
        }
        if self.horizontal_active < self.color_active
            || self.horizontal_active + 1 > width + mode.h_front_porch as u32
        {
            return Err(ConfigError::TimingMismatch(ChannelRole::Horizontal));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_constants_640x350() {
        let timing = VideoMode::VGA_640X350.timing();
        assert_eq!(timing.horizontal_active, 655);
        assert_eq!(timing.vertical_active, 349);
        assert_eq!(timing.color_active, 639);
        assert!(timing.validate(&VideoMode::VGA_640X350).is_ok());
    }

    #[test]
    fn test_timing_constants_640x480() {
        let timing = VideoMode::VGA_640X480.timing();
        assert_eq!(timing.horizontal_active, 655);
        assert_eq!(timing.vertical_active, 479);
        assert_eq!(timing.color_active, 639);
        assert_eq!(timing.period(ChannelRole::Vertical), 479);
    }

    #[test]
    fn test_frame_totals() {
        assert_eq!(VideoMode::VGA_640X480.line_pixels(), 800);
        assert_eq!(VideoMode::VGA_640X480.frame_lines(), 525);
        assert_eq!(VideoMode::VGA_640X350.frame_lines(), 449);
    }

    #[test]
    fn test_refresh_rate() {
        // 25MHz / (800 * 525) = 59.52Hz
        assert_eq!(VideoMode::VGA_640X480.refresh_mhz(), 59_523);
        // 25MHz / (800 * 449) = 69.60Hz
        assert_eq!(VideoMode::VGA_640X350.refresh_mhz(), 69_599);
    }

    #[test]
    fn test_mismatched_timing_rejected() {
        let mode = VideoMode::VGA_640X480;

        // Timing for the 350-line mode on a 480-line display
        let wrong = VideoMode::VGA_640X350.timing();
        assert_eq!(
            wrong.validate(&mode),
            Err(ConfigError::TimingMismatch(ChannelRole::Vertical))
        );

        let mut short_line = mode.timing();
        short_line.horizontal_active = 600;
        assert_eq!(
            short_line.validate(&mode),
            Err(ConfigError::TimingMismatch(ChannelRole::Horizontal))
        );

        let mut wide_color = mode.timing();
        wide_color.color_active = 640;
        assert_eq!(
            wide_color.validate(&mode),
            Err(ConfigError::TimingMismatch(ChannelRole::Color))
        );
    }
}
