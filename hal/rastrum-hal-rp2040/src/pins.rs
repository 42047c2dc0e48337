//! VGA connector pin assignment
//!
//! Six color lines on consecutive GPIOs (two bits per channel through a
//! resistor ladder), followed by the two sync lines:
//!
//! ```text
//! GPIO  0   1   2   3   4   5   6      7
//!       R0  R1  G0  G1  B0  B1  HSYNC  VSYNC
//! ```

use embassy_rp::peripherals::{PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7};
use embassy_rp::Peri;

use rastrum_core::config::BITS_PER_PIXEL;

/// GPIO numbers used by the VGA output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMap {
    /// First color GPIO (red, low bit)
    pub red_pin: u8,
    /// Horizontal sync GPIO
    pub hsync_pin: u8,
    /// Vertical sync GPIO
    pub vsync_pin: u8,
}

impl PinMap {
    /// The wiring the PIO programs and [`VgaPins`] are built for
    pub const DEFAULT: PinMap = PinMap {
        red_pin: 0,
        hsync_pin: 6,
        vsync_pin: 7,
    };

    /// Number of color GPIOs
    pub const fn color_pins(&self) -> u8 {
        BITS_PER_PIXEL as u8
    }

    /// Check that no two signals share a GPIO and all fit in bank 0
    pub fn is_valid(&self) -> bool {
        let color_end = self.red_pin + self.color_pins();
        let in_color = |pin: u8| pin >= self.red_pin && pin < color_end;

        color_end <= 30
            && self.hsync_pin < 30
            && self.vsync_pin < 30
            && self.hsync_pin != self.vsync_pin
            && !in_color(self.hsync_pin)
            && !in_color(self.vsync_pin)
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The eight GPIOs of [`PinMap::DEFAULT`]
pub struct VgaPins<'d> {
    pub red0: Peri<'d, PIN_0>,
    pub red1: Peri<'d, PIN_1>,
    pub green0: Peri<'d, PIN_2>,
    pub green1: Peri<'d, PIN_3>,
    pub blue0: Peri<'d, PIN_4>,
    pub blue1: Peri<'d, PIN_5>,
    pub hsync: Peri<'d, PIN_6>,
    pub vsync: Peri<'d, PIN_7>,
}

/// Take the VGA pins from the peripherals struct
///
/// Usage:
/// ```ignore
/// let pins = vga_pins!(p);
/// ```
#[macro_export]
macro_rules! vga_pins {
    ($p:expr) => {
        $crate::pins::VgaPins {
            red0: $p.PIN_0,
            red1: $p.PIN_1,
            green0: $p.PIN_2,
            green1: $p.PIN_3,
            blue0: $p.PIN_4,
            blue1: $p.PIN_5,
            hsync: $p.PIN_6,
            vsync: $p.PIN_7,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map() {
        let map = PinMap::default();
        assert!(map.is_valid());
        assert_eq!(map.color_pins(), 6);
        assert_eq!(map.red_pin + map.color_pins(), map.hsync_pin);
    }

    #[test]
    fn test_overlapping_map_rejected() {
        let map = PinMap {
            red_pin: 2,
            hsync_pin: 6,
            vsync_pin: 7,
        };
        assert!(!map.is_valid());

        let map = PinMap {
            hsync_pin: 7,
            ..PinMap::DEFAULT
        };
        assert!(!map.is_valid());
    }
}
