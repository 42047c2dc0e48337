//! 6-bit color codes
//!
//! Two bits per channel, wired as red on bits 0-1, green on bits 2-3 and
//! blue on bits 4-5 of the color output pins.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::PIXEL_MASK;

/// A 6-bit color code (64 colors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color(u8);

impl Color {
    pub const BLACK: Color = Color(0b00_00_00);
    pub const RED: Color = Color(0b00_00_11);
    pub const GREEN: Color = Color(0b00_11_00);
    pub const BLUE: Color = Color(0b11_00_00);
    pub const WHITE: Color = Color(0b11_11_11);

    /// Create a color from a code; bits above the 6-bit budget are dropped
    pub const fn new(code: u8) -> Self {
        Self(code & PIXEL_MASK as u8)
    }

    /// Create a color from 2-bit channel levels (each masked to 0-3)
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self((red & 0b11) | (green & 0b11) << 2 | (blue & 0b11) << 4)
    }

    /// The 6-bit color code
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Red level (0-3)
    pub const fn red(self) -> u8 {
        self.0 & 0b11
    }

    /// Green level (0-3)
    pub const fn green(self) -> u8 {
        (self.0 >> 2) & 0b11
    }

    /// Blue level (0-3)
    pub const fn blue(self) -> u8 {
        (self.0 >> 4) & 0b11
    }

    /// All three channel levels as `(red, green, blue)`
    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.red(), self.green(), self.blue())
    }
}

impl From<u8> for Color {
    fn from(code: u8) -> Self {
        Color::new(code)
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_masked() {
        assert_eq!(Color::new(0xFF).code(), 63);
        assert_eq!(Color::new(64).code(), 0);
        assert_eq!(Color::from(0x7F).code(), 0x3F);
    }

    #[test]
    fn test_rgb_channels() {
        let c = Color::from_rgb(1, 2, 3);
        assert_eq!(c.code(), 0b11_10_01);
        assert_eq!(c.rgb(), (1, 2, 3));
        assert_eq!(Color::from_rgb(3, 3, 3), Color::WHITE);
        assert_eq!(Color::from_rgb(7, 0, 0), Color::RED);
    }
}
