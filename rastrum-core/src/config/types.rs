//! Configuration type definitions
//!
//! A [`DisplayConfig`] fixes resolution and packing for the lifetime of
//! the firmware. Everything that sizes storage is a `const fn` so static
//! framebuffers can be declared from a config constant.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rastrum_hal::ChannelRole;

use super::mode::{TimingParameters, VideoMode};

/// Bits of color per pixel (2 each of red, green, blue)
pub const BITS_PER_PIXEL: u32 = 6;

/// Mask selecting one pixel's color bits
pub const PIXEL_MASK: u32 = (1 << BITS_PER_PIXEL) - 1;

/// Configuration errors
///
/// All of these are fatal: start-up must not proceed to starting the
/// timing channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage word cannot hold a single pixel
    WordTooNarrow { word_bits: u32 },
    /// Dense packing needs at least two pixels per word
    DenseWordTooNarrow { word_bits: u32 },
    /// Backing storage does not match the words one frame needs
    StoreSizeMismatch { expected: usize, actual: usize },
    /// Period constant inconsistent with the video mode
    TimingMismatch(ChannelRole),
}

/// How pixel color codes are laid out in storage words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PackingPolicy {
    /// One pixel per storage unit; plain overwrite on write
    #[default]
    Wide,
    /// Several pixels per word, first pixel in the most significant bits;
    /// read-modify-write on write
    Dense,
}

impl PackingPolicy {
    /// Pixels held by one storage word of `word_bits` bits
    pub const fn pixels_per_word(self, word_bits: u32) -> u32 {
        match self {
            PackingPolicy::Wide => 1,
            PackingPolicy::Dense => word_bits / BITS_PER_PIXEL,
        }
    }

    /// Words needed to hold `pixels` pixels, rounded up
    pub const fn words_for(self, pixels: usize, word_bits: u32) -> usize {
        let per_word = self.pixels_per_word(word_bits) as usize;
        if per_word == 0 {
            return 0;
        }
        pixels.div_ceil(per_word)
    }

    /// Check that a storage word of `word_bits` bits suits this policy
    pub const fn check_word_bits(self, word_bits: u32) -> Result<(), ConfigError> {
        if word_bits < BITS_PER_PIXEL {
            return Err(ConfigError::WordTooNarrow { word_bits });
        }
        if let PackingPolicy::Dense = self {
            if self.pixels_per_word(word_bits) < 2 {
                return Err(ConfigError::DenseWordTooNarrow { word_bits });
            }
        }
        Ok(())
    }
}

/// Supported resolution presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Resolution {
    /// 640x350 @ 70Hz
    #[default]
    Vga640x350,
    /// 640x480 @ 60Hz
    Vga640x480,
}

impl Resolution {
    /// Timing for this preset
    pub const fn mode(self) -> VideoMode {
        match self {
            Resolution::Vga640x350 => VideoMode::VGA_640X350,
            Resolution::Vga640x480 => VideoMode::VGA_640X480,
        }
    }
}

/// Complete display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Resolution preset
    pub resolution: Resolution,
    /// Packing policy
    pub packing: PackingPolicy,
}

impl DisplayConfig {
    /// 640x350, one pixel per byte
    pub const VGA_640X350_WIDE: DisplayConfig = DisplayConfig::new(Resolution::Vga640x350, PackingPolicy::Wide);
    /// 640x350, five pixels per 32-bit word
    pub const VGA_640X350_DENSE: DisplayConfig = DisplayConfig::new(Resolution::Vga640x350, PackingPolicy::Dense);
    /// 640x480, one pixel per byte
    pub const VGA_640X480_WIDE: DisplayConfig = DisplayConfig::new(Resolution::Vga640x480, PackingPolicy::Wide);
    /// 640x480, five pixels per 32-bit word
    pub const VGA_640X480_DENSE: DisplayConfig = DisplayConfig::new(Resolution::Vga640x480, PackingPolicy::Dense);

    /// Create a new display config
    pub const fn new(resolution: Resolution, packing: PackingPolicy) -> Self {
        Self { resolution, packing }
    }

    /// Video mode for the configured resolution
    pub const fn mode(&self) -> VideoMode {
        self.resolution.mode()
    }

    /// Visible width in pixels
    pub const fn width(&self) -> u16 {
        self.mode().width
    }

    /// Visible height in lines
    pub const fn height(&self) -> u16 {
        self.mode().height
    }

    /// Period constants for the timing channels
    pub const fn timing(&self) -> TimingParameters {
        self.mode().timing()
    }

    /// Storage words one frame needs, for words of `word_bits` bits
    pub const fn words_per_frame(&self, word_bits: u32) -> usize {
        self.packing.words_for(self.mode().pixel_count(), word_bits)
    }

    /// Validate this config against a storage word width
    ///
    /// Checks the packing policy fits the word and the derived timing
    /// constants are consistent with the mode.
    pub fn validate(&self, word_bits: u32) -> Result<(), ConfigError> {
        self.packing.check_word_bits(word_bits)?;
        self.timing().validate(&self.mode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_per_word() {
        assert_eq!(PackingPolicy::Wide.pixels_per_word(8), 1);
        assert_eq!(PackingPolicy::Wide.pixels_per_word(32), 1);
        assert_eq!(PackingPolicy::Dense.pixels_per_word(32), 5);
        assert_eq!(PackingPolicy::Dense.pixels_per_word(16), 2);
    }

    #[test]
    fn test_words_per_frame() {
        // One byte per pixel
        assert_eq!(DisplayConfig::VGA_640X350_WIDE.words_per_frame(8), 224_000);
        // 128 words per line * 480 lines
        assert_eq!(DisplayConfig::VGA_640X480_DENSE.words_per_frame(32), 128 * 480);
        assert_eq!(DisplayConfig::VGA_640X350_DENSE.words_per_frame(32), 128 * 350);
    }

    #[test]
    fn test_words_round_up() {
        // 7 pixels at 5 per word need 2 words
        assert_eq!(PackingPolicy::Dense.words_for(7, 32), 2);
        assert_eq!(PackingPolicy::Dense.words_for(10, 32), 2);
        assert_eq!(PackingPolicy::Dense.words_for(11, 32), 3);
    }

    #[test]
    fn test_word_width_checks() {
        assert_eq!(
            PackingPolicy::Wide.check_word_bits(4),
            Err(ConfigError::WordTooNarrow { word_bits: 4 })
        );
        assert_eq!(
            PackingPolicy::Dense.check_word_bits(8),
            Err(ConfigError::DenseWordTooNarrow { word_bits: 8 })
        );
        assert!(PackingPolicy::Wide.check_word_bits(8).is_ok());
        assert!(PackingPolicy::Dense.check_word_bits(32).is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(DisplayConfig::VGA_640X350_WIDE.validate(8).is_ok());
        assert!(DisplayConfig::VGA_640X480_DENSE.validate(32).is_ok());
        assert!(DisplayConfig::VGA_640X480_DENSE.validate(8).is_err());
    }

    #[test]
    fn test_config_dimensions() {
        let config = DisplayConfig::VGA_640X480_WIDE;
        assert_eq!(config.width(), 640);
        assert_eq!(config.height(), 480);
        assert_eq!(config.timing().vertical_active, 479);
    }
}
