//! Pixel packing
//!
//! Maps (x, y) coordinates to a location inside the framebuffer's storage
//! words, and packs/unpacks color codes at that location.
//!
//! # Layout
//!
//! Pixels are stored in scan order: linear index `width * y + x`.
//!
//! - **Wide**: one pixel per storage unit, color code right-aligned.
//! - **Dense**: `word_bits / 6` pixels per word, first pixel in the most
//!   significant bits. For 32-bit words that is 5 pixels, with the bottom
//!   2 bits left as padding:
//!
//! ```text
//!  31      26 25      20 19      14 13       8 7        2 1  0
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┬────┐
//! │ pixel 0  │ pixel 1  │ pixel 2  │ pixel 3  │ pixel 4  │ -- │
//! └──────────┴──────────┴──────────┴──────────┴──────────┴────┘
//! ```

use crate::config::{ConfigError, DisplayConfig, PackingPolicy, BITS_PER_PIXEL, PIXEL_MASK};

use super::color::Color;

/// Location of one pixel inside the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelAddress {
    /// Index of the storage word
    pub word_index: usize,
    /// Offset of the pixel's field from the word's most significant bit;
    /// always a multiple of [`BITS_PER_PIXEL`]
    pub bit_offset: u32,
}

impl PixelAddress {
    /// Position of the pixel within its word (0 = first in scan order)
    pub fn slot(&self) -> u32 {
        self.bit_offset / BITS_PER_PIXEL
    }
}

/// Pure mapping between coordinates, colors and storage words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelPacker {
    width: u16,
    height: u16,
    policy: PackingPolicy,
    word_bits: u32,
    pixels_per_word: u32,
}

impl PixelPacker {
    /// Create a packer for `config` using storage words of `word_bits` bits
    pub fn new(config: &DisplayConfig, word_bits: u32) -> Result<Self, ConfigError> {
        config.packing.check_word_bits(word_bits)?;

        Ok(Self {
            width: config.width(),
            height: config.height(),
            policy: config.packing,
            word_bits,
            pixels_per_word: config.packing.pixels_per_word(word_bits),
        })
    }

    /// Active width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Active height in lines
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Packing policy
    pub fn policy(&self) -> PackingPolicy {
        self.policy
    }

    /// Pixels held by one storage word
    pub fn pixels_per_word(&self) -> u32 {
        self.pixels_per_word
    }

    /// Storage words one frame needs
    pub fn words_per_frame(&self) -> usize {
        let pixels = self.width as usize * self.height as usize;
        pixels.div_ceil(self.pixels_per_word as usize)
    }

    /// Clamp coordinates to the active area
    pub fn clamp(&self, x: i32, y: i32) -> (u16, u16) {
        let x = x.clamp(0, self.width as i32 - 1) as u16;
        let y = y.clamp(0, self.height as i32 - 1) as u16;
        (x, y)
    }

    /// Linear scan-order index of a (clamped) coordinate
    pub fn linear_index(&self, x: i32, y: i32) -> usize {
        let (x, y) = self.clamp(x, y);
        self.width as usize * y as usize + x as usize
    }

    /// Storage location of a (clamped) coordinate
    pub fn address(&self, x: i32, y: i32) -> PixelAddress {
        self.address_of(self.linear_index(x, y))
    }

    /// Storage location of a linear pixel index
    pub fn address_of(&self, linear: usize) -> PixelAddress {
        let per_word = self.pixels_per_word as usize;
        PixelAddress {
            word_index: linear / per_word,
            bit_offset: (linear % per_word) as u32 * BITS_PER_PIXEL,
        }
    }

    /// Right shift that brings a pixel's field down to bit 0
    pub fn shift(&self, addr: PixelAddress) -> u32 {
        match self.policy {
            PackingPolicy::Wide => 0,
            PackingPolicy::Dense => self.word_bits - addr.bit_offset - BITS_PER_PIXEL,
        }
    }

    /// Mask covering a pixel's field inside its word
    pub fn field_mask(&self, addr: PixelAddress) -> u32 {
        PIXEL_MASK << self.shift(addr)
    }

    /// Place `color` into `word` at `addr`
    ///
    /// Wide packing overwrites the whole unit. Dense packing clears the
    /// target field before OR-ing in the new code, so repeated writes to
    /// one pixel never accumulate bits from earlier colors.
    pub fn pack(&self, word: u32, addr: PixelAddress, color: Color) -> u32 {
        let code = color.code() as u32;
        match self.policy {
            PackingPolicy::Wide => code,
            PackingPolicy::Dense => (word & !self.field_mask(addr)) | (code << self.shift(addr)),
        }
    }

    /// Extract the color at `addr` from `word`
    pub fn unpack(&self, word: u32, addr: PixelAddress) -> Color {
        Color::new(((word >> self.shift(addr)) & PIXEL_MASK) as u8)
    }

    /// Extract the pixel in position `slot` of a streamed word
    pub fn unpack_slot(&self, word: u32, slot: u32) -> Color {
        let addr = PixelAddress {
            word_index: 0,
            bit_offset: slot * BITS_PER_PIXEL,
        };
        self.unpack(word, addr)
    }

    /// Build a word with every pixel slot set to `color`
    pub fn splat(&self, color: Color) -> u32 {
        (0..self.pixels_per_word).fold(0, |word, slot| {
            let addr = PixelAddress {
                word_index: 0,
                bit_offset: slot * BITS_PER_PIXEL,
            };
            self.pack(word, addr, color)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dense_480() -> PixelPacker {
        PixelPacker::new(&DisplayConfig::VGA_640X480_DENSE, 32).unwrap()
    }

    fn wide_350() -> PixelPacker {
        PixelPacker::new(&DisplayConfig::VGA_640X350_WIDE, 8).unwrap()
    }

    #[test]
    fn test_rejects_narrow_word() {
        assert_eq!(
            PixelPacker::new(&DisplayConfig::VGA_640X480_DENSE, 8),
            Err(ConfigError::DenseWordTooNarrow { word_bits: 8 })
        );
    }

    #[test]
    fn test_clamping() {
        let packer = wide_350();
        assert_eq!(packer.clamp(-5, -1), (0, 0));
        assert_eq!(packer.clamp(700, 400), (639, 349));
        assert_eq!(packer.clamp(320, 175), (320, 175));
    }

    #[test]
    fn test_dense_addresses() {
        let packer = dense_480();
        assert_eq!(
            packer.address(0, 0),
            PixelAddress { word_index: 0, bit_offset: 0 }
        );
        assert_eq!(
            packer.address(4, 0),
            PixelAddress { word_index: 0, bit_offset: 24 }
        );
        assert_eq!(
            packer.address(5, 0),
            PixelAddress { word_index: 1, bit_offset: 0 }
        );
        // Second line starts on a word boundary: 640 / 5 = 128
        assert_eq!(packer.address(0, 1).word_index, 128);
        assert_eq!(packer.address(0, 1).bit_offset, 0);
    }

    #[test]
    fn test_dense_first_pixel_in_top_bits() {
        let packer = dense_480();
        let addr = packer.address(0, 0);
        assert_eq!(packer.shift(addr), 26);
        assert_eq!(packer.field_mask(addr), 0xFC00_0000);

        let word = packer.pack(0, addr, Color::new(63));
        assert_eq!(word, 0b111111 << 26);
    }

    #[test]
    fn test_dense_padding_untouched() {
        let packer = dense_480();
        let word = packer.splat(Color::WHITE);
        assert_eq!(word & 0b11, 0);
        assert_eq!(word, 0xFFFF_FFFC);
    }

    #[test]
    fn test_dense_overwrite_clears_old_bits() {
        let packer = dense_480();
        let addr = packer.address(2, 0);

        let word = packer.pack(0, addr, Color::new(0b101010));
        let word = packer.pack(word, addr, Color::new(0b010101));
        assert_eq!(packer.unpack(word, addr).code(), 0b010101);
    }

    #[test]
    fn test_unpack_slot_matches_address() {
        let packer = dense_480();
        let mut word = 0;
        for x in 0..5 {
            word = packer.pack(word, packer.address(x, 0), Color::new(x as u8 + 1));
        }
        for slot in 0..5 {
            assert_eq!(packer.unpack_slot(word, slot).code(), slot as u8 + 1);
        }
    }

    #[test]
    fn test_wide_stores_right_aligned() {
        let packer = wide_350();
        let addr = packer.address(639, 349);
        assert_eq!(addr.word_index, 223_999);
        assert_eq!(addr.bit_offset, 0);
        assert_eq!(packer.pack(0xFF, addr, Color::new(0x15)), 0x15);
    }

    proptest! {
        #[test]
        fn prop_address_invariant(x in 0i32..640, y in 0i32..480) {
            let packer = dense_480();
            let addr = packer.address(x, y);
            prop_assert_eq!(addr.bit_offset % BITS_PER_PIXEL, 0);
            prop_assert!(addr.bit_offset < 32);
            let per_word = packer.pixels_per_word() as usize;
            prop_assert_eq!(
                addr.word_index * per_word + addr.slot() as usize,
                packer.linear_index(x, y)
            );
        }

        #[test]
        fn prop_unpack_pack_identity(
            x in 0i32..640,
            y in 0i32..480,
            code in 0u8..64,
            background in any::<u32>(),
        ) {
            for packer in [dense_480(), wide_350()] {
                let addr = packer.address(x, y);
                let word = packer.pack(background, addr, Color::new(code));
                prop_assert_eq!(packer.unpack(word, addr).code(), code);
            }
        }

        #[test]
        fn prop_dense_pack_touches_only_target_field(
            x in 0i32..640,
            code in 0u8..64,
            background in any::<u32>(),
        ) {
            let packer = dense_480();
            let addr = packer.address(x, 0);
            let mask = packer.field_mask(addr);
            let word = packer.pack(background, addr, Color::new(code));
            prop_assert_eq!(word & !mask, background & !mask);
        }

        #[test]
        fn prop_clamped_index_in_bounds(x in any::<i32>(), y in any::<i32>()) {
            for packer in [dense_480(), wide_350()] {
                let addr = packer.address(x, y);
                prop_assert!(addr.word_index < packer.words_per_frame());
            }
        }
    }
}
