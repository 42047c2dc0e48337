//! Framebuffer storage
//!
//! [`PixelStore`] is a read view over the storage cells, cheap to copy
//! and handed to the streamer. [`Framebuffer`] is the single writer; its
//! mutating methods take `&mut self`, so only one owner can write pixels
//! while any number of stores read concurrently.

use crate::config::{ConfigError, DisplayConfig};

use super::color::Color;
use super::packer::PixelPacker;
use super::word::StorageWord;

/// Raw backing memory for one full-screen image
///
/// Addressed by packed word index. The length never changes.
pub struct PixelStore<'a, W: StorageWord> {
    cells: &'a [W::Cell],
}

impl<'a, W: StorageWord> Clone for PixelStore<'a, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, W: StorageWord> Copy for PixelStore<'a, W> {}

impl<'a, W: StorageWord> PixelStore<'a, W> {
    /// Wrap `cells` and zero every word (blank frame)
    pub fn new(cells: &'a [W::Cell]) -> Self {
        let store = Self { cells };
        store.zero();
        store
    }

    /// Number of words (`WORDS_PER_FRAME`)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the store has no words
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Load one word, or `None` past the end
    pub fn get(&self, index: usize) -> Option<W> {
        self.cells.get(index).map(W::load)
    }

    /// Load one word
    ///
    /// # Panics
    /// If `index >= len()`.
    pub fn word(&self, index: usize) -> W {
        W::load(&self.cells[index])
    }

    /// Underlying cells, for handing the buffer address to a DMA engine
    pub fn cells(&self) -> &'a [W::Cell] {
        self.cells
    }

    /// Store one word; out-of-range indices are ignored
    pub(crate) fn set(&self, index: usize, value: W) {
        if let Some(cell) = self.cells.get(index) {
            W::store(cell, value);
        }
    }

    fn zero(&self) {
        for cell in self.cells {
            W::store(cell, W::default());
        }
    }
}

/// The writable framebuffer: storage plus packing
///
/// `set_pixel` is the only mutation surface application code needs.
/// Writes go straight into the words being streamed; they show up on the
/// display within one full replay of the buffer.
pub struct Framebuffer<'a, W: StorageWord> {
    config: DisplayConfig,
    store: PixelStore<'a, W>,
    packer: PixelPacker,
}

impl<'a, W: StorageWord> Framebuffer<'a, W> {
    /// Create a framebuffer over `cells`, validating the config and zeroing
    /// the storage
    ///
    /// `cells` must hold exactly `config.words_per_frame(W::BITS)` words.
    pub fn new(config: &DisplayConfig, cells: &'a [W::Cell]) -> Result<Self, ConfigError> {
        config.validate(W::BITS)?;
        let packer = PixelPacker::new(config, W::BITS)?;

        let expected = packer.words_per_frame();
        if cells.len() != expected {
            return Err(ConfigError::StoreSizeMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            config: *config,
            store: PixelStore::new(cells),
            packer,
        })
    }

    /// Read view of the storage, for the streamer
    pub fn store(&self) -> PixelStore<'a, W> {
        self.store
    }

    /// Display configuration this framebuffer was built for
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// The packing in use
    pub fn packer(&self) -> &PixelPacker {
        &self.packer
    }

    /// Active width in pixels
    pub fn width(&self) -> u16 {
        self.packer.width()
    }

    /// Active height in lines
    pub fn height(&self) -> u16 {
        self.packer.height()
    }

    /// Write one pixel
    ///
    /// Never fails: coordinates outside the active area are clamped to
    /// the nearest edge and the color is masked to 6 bits.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: impl Into<Color>) {
        let addr = self.packer.address(x, y);
        let old = self.store.word(addr.word_index).to_bits();
        let new = self.packer.pack(old, addr, color.into());
        self.store.set(addr.word_index, W::from_bits(new));
    }

    /// Read one pixel back (same clamping as [`Framebuffer::set_pixel`])
    pub fn pixel(&self, x: i32, y: i32) -> Color {
        let addr = self.packer.address(x, y);
        self.packer
            .unpack(self.store.word(addr.word_index).to_bits(), addr)
    }

    /// Fill the whole frame with one color
    pub fn fill(&mut self, color: impl Into<Color>) {
        let word = W::from_bits(self.packer.splat(color.into()));
        for index in 0..self.store.len() {
            self.store.set(index, word);
        }
    }

    /// Fill the whole frame with black
    pub fn clear(&mut self) {
        self.fill(Color::BLACK);
    }
}
