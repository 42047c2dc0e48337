//! Demo pattern
//!
//! Diagonal color bands: walking the frame in scan order, the color index
//! advances every 10 pixels and again every 6 lines, wrapping at 64.

use crate::framebuffer::Color;

/// Pixels per color step along a line
pub const COLUMN_STEP: u32 = 10;

/// Lines per extra color step
pub const ROW_STEP: u32 = 6;

/// Color of the diagonal pattern at (x, y) on a frame `width` pixels wide
pub fn diagonal_color(width: u16, x: u16, y: u16) -> Color {
    let linear = width as u32 * y as u32 + x as u32;
    let index = linear / COLUMN_STEP + y as u32 / ROW_STEP;
    Color::new((index % 64) as u8)
}

/// Every pixel of the pattern in scan order, as `(x, y, color)`
#[derive(Debug, Clone)]
pub struct DiagonalPattern {
    width: u16,
    height: u16,
    x: u16,
    y: u16,
}

impl DiagonalPattern {
    /// Pattern over a `width` × `height` frame
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            x: 0,
            y: 0,
        }
    }
}

impl Iterator for DiagonalPattern {
    type Item = (u16, u16, Color);

    fn next(&mut self) -> Option<Self::Item> {
        if self.width == 0 || self.y >= self.height {
            return None;
        }

        let item = (self.x, self.y, diagonal_color(self.width, self.x, self.y));
        self.x += 1;
        if self.x == self.width {
            self.x = 0;
            self.y += 1;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.width as usize * self.height as usize;
        let done = self.width as usize * self.y as usize + self.x as usize;
        let left = total.saturating_sub(done);
        (left, Some(left))
    }
}

impl ExactSizeIterator for DiagonalPattern {}
