//! 1-bit frame buffer in controller page order
//!
//! Each page is one byte-high strip of the canvas: byte `x` of page `p`
//! holds pixels `(x, 8p)..=(x, 8p + 7)`, bit 0 at the top.

use localizer_core::config::defaults::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

use crate::font::{glyph, ADVANCE, GLYPH_WIDTH};

/// Visible width in pixels
pub const WIDTH: usize = DISPLAY_WIDTH;
/// Visible height in pixels
pub const HEIGHT: usize = DISPLAY_HEIGHT;
/// Number of 8-pixel pages
pub const PAGES: usize = HEIGHT / 8;

/// Monochrome canvas, overwritten every cycle
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    pub fn clear(&mut self) {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Light one pixel; coordinates outside the canvas are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        self.pages[y / 8][x] |= 1 << (y % 8);
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    pub fn page(&self, index: usize) -> &[u8; WIDTH] {
        &self.pages[index]
    }

    pub fn pages(&self) -> &[[u8; WIDTH]; PAGES] {
        &self.pages
    }

    /// Draw `text` with its first glyph's left edge at `x`, top at `y`
    ///
    /// Glyphs entirely outside the canvas are skipped, partial glyphs are
    /// clipped per pixel.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            let left = x + (i * ADVANCE) as i32;
            if left >= WIDTH as i32 {
                break;
            }
            if left + (GLYPH_WIDTH as i32) <= 0 {
                continue;
            }
            self.draw_glyph(left, y, glyph(ch));
        }
    }

    fn draw_glyph(&mut self, x: i32, y: i32, columns: &[u8; GLYPH_WIDTH]) {
        for (dx, &bits) in columns.iter().enumerate() {
            for dy in 0..8 {
                if bits & (1 << dy) != 0 {
                    self.set_pixel(x + dx as i32, y + dy);
                }
            }
        }
    }
}

impl core::fmt::Debug for FrameBuffer {
    /// One text row per pixel row, `#` for lit pixels
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                f.write_str(if self.pixel(x, y) { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pixel_page_layout() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(3, 0);
        fb.set_pixel(3, 9);
        fb.set_pixel(71, 39);
        assert_eq!(fb.page(0)[3], 0x01);
        assert_eq!(fb.page(1)[3], 0x02);
        assert_eq!(fb.page(4)[71], 0x80);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(-1, 0);
        fb.set_pixel(0, -1);
        fb.set_pixel(72, 0);
        fb.set_pixel(0, 40);
        assert_eq!(fb, FrameBuffer::new());
    }

    #[test]
    fn test_draw_text_page_aligned() {
        let mut fb = FrameBuffer::new();
        fb.draw_text(0, 8, "0");
        assert_eq!(&fb.page(1)[..6], &[0x3E, 0x51, 0x49, 0x45, 0x3E, 0x00]);
        assert!(fb.page(0).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_text_clips_left_and_right() {
        let mut fb = FrameBuffer::new();
        // First glyph fully off canvas, second starts at x = 1
        fb.draw_text(-5, 0, "00");
        assert_eq!(&fb.page(0)[..6], &[0x00, 0x3E, 0x51, 0x49, 0x45, 0x3E]);

        fb.clear();
        fb.draw_text(70, 0, "0");
        assert_eq!(&fb.page(0)[70..], &[0x3E, 0x51]);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.draw_text(0, 0, "ABC");
        fb.clear();
        assert_eq!(fb, FrameBuffer::new());
    }
}
