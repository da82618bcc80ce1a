//! Horizontal scrolling of text wider than the canvas

use crate::font::ADVANCE;
use crate::frame::{FrameBuffer, WIDTH};

/// Pixels scrolled per frame
pub const SCROLL_STEP: u32 = 2;

// A line's pixel width is a multiple of the glyph advance, so a step that
// divides the advance makes every line return to offset 0 after exactly
// width / step frames.
const _: () = assert!(ADVANCE as u32 % SCROLL_STEP == 0);

/// Pixel width of `text` when drawn
pub fn text_width(text: &str) -> u32 {
    (text.chars().count() * ADVANCE) as u32
}

/// Scroll position of one line
///
/// Starts at zero and is never reset when the text changes; a shorter
/// text simply reads the offset modulo its own width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    offset: u32,
}

impl ScrollState {
    pub const fn new() -> Self {
        Self { offset: 0 }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Draw `text` at `y`: static if it fits, shifted left by the offset
    /// otherwise. Returns the text width.
    pub fn draw(&self, fb: &mut FrameBuffer, y: i32, text: &str) -> u32 {
        let width = text_width(text);
        if width <= WIDTH as u32 {
            fb.draw_text(0, y, text);
        } else {
            fb.draw_text(-((self.offset % width) as i32), y, text);
        }
        width
    }

    /// Move one step for a line `width` pixels wide
    pub fn advance(&mut self, width: u32) {
        if width > WIDTH as u32 {
            self.offset = (self.offset % width + SCROLL_STEP) % width;
        }
    }
}
