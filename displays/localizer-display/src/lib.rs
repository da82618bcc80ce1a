//! Status screen renderer for the Localizer OLED
//!
//! This crate provides:
//! - A 1-bit, page-addressed [`FrameBuffer`] matching the 72×40 window
//! - A 5×7 glyph table for printable ASCII
//! - Per-line horizontal scrolling for text wider than the canvas
//! - [`StatusScreen`], which composes the five status rows every cycle
//! - The [`FrameSink`] trait a display driver implements to receive pages
//!
//! # Layout
//!
//! ```text
//! page 0  GPS: FIX
//! page 1  RTC: SYNC
//! page 2  WiFi | NTP
//! page 3  48.11730 11.51667 8sat 41km/h   (scrolls)
//! page 4  Domplein, Utrecht, NL           (scrolls)
//! ```

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod font;
pub mod frame;
pub mod screen;
pub mod scroll;

pub use backend::{flush, DisplayError, FrameSink};
pub use frame::{FrameBuffer, HEIGHT, PAGES, WIDTH};
pub use screen::{ScreenData, StatusScreen};
pub use scroll::{ScrollState, SCROLL_STEP};
