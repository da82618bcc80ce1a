//! Device drivers
//!
//! Concrete implementations of the collaborator traits over
//! `embedded-hal-async` I2C:
//!
//! - DS3231 calendar clock ([`localizer_core::traits::ClockRegisters`])
//! - SSD1306 OLED, 72×40 window ([`localizer_display::FrameSink`])

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod ds3231;
pub mod ssd1306;

#[cfg(test)]
pub(crate) mod mock;

pub use ds3231::Ds3231;
pub use ssd1306::Ssd1306;
