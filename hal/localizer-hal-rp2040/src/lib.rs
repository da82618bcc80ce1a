//! RP2040-specific HAL for the Localizer tracker
//!
//! Implements the shared `localizer-hal` traits on the RP2040:
//!
//! - Flash settings store (implements `localizer_hal::ConfigStore`)

#![no_std]

pub mod flash;

pub use localizer_hal::{ConfigKey, ConfigStore, StoreError};
