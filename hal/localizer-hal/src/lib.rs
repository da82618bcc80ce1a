//! Localizer Hardware Abstraction Layer
//!
//! Traits that chip-specific HALs implement so the board-agnostic crates
//! can reach persistent storage without knowing the flash layout.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  localizer-core (settings load/validate) │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  localizer-hal (this crate - traits)     │
//! └──────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌──────────────────────────────────────────┐
//! │  localizer-hal-rp2040 (flash map)        │
//! └──────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod store;

pub use store::{ConfigKey, ConfigStore, StoreError};
