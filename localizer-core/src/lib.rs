//! Board-agnostic core logic for the Localizer tracker
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Fix/status state shared between tasks, with single-owner writers
//! - Byte-level positioning ingest
//! - One-shot clock synchronization policy and packed-decimal codec
//! - Settings model, compiled defaults and load-time validation
//! - Telemetry, location and status messages
//! - Collaborator traits (clock registers, publisher, geocoder)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod ingest;
pub mod lookup;
pub mod state;
pub mod telemetry;
pub mod timesync;
pub mod traits;
