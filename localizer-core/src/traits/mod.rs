//! Collaborator traits
//!
//! These traits define the interface between the application logic and
//! the devices and services it talks to. Implementations live in the
//! driver and firmware crates; tests supply mocks.

pub mod clock;
pub mod uplink;

pub use clock::ClockRegisters;
pub use uplink::{GeocodeError, Geocoder, PublishError, Publisher};
