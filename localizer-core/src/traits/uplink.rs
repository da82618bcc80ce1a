//! Network collaborators: message publishing and reverse geocoding

use crate::lookup::GeocodeReply;

/// Errors from publishing a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishError {
    /// The network link is down
    LinkDown,
    /// Writing to the uplink failed
    Transport,
    /// The message did not fit its buffer
    Overflow,
}

impl From<core::fmt::Error> for PublishError {
    fn from(_: core::fmt::Error) -> Self {
        PublishError::Overflow
    }
}

/// Errors from a reverse geocode request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeocodeError {
    /// Writing the request failed
    Transport,
    /// No reply within the deadline
    Timeout,
    /// The service answered with an error
    Failed,
}

/// Publishes a JSON payload to a topic
pub trait Publisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &str,
    ) -> impl core::future::Future<Output = Result<(), PublishError>>;
}

/// Turns coordinates into address fields
pub trait Geocoder {
    fn reverse(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> impl core::future::Future<Output = Result<GeocodeReply, GeocodeError>>;
}
