//! Reverse geocode lookup cycle

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::String;
use localizer_protocol::GeoFields;

use crate::state::location::copy_truncated;
use crate::state::{Location, LocationText, Status, StatusFlags};
use crate::telemetry::LocationMessage;
use crate::traits::{GeocodeError, Geocoder, PublishError, Publisher};

/// Capacity of one geocode field
pub const GEO_FIELD_LEN: usize = 64;

pub type GeoText = String<GEO_FIELD_LEN>;

/// Owned reverse geocode reply, every field optional
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeocodeReply {
    pub road: Option<GeoText>,
    pub city: Option<GeoText>,
    pub town: Option<GeoText>,
    pub village: Option<GeoText>,
    pub country_code: Option<GeoText>,
}

impl From<&GeoFields<'_>> for GeocodeReply {
    fn from(fields: &GeoFields<'_>) -> Self {
        let own = |field: Option<&str>| {
            field.map(|s| {
                let mut text = GeoText::new();
                copy_truncated(&mut text, s);
                text
            })
        };
        Self {
            road: own(fields.road),
            city: own(fields.city),
            town: own(fields.town),
            village: own(fields.village),
            country_code: own(fields.country_code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LookupError {
    /// The fix was lost between the wait and the read
    NoFix,
    Geocode(GeocodeError),
    Publish(PublishError),
}

impl From<GeocodeError> for LookupError {
    fn from(e: GeocodeError) -> Self {
        LookupError::Geocode(e)
    }
}

impl From<PublishError> for LookupError {
    fn from(e: PublishError) -> Self {
        LookupError::Publish(e)
    }
}

/// Run one lookup
///
/// Waits until the link is up and the fix is valid, resolves the current
/// position, merges the reply into `location` and publishes it.
pub async fn lookup_once<M, G, P>(
    status: &Status<M>,
    location: &Location<M>,
    geocoder: &mut G,
    publisher: &mut P,
    topic: &str,
) -> Result<LocationText, LookupError>
where
    M: RawMutex,
    G: Geocoder,
    P: Publisher,
{
    status
        .wait_all(StatusFlags::LINK_CONNECTED | StatusFlags::FIX_VALID)
        .await;

    let fix = status.read_fix();
    let position = fix.current().ok_or(LookupError::NoFix)?;

    let reply = geocoder
        .reverse(position.latitude, position.longitude)
        .await?;
    let text = location.apply(&reply);

    let payload = LocationMessage::from(&text).to_json().map_err(PublishError::from)?;
    publisher.publish(topic, &payload).await?;
    Ok(text)
}
