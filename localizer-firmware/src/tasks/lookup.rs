//! Reverse geocode task

use defmt::*;
use embassy_time::Timer;

use localizer_core::config::defaults::{GEOLOCATION_INTERVAL_MS, TOPIC_LOCATION};
use localizer_core::lookup::{lookup_once, LookupError};

use crate::channels::{LOCATION, STATUS};
use crate::uplink::Uplink;

/// Lookup task - resolves the current position to an address while the
/// link is up and the fix is valid
#[embassy_executor::task]
pub async fn lookup_task(uplink: Uplink) {
    info!("Lookup task started");

    let mut geocoder = uplink;
    let mut publisher = uplink;

    loop {
        match lookup_once(&STATUS, &LOCATION, &mut geocoder, &mut publisher, TOPIC_LOCATION).await {
            Ok(text) => debug!(
                "Location: {} / {} / {}",
                text.street.as_str(),
                text.city.as_str(),
                text.country.as_str()
            ),
            Err(LookupError::NoFix) => trace!("Fix lost before lookup"),
            Err(e) => warn!("Location lookup failed: {:?}", e),
        }

        Timer::after_millis(GEOLOCATION_INTERVAL_MS).await;
    }
}
