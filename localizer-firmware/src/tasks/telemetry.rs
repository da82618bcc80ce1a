//! Telemetry publishing task
//!
//! While the link is up, publishes the position on a fixed interval and a
//! status message on every link-up edge.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use localizer_core::config::defaults::{TELEMETRY_INTERVAL_MS, TOPIC_GPS, TOPIC_STATUS};
use localizer_core::config::Settings;
use localizer_core::state::StatusFlags;
use localizer_core::telemetry::{publish_telemetry, Published, StatusMessage};
use localizer_core::traits::Publisher;

use crate::channels::{last_clock, LINK_UP, STATUS};
use crate::uplink::Uplink;

/// Telemetry task
#[embassy_executor::task]
pub async fn telemetry_task(uplink: Uplink, settings: &'static Settings) {
    info!("Telemetry task started");

    let mut publisher = uplink;
    let mut ticker = Ticker::every(Duration::from_millis(TELEMETRY_INTERVAL_MS));

    loop {
        if !STATUS.get_flag(StatusFlags::LINK_CONNECTED) {
            STATUS.wait_any(StatusFlags::LINK_CONNECTED).await;
            // Don't burst the ticks missed while offline
            ticker.reset();
        }

        match select(LINK_UP.wait(), ticker.next()).await {
            Either::First(()) => send_status(&mut publisher, settings).await,
            Either::Second(()) => match publish_telemetry(&STATUS, &mut publisher, TOPIC_GPS).await {
                Ok(Published::Sent) => trace!("Telemetry sent"),
                Ok(Published::SkippedNoFix) => trace!("Telemetry skipped, no fix"),
                Err(e) => warn!("Telemetry publish failed: {:?}", e),
            },
        }
    }
}

async fn send_status(publisher: &mut Uplink, settings: &Settings) {
    let message = StatusMessage::new(&settings.device_id, STATUS.flags(), last_clock());
    let payload = match message.to_json() {
        Ok(payload) => payload,
        Err(_) => {
            warn!("Status message too long");
            return;
        }
    };
    match publisher.publish(TOPIC_STATUS, &payload).await {
        Ok(()) => debug!("Status sent"),
        Err(e) => warn!("Status publish failed: {:?}", e),
    }
}
