//! Uplink collaborators over the network module UART
//!
//! Outbound lines share one transmit half behind an async mutex so a
//! publish and a geocode request never interleave on the wire. The link
//! settings go out once at startup, before the module reports a link. Replies are
//! decoded by the uplink receive task and handed back through
//! [`GEOCODE_REPLY`].

use defmt::*;
use embassy_rp::uart::{BufferedUartTx, Error as UartError};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Write;
use heapless::String;

use localizer_core::config::defaults::GEOCODE_TIMEOUT_MS;
use localizer_core::config::{Settings, LINK_KEYS};
use localizer_core::lookup::GeocodeReply;
use localizer_core::state::StatusFlags;
use localizer_core::traits::{GeocodeError, Geocoder, PublishError, Publisher};
use localizer_protocol::uplink::{write_config, write_geocode_request, write_publish};
use localizer_protocol::MAX_UPLINK_LINE;

use crate::channels::{GEOCODE_REPLY, STATUS};

/// Transmit half shared by every outbound line
pub type UplinkTx = Mutex<CriticalSectionRawMutex, BufferedUartTx>;

/// Longest geocode request line
const REQUEST_LEN: usize = 48;

/// Handle onto the network module
#[derive(Clone, Copy)]
pub struct Uplink {
    tx: &'static UplinkTx,
}

impl Uplink {
    pub fn new(tx: &'static UplinkTx) -> Self {
        Self { tx }
    }

    async fn send(&self, line: &str) -> Result<(), UartError> {
        let mut tx = self.tx.lock().await;
        tx.write_all(line.as_bytes()).await.inspect_err(|e| {
            warn!("Uplink write failed: {:?}", e);
        })
    }

    /// Hand the network module its Wi-Fi and broker settings
    pub async fn configure(&self, settings: &Settings) -> Result<(), UartError> {
        let mut line: String<MAX_UPLINK_LINE> = String::new();
        for key in LINK_KEYS {
            line.clear();
            if write_config(&mut line, key.name(), &settings.value(key)).is_err() {
                warn!("Setting {} not sendable, skipped", key.name());
                continue;
            }
            self.send(&line).await?;
        }
        debug!("Link settings sent");
        Ok(())
    }
}

impl Publisher for Uplink {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), PublishError> {
        if !STATUS.get_flag(StatusFlags::LINK_CONNECTED) {
            return Err(PublishError::LinkDown);
        }

        let mut line: String<MAX_UPLINK_LINE> = String::new();
        write_publish(&mut line, topic, payload)?;
        self.send(&line).await.map_err(|_| PublishError::Transport)?;
        trace!("Published {} bytes to {}", payload.len(), topic);
        Ok(())
    }
}

impl Geocoder for Uplink {
    async fn reverse(&mut self, latitude: f64, longitude: f64) -> Result<GeocodeReply, GeocodeError> {
        let mut line: String<REQUEST_LEN> = String::new();
        write_geocode_request(&mut line, latitude, longitude).map_err(|_| GeocodeError::Transport)?;

        // A late answer to an earlier request must not satisfy this one
        GEOCODE_REPLY.reset();
        self.send(&line).await.map_err(|_| GeocodeError::Transport)?;

        match with_timeout(Duration::from_millis(GEOCODE_TIMEOUT_MS), GEOCODE_REPLY.wait()).await {
            Ok(reply) => reply,
            Err(_) => Err(GeocodeError::Timeout),
        }
    }
}

