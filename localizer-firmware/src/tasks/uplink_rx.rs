//! Uplink UART receive task
//!
//! Decodes lines from the network module and dispatches them: link and
//! time-service state go to their flags, network time to the timekeeper and
//! geocode answers to the pending lookup.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_io_async::Read;

use localizer_core::lookup::GeocodeReply;
use localizer_core::state::FlagWriter;
use localizer_core::timesync::CalendarValue;
use localizer_core::traits::GeocodeError;
use localizer_protocol::uplink::parse_inbound;
use localizer_protocol::{Inbound, LineBuffer, MAX_UPLINK_LINE};

use crate::channels::{GEOCODE_REPLY, LINK_UP, NETWORK_TIME};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

type Flag = FlagWriter<'static, CriticalSectionRawMutex>;

/// Uplink RX task
#[embassy_executor::task]
pub async fn uplink_rx_task(mut rx: BufferedUartRx, mut link: Flag, mut time_service: Flag) {
    info!("Uplink RX task started");

    let mut lines: LineBuffer<MAX_UPLINK_LINE> = LineBuffer::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("Uplink RX: {} bytes", n);
                for &byte in &buf[..n] {
                    let Some(line) = lines.feed(byte) else {
                        continue;
                    };
                    match parse_inbound(line) {
                        Ok(message) => dispatch(message, &mut link, &mut time_service),
                        Err(e) => debug!("Ignoring uplink line: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Uplink UART read error: {:?}", e);
            }
        }
    }
}

fn dispatch(message: Inbound<'_>, link: &mut Flag, time_service: &mut Flag) {
    match message {
        Inbound::LinkUp => {
            if link.set() {
                info!("Link up");
                LINK_UP.signal(());
            }
        }
        Inbound::LinkDown => {
            if link.clear() {
                info!("Link down");
            }
        }
        Inbound::Time(network) => match CalendarValue::from_utc(network.date, network.time) {
            Some(value) => {
                if time_service.set() {
                    info!("Network time synced: {}", value);
                }
                NETWORK_TIME.signal(value);
            }
            None => warn!("Network time out of range"),
        },
        Inbound::Geocode(fields) => {
            GEOCODE_REPLY.signal(Ok(GeocodeReply::from(&fields)));
        }
        Inbound::GeocodeFailed => {
            GEOCODE_REPLY.signal(Err(GeocodeError::Failed));
        }
    }
}
