//! Positioning receiver ingest task
//!
//! Runs on the high-priority executor so fix updates are never delayed by
//! rendering or uplink traffic.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Read;

use localizer_core::config::defaults::GPS_READ_TIMEOUT_MS;
use localizer_core::ingest::{Decoder, Update};

/// Bytes taken from the UART per read
const RX_BUF_SIZE: usize = 64;

/// Idle reads between decoder statistics reports
const STATS_EVERY: u32 = 600;

/// Ingest task - decodes receiver sentences into the shared fix state
#[embassy_executor::task]
pub async fn ingest_task(mut rx: BufferedUartRx, mut decoder: Decoder<'static, CriticalSectionRawMutex>) {
    info!("Ingest task started");

    let mut buf = [0u8; RX_BUF_SIZE];
    let mut idle = 0u32;

    loop {
        match with_timeout(Duration::from_millis(GPS_READ_TIMEOUT_MS), rx.read(&mut buf)).await {
            Ok(Ok(n)) => {
                for &byte in &buf[..n] {
                    if let Some(update) = decoder.feed(byte) {
                        report(update);
                    }
                }
            }
            Ok(Err(e)) => {
                warn!("GPS UART read error: {:?}", e);
            }
            Err(_) => {
                idle += 1;
                if idle >= STATS_EVERY {
                    idle = 0;
                    debug!("GPS quiet, decoder stats: {:?}", decoder.stats());
                }
            }
        }
    }
}

fn report(update: Update) {
    match update {
        Update::Position { acquired: true } => info!("GPS fix acquired"),
        Update::NoFix { lost: true } => info!("GPS fix lost"),
        Update::Satellites(count) => trace!("Satellites: {}", count),
        _ => {}
    }
}
