//! Clock synchronization task
//!
//! Offers the first usable time to the sync policy, which decides the one
//! clock write of this boot. Afterwards the clock is read back every minute
//! for status reports.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{with_timeout, Duration, Ticker, Timer};

use localizer_core::config::defaults::{GPS_FIX_TIMEOUT_MS, RTC_READBACK_MS};
use localizer_core::state::StatusFlags;
use localizer_core::timesync::{CalendarValue, Decision, TimeEvent, TimeKeeper, TimeSource};
use localizer_drivers::Ds3231;

use crate::channels::{store_clock, NETWORK_TIME, STATUS};

pub type Clock = Ds3231<I2c<'static, I2C1, Async>>;

pub type Keeper = TimeKeeper<'static, CriticalSectionRawMutex, Clock>;

/// Timekeeper task - one decisive clock write, then periodic read-back
#[embassy_executor::task]
pub async fn timekeeper_task(mut keeper: Keeper) {
    info!("Timekeeper task started");

    read_back(&mut keeper).await;

    while !keeper.policy().is_decided() {
        let Some(event) = next_event().await else {
            continue;
        };

        match keeper.offer(event).await {
            Ok(Decision::Write(value)) => {
                info!("Clock synced from {:?}: {}", event.source, value);
                if let Err(e) = keeper.device_mut().clear_oscillator_stop().await {
                    warn!("Failed to clear RTC oscillator flag: {:?}", e);
                }
            }
            Ok(Decision::Forfeit) => {
                info!(
                    "{:?} time arrived before {:?}, clock left unsynced this boot",
                    event.source,
                    keeper.policy().preferred()
                );
            }
            Ok(Decision::Ignore) => {}
            Err(e) => warn!("Clock write failed: {:?}", e),
        }
    }

    let mut ticker = Ticker::every(Duration::from_millis(RTC_READBACK_MS));
    loop {
        read_back(&mut keeper).await;
        ticker.next().await;
    }
}

/// Wait for a fix or network time, warning while neither arrives
async fn next_event() -> Option<TimeEvent> {
    let arrival = select(STATUS.wait_any(StatusFlags::FIX_VALID), NETWORK_TIME.wait());
    match with_timeout(Duration::from_millis(GPS_FIX_TIMEOUT_MS), arrival).await {
        Err(_) => {
            warn!("No GPS fix after {} s", GPS_FIX_TIMEOUT_MS / 1000);
            None
        }
        Ok(Either::First(_)) => {
            let snapshot = STATUS.read_fix();
            let at = snapshot
                .current()
                .and_then(|fix| CalendarValue::from_utc(fix.date, fix.time));
            match at {
                Some(at) => Some(TimeEvent { source: TimeSource::Positioning, at }),
                None => {
                    // Fix-valid stays set, so pace the retry
                    debug!("Fix without a usable date");
                    Timer::after_secs(1).await;
                    None
                }
            }
        }
        Ok(Either::Second(at)) => Some(TimeEvent { source: TimeSource::Network, at }),
    }
}

async fn read_back(keeper: &mut Keeper) {
    match keeper.read_clock().await {
        Ok(value) => {
            debug!("RTC: {}", value);
            store_clock(value);
        }
        Err(e) => warn!("RTC read failed: {:?}", e),
    }
}
