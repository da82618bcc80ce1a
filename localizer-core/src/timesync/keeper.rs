//! Policy, clock device and clock-synced flag glued together

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::calendar::{read_calendar, write_calendar, CalendarValue, ClockError};
use super::policy::{Decision, SyncPolicy, TimeEvent};
use crate::state::FlagWriter;
use crate::traits::ClockRegisters;

/// Owns the clock device and the clock-synced flag
pub struct TimeKeeper<'a, M: RawMutex, C: ClockRegisters> {
    policy: SyncPolicy,
    device: C,
    synced: FlagWriter<'a, M>,
}

impl<'a, M: RawMutex, C: ClockRegisters> TimeKeeper<'a, M, C> {
    pub fn new(policy: SyncPolicy, device: C, synced: FlagWriter<'a, M>) -> Self {
        Self {
            policy,
            device,
            synced,
        }
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Direct access for device housekeeping outside the calendar registers
    pub fn device_mut(&mut self) -> &mut C {
        &mut self.device
    }

    /// Offer a time event and carry out the decision
    ///
    /// On a write the clock-synced flag is set even if the device write
    /// failed part way; the device error is returned for reporting.
    pub async fn offer(&mut self, event: TimeEvent) -> Result<Decision, ClockError<C::Error>> {
        let decision = self.policy.offer(event);
        if let Decision::Write(value) = decision {
            let written = write_calendar(&mut self.device, &value).await;
            self.synced.set();
            written?;
        }
        Ok(decision)
    }

    /// Read the device's current calendar value
    pub async fn read_clock(&mut self) -> Result<CalendarValue, ClockError<C::Error>> {
        read_calendar(&mut self.device).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Decoder;
    use crate::state::{Status, StatusFlags};
    use crate::timesync::calendar::tests::MockClock;
    use crate::timesync::policy::{SyncState, TimeSource};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    const RMC: &[u8] = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";
    const GGA: &[u8] =
        b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

    fn positioning_event(status: &Status<CriticalSectionRawMutex>) -> TimeEvent {
        let fix = status.read_fix();
        let position = fix.current().unwrap();
        TimeEvent {
            source: TimeSource::Positioning,
            at: CalendarValue::from_utc(position.date, position.time).unwrap(),
        }
    }

    #[test]
    fn test_single_write_for_many_fixes() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let w = status.split().unwrap();
        let mut decoder = Decoder::new(w.fix);
        let mut keeper = TimeKeeper::new(
            SyncPolicy::new(TimeSource::Positioning),
            MockClock::new(),
            w.clock,
        );

        for _ in 0..5 {
            decoder.feed_all(RMC);
            decoder.feed_all(GGA);
            let event = positioning_event(&status);
            block_on(keeper.offer(event)).unwrap();
        }

        assert_eq!(keeper.device.writes.len(), 6);
        assert_eq!(keeper.policy().state(), SyncState::Synced);
        assert!(status.get_flag(StatusFlags::CLOCK_SYNCED));

        let read = block_on(keeper.read_clock()).unwrap();
        assert_eq!(
            read,
            CalendarValue { second: 19, minute: 35, hour: 12, day: 23, month: 3, year: 94 }
        );
    }

    #[test]
    fn test_end_to_end_fix_and_flags() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let w = status.split().unwrap();
        let mut decoder = Decoder::new(w.fix);

        decoder.feed_all(RMC);
        decoder.feed_all(GGA);

        let fix = status.read_fix();
        assert!(fix.valid);
        assert!((fix.position.latitude - 48.1173).abs() < 1e-4);
        assert!((fix.position.longitude - 11.516_667).abs() < 1e-4);
        assert_eq!(fix.satellites, 8);

        // Lookup becomes eligible once the link is also up
        let mut link = w.link;
        let mut wait = core::pin::pin!(
            status.wait_all(StatusFlags::LINK_CONNECTED | StatusFlags::FIX_VALID)
        );
        assert!(embassy_futures::poll_once(wait.as_mut()).is_pending());
        link.set();
        assert!(embassy_futures::poll_once(wait.as_mut()).is_ready());
    }

    #[test]
    fn test_failed_write_still_marks_synced() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let w = status.split().unwrap();
        let mut clock = MockClock::new();
        clock.fail_at_write = Some(2);
        let mut keeper =
            TimeKeeper::new(SyncPolicy::new(TimeSource::Network), clock, w.clock);

        let at = CalendarValue { second: 0, minute: 30, hour: 8, day: 17, month: 10, year: 26 };
        let result = block_on(keeper.offer(TimeEvent { source: TimeSource::Network, at }));

        assert_eq!(result, Err(ClockError::Write { written: 2, source: () }));
        assert!(status.get_flag(StatusFlags::CLOCK_SYNCED));

        // No retry on a later event
        let again = block_on(keeper.offer(TimeEvent { source: TimeSource::Network, at }));
        assert_eq!(again, Ok(Decision::Ignore));
        assert_eq!(keeper.device.writes.len(), 2);
    }

    #[test]
    fn test_forfeit_never_writes() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let w = status.split().unwrap();
        let mut keeper = TimeKeeper::new(
            SyncPolicy::new(TimeSource::Positioning),
            MockClock::new(),
            w.clock,
        );

        let at = CalendarValue { second: 0, minute: 0, hour: 0, day: 1, month: 1, year: 26 };
        let result = block_on(keeper.offer(TimeEvent { source: TimeSource::Network, at }));
        assert_eq!(result, Ok(Decision::Forfeit));
        assert!(keeper.device.writes.is_empty());
        assert!(!status.get_flag(StatusFlags::CLOCK_SYNCED));
    }
}
