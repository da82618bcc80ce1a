//! Messages published over the uplink
//!
//! Payloads are flat JSON objects formatted into fixed buffers:
//!
//! ```text
//! <base>/gps       {"lat":48.117300,"lon":11.516667,"sats":8,"speed":41.5,"fix":true}
//! <base>/location  {"street":"Domplein","city":"Utrecht","country":"NL"}
//! <base>/status    {"device":"localizer","fix":true,"rtc":true,"ntp":false,"time":"2026-10-17T08:30:00"}
//! ```
//!
//! Speed is published in km/h.

use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::String;

use crate::state::{FixSnapshot, LocationText, Status, StatusFlags};
use crate::timesync::CalendarValue;
use crate::traits::{PublishError, Publisher};

/// Largest payload of any message
pub const MAX_PAYLOAD: usize = 192;

pub type Payload = String<MAX_PAYLOAD>;

pub const KMH_PER_KNOT: f32 = 1.852;

/// Write `value` as a quoted JSON string
fn write_json_str<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

/// Periodic position report
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryMessage {
    pub latitude: f64,
    pub longitude: f64,
    pub satellites: u8,
    pub speed_kmh: f32,
    pub fix: bool,
}

impl TelemetryMessage {
    /// Build from a snapshot; `None` without a valid fix
    pub fn from_snapshot(snapshot: &FixSnapshot) -> Option<Self> {
        let position = snapshot.current()?;
        Some(Self {
            latitude: position.latitude,
            longitude: position.longitude,
            satellites: snapshot.satellites,
            speed_kmh: position.speed_knots * KMH_PER_KNOT,
            fix: snapshot.valid,
        })
    }

    pub fn to_json(&self) -> Result<Payload, fmt::Error> {
        let mut out = Payload::new();
        write!(
            out,
            r#"{{"lat":{:.6},"lon":{:.6},"sats":{},"speed":{:.1},"fix":{}}}"#,
            self.latitude, self.longitude, self.satellites, self.speed_kmh, self.fix
        )?;
        Ok(out)
    }
}

/// Resolved address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationMessage<'a> {
    pub street: &'a str,
    pub city: &'a str,
    pub country: &'a str,
}

impl<'a> From<&'a LocationText> for LocationMessage<'a> {
    fn from(text: &'a LocationText) -> Self {
        Self {
            street: &text.street,
            city: &text.city,
            country: &text.country,
        }
    }
}

impl LocationMessage<'_> {
    pub fn to_json(&self) -> Result<Payload, fmt::Error> {
        let mut out = Payload::new();
        out.write_str(r#"{"street":"#)?;
        write_json_str(&mut out, self.street)?;
        out.write_str(r#","city":"#)?;
        write_json_str(&mut out, self.city)?;
        out.write_str(r#","country":"#)?;
        write_json_str(&mut out, self.country)?;
        out.write_char('}')?;
        Ok(out)
    }
}

/// Device health, sent on every link-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage<'a> {
    pub device: &'a str,
    pub fix: bool,
    pub rtc: bool,
    pub ntp: bool,
    /// Last clock read-back, if any
    pub time: Option<CalendarValue>,
}

impl<'a> StatusMessage<'a> {
    pub fn new(device: &'a str, flags: StatusFlags, time: Option<CalendarValue>) -> Self {
        Self {
            device,
            fix: flags.contains(StatusFlags::FIX_VALID),
            rtc: flags.contains(StatusFlags::CLOCK_SYNCED),
            ntp: flags.contains(StatusFlags::TIME_SERVICE_SYNCED),
            time,
        }
    }

    pub fn to_json(&self) -> Result<Payload, fmt::Error> {
        let mut out = Payload::new();
        out.write_str(r#"{"device":"#)?;
        write_json_str(&mut out, self.device)?;
        write!(
            out,
            r#","fix":{},"rtc":{},"ntp":{},"time":"#,
            self.fix, self.rtc, self.ntp
        )?;
        match &self.time {
            Some(time) => write!(out, "\"{}\"", time)?,
            None => out.write_str("null")?,
        }
        out.write_char('}')?;
        Ok(out)
    }
}

/// Outcome of one telemetry tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Published {
    Sent,
    /// No valid fix; nothing was sent
    SkippedNoFix,
}

/// Publish the current position if the fix is valid
pub async fn publish_telemetry<M: RawMutex, P: Publisher>(
    status: &Status<M>,
    publisher: &mut P,
    topic: &str,
) -> Result<Published, PublishError> {
    let Some(message) = TelemetryMessage::from_snapshot(&status.read_fix()) else {
        return Ok(Published::SkippedNoFix);
    };
    let payload = message.to_json()?;
    publisher.publish(topic, &payload).await?;
    Ok(Published::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::tests::RecordingPublisher;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use localizer_protocol::{PositionFix, UtcDate, UtcTime};

    fn munich() -> PositionFix {
        PositionFix {
            time: UtcTime { hour: 12, minute: 35, second: 19 },
            date: UtcDate { day: 23, month: 3, year: 2094 },
            latitude: 48.1173,
            longitude: 11.516667,
            speed_knots: 22.4,
        }
    }

    #[test]
    fn test_telemetry_json() {
        let snapshot = FixSnapshot {
            valid: true,
            position: munich(),
            last_valid: Some(munich()),
            satellites: 8,
        };
        let json = TelemetryMessage::from_snapshot(&snapshot)
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(
            json.as_str(),
            r#"{"lat":48.117300,"lon":11.516667,"sats":8,"speed":41.5,"fix":true}"#
        );
    }

    #[test]
    fn test_no_telemetry_without_fix() {
        let snapshot = FixSnapshot {
            valid: false,
            position: munich(),
            last_valid: Some(munich()),
            satellites: 3,
        };
        assert_eq!(TelemetryMessage::from_snapshot(&snapshot), None);
    }

    #[test]
    fn test_location_json_escapes() {
        let message = LocationMessage {
            street: "Rue \"Haute\"",
            city: "a\\b",
            country: "\u{1}",
        };
        assert_eq!(
            message.to_json().unwrap().as_str(),
            r#"{"street":"Rue \"Haute\"","city":"a\\b","country":"\u0001"}"#
        );
    }

    #[test]
    fn test_status_json() {
        let flags = StatusFlags::FIX_VALID | StatusFlags::CLOCK_SYNCED;
        let time = CalendarValue { second: 0, minute: 30, hour: 8, day: 17, month: 10, year: 26 };

        let with_time = StatusMessage::new("van-1", flags, Some(time)).to_json().unwrap();
        assert_eq!(
            with_time.as_str(),
            r#"{"device":"van-1","fix":true,"rtc":true,"ntp":false,"time":"2026-10-17T08:30:00"}"#
        );

        let without = StatusMessage::new("van-1", StatusFlags::empty(), None).to_json().unwrap();
        assert_eq!(
            without.as_str(),
            r#"{"device":"van-1","fix":false,"rtc":false,"ntp":false,"time":null}"#
        );
    }

    #[test]
    fn test_publish_only_with_fix() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let mut w = status.split().unwrap();
        let mut publisher = RecordingPublisher::new();

        let skipped = block_on(publish_telemetry(&status, &mut publisher, "camper/gps"));
        assert_eq!(skipped, Ok(Published::SkippedNoFix));
        assert!(publisher.sent.is_empty());

        w.fix.write_fix(munich());
        let sent = block_on(publish_telemetry(&status, &mut publisher, "camper/gps"));
        assert_eq!(sent, Ok(Published::Sent));
        assert_eq!(publisher.sent.len(), 1);

        publisher.fail = true;
        let failed = block_on(publish_telemetry(&status, &mut publisher, "camper/gps"));
        assert_eq!(failed, Err(PublishError::Transport));
    }
}
