//! Uplink line protocol
//!
//! Text commands exchanged with the companion network module over UART.
//! One command per `\n` terminated line.
//!
//! Module → tracker:
//! ```text
//! LINK UP                                  network link associated
//! LINK DOWN                                network link lost
//! TIME 2026-10-17T08:30:00                 network time (UTC)
//! GEO <road>|<city>|<town>|<village>|<cc>  reverse geocode reply, empty = absent
//! ERR GEO                                  reverse geocode failed
//! ```
//!
//! Tracker → module:
//! ```text
//! CFG <key> <value>                        link setting, sent at startup
//! PUB <topic> <json>                       publish a message
//! GEO? <lat> <lon>                         request reverse geocode
//! ```
//!
//! A `CFG` value runs to the end of the line and may be empty or contain
//! spaces; it never contains a control byte.

use core::fmt::{self, Write};

use crate::nmea::{UtcDate, UtcTime};

/// Maximum length of one uplink line
pub const MAX_UPLINK_LINE: usize = 256;

/// Separator between geocode reply fields
const GEO_SEPARATOR: char = '|';

/// Uplink decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UplinkError {
    /// Unknown command word
    Unknown,
    /// Known command with unparseable arguments
    Malformed,
}

/// Network time reported by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkTime {
    pub date: UtcDate,
    pub time: UtcTime,
}

/// Reverse geocode fields, each absent when the lookup had no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeoFields<'a> {
    pub road: Option<&'a str>,
    pub city: Option<&'a str>,
    pub town: Option<&'a str>,
    pub village: Option<&'a str>,
    pub country_code: Option<&'a str>,
}

/// A decoded inbound line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Inbound<'a> {
    LinkUp,
    LinkDown,
    Time(NetworkTime),
    Geocode(GeoFields<'a>),
    GeocodeFailed,
}

/// Decode one inbound line (without terminator)
pub fn parse_inbound(line: &[u8]) -> Result<Inbound<'_>, UplinkError> {
    let line = core::str::from_utf8(line).map_err(|_| UplinkError::Malformed)?;
    let (command, args) = line.split_once(' ').unwrap_or((line, ""));

    match (command, args) {
        ("LINK", "UP") => Ok(Inbound::LinkUp),
        ("LINK", "DOWN") => Ok(Inbound::LinkDown),
        ("LINK", _) => Err(UplinkError::Malformed),
        ("TIME", stamp) => parse_timestamp(stamp).map(Inbound::Time),
        ("GEO", fields) => parse_geo(fields).map(Inbound::Geocode),
        ("ERR", "GEO") => Ok(Inbound::GeocodeFailed),
        _ => Err(UplinkError::Unknown),
    }
}

fn number<T: core::str::FromStr>(text: &str) -> Result<T, UplinkError> {
    text.parse().map_err(|_| UplinkError::Malformed)
}

/// `yyyy-mm-ddThh:mm:ss`
fn parse_timestamp(stamp: &str) -> Result<NetworkTime, UplinkError> {
    let (date, time) = stamp.split_once('T').ok_or(UplinkError::Malformed)?;

    let mut d = date.splitn(3, '-');
    let mut t = time.splitn(3, ':');
    let (Some(year), Some(month), Some(day)) = (d.next(), d.next(), d.next()) else {
        return Err(UplinkError::Malformed);
    };
    let (Some(hour), Some(minute), Some(second)) = (t.next(), t.next(), t.next()) else {
        return Err(UplinkError::Malformed);
    };

    let parsed = NetworkTime {
        date: UtcDate {
            day: number(day)?,
            month: number(month)?,
            year: number(year)?,
        },
        time: UtcTime {
            hour: number(hour)?,
            minute: number(minute)?,
            second: number(second)?,
        },
    };

    let NetworkTime { date, time } = parsed;
    if !(2000..=2099).contains(&date.year)
        || !(1..=12).contains(&date.month)
        || !(1..=31).contains(&date.day)
        || time.hour > 23
        || time.minute > 59
        || time.second > 59
    {
        return Err(UplinkError::Malformed);
    }
    Ok(parsed)
}

fn parse_geo(fields: &str) -> Result<GeoFields<'_>, UplinkError> {
    let mut parts = fields.split(GEO_SEPARATOR).map(|s| {
        let s = s.trim();
        (!s.is_empty()).then_some(s)
    });

    let geo = GeoFields {
        road: parts.next().ok_or(UplinkError::Malformed)?,
        city: parts.next().ok_or(UplinkError::Malformed)?,
        town: parts.next().ok_or(UplinkError::Malformed)?,
        village: parts.next().ok_or(UplinkError::Malformed)?,
        country_code: parts.next().ok_or(UplinkError::Malformed)?,
    };
    if parts.next().is_some() {
        return Err(UplinkError::Malformed);
    }
    Ok(geo)
}

/// Write a link setting, including the terminator
pub fn write_config<W: Write>(out: &mut W, key: &str, value: &str) -> fmt::Result {
    if value.bytes().any(|b| b < 0x20) {
        return Err(fmt::Error);
    }
    write!(out, "CFG {} {}\n", key, value)
}

/// Write a publish command, including the terminator
pub fn write_publish<W: Write>(out: &mut W, topic: &str, payload: &str) -> fmt::Result {
    write!(out, "PUB {} {}\n", topic, payload)
}

/// Write a reverse geocode request, including the terminator
pub fn write_geocode_request<W: Write>(out: &mut W, latitude: f64, longitude: f64) -> fmt::Result {
    write!(out, "GEO? {:.6} {:.6}\n", latitude, longitude)
}
