//! Calendar value and its register layout
//!
//! ```text
//! reg  field    digit mask
//! 0x00 seconds  0x7F
//! 0x01 minutes  0x7F
//! 0x02 hours    0x3F   (24 hour mode, bit 6 clear)
//! 0x03 weekday         (not used)
//! 0x04 day      0x3F
//! 0x05 month    0x1F   (bit 7 century)
//! 0x06 year     0xFF   (years since 2000)
//! ```

use core::fmt;

use localizer_protocol::{UtcDate, UtcTime};

use super::bcd;
use crate::traits::ClockRegisters;

pub const REG_SECONDS: u8 = 0x00;
pub const REG_MINUTES: u8 = 0x01;
pub const REG_HOURS: u8 = 0x02;
pub const REG_DAY: u8 = 0x04;
pub const REG_MONTH: u8 = 0x05;
pub const REG_YEAR: u8 = 0x06;

/// Registers covered by one burst read, weekday included
const CALENDAR_SPAN: usize = 7;

const SECONDS_MASK: u8 = 0x7F;
const MINUTES_MASK: u8 = 0x7F;
const HOURS_MASK: u8 = 0x3F;
const DAY_MASK: u8 = 0x3F;
const MONTH_MASK: u8 = 0x1F;

/// First year representable by the two-digit year register
pub const BASE_YEAR: u16 = 2000;

/// Errors from clock device access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError<E> {
    /// A register write failed after `written` fields were stored
    ///
    /// The device now holds a mix of new and old fields.
    Write { written: u8, source: E },
    /// A register read failed
    Read(E),
    /// The device returned fields outside their calendar range
    Invalid,
}

/// Broken-down UTC time as held by the clock device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarValue {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub day: u8,
    pub month: u8,
    /// Years since 2000
    pub year: u8,
}

impl CalendarValue {
    /// Build from a decoded date and time
    ///
    /// Returns `None` if the year lies outside 2000..=2099 or any field is
    /// out of range.
    pub fn from_utc(date: UtcDate, time: UtcTime) -> Option<Self> {
        let year = date.year.checked_sub(BASE_YEAR)?;
        let value = Self {
            second: time.second,
            minute: time.minute,
            hour: time.hour,
            day: date.day,
            month: date.month,
            year: u8::try_from(year).ok()?,
        };
        value.is_valid().then_some(value)
    }

    /// Check every field is within its calendar range
    pub fn is_valid(&self) -> bool {
        self.second <= 59
            && self.minute <= 59
            && self.hour <= 23
            && (1..=31).contains(&self.day)
            && (1..=12).contains(&self.month)
            && self.year <= 99
    }

    /// Full year, e.g. 2026
    pub fn full_year(&self) -> u16 {
        BASE_YEAR + u16::from(self.year)
    }

    /// Register/value pairs in write order
    pub fn to_registers(&self) -> [(u8, u8); 6] {
        [
            (REG_SECONDS, bcd::encode(self.second)),
            (REG_MINUTES, bcd::encode(self.minute)),
            (REG_HOURS, bcd::encode(self.hour)),
            (REG_DAY, bcd::encode(self.day)),
            (REG_MONTH, bcd::encode(self.month)),
            (REG_YEAR, bcd::encode(self.year)),
        ]
    }

    /// Decode a burst read starting at register 0x00
    pub fn from_registers(raw: &[u8; CALENDAR_SPAN]) -> Self {
        Self {
            second: bcd::decode(raw[REG_SECONDS as usize] & SECONDS_MASK),
            minute: bcd::decode(raw[REG_MINUTES as usize] & MINUTES_MASK),
            hour: bcd::decode(raw[REG_HOURS as usize] & HOURS_MASK),
            day: bcd::decode(raw[REG_DAY as usize] & DAY_MASK),
            month: bcd::decode(raw[REG_MONTH as usize] & MONTH_MASK),
            year: bcd::decode(raw[REG_YEAR as usize]),
        }
    }
}

/// ISO 8601, e.g. `2026-10-17T08:30:00`
impl fmt::Display for CalendarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.full_year(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Write all six calendar fields, one register at a time
///
/// Stops at the first failing write. Fields already written stay written.
pub async fn write_calendar<C: ClockRegisters>(
    device: &mut C,
    value: &CalendarValue,
) -> Result<(), ClockError<C::Error>> {
    for (written, (register, packed)) in value.to_registers().into_iter().enumerate() {
        device
            .write_register(register, packed)
            .await
            .map_err(|source| ClockError::Write {
                written: written as u8,
                source,
            })?;
    }
    Ok(())
}

/// Read and decode the calendar fields
pub async fn read_calendar<C: ClockRegisters>(
    device: &mut C,
) -> Result<CalendarValue, ClockError<C::Error>> {
    let mut raw = [0u8; CALENDAR_SPAN];
    device
        .read_registers(REG_SECONDS, &mut raw)
        .await
        .map_err(ClockError::Read)?;

    let value = CalendarValue::from_registers(&raw);
    if value.is_valid() {
        Ok(value)
    } else {
        Err(ClockError::Invalid)
    }
}
