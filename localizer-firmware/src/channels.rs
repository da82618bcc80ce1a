//! Shared state and inter-task signals
//!
//! Fix/status and location live in `localizer-core` containers; the signals
//! below carry the one-shot hand-offs between the uplink receiver and the
//! loops that consume its answers.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use localizer_core::lookup::GeocodeReply;
use localizer_core::state::{Location, Status};
use localizer_core::timesync::CalendarValue;
use localizer_core::traits::GeocodeError;

pub type StatusState = Status<CriticalSectionRawMutex>;

/// Fix, satellites and status flags
pub static STATUS: StatusState = Status::new();

/// Resolved address, written by the lookup task only
pub static LOCATION: Location<CriticalSectionRawMutex> = Location::new();

/// Network time received from the uplink
pub static NETWORK_TIME: Signal<CriticalSectionRawMutex, CalendarValue> = Signal::new();

/// Answer to the outstanding reverse geocode request
pub static GEOCODE_REPLY: Signal<CriticalSectionRawMutex, Result<GeocodeReply, GeocodeError>> =
    Signal::new();

/// Raised on every link-up edge
pub static LINK_UP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Most recent clock read-back, reported in status messages
pub static LAST_CLOCK: Mutex<CriticalSectionRawMutex, Cell<Option<CalendarValue>>> =
    Mutex::new(Cell::new(None));

pub fn last_clock() -> Option<CalendarValue> {
    LAST_CLOCK.lock(|cell| cell.get())
}

pub fn store_clock(value: CalendarValue) {
    LAST_CLOCK.lock(|cell| cell.set(Some(value)));
}
