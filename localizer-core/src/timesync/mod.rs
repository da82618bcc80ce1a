//! One-shot calendar clock synchronization
//!
//! The persistent clock is written at most once per boot, from the first
//! valid time the preferred source delivers. If another source speaks
//! first, synchronization is forfeited until the next boot.

pub mod bcd;
pub mod calendar;
pub mod keeper;
pub mod policy;

pub use calendar::{read_calendar, write_calendar, CalendarValue, ClockError};
pub use keeper::TimeKeeper;
pub use policy::{Decision, SyncPolicy, SyncState, TimeEvent, TimeSource};
