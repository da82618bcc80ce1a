//! Sync decision policy
//!
//! ```text
//!            preferred source            any later event
//! Unsynced ─────────────────────► Synced ────────────────► Synced
//!     │
//!     │ other source first       any later event
//!     └─────────────────────► Forfeited ──────────────► Forfeited
//! ```

use super::calendar::CalendarValue;

/// Where a time event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSource {
    /// UTC date/time of a valid position fix
    Positioning,
    /// Network time service
    Network,
}

impl TimeSource {
    /// Parse the stored setting value
    pub fn from_setting(value: &str) -> Option<Self> {
        match value {
            "gps" => Some(TimeSource::Positioning),
            "ntp" => Some(TimeSource::Network),
            _ => None,
        }
    }

    pub fn as_setting(self) -> &'static str {
        match self {
            TimeSource::Positioning => "gps",
            TimeSource::Network => "ntp",
        }
    }
}

/// A valid time from one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeEvent {
    pub source: TimeSource,
    pub at: CalendarValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncState {
    /// No time event seen yet
    Unsynced,
    /// The clock was written from the preferred source
    Synced,
    /// Another source answered first; no write this boot
    Forfeited,
}

/// What to do with an offered event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decision {
    /// Write this value to the clock device
    Write(CalendarValue),
    /// First event came from the other source
    Forfeit,
    /// Already decided
    Ignore,
}

/// Decides the single clock write of a boot
#[derive(Debug, Clone, Copy)]
pub struct SyncPolicy {
    preferred: TimeSource,
    state: SyncState,
}

impl SyncPolicy {
    pub const fn new(preferred: TimeSource) -> Self {
        Self {
            preferred,
            state: SyncState::Unsynced,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn preferred(&self) -> TimeSource {
        self.preferred
    }

    /// True once no further event can cause a write
    pub fn is_decided(&self) -> bool {
        self.state != SyncState::Unsynced
    }

    /// Offer a time event
    pub fn offer(&mut self, event: TimeEvent) -> Decision {
        match self.state {
            SyncState::Synced | SyncState::Forfeited => Decision::Ignore,
            SyncState::Unsynced if event.source == self.preferred => {
                self.state = SyncState::Synced;
                Decision::Write(event.at)
            }
            SyncState::Unsynced => {
                self.state = SyncState::Forfeited;
                Decision::Forfeit
            }
        }
    }
}
