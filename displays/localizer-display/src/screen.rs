//! Status screen composition

use core::fmt::Write;

use heapless::String;
use localizer_core::state::{FixSnapshot, LocationText, StatusFlags};
use localizer_core::telemetry::KMH_PER_KNOT;

use crate::font::ADVANCE;
use crate::frame::FrameBuffer;
use crate::scroll::ScrollState;

/// Longest line the screen formats
pub const LINE_LEN: usize = 128;

pub type Line = String<LINE_LEN>;

const ROW_HEIGHT: i32 = 8;

const fn row_y(row: i32) -> i32 {
    row * ROW_HEIGHT
}

const fn col_x(col: usize) -> i32 {
    (col * ADVANCE) as i32
}

/// Everything one frame shows, captured at the start of the cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenData {
    pub flags: StatusFlags,
    pub fix: FixSnapshot,
    pub location: LocationText,
}

impl ScreenData {
    /// Position, satellites and speed
    ///
    /// Shows the last valid position while the fix is lost.
    pub fn telemetry_line(&self) -> Line {
        let mut line = Line::new();
        let sats = self.fix.satellites;
        // A full buffer only truncates the line
        let _ = match (self.fix.current(), self.fix.last_valid) {
            (Some(p), _) => write!(
                line,
                "{:.5} {:.5} {}sat {:.0}km/h",
                p.latitude,
                p.longitude,
                sats,
                p.speed_knots * KMH_PER_KNOT
            ),
            (None, Some(p)) => write!(line, "Last {:.5} {:.5} {}sat", p.latitude, p.longitude, sats),
            (None, None) => write!(line, "No position {}sat", sats),
        };
        line
    }

    /// Street, city and country, skipping unknown parts
    pub fn location_line(&self) -> Line {
        let mut line = Line::new();
        let parts = [
            self.location.street.as_str(),
            self.location.city.as_str(),
            self.location.country.as_str(),
        ];
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            if !line.is_empty() {
                let _ = line.push_str(", ");
            }
            let _ = line.push_str(part);
        }
        if line.is_empty() {
            let _ = line.push_str("Location unknown");
        }
        line
    }
}

/// Composes the five status rows and owns the scroll state of the two
/// free-text rows
#[derive(Debug, Default)]
pub struct StatusScreen {
    telemetry: ScrollState,
    location: ScrollState,
}

impl StatusScreen {
    pub const fn new() -> Self {
        Self {
            telemetry: ScrollState::new(),
            location: ScrollState::new(),
        }
    }

    /// Redraw `fb` from `data`, then advance both scrolling rows
    pub fn compose(&mut self, fb: &mut FrameBuffer, data: &ScreenData) {
        let flags = data.flags;
        fb.clear();

        let gps = if flags.contains(StatusFlags::FIX_VALID) {
            "GPS: FIX"
        } else {
            "GPS: ----"
        };
        fb.draw_text(0, row_y(0), gps);

        let rtc = if flags.contains(StatusFlags::CLOCK_SYNCED) {
            "RTC: SYNC"
        } else {
            "RTC: ----"
        };
        fb.draw_text(0, row_y(1), rtc);

        let wifi = if flags.contains(StatusFlags::LINK_CONNECTED) {
            "WiFi"
        } else {
            "----"
        };
        let ntp = if flags.contains(StatusFlags::TIME_SERVICE_SYNCED) {
            "NTP"
        } else {
            "---"
        };
        fb.draw_text(col_x(0), row_y(2), wifi);
        fb.draw_text(col_x(5), row_y(2), "|");
        fb.draw_text(col_x(7), row_y(2), ntp);

        let width = self.telemetry.draw(fb, row_y(3), &data.telemetry_line());
        self.telemetry.advance(width);

        let width = self.location.draw(fb, row_y(4), &data.location_line());
        self.location.advance(width);
    }
}
