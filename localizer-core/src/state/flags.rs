//! Status flags

use bitflags::bitflags;

bitflags! {
    /// Independent boolean status conditions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlags: u8 {
        /// Network link is up (written by the uplink)
        const LINK_CONNECTED = 1 << 0;
        /// Receiver reports a valid fix (written by ingest)
        const FIX_VALID = 1 << 1;
        /// Persistent clock was written (written by the timekeeper)
        const CLOCK_SYNCED = 1 << 2;
        /// Network time service answered (written by the uplink)
        const TIME_SERVICE_SYNCED = 1 << 3;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "StatusFlags {{ link: {}, fix: {}, clock: {}, ntp: {} }}",
            self.contains(Self::LINK_CONNECTED),
            self.contains(Self::FIX_VALID),
            self.contains(Self::CLOCK_SYNCED),
            self.contains(Self::TIME_SERVICE_SYNCED),
        )
    }
}
