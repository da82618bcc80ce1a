//! Localizer line protocols
//!
//! This crate defines the two ASCII line-oriented protocols the tracker
//! speaks. Both are fed one byte at a time through a bounded [`LineBuffer`]
//! so a runaway line can never overflow memory or produce two records.
//!
//! # Positioning sentences
//!
//! The GPS receiver emits NMEA 0183 sentences at 9600 baud:
//! ```text
//! $GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A
//! └─┬──┘ └──────────────── comma separated fields ────────────────┘ └┬┘
//!   id                                                           checksum
//! ```
//! Only the position/velocity (`RMC`) and fix data (`GGA`) sentences are
//! decoded; the trailing checksum is ignored.
//!
//! # Uplink
//!
//! Network bring-up, telemetry publishing, network time and reverse
//! geocoding run on a companion network module. The tracker exchanges
//! short text commands with it, see [`uplink`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod line;
pub mod nmea;
pub mod uplink;

pub use line::LineBuffer;
pub use nmea::{
    parse_sentence, Gga, PositionFix, Rmc, Sentence, SentenceError, UtcDate, UtcTime,
    MAX_SENTENCE_LEN, SENTENCE_MARKER,
};
pub use uplink::{GeoFields, Inbound, NetworkTime, UplinkError, MAX_UPLINK_LINE};
