//! Positioning stream ingest
//!
//! Turns receiver bytes into fix state updates. Malformed and unsupported
//! lines are dropped without touching the state. An over-length line is cut
//! to the buffer capacity and decoded once from the kept prefix.

use embassy_sync::blocking_mutex::raw::RawMutex;
use localizer_protocol::{parse_sentence, LineBuffer, Rmc, Sentence, SentenceError, MAX_SENTENCE_LEN};

use crate::state::FixWriter;

/// State change caused by one sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Update {
    /// Position group stored; `acquired` on the invalid → valid edge
    Position { acquired: bool },
    /// Fix-valid cleared; `lost` on the valid → invalid edge
    NoFix { lost: bool },
    Satellites(u8),
}

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    pub sentences: u32,
    pub unsupported: u32,
    pub malformed: u32,
}

impl DecoderStats {
    fn record(&mut self, error: SentenceError) {
        match error {
            SentenceError::Unsupported | SentenceError::NoMarker => {
                self.unsupported = self.unsupported.wrapping_add(1)
            }
            SentenceError::TooFewFields | SentenceError::Malformed => {
                self.malformed = self.malformed.wrapping_add(1)
            }
        }
    }
}

/// Byte-at-a-time sentence decoder feeding the fix state
pub struct Decoder<'a, M: RawMutex> {
    line: LineBuffer<MAX_SENTENCE_LEN>,
    writer: FixWriter<'a, M>,
    stats: DecoderStats,
}

impl<'a, M: RawMutex> Decoder<'a, M> {
    pub fn new(writer: FixWriter<'a, M>) -> Self {
        Self {
            line: LineBuffer::new(),
            writer,
            stats: DecoderStats::default(),
        }
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Feed one byte; returns the state change a completed sentence caused
    pub fn feed(&mut self, byte: u8) -> Option<Update> {
        let line = self.line.feed(byte)?;
        let sentence = match parse_sentence(line) {
            Ok(sentence) => sentence,
            Err(e) => {
                self.stats.record(e);
                return None;
            }
        };
        self.stats.sentences = self.stats.sentences.wrapping_add(1);

        let update = match sentence {
            Sentence::Rmc(Rmc::Valid(fix)) => Update::Position {
                acquired: self.writer.write_fix(fix),
            },
            Sentence::Rmc(Rmc::Invalid) => Update::NoFix {
                lost: self.writer.clear_fix(),
            },
            Sentence::Gga(gga) => {
                self.writer.write_satellites(gga.satellites);
                Update::Satellites(gga.satellites)
            }
        };
        Some(update)
    }

    /// Feed a chunk; returns the last state change, if any
    pub fn feed_all(&mut self, bytes: &[u8]) -> Option<Update> {
        bytes.iter().fold(None, |last, &b| self.feed(b).or(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Status;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    const RMC_VALID: &[u8] =
        b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";
    const RMC_VOID: &[u8] = b"$GPRMC,123520,V,,,,,,,230394,,*7F\r\n";

    #[test]
    fn test_fix_acquired_then_lost() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let mut decoder = Decoder::new(status.split().unwrap().fix);

        assert_eq!(
            decoder.feed_all(RMC_VALID),
            Some(Update::Position { acquired: true })
        );
        assert_eq!(
            decoder.feed_all(RMC_VALID),
            Some(Update::Position { acquired: false })
        );
        let before = status.read_fix();
        assert_eq!(decoder.feed_all(RMC_VOID), Some(Update::NoFix { lost: true }));

        let fix = status.read_fix();
        assert!(!fix.valid);
        // Position from the valid sentence is retained unchanged
        assert_eq!(fix.position, before.position);
        assert_eq!(fix.last_valid, before.last_valid);
        assert!((fix.position.latitude - 48.1173).abs() < 1e-4);
        assert_eq!(decoder.stats().sentences, 3);
    }

    #[test]
    fn test_noise_leaves_state_untouched() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let mut decoder = Decoder::new(status.split().unwrap().fix);

        assert_eq!(decoder.feed_all(b"$GPGSV,3,1,11,03*74\r\n"), None);
        assert_eq!(decoder.feed_all(b"garbage\r\n"), None);
        assert_eq!(decoder.feed_all(b"$GPRMC,123519,A\r\n"), None);

        assert_eq!(status.read_fix(), crate::state::FixSnapshot::EMPTY);
        let stats = decoder.stats();
        assert_eq!(stats.unsupported, 2);
        assert_eq!(stats.malformed, 1);
    }

    #[test]
    fn test_over_length_line_decoded_from_prefix() {
        let status = Status::<CriticalSectionRawMutex>::new();
        let mut decoder = Decoder::new(status.split().unwrap().fix);

        let mut long = [b'0'; 150];
        let gga = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,";
        long[..gga.len()].copy_from_slice(gga);
        assert_eq!(decoder.feed_all(&long), None);
        assert_eq!(decoder.feed_all(b"\n"), Some(Update::Satellites(8)));
        assert_eq!(status.read_fix().satellites, 8);

        // A prefix too short to hold the fields is simply dropped
        let mut long = [b'9'; 200];
        long[..7].copy_from_slice(b"$GPRMC,");
        assert_eq!(decoder.feed_all(&long), None);
        assert_eq!(decoder.feed_all(b"\n"), None);
        assert_eq!(decoder.stats().malformed, 1);

        // Stream recovers on the next line
        assert!(decoder.feed_all(RMC_VALID).is_some());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_bytes_never_panic(
                chunks in proptest::collection::vec(
                    proptest::collection::vec(any::<u8>(), 0..120),
                    0..8,
                ),
            ) {
                let status = Status::<CriticalSectionRawMutex>::new();
                let mut decoder = Decoder::new(status.split().unwrap().fix);
                for (i, chunk) in chunks.iter().enumerate() {
                    let prefix: &[u8] = if i % 2 == 0 { b"$GPRMC," } else { b"$GPGGA," };
                    decoder.feed_all(prefix);
                    decoder.feed_all(chunk);
                    decoder.feed_all(b"\n");
                }
                // A clean sentence still decodes afterwards
                prop_assert!(decoder.feed_all(RMC_VALID).is_some());
            }
        }
    }
}
