//! NMEA 0183 positioning sentences
//!
//! Decodes a completed line into a typed [`Sentence`]. Two sentence kinds
//! are understood:
//!
//! - `RMC` (recommended minimum): validity marker, UTC time and date,
//!   position and speed over ground
//! - `GGA` (fix data): number of satellites in use
//!
//! Everything else is reported as [`SentenceError::Unsupported`]. A
//! sentence either decodes completely or not at all; there is no partial
//! result.

use core::str;

use heapless::Vec;

/// Every sentence starts with this byte
pub const SENTENCE_MARKER: u8 = b'$';

/// Maximum accepted sentence length in bytes (NMEA allows 82)
pub const MAX_SENTENCE_LEN: usize = 96;

/// Maximum number of fields split out of one sentence
pub const MAX_FIELDS: usize = 20;

/// Field delimiter
pub const FIELD_DELIMITER: u8 = b',';

/// Start of the trailing checksum
const CHECKSUM_MARKER: u8 = b'*';

/// Length of the `$TTSSS` identifier prefix
const ID_LEN: usize = 6;

const RMC_MIN_FIELDS: usize = 10;
const GGA_MIN_FIELDS: usize = 8;

/// Validity marker meaning "data valid"
const STATUS_VALID: &[u8] = b"A";

/// Sentence decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentenceError {
    /// Line does not start with the sentence marker
    NoMarker,
    /// Identifier is not one we decode
    Unsupported,
    /// Fewer fields than the sentence kind requires
    TooFewFields,
    /// A required field could not be parsed
    Malformed,
}

/// UTC time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// UTC calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcDate {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

/// Position and time reported by a valid RMC sentence
///
/// These fields are always replaced together.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionFix {
    pub time: UtcTime,
    pub date: UtcDate,
    /// Decimal degrees, negative south
    pub latitude: f64,
    /// Decimal degrees, negative west
    pub longitude: f64,
    /// Speed over ground in knots
    pub speed_knots: f32,
}

impl PositionFix {
    /// All-zero group held before the first fix
    pub const ZERO: Self = Self {
        time: UtcTime { hour: 0, minute: 0, second: 0 },
        date: UtcDate { day: 0, month: 0, year: 0 },
        latitude: 0.0,
        longitude: 0.0,
        speed_knots: 0.0,
    };
}

/// Decoded RMC sentence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rmc {
    /// Marker `A`: receiver has a fix
    Valid(PositionFix),
    /// Any other marker
    Invalid,
}

/// Decoded GGA sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gga {
    pub satellites: u8,
}

/// A decoded sentence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sentence {
    Rmc(Rmc),
    Gga(Gga),
}

/// Decode one line (without terminator)
pub fn parse_sentence(line: &[u8]) -> Result<Sentence, SentenceError> {
    if line.first() != Some(&SENTENCE_MARKER) {
        return Err(SentenceError::NoMarker);
    }
    if line.len() < ID_LEN {
        return Err(SentenceError::Unsupported);
    }

    // Checksum is not verified
    let body = match line.iter().position(|&b| b == CHECKSUM_MARKER) {
        Some(end) => &line[..end],
        None => line,
    };

    match &line[..ID_LEN] {
        b"$GPRMC" | b"$GNRMC" => parse_rmc(body).map(Sentence::Rmc),
        b"$GPGGA" | b"$GNGGA" => parse_gga(body).map(Sentence::Gga),
        _ => Err(SentenceError::Unsupported),
    }
}

/// Split a sentence body into at most `MAX_FIELDS` fields
fn split_fields(body: &[u8]) -> Vec<&[u8], MAX_FIELDS> {
    let mut fields = Vec::new();
    for field in body.split(|&b| b == FIELD_DELIMITER) {
        if fields.push(field).is_err() {
            break;
        }
    }
    fields
}

fn parse_rmc(body: &[u8]) -> Result<Rmc, SentenceError> {
    let f = split_fields(body);
    if f.len() < RMC_MIN_FIELDS {
        return Err(SentenceError::TooFewFields);
    }

    if f[2] != STATUS_VALID {
        return Ok(Rmc::Invalid);
    }

    let fix = PositionFix {
        time: parse_time(f[1])?,
        date: parse_date(f[9])?,
        latitude: parse_coordinate(f[3], f[4], b'N', b'S')?,
        longitude: parse_coordinate(f[5], f[6], b'E', b'W')?,
        speed_knots: parse_speed(f[7])?,
    };
    Ok(Rmc::Valid(fix))
}

fn parse_gga(body: &[u8]) -> Result<Gga, SentenceError> {
    let f = split_fields(body);
    if f.len() < GGA_MIN_FIELDS {
        return Err(SentenceError::TooFewFields);
    }

    let satellites = as_str(f[7])?
        .parse::<u8>()
        .map_err(|_| SentenceError::Malformed)?;
    Ok(Gga { satellites })
}

fn as_str(field: &[u8]) -> Result<&str, SentenceError> {
    str::from_utf8(field).map_err(|_| SentenceError::Malformed)
}

/// Two ASCII digits starting at `at`
fn digit_pair(field: &[u8], at: usize) -> Result<u8, SentenceError> {
    match field.get(at..at + 2) {
        Some([t, u]) if t.is_ascii_digit() && u.is_ascii_digit() => {
            Ok((t - b'0') * 10 + (u - b'0'))
        }
        _ => Err(SentenceError::Malformed),
    }
}

/// `hhmmss` with optional fractional seconds
fn parse_time(field: &[u8]) -> Result<UtcTime, SentenceError> {
    let time = UtcTime {
        hour: digit_pair(field, 0)?,
        minute: digit_pair(field, 2)?,
        second: digit_pair(field, 4)?,
    };
    if time.hour > 23 || time.minute > 59 || time.second > 60 {
        return Err(SentenceError::Malformed);
    }
    Ok(time)
}

/// `ddmmyy`, century fixed to 2000
fn parse_date(field: &[u8]) -> Result<UtcDate, SentenceError> {
    if field.len() != 6 {
        return Err(SentenceError::Malformed);
    }
    let date = UtcDate {
        day: digit_pair(field, 0)?,
        month: digit_pair(field, 2)?,
        year: 2000 + digit_pair(field, 4)? as u16,
    };
    if !(1..=31).contains(&date.day) || !(1..=12).contains(&date.month) {
        return Err(SentenceError::Malformed);
    }
    Ok(date)
}

/// `DDMM.MMMM` / `DDDMM.MMMM` plus hemisphere to signed decimal degrees
pub fn parse_coordinate(
    value: &[u8],
    hemisphere: &[u8],
    positive: u8,
    negative: u8,
) -> Result<f64, SentenceError> {
    let sign = match hemisphere {
        [h] if *h == positive => 1.0,
        [h] if *h == negative => -1.0,
        _ => return Err(SentenceError::Malformed),
    };

    let int_len = value.iter().position(|&b| b == b'.').unwrap_or(value.len());
    if int_len < 3 {
        return Err(SentenceError::Malformed);
    }
    // Minutes always take the last two integer digits
    let (deg_field, min_field) = value.split_at(int_len - 2);
    if !deg_field.iter().all(u8::is_ascii_digit) {
        return Err(SentenceError::Malformed);
    }

    let degrees = as_str(deg_field)?
        .parse::<u16>()
        .map_err(|_| SentenceError::Malformed)?;
    let minutes = as_str(min_field)?
        .parse::<f64>()
        .map_err(|_| SentenceError::Malformed)?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(SentenceError::Malformed);
    }

    Ok(sign * (degrees as f64 + minutes / 60.0))
}

/// Speed over ground; receivers leave the field empty when stationary
fn parse_speed(field: &[u8]) -> Result<f32, SentenceError> {
    if field.is_empty() {
        return Ok(0.0);
    }
    as_str(field)?
        .parse::<f32>()
        .map_err(|_| SentenceError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RMC: &[u8] = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_rmc_valid() {
        let Ok(Sentence::Rmc(Rmc::Valid(fix))) = parse_sentence(RMC) else {
            panic!("expected valid RMC");
        };
        assert_eq!(fix.time, UtcTime { hour: 12, minute: 35, second: 19 });
        assert_eq!(fix.date, UtcDate { day: 23, month: 3, year: 2094 });
        assert!(approx(fix.latitude, 48.1173));
        assert!(approx(fix.longitude, 11.5167));
        assert!((fix.speed_knots - 22.4).abs() < 1e-3);
    }

    #[test]
    fn test_rmc_void_marker() {
        let line = b"$GPRMC,123519,V,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
        assert_eq!(parse_sentence(line), Ok(Sentence::Rmc(Rmc::Invalid)));

        // Void sentences are accepted even with empty position fields
        let line = b"$GPRMC,,V,,,,,,,,,,N*53";
        assert_eq!(parse_sentence(line), Ok(Sentence::Rmc(Rmc::Invalid)));
    }

    #[test]
    fn test_rmc_too_few_fields() {
        let line = b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4";
        assert_eq!(parse_sentence(line), Err(SentenceError::TooFewFields));
    }

    #[test]
    fn test_rmc_valid_with_bad_field_is_malformed() {
        let line = b"$GPRMC,123519,A,48x7.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
        assert_eq!(parse_sentence(line), Err(SentenceError::Malformed));

        let line = b"$GPRMC,123519,A,4807.038,Q,01131.000,E,022.4,084.4,230394,003.1,W*6A";
        assert_eq!(parse_sentence(line), Err(SentenceError::Malformed));
    }

    #[test]
    fn test_gga_satellites() {
        assert_eq!(
            parse_sentence(GGA),
            Ok(Sentence::Gga(Gga { satellites: 8 }))
        );
    }

    #[test]
    fn test_gga_too_few_fields() {
        let line = b"$GPGGA,123519,4807.038,N,01131.000,E,1";
        assert_eq!(parse_sentence(line), Err(SentenceError::TooFewFields));
    }

    #[test]
    fn test_gn_talker_accepted() {
        let line = b"$GNGGA,123519,4807.038,N,01131.000,E,1,11,0.9,545.4,M,46.9,M,,*47";
        assert_eq!(
            parse_sentence(line),
            Ok(Sentence::Gga(Gga { satellites: 11 }))
        );
    }

    #[test]
    fn test_unsupported_and_unmarked() {
        assert_eq!(
            parse_sentence(b"$GPGSV,3,1,11,03,03,111,00*74"),
            Err(SentenceError::Unsupported)
        );
        assert_eq!(
            parse_sentence(b"GPRMC,123519,A"),
            Err(SentenceError::NoMarker)
        );
        assert_eq!(parse_sentence(b"$GP"), Err(SentenceError::Unsupported));
        assert_eq!(parse_sentence(b""), Err(SentenceError::NoMarker));
    }

    #[test]
    fn test_coordinate_conversion() {
        let lat = parse_coordinate(b"4807.038", b"N", b'N', b'S').unwrap();
        assert!(approx(lat, 48.1173));

        let lon = parse_coordinate(b"01131.000", b"E", b'E', b'W').unwrap();
        assert!(approx(lon, 11.5167));

        let lat = parse_coordinate(b"4807.038", b"S", b'N', b'S').unwrap();
        assert!(approx(lat, -48.1173));

        let lon = parse_coordinate(b"01131.000", b"W", b'E', b'W').unwrap();
        assert!(approx(lon, -11.5167));
    }

    #[test]
    fn test_coordinate_rejects_garbage() {
        assert!(parse_coordinate(b"", b"N", b'N', b'S').is_err());
        assert!(parse_coordinate(b"07.5", b"N", b'N', b'S').is_err());
        assert!(parse_coordinate(b"4807.038", b"", b'N', b'S').is_err());
        assert!(parse_coordinate(b"4875.000", b"N", b'N', b'S').is_err());
        assert!(parse_coordinate(b"+807.038", b"N", b'N', b'S').is_err());
    }

    #[test]
    fn test_multibyte_noise_in_coordinate_is_malformed() {
        assert!(parse_coordinate("1\u{20ac}.5".as_bytes(), b"N", b'N', b'S').is_err());
        assert!(parse_coordinate(b"48\xe2\x82.5", b"N", b'N', b'S').is_err());

        let line = "$GPRMC,123519,A,1\u{20ac}.5,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
        assert_eq!(
            parse_sentence(line.as_bytes()),
            Err(SentenceError::Malformed)
        );
    }

    #[test]
    fn test_time_with_fraction() {
        let t = parse_time(b"235959.00").unwrap();
        assert_eq!(t, UtcTime { hour: 23, minute: 59, second: 59 });
        assert!(parse_time(b"2359").is_err());
        assert!(parse_time(b"246000").is_err());
    }

    #[test]
    fn test_date_century() {
        let d = parse_date(b"010125").unwrap();
        assert_eq!(d, UtcDate { day: 1, month: 1, year: 2025 });
        assert!(parse_date(b"321325").is_err());
        assert!(parse_date(b"0101").is_err());
    }

    #[test]
    fn test_empty_speed_is_zero() {
        assert_eq!(parse_speed(b""), Ok(0.0));
        assert!(parse_speed(b"fast").is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn with_prefix(prefix: &[u8], tail: &[u8]) -> std::vec::Vec<u8> {
            let mut line = prefix.to_vec();
            line.extend_from_slice(tail);
            line
        }

        proptest! {
            #[test]
            fn arbitrary_rmc_body_never_panics(tail in proptest::collection::vec(any::<u8>(), 0..120)) {
                let _ = parse_sentence(&with_prefix(b"$GPRMC,", &tail));
            }

            #[test]
            fn arbitrary_gga_body_never_panics(tail in proptest::collection::vec(any::<u8>(), 0..120)) {
                let _ = parse_sentence(&with_prefix(b"$GPGGA,", &tail));
            }

            #[test]
            fn valid_marker_with_noisy_coordinate_never_panics(
                coord in proptest::collection::vec(any::<u8>(), 0..16),
            ) {
                let mut line = b"$GPRMC,123519,A,".to_vec();
                line.extend_from_slice(&coord);
                line.extend_from_slice(b",N,01131.000,E,022.4,084.4,230394,003.1,W");
                let _ = parse_sentence(&line);
                let _ = parse_coordinate(&coord, b"N", b'N', b'S');
            }
        }
    }
}
