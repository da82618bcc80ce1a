//! Packed decimal: tens digit in the high nibble, units in the low nibble

/// Encode a value in `0..=99`
pub const fn encode(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Decode a packed byte; the caller masks off non-digit bits first
pub const fn decode(packed: u8) -> u8 {
    (packed >> 4) * 10 + (packed & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(encode(0), 0x00);
        assert_eq!(encode(9), 0x09);
        assert_eq!(encode(10), 0x10);
        assert_eq!(encode(59), 0x59);
        assert_eq!(encode(99), 0x99);
        assert_eq!(decode(0x26), 26);
    }

    proptest! {
        #[test]
        fn round_trip(value in 0u8..=99) {
            prop_assert_eq!(decode(encode(value)), value);
        }

        #[test]
        fn nibbles_are_digits(value in 0u8..=99) {
            let packed = encode(value);
            prop_assert!(packed >> 4 <= 9);
            prop_assert!(packed & 0x0F <= 9);
        }
    }
}
