//! Register decoding for the EVlink Pro AC register layout.
//!
//! The device stores multi-register values with big-endian bytes inside
//! each 16-bit register but little-endian word order across registers:
//! the first register holds the least-significant 16 bits. Getting this
//! wrong produces plausible-looking wrong numbers, so the functions here
//! are covered by known bit-pattern tests.

/// Decode two registers into an IEEE-754 single-precision float.
///
/// `words[0]` is the low half-word, `words[1]` the high half-word.
pub fn decode_float32(words: [u16; 2]) -> f32 {
    let bits = ((words[1] as u32) << 16) | (words[0] as u32);
    f32::from_bits(bits)
}

/// Decode four registers into an unsigned 64-bit integer.
///
/// `words[0]` is the least-significant word, `words[3]` the most-significant.
pub fn decode_uint64(words: [u16; 4]) -> u64 {
    (words[0] as u64)
        | ((words[1] as u64) << 16)
        | ((words[2] as u64) << 32)
        | ((words[3] as u64) << 48)
}

/// Decode a single register as its raw unsigned value.
pub fn decode_uint16(words: [u16; 1]) -> u16 {
    words[0]
}

/// Round to a fixed number of decimal places, ties to even.
///
/// Cosmetic rounding applied after scaling; display output depends on it.
/// Ties round to the even neighbor, matching the reference output.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_float32_word_swapped() {
        // 1000.0 as f32 is 0x447A0000; low word first on the wire.
        assert_eq!(decode_float32([0x0000, 0x447A]), 1000.0);

        // 10.0 as f32 is 0x41200000.
        assert_eq!(decode_float32([0x0000, 0x4120]), 10.0);

        // 123.456 as f32 is 0x42F6E979.
        let value = decode_float32([0xE979, 0x42F6]);
        assert!((value - 123.456).abs() < 0.001);
    }

    #[test]
    fn test_decode_float32_zero_and_negative() {
        assert_eq!(decode_float32([0x0000, 0x0000]), 0.0);
        // -2.5 as f32 is 0xC0200000.
        assert_eq!(decode_float32([0x0000, 0xC020]), -2.5);
    }

    #[test]
    fn test_decode_uint64_word_swapped() {
        assert_eq!(decode_uint64([0x0001, 0x0000, 0x0000, 0x0000]), 1);
        assert_eq!(decode_uint64([0x0000, 0x0001, 0x0000, 0x0000]), 0x1_0000);

        // All four words populated: 0x0123_4567_89AB_CDEF.
        assert_eq!(
            decode_uint64([0xCDEF, 0x89AB, 0x4567, 0x0123]),
            0x0123_4567_89AB_CDEF
        );
    }

    #[test]
    fn test_decode_uint16_identity() {
        assert_eq!(decode_uint16([0]), 0);
        assert_eq!(decode_uint16([4711]), 4711);
        assert_eq!(decode_uint16([0xFFFF]), 0xFFFF);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(123.456, 2), 123.46);
        assert_eq!(round_to(229.94, 1), 229.9);
        assert_eq!(round_to(10000.0, 2), 10000.0);
    }

    #[test]
    fn test_round_to_ties_even() {
        // Exactly representable ties go to the even neighbor.
        assert_eq!(round_to(1.25, 1), 1.2);
        assert_eq!(round_to(1.75, 1), 1.8);
        assert_eq!(round_to(0.125, 2), 0.12);
    }
}
