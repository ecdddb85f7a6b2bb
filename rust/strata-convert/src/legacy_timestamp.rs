//! Decoding of the legacy 12-byte (INT96) timestamp encoding.
//!
//! The value is laid out little-endian as 8 bytes of nanoseconds within the
//! day followed by 4 bytes of Julian day number.

use std::io::Cursor;

use byteorder::{LE, ReadBytesExt};
use strata_common::{Result, error::Error};

/// Size in bytes of an encoded legacy timestamp.
pub const LEGACY_TIMESTAMP_SIZE: usize = 12;

/// Julian day number of 1970-01-01.
pub const JULIAN_DAY_OF_EPOCH: i64 = 2_440_588;

const SECONDS_PER_DAY: i64 = 86_400;
const MICROS_PER_SECOND: i64 = 1_000_000;
const NANOS_PER_MICRO: i64 = 1_000;

/// Decodes a legacy timestamp into microseconds since the Unix epoch.
///
/// Sub-microsecond precision is truncated toward zero.
///
/// # Errors
///
/// Returns an `InvalidFormat` error if `bytes` is not exactly 12 bytes long.
pub fn decode_micros(bytes: &[u8]) -> Result<i64> {
    if bytes.len() != LEGACY_TIMESTAMP_SIZE {
        return Err(Error::invalid_data(
            "legacy timestamp",
            format!(
                "expected {LEGACY_TIMESTAMP_SIZE} bytes, found {}",
                bytes.len()
            ),
        ));
    }
    let mut reader = Cursor::new(bytes);
    let nanos_of_day = reader
        .read_i64::<LE>()
        .map_err(|e| Error::invalid_data("legacy timestamp", e.to_string()))?;
    let julian_day = reader
        .read_i32::<LE>()
        .map_err(|e| Error::invalid_data("legacy timestamp", e.to_string()))?;
    Ok(julian_to_micros(julian_day, nanos_of_day))
}

/// Combines a Julian day number and the nanoseconds within that day into
/// microseconds since the Unix epoch.
///
/// Results beyond the `i64` range saturate at `i64::MIN` / `i64::MAX`.
pub fn julian_to_micros(julian_day: i32, nanos_of_day: i64) -> i64 {
    // Widened so only the final sum is clamped.
    let days = julian_day as i128 - JULIAN_DAY_OF_EPOCH as i128;
    let micros = days * (SECONDS_PER_DAY * MICROS_PER_SECOND) as i128
        + (nanos_of_day / NANOS_PER_MICRO) as i128;
    micros.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Encodes microseconds since the Unix epoch in the legacy layout.
///
/// Inverse of [`decode_micros`]. Every `i64` input is representable: the
/// extremes fall within about 107 million days of the epoch, far inside the
/// `i32` Julian day range.
pub fn encode_micros(micros: i64) -> [u8; LEGACY_TIMESTAMP_SIZE] {
    let micros_per_day = SECONDS_PER_DAY * MICROS_PER_SECOND;
    let days = micros.div_euclid(micros_per_day);
    let nanos_of_day = micros.rem_euclid(micros_per_day) * NANOS_PER_MICRO;
    let julian_day = (days + JULIAN_DAY_OF_EPOCH) as i32;

    let mut bytes = [0u8; LEGACY_TIMESTAMP_SIZE];
    bytes[..8].copy_from_slice(&nanos_of_day.to_le_bytes());
    bytes[8..].copy_from_slice(&julian_day.to_le_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(nanos_of_day: i64, julian_day: i32) -> Vec<u8> {
        let mut bytes = nanos_of_day.to_le_bytes().to_vec();
        bytes.extend_from_slice(&julian_day.to_le_bytes());
        bytes
    }

    #[test]
    fn test_epoch() {
        assert_eq!(decode_micros(&encode(0, 2_440_588)).unwrap(), 0);
    }

    #[test]
    fn test_day_after_epoch() {
        assert_eq!(
            decode_micros(&encode(1_000_000, 2_440_589)).unwrap(),
            86_400_001_000
        );
    }

    #[test]
    fn test_before_epoch() {
        assert_eq!(
            decode_micros(&encode(0, 2_440_587)).unwrap(),
            -86_400_000_000
        );
    }

    #[test]
    fn test_truncates_sub_micros() {
        assert_eq!(decode_micros(&encode(1_999, 2_440_588)).unwrap(), 1);
    }

    #[test]
    fn test_wrong_size() {
        assert!(decode_micros(&[0u8; 11]).is_err());
        assert!(decode_micros(&[0u8; 13]).is_err());
        assert!(decode_micros(&[]).is_err());
    }

    #[test]
    fn test_encode_inverts_decode() {
        for micros in [0, 1, 86_400_001_000, -86_400_000_000, -1, 1_700_000_000_123_456] {
            assert_eq!(decode_micros(&encode_micros(micros)).unwrap(), micros);
        }
    }

    #[test]
    fn test_extreme_julian_days_saturate() {
        assert_eq!(decode_micros(&encode(0, i32::MAX)).unwrap(), i64::MAX);
        assert_eq!(decode_micros(&encode(0, i32::MIN)).unwrap(), i64::MIN);
        assert_eq!(
            decode_micros(&encode(86_399_999_999_999, i32::MAX)).unwrap(),
            i64::MAX
        );
        assert_eq!(julian_to_micros(i32::MIN, -1_000), i64::MIN);
    }

    #[test]
    fn test_encode_full_range() {
        for micros in [i64::MIN, i64::MIN + 1, i64::MAX - 1, i64::MAX] {
            assert_eq!(decode_micros(&encode_micros(micros)).unwrap(), micros);
        }
        let julian_day = i32::from_le_bytes(encode_micros(i64::MIN)[8..].try_into().unwrap());
        assert_eq!(julian_day, 2_440_588 - 106_751_992);
    }
}
