//! Fixed-point conversions between scene values and 16-bit table samples
//!
//! Rotations are binary angles: a full turn maps onto 0..=65535, so the
//! stored value is the two's-complement bit pattern of the signed angle.
//! Translations are scaled by a caller-supplied unit scale and stored as the
//! bit pattern of a signed 16-bit integer.

use crate::error::{AnimError, Result};

/// Binary-angle units per full turn
pub const ROTATION_UNITS_PER_TURN: f64 = 65536.0;

/// Encode an angle (radians) as a 16-bit binary angle
pub fn encode_rotation(radians: f32) -> u16 {
    let degrees = f64::from(radians).to_degrees();
    let units = (degrees / 360.0 * ROTATION_UNITS_PER_TURN).round() as i64;
    units.rem_euclid(ROTATION_UNITS_PER_TURN as i64) as u16
}

/// Decode a 16-bit binary angle to radians in `[0, 2π)`
pub fn decode_rotation(raw: u16) -> f32 {
    let degrees = f64::from(raw) * 360.0 / ROTATION_UNITS_PER_TURN;
    degrees.to_radians() as f32
}

/// Encode a scene-space distance as a 16-bit table sample
///
/// The value is multiplied by `unit_scale`, rounded, and must fit in an
/// `i16`; the stored sample is that integer's unsigned bit pattern.
pub fn encode_translation(value: f32, unit_scale: f32) -> Result<u16> {
    let scaled = (f64::from(value) * f64::from(unit_scale)).round();
    if !(f64::from(i16::MIN)..=f64::from(i16::MAX)).contains(&scaled) {
        return Err(AnimError::TranslationOutOfRange {
            value,
            scale: unit_scale,
        });
    }
    Ok(scaled as i16 as u16)
}

/// Decode a 16-bit table sample to a scene-space distance
pub fn decode_translation(raw: u16, unit_scale: f32) -> f32 {
    f32::from(raw as i16) / unit_scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    const ROTATION_STEP: f32 = TAU / 65536.0;

    #[test]
    fn test_rotation_zero() {
        assert_eq!(encode_rotation(0.0), 0);
        assert_eq!(decode_rotation(0), 0.0);
    }

    #[test]
    fn test_rotation_quarter_turns() {
        assert_eq!(encode_rotation(FRAC_PI_2), 0x4000);
        assert_eq!(encode_rotation(PI), 0x8000);
        assert_eq!(encode_rotation(-FRAC_PI_2), 0xC000);
        assert!((decode_rotation(0x4000) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_full_turn_wraps() {
        assert_eq!(encode_rotation(TAU), 0);
        assert_eq!(encode_rotation(TAU + FRAC_PI_2), 0x4000);
    }

    #[test]
    fn test_rotation_just_under_full_turn() {
        let decoded = decode_rotation(0xFFFF);
        assert!(decoded < TAU);
        assert!((TAU - decoded) <= ROTATION_STEP * 1.01);
    }

    #[test]
    fn test_rotation_roundtrip_within_one_unit() {
        for raw in [1u16, 77, 0x1234, 0x7FFF, 0x8001, 0xABCD, 0xFFFE] {
            let back = encode_rotation(decode_rotation(raw));
            let diff = (i32::from(back) - i32::from(raw)).abs();
            assert!(diff <= 1, "raw {raw:#06X} came back as {back:#06X}");
        }
    }

    #[test]
    fn test_translation_zero_any_scale() {
        for scale in [1.0, 100.0, 212.766, 0.01] {
            let raw = encode_translation(0.0, scale).unwrap();
            assert_eq!(raw, 0);
            assert_eq!(decode_translation(raw, scale), 0.0);
        }
    }

    #[test]
    fn test_translation_negative_bit_pattern() {
        assert_eq!(encode_translation(-1.0, 1.0).unwrap(), 0xFFFF);
        assert_eq!(encode_translation(-0.5, 100.0).unwrap(), (-50i16) as u16);
        assert_eq!(decode_translation(0xFFCE, 100.0), -0.5);
    }

    #[test]
    fn test_translation_roundtrip_tolerance() {
        let scale = 100.0;
        for value in [1.234f32, -3.21, 250.0, -327.0] {
            let decoded = decode_translation(encode_translation(value, scale).unwrap(), scale);
            assert!((decoded - value).abs() <= 1.0 / scale);
        }
    }

    #[test]
    fn test_translation_out_of_range() {
        assert!(encode_translation(32767.0, 1.0).is_ok());
        assert!(encode_translation(-32768.0, 1.0).is_ok());
        assert!(matches!(
            encode_translation(32768.0, 1.0),
            Err(AnimError::TranslationOutOfRange { .. })
        ));
        assert!(matches!(
            encode_translation(-400.0, 100.0),
            Err(AnimError::TranslationOutOfRange { .. })
        ));
        assert!(encode_translation(f32::NAN, 1.0).is_err());
    }
}
