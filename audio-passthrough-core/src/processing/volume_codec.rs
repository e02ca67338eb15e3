//! Mapping between normalized volume and device volume units.
//!
//! ```text
//! encode: s = (v == 0) ? 1 : v * 100
//!         device = ((max - min) / 2) * log10(s) + min
//! decode: n = (device - min) / ((max - min) / 2)
//!         v = round(10^n / 10) / 10
//! ```
//! Decoding keeps one decimal, so a round trip is only exact to 0.1.

use crate::models::error::PassthroughError;

const VOLUME_SCALE: f64 = 100.0;

// Absorbs log10 rounding at the range edges (v == 1.0 lands on vol_max).
const RANGE_EPSILON: f64 = 1e-6;

/// Convert a normalized volume in `[0, 1]` into device units within `[vol_min, vol_max]`.
pub fn encode_volume(volume: f32, vol_min: f32, vol_max: f32) -> Result<f32, PassthroughError> {
    if !(0.0..=1.0).contains(&volume) {
        return Err(PassthroughError::InvalidParam(format!("volume {} outside [0, 1]", volume)));
    }
    let scale = if volume == 0.0 {
        1.0
    } else {
        volume as f64 * VOLUME_SCALE
    };
    let (min, max) = (vol_min as f64, vol_max as f64);
    if min.is_nan() || max.is_nan() || max <= min {
        return Err(PassthroughError::Internal(format!("invalid volume range [{}, {}]", min, max)));
    }
    let device = ((max - min) / 2.0) * scale.log10() + min;
    if device < min - RANGE_EPSILON || device > max + RANGE_EPSILON {
        return Err(PassthroughError::Internal(format!(
            "device volume {} outside [{}, {}]",
            device, min, max
        )));
    }
    Ok(device.clamp(min, max) as f32)
}

/// Convert a device volume back into a normalized volume with one decimal.
pub fn decode_volume(device: f32, vol_min: f32, vol_max: f32) -> Result<f32, PassthroughError> {
    let (min, max) = (vol_min as f64, vol_max as f64);
    if max - min == 0.0 {
        return Err(PassthroughError::Internal("volume range is empty".into()));
    }
    let normalized = (device as f64 - min) / ((max - min) / 2.0);
    let tenths = (10f64.powf(normalized) / 10.0).round();
    Ok((tenths / 10.0) as f32)
}

/// Check a gain value against the device range.
pub fn check_gain(gain: f32, gain_min: f32, gain_max: f32) -> Result<f32, PassthroughError> {
    if gain.is_nan() || gain < 0.0 {
        return Err(PassthroughError::InvalidParam(format!("gain {} is negative", gain)));
    }
    if gain < gain_min || gain > gain_max {
        return Err(PassthroughError::InvalidParam(format!(
            "gain {} outside [{}, {}]",
            gain, gain_min, gain_max
        )));
    }
    Ok(gain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn half_volume_round_trip() {
        let device = encode_volume(0.5, 0.0, 50.0).unwrap();
        assert_abs_diff_eq!(device, 42.474, epsilon = 1e-2);

        let back = decode_volume(device, 0.0, 50.0).unwrap();
        assert_abs_diff_eq!(back, 0.5, epsilon = 0.1);
    }

    #[test]
    fn range_endpoints() {
        assert_abs_diff_eq!(encode_volume(0.0, 0.0, 50.0).unwrap(), 0.0);
        assert_abs_diff_eq!(encode_volume(1.0, 0.0, 50.0).unwrap(), 50.0, epsilon = 1e-4);
        assert_abs_diff_eq!(decode_volume(0.0, 0.0, 50.0).unwrap(), 0.0);
        assert_abs_diff_eq!(decode_volume(50.0, 0.0, 50.0).unwrap(), 1.0);
    }

    #[test]
    fn offset_range() {
        let device = encode_volume(1.0, 20.0, 120.0).unwrap();
        assert_abs_diff_eq!(device, 120.0, epsilon = 1e-3);
        assert_abs_diff_eq!(decode_volume(20.0, 20.0, 120.0).unwrap(), 0.0);
    }

    #[test]
    fn below_one_percent_underflows_range() {
        // log10(0.5) is negative, so the device value falls below vol_min.
        let err = encode_volume(0.005, 0.0, 50.0).unwrap_err();
        assert!(matches!(err, PassthroughError::Internal(_)));
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert!(matches!(encode_volume(1.5, 0.0, 50.0), Err(PassthroughError::InvalidParam(_))));
        assert!(matches!(encode_volume(-0.1, 0.0, 50.0), Err(PassthroughError::InvalidParam(_))));
        assert!(matches!(encode_volume(f32::NAN, 0.0, 50.0), Err(PassthroughError::InvalidParam(_))));
    }

    #[test]
    fn decode_guards_empty_range() {
        assert!(matches!(decode_volume(3.0, 10.0, 10.0), Err(PassthroughError::Internal(_))));
    }

    #[test]
    fn gain_bounds() {
        assert_eq!(check_gain(3.5, 0.0, 15.0), Ok(3.5));
        assert!(matches!(check_gain(-1.0, 0.0, 15.0), Err(PassthroughError::InvalidParam(_))));
        assert!(matches!(check_gain(16.0, 0.0, 15.0), Err(PassthroughError::InvalidParam(_))));
    }
}
