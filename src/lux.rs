//! Conversion of the raw photodiode counts into an illuminance value.
//!
//! The piecewise polynomial and its coefficients are the empirical
//! calibration from the datasheet, with the segment selected by the
//! infrared-to-broadband ratio.

use crate::{Gain, IntegrationTime};

/// Approximates illuminance in lux from one reading of both channels.
///
/// Returns `None` when no meaningful value exists: the broadband count is
/// zero, either channel is past the clip threshold for the configured
/// integration time, or the timing is [`IntegrationTime::Manual`], which
/// has no calibration entries.  A computed value is returned as-is, never
/// clamped.
#[must_use]
pub fn compute(
    broadband: u16,
    infrared: u16,
    gain: Gain,
    integration_time: IntegrationTime,
) -> Option<f64> {
    let threshold = integration_time.clip_threshold()?;
    let time_scale = integration_time.scale()?;
    if broadband == 0 || broadband > threshold || infrared > threshold {
        return None;
    }

    let channel0 = f64::from(broadband);
    let channel1 = f64::from(infrared);
    let ratio = channel1 / channel0;

    let lux = if ratio <= 0.50 {
        0.0304 * channel0 - 0.062 * channel0 * libm::pow(ratio, 1.4)
    } else if ratio <= 0.61 {
        0.0224 * channel0 - 0.031 * channel1
    } else if ratio <= 0.80 {
        0.0128 * channel0 - 0.0153 * channel1
    } else if ratio <= 1.30 {
        0.00146 * channel0 - 0.00112 * channel1
    } else {
        0.0
    };

    Some(lux * gain.scale() * time_scale)
}

#[cfg(test)]
mod test {
    use super::compute;
    use crate::{Gain, IntegrationTime};

    #[test]
    pub fn ratio_below_half() {
        let lux = compute(100, 30, Gain::High, IntegrationTime::Ms101).unwrap();
        let expected =
            (0.0304 * 100.0 - 0.062 * 100.0 * libm::pow(0.3, 1.4)) * 1.0 * (1.0 / 0.252);
        assert!((lux - expected).abs() < 1e-12);
        // worked out by hand: roughly 7.5 lux
        assert!((lux - 7.504).abs() < 0.001);
    }

    #[test]
    pub fn ratio_exactly_half_uses_first_segment() {
        let lux = compute(100, 50, Gain::High, IntegrationTime::Ms402).unwrap();
        let expected = 0.0304 * 100.0 - 0.062 * 100.0 * libm::pow(0.5, 1.4);
        assert!((lux - expected).abs() < 1e-12);
    }

    #[test]
    pub fn ratio_exactly_0_61_uses_second_segment() {
        let lux = compute(100, 61, Gain::High, IntegrationTime::Ms402).unwrap();
        let expected = 0.0224 * 100.0 - 0.031 * 61.0;
        assert!((lux - expected).abs() < 1e-12);
    }

    #[test]
    pub fn ratio_exactly_0_80_uses_third_segment() {
        let lux = compute(100, 80, Gain::High, IntegrationTime::Ms402).unwrap();
        let expected = 0.0128 * 100.0 - 0.0153 * 80.0;
        assert!((lux - expected).abs() < 1e-12);
    }

    #[test]
    pub fn ratio_exactly_1_30_uses_fourth_segment() {
        let lux = compute(100, 130, Gain::High, IntegrationTime::Ms402).unwrap();
        let expected = 0.00146 * 100.0 - 0.00112 * 130.0;
        assert!((lux - expected).abs() < 1e-12);
    }

    #[test]
    pub fn ratio_above_1_30_is_zero() {
        assert_eq!(compute(100, 131, Gain::High, IntegrationTime::Ms402), Some(0.0));
        assert_eq!(compute(100, 65000, Gain::High, IntegrationTime::Ms402), Some(0.0));
    }

    #[test]
    pub fn zero_broadband_is_invalid() {
        assert_eq!(compute(0, 0, Gain::High, IntegrationTime::Ms402), None);
        assert_eq!(compute(0, 100, Gain::Low, IntegrationTime::Ms13_7), None);
    }

    #[test]
    pub fn clipped_channel_is_invalid() {
        assert_eq!(compute(5000, 30, Gain::High, IntegrationTime::Ms13_7), None);
        assert_eq!(compute(100, 37001, Gain::High, IntegrationTime::Ms101), None);
        assert_eq!(compute(65001, 30, Gain::High, IntegrationTime::Ms402), None);
    }

    #[test]
    pub fn clip_threshold_itself_is_still_valid() {
        assert!(compute(4900, 0, Gain::High, IntegrationTime::Ms13_7).is_some());
    }

    #[test]
    pub fn manual_timing_is_invalid() {
        assert_eq!(compute(100, 30, Gain::High, IntegrationTime::Manual), None);
    }

    #[test]
    pub fn low_gain_counts_are_scaled_up() {
        let low = compute(100, 30, Gain::Low, IntegrationTime::Ms402).unwrap();
        let high = compute(100, 30, Gain::High, IntegrationTime::Ms402).unwrap();
        assert!((low - high * 16.0).abs() < 1e-12);
    }

    #[test]
    pub fn deterministic() {
        assert_eq!(
            compute(1234, 567, Gain::Low, IntegrationTime::Ms101),
            compute(1234, 567, Gain::Low, IntegrationTime::Ms101)
        );
    }
}
