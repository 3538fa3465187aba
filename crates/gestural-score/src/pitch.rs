//! Semitone and Hertz conversion for the F0 channel.

/// Frequency corresponding to 0 semitones.
pub const F0_REFERENCE_HZ: f64 = 1.0;

/// Converts semitones relative to [`F0_REFERENCE_HZ`] into Hertz.
pub fn st_to_hz(st: f64) -> f64 {
    F0_REFERENCE_HZ * 2.0_f64.powf(st / 12.0)
}

/// Converts Hertz into semitones relative to [`F0_REFERENCE_HZ`].
///
/// Non-positive frequencies map to negative infinity.
pub fn hz_to_st(hz: f64) -> f64 {
    if hz <= 0.0 {
        return f64::NEG_INFINITY;
    }
    12.0 * (hz / F0_REFERENCE_HZ).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octave_is_twelve_semitones() {
        assert!((st_to_hz(12.0) - 2.0).abs() < 1e-12);
        assert!((hz_to_st(440.0) - hz_to_st(220.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_f0_target() {
        // 84 st above 1 Hz is 2^7 = 128 Hz.
        assert!((st_to_hz(84.0) - 128.0).abs() < 1e-9);
        assert!((hz_to_st(128.0) - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_hz() {
        assert_eq!(hz_to_st(0.0), f64::NEG_INFINITY);
    }
}
