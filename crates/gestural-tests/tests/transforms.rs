//! Global transform tests.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gestural-tests --test transforms
//! ```

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use gestural_score::{st_to_hz, validate_score, Channel, GesturalScore};
use gestural_tests::fixtures::{demo_score, f0_score};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

// ============================================================================
// F0 statistics
// ============================================================================

#[test]
fn test_f0_statistic_units_agree() {
    let score = f0_score(&[72.0, 84.0, 96.0]);
    let stat = score.f0_statistic();

    assert!(close(stat.mean_st, 84.0));
    assert!(close(stat.sd_st, (96.0f64).sqrt()));

    let hz = [st_to_hz(72.0), st_to_hz(84.0), st_to_hz(96.0)];
    let mean_hz = hz.iter().sum::<f64>() / 3.0;
    assert!(close(stat.mean_hz, mean_hz));
}

#[test]
fn test_f0_statistic_ignores_neutral_gestures() {
    let mut score = f0_score(&[80.0, 90.0, 40.0]);
    score.sequence_mut(Channel::F0).set_neutral(2, true);
    let stat = score.f0_statistic();
    assert!(close(stat.mean_st, 85.0));
    assert!(close(stat.sd_st, 5.0));
}

#[test]
fn test_f0_statistic_of_empty_score() {
    let stat = GesturalScore::default().f0_statistic();
    assert_eq!(stat.mean_st, 0.0);
    assert_eq!(stat.sd_hz, 0.0);
}

proptest! {
    /// An octave offset doubles the Hertz statistics and leaves the spread in semitones.
    #[test]
    fn octave_offset_doubles_hz_statistics(
        targets in prop::collection::vec(20.0..90.0f64, 1..10)
    ) {
        let mut score = f0_score(&targets);
        let before = score.f0_statistic();
        score.change_f0_offset(12.0);
        let after = score.f0_statistic();

        prop_assert!(close(after.mean_st, before.mean_st + 12.0));
        prop_assert!(close(after.sd_st, before.sd_st));
        prop_assert!(close(after.mean_hz, 2.0 * before.mean_hz));
        prop_assert!(close(after.sd_hz, 2.0 * before.sd_hz));
    }

    /// Scaling the range scales the spread and keeps the mean.
    #[test]
    fn range_factor_scales_spread(
        targets in prop::collection::vec(70.0..90.0f64, 1..10),
        factor in 0.0..2.0f64
    ) {
        let mut score = f0_score(&targets);
        let before = score.f0_statistic();
        score.change_f0_range(factor);
        let after = score.f0_statistic();

        prop_assert!(close(after.mean_st, before.mean_st));
        prop_assert!((after.sd_st - factor * before.sd_st).abs() < 1e-9);
    }
}

// ============================================================================
// Time transforms
// ============================================================================

#[test]
fn test_change_duration_scales_begin_and_end_times() {
    let mut score = demo_score();
    let before = score.clone();
    score.change_duration(1.5);

    assert!(close(score.duration_s(), 1.5 * before.duration_s()));
    for channel in Channel::ALL {
        let old = before.sequence(channel);
        let new = score.sequence(channel);
        assert_eq!(old.len(), new.len());
        for i in 0..old.len() {
            assert!(close(new.begin_s(i), 1.5 * old.begin_s(i)));
            assert!(close(new.end_s(i), 1.5 * old.end_s(i)));
        }
    }
}

#[test]
fn test_invalid_duration_factors_are_ignored() {
    let mut score = demo_score();
    for factor in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-12] {
        score.change_duration(factor);
        assert_eq!(score, demo_score(), "factor {} changed the score", factor);
    }
}

#[test]
fn test_time_constants_skip_f0() {
    let mut score = demo_score();
    score.change_time_constants(2.0);

    assert_eq!(
        score.sequence(Channel::Velic).gesture(0).unwrap().tau_s,
        0.024
    );
    assert_eq!(score.sequence(Channel::F0).gesture(0).unwrap().tau_s, 0.020);

    // Results are clamped to the channel bounds.
    score.change_time_constants(100.0);
    assert_eq!(
        score.sequence(Channel::LungPressure).gesture(0).unwrap().tau_s,
        0.05
    );
}

// ============================================================================
// Value transforms
// ============================================================================

#[test]
fn test_pressure_factor_is_clamped() {
    let mut score = demo_score();
    score.change_subglottal_pressure(0.5);
    assert_eq!(
        score.sequence(Channel::LungPressure).gesture(1).unwrap().value,
        4000.0
    );

    score.change_subglottal_pressure(10.0);
    assert_eq!(
        score.sequence(Channel::LungPressure).gesture(1).unwrap().value,
        20_000.0
    );
}

#[test]
fn test_f0_slope_summand() {
    let mut score = demo_score();
    score.change_f0_target_slope(5.0);
    let slopes: Vec<f64> = score.sequence(Channel::F0).iter().map(|g| g.slope).collect();
    assert_eq!(slopes, vec![5.0, -5.0]);
}

#[test]
fn test_substitute_glottal_shapes() {
    let mut score = demo_score();
    assert_eq!(score.substitute_glottal_shapes("modal", "breathy"), 1);
    assert_eq!(score.substitute_glottal_shapes("modal", "breathy"), 0);
    assert_eq!(
        score
            .sequence(Channel::GlottalShape)
            .gesture(0)
            .unwrap()
            .nominal,
        "breathy"
    );
}

#[test]
fn test_transforms_keep_score_valid() {
    let mut score = demo_score();
    score.change_f0_offset(40.0);
    score.change_f0_range(3.0);
    score.change_f0_target_slope(-200.0);
    score.change_subglottal_pressure(-1.0);
    score.change_time_constants(0.01);
    score.change_duration(0.25);

    let result = validate_score(&score);
    assert!(result.is_ok(), "{:?}", result.errors);
}
