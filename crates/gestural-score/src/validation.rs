//! Whole-score validation.
//!
//! Editing operations clamp as they go, so a score built through the API is
//! always valid. Validation exists for scores assembled by other means (direct
//! field writes, deserialized data) and for reporting in the CLI.

use crate::channel::Channel;
use crate::error::{ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode};
use crate::gesture::Gesture;
use crate::score::GesturalScore;
use crate::sequence::GestureSequence;

/// Sequences whose durations differ by more than this are reported.
pub const SEQUENCE_LENGTH_TOLERANCE_S: f64 = 0.001;

/// Validates a score and returns a validation result.
///
/// # Example
/// ```
/// use gestural_score::{GesturalScore, GlottisModel};
/// use gestural_score::validation::validate_score;
///
/// let score = GesturalScore::test_score(GlottisModel::default());
/// assert!(validate_score(&score).is_ok());
/// ```
pub fn validate_score(score: &GesturalScore) -> ValidationResult {
    let mut result = ValidationResult::default();

    for (_, sequence) in score.sequences().iter() {
        validate_sequence(sequence, &mut result);
    }
    validate_glottal_shapes(score, &mut result);
    validate_sequence_lengths(score, &mut result);

    result
}

fn validate_sequence(sequence: &GestureSequence, result: &mut ValidationResult) {
    let channel = sequence.channel();
    for (index, gesture) in sequence.iter().enumerate() {
        let path = |field: &str| format!("{}[{}].{}", channel, index, field);

        if !gesture.is_finite() {
            result.add_error(ValidationError::with_path(
                ErrorCode::NonFiniteNumber,
                "gesture contains NaN or infinite numbers",
                format!("{}[{}]", channel, index),
            ));
            continue;
        }

        if gesture.duration_s <= 0.0 {
            result.add_error(ValidationError::with_path(
                ErrorCode::NonPositiveDuration,
                format!("duration must be positive, got {}", gesture.duration_s),
                path("duration_s"),
            ));
        }

        validate_ranges(sequence, gesture, &path, result);

        if sequence.bounds().nominal_values && !gesture.neutral && gesture.nominal.is_empty() {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::EmptyNominalValue,
                "non-neutral gesture has no target name",
                path("value"),
            ));
        }
    }
}

fn validate_ranges(
    sequence: &GestureSequence,
    gesture: &Gesture,
    path: &dyn Fn(&str) -> String,
    result: &mut ValidationResult,
) {
    let b = sequence.bounds();

    if !b.nominal_values && !(b.min_value..=b.max_value).contains(&gesture.value) {
        result.add_error(ValidationError::with_path(
            ErrorCode::ValueOutOfRange,
            format!(
                "value {} outside [{}, {}]",
                gesture.value, b.min_value, b.max_value
            ),
            path("value"),
        ));
    }
    if !(b.min_slope..=b.max_slope).contains(&gesture.slope) {
        result.add_error(ValidationError::with_path(
            ErrorCode::SlopeOutOfRange,
            format!(
                "slope {} outside [{}, {}]",
                gesture.slope, b.min_slope, b.max_slope
            ),
            path("slope"),
        ));
    }
    if !(b.min_tau_s..=b.max_tau_s).contains(&gesture.tau_s) {
        result.add_error(ValidationError::with_path(
            ErrorCode::TimeConstantOutOfRange,
            format!(
                "time constant {} s outside [{}, {}]",
                gesture.tau_s, b.min_tau_s, b.max_tau_s
            ),
            path("time_constant_s"),
        ));
    }
}

fn validate_glottal_shapes(score: &GesturalScore, result: &mut ValidationResult) {
    let glottis = score.glottis();
    for (index, gesture) in score.sequence(Channel::GlottalShape).iter().enumerate() {
        if gesture.neutral || gesture.nominal.is_empty() || glottis.has_shape(&gesture.nominal) {
            continue;
        }
        result.add_warning(ValidationWarning::with_path(
            WarningCode::UnknownGlottalShape,
            format!(
                "glottal shape '{}' is not defined by the {}",
                gesture.nominal,
                glottis.name()
            ),
            format!("{}[{}].value", Channel::GlottalShape, index),
        ));
    }
}

fn validate_sequence_lengths(score: &GesturalScore, result: &mut ValidationResult) {
    let durations: Vec<(Channel, f64)> = score
        .sequences()
        .iter()
        .filter(|(_, seq)| !seq.is_empty())
        .map(|(channel, seq)| (channel, seq.duration_s()))
        .collect();
    let Some(longest) = durations.iter().map(|(_, d)| *d).reduce(f64::max) else {
        return;
    };
    for (channel, duration) in durations {
        if longest - duration > SEQUENCE_LENGTH_TOLERANCE_S {
            result.add_warning(ValidationWarning::with_path(
                WarningCode::SequenceLengthMismatch,
                format!(
                    "sequence lasts {:.3} s but the score lasts {:.3} s",
                    duration, longest
                ),
                channel.to_string(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glottis::{GlottisKind, GlottisModel};

    #[test]
    fn test_demo_score_is_valid() {
        let result = validate_score(&GesturalScore::test_score(GlottisModel::default()));
        assert!(result.is_ok(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_out_of_range_fields() {
        let mut score = GesturalScore::default();
        let f0 = score.sequence_mut(Channel::F0);
        f0.append(Gesture::continuous(0.1, 84.0, 0.02));
        let g = f0.gesture_mut(0).unwrap();
        g.value = 150.0;
        g.slope = 100.0;
        g.tau_s = 0.001;

        let result = validate_score(&score);
        assert!(!result.is_ok());
        assert!(result.has_error(ErrorCode::ValueOutOfRange));
        assert!(result.has_error(ErrorCode::SlopeOutOfRange));
        assert!(result.has_error(ErrorCode::TimeConstantOutOfRange));
        assert_eq!(
            result.errors[0].path.as_deref(),
            Some("f0-gestures[0].value")
        );
    }

    #[test]
    fn test_non_positive_and_non_finite() {
        let mut score = GesturalScore::default();
        let velic = score.sequence_mut(Channel::Velic);
        velic.append(Gesture::continuous(0.1, 0.5, 0.012));
        velic.append(Gesture::continuous(0.1, 0.5, 0.012));
        velic.gesture_mut(0).unwrap().duration_s = 0.0;
        velic.gesture_mut(1).unwrap().value = f64::NAN;

        let result = validate_score(&score);
        assert!(result.has_error(ErrorCode::NonPositiveDuration));
        assert!(result.has_error(ErrorCode::NonFiniteNumber));
    }

    #[test]
    fn test_empty_nominal_warning() {
        let mut score = GesturalScore::default();
        score
            .sequence_mut(Channel::Lip)
            .append(Gesture::named(0.1, "", 0.012));
        let result = validate_score(&score);
        assert!(result.is_ok());
        assert!(result.has_warning(WarningCode::EmptyNominalValue));
    }

    #[test]
    fn test_unknown_glottal_shape_depends_on_model() {
        let mut score = GesturalScore::new(GlottisModel::default_for(GlottisKind::Geometric));
        score
            .sequence_mut(Channel::GlottalShape)
            .append(Gesture::named(0.1, "slightly-breathy", 0.012));
        assert!(!validate_score(&score).has_warning(WarningCode::UnknownGlottalShape));

        score.set_glottis(GlottisModel::default_for(GlottisKind::TwoMass));
        assert!(validate_score(&score).has_warning(WarningCode::UnknownGlottalShape));
    }

    #[test]
    fn test_sequence_length_mismatch() {
        let mut score = GesturalScore::default();
        score
            .sequence_mut(Channel::F0)
            .append(Gesture::continuous(0.5, 84.0, 0.02));
        score
            .sequence_mut(Channel::LungPressure)
            .append(Gesture::continuous(0.4995, 8000.0, 0.005));
        assert!(!validate_score(&score).has_warning(WarningCode::SequenceLengthMismatch));

        score
            .sequence_mut(Channel::Velic)
            .append(Gesture::continuous(0.3, 0.0, 0.012));
        let result = validate_score(&score);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path.as_deref(), Some("velic-gestures"));
    }
}
