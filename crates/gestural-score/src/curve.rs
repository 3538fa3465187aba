//! Dense control curves generated from a gestural score.
//!
//! Each channel is sampled at `t_k = k / fs` for `k = 0..=round(T * fs)`,
//! where `T` is the longest sequence duration. Within a gesture the curve
//! relaxes towards the gesture target with a first-order lag:
//!
//! ```text
//! v[k] = target + (v[k-1] - target) * exp(-dt / tau)
//! ```
//!
//! A non-positive time constant turns the lag into a step. Nominal channels
//! produce an activation curve (1 while a named, non-neutral gesture is
//! active, 0 otherwise) and a label track with the active names.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::channel::{Channel, ChannelMap};
use crate::error::{ScoreError, ScoreResult};
use crate::gesture::Gesture;
use crate::glottis::GlottisModel;
use crate::sequence::GestureSequence;

/// Sample rate used when an invalid rate is requested.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 44_100.0;

/// Most samples a single curve may hold.
pub const MAX_CURVE_SAMPLES: usize = 1 << 24;

/// First-order lag that follows a piecewise target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFollower {
    value: f64,
    dt: f64,
}

impl TargetFollower {
    /// Creates a follower starting at `initial`.
    pub fn new(initial: f64, sample_rate_hz: f64) -> Self {
        Self {
            value: initial,
            dt: 1.0 / sample_rate_hz,
        }
    }

    /// Returns the current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advances by one sample towards `target` and returns the new value.
    pub fn next_sample(&mut self, target: f64, tau_s: f64) -> f64 {
        if tau_s <= 0.0 {
            self.value = target;
        } else {
            let decay = (-self.dt / tau_s).exp();
            self.value = target + (self.value - target) * decay;
        }
        self.value
    }
}

/// One uniformly sampled curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeFunction {
    samples: Vec<f64>,
    sample_rate_hz: f64,
}

impl TimeFunction {
    pub fn new(samples: Vec<f64>, sample_rate_hz: f64) -> Self {
        Self {
            samples,
            sample_rate_hz,
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Value at an arbitrary time, linearly interpolated.
    ///
    /// Times before the first or after the last sample return the first or
    /// last sample. An empty curve returns 0.
    pub fn value_at(&self, time_s: f64) -> f64 {
        let (Some(&first), Some(&last)) = (self.samples.first(), self.samples.last()) else {
            return 0.0;
        };
        let pos = time_s * self.sample_rate_hz;
        if pos.is_nan() || pos <= 0.0 {
            return first;
        }
        let max_index = (self.samples.len() - 1) as f64;
        if pos >= max_index {
            return last;
        }
        let i = pos.floor() as usize;
        let frac = pos - i as f64;
        self.samples[i] + (self.samples[i + 1] - self.samples[i]) * frac
    }
}

/// A named span on a nominal channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSegment {
    pub start_s: f64,
    pub end_s: f64,
    pub name: String,
}

/// The dense, synchronized curves of a whole score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCurves {
    /// Sample rate shared by all curves.
    pub sample_rate_hz: f64,
    /// Duration covered by the curves.
    pub duration_s: f64,
    /// One curve per channel, all of the same length.
    pub curves: ChannelMap<TimeFunction>,
    /// Active shape names of the nominal channels. Empty for continuous channels.
    pub labels: ChannelMap<Vec<LabelSegment>>,
    /// The glottis model that interprets the phonatory channels.
    pub glottis: GlottisModel,
}

impl ScoreCurves {
    /// Samples every sequence at `sample_rate_hz`.
    ///
    /// Fails with [`ScoreError::CurveTooLong`] if a curve would need more
    /// than [`MAX_CURVE_SAMPLES`] samples.
    pub fn generate(
        sequences: &ChannelMap<GestureSequence>,
        glottis: &GlottisModel,
        sample_rate_hz: f64,
    ) -> ScoreResult<Self> {
        let sample_rate_hz = if sample_rate_hz.is_finite() && sample_rate_hz > 0.0 {
            sample_rate_hz
        } else {
            warn!(
                requested = sample_rate_hz,
                fallback = DEFAULT_SAMPLE_RATE_HZ,
                "invalid sample rate, using default"
            );
            DEFAULT_SAMPLE_RATE_HZ
        };

        let duration_s = sequences
            .iter()
            .map(|(_, seq)| seq.duration_s())
            .fold(0.0, f64::max);
        let num_samples = sample_count(duration_s, sample_rate_hz).ok_or(
            ScoreError::CurveTooLong {
                duration_s,
                sample_rate_hz,
                max_samples: MAX_CURVE_SAMPLES,
            },
        )?;

        let curves = sequences.map(|_, seq| sample_sequence(seq, num_samples, sample_rate_hz));
        let labels = sequences.map(|_, seq| label_track(seq));

        debug!(
            sample_rate_hz,
            duration_s, num_samples, "generated score curves"
        );

        Ok(Self {
            sample_rate_hz,
            duration_s,
            curves,
            labels,
            glottis: glottis.clone(),
        })
    }

    /// Number of samples per curve.
    pub fn num_samples(&self) -> usize {
        self.curves.f0.len()
    }

    pub fn curve(&self, channel: Channel) -> &TimeFunction {
        self.curves.get(channel)
    }

    pub fn labels(&self, channel: Channel) -> &[LabelSegment] {
        self.labels.get(channel)
    }

    /// Interpolated value of a channel at `time_s`.
    pub fn value_at(&self, channel: Channel, time_s: f64) -> f64 {
        self.curves.get(channel).value_at(time_s)
    }

    /// Name active on a nominal channel at `time_s`.
    pub fn label_at(&self, channel: Channel, time_s: f64) -> Option<&str> {
        self.labels
            .get(channel)
            .iter()
            .find(|seg| time_s >= seg.start_s && time_s < seg.end_s)
            .map(|seg| seg.name.as_str())
    }
}

/// Number of samples covering `[0, duration_s]`, if it fits in a curve.
fn sample_count(duration_s: f64, sample_rate_hz: f64) -> Option<usize> {
    let last = (duration_s * sample_rate_hz).round();
    if !(last.is_finite() && last >= 0.0 && last < MAX_CURVE_SAMPLES as f64) {
        return None;
    }
    (last as usize).checked_add(1)
}

/// Target of a gesture at `time_s`, given that it begins at `begin_s`.
fn gesture_target(seq: &GestureSequence, gesture: &Gesture, begin_s: f64, time_s: f64) -> f64 {
    let bounds = seq.bounds();
    if bounds.nominal_values {
        return if !gesture.neutral && !gesture.nominal.is_empty() {
            1.0
        } else {
            0.0
        };
    }
    if gesture.neutral {
        return bounds.neutral_value;
    }
    let target = gesture.value + gesture.slope * (time_s - begin_s);
    target.clamp(bounds.min_value, bounds.max_value)
}

fn sample_sequence(seq: &GestureSequence, num_samples: usize, sample_rate_hz: f64) -> TimeFunction {
    let bounds = seq.bounds();
    let gestures = seq.gestures();

    let initial = gestures
        .first()
        .map(|g| gesture_target(seq, g, 0.0, 0.0))
        .unwrap_or(bounds.neutral_value);
    let mut follower = TargetFollower::new(initial, sample_rate_hz);

    let mut samples = Vec::with_capacity(num_samples);
    samples.push(initial);

    // The last gesture also owns the sample on its end time.
    let end_tolerance_s = 0.5 / sample_rate_hz;
    let mut index = 0;
    let mut begin_s = 0.0;
    let mut end_s = gestures.first().map_or(0.0, |g| g.duration_s);

    for k in 1..num_samples {
        let t = k as f64 / sample_rate_hz;
        while index + 1 < gestures.len() && t >= end_s {
            index += 1;
            begin_s = end_s;
            end_s += gestures[index].duration_s;
        }

        let (target, tau_s) = match gestures.get(index) {
            Some(g) if t - end_s < end_tolerance_s => (gesture_target(seq, g, begin_s, t), g.tau_s),
            _ => (bounds.neutral_value, bounds.default_tau_s),
        };
        samples.push(follower.next_sample(target, tau_s));
    }

    TimeFunction::new(samples, sample_rate_hz)
}

fn label_track(seq: &GestureSequence) -> Vec<LabelSegment> {
    if !seq.bounds().nominal_values {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut begin_s = 0.0;
    for gesture in seq.iter() {
        let end_s = begin_s + gesture.duration_s;
        if !gesture.neutral && !gesture.nominal.is_empty() {
            segments.push(LabelSegment {
                start_s: begin_s,
                end_s,
                name: gesture.nominal.clone(),
            });
        }
        begin_s = end_s;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(channel: Channel, gestures: Vec<Gesture>) -> ChannelMap<GestureSequence> {
        let mut map = ChannelMap::from_fn(GestureSequence::new);
        for g in gestures {
            assert!(map.get_mut(channel).append(g));
        }
        map
    }

    #[test]
    fn test_follower_exponential_law() {
        let fs = 1000.0;
        let tau = 0.01;
        let mut f = TargetFollower::new(0.0, fs);
        for k in 1..=50 {
            let v = f.next_sample(1.0, tau);
            let expected = 1.0 - (-(k as f64) / fs / tau).exp();
            assert!((v - expected).abs() < 1e-12, "k={} v={} expected={}", k, v, expected);
        }
    }

    #[test]
    fn test_follower_step() {
        let mut f = TargetFollower::new(3.0, 100.0);
        assert_eq!(f.next_sample(7.0, 0.0), 7.0);
        assert_eq!(f.value(), 7.0);
    }

    #[test]
    fn test_sample_count_and_alignment() {
        let mut map = single(Channel::F0, vec![Gesture::continuous(0.1, 90.0, 0.02)]);
        map.velic.append(Gesture::continuous(0.05, 0.5, 0.012));
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 1000.0).unwrap();
        assert_eq!(curves.num_samples(), 101);
        for (_, curve) in curves.curves.iter() {
            assert_eq!(curve.len(), 101);
        }
        // Empty channels sit at their neutral value.
        assert_eq!(curves.curve(Channel::LungPressure).samples()[50], 0.0);
    }

    #[test]
    fn test_empty_score_has_one_sample() {
        let map = ChannelMap::from_fn(GestureSequence::new);
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 44_100.0).unwrap();
        assert_eq!(curves.num_samples(), 1);
        assert_eq!(curves.curve(Channel::F0).samples(), &[84.0]);
    }

    #[test]
    fn test_curve_relaxes_towards_next_target() {
        let map = single(
            Channel::LungPressure,
            vec![
                Gesture::continuous(0.05, 0.0, 0.005),
                Gesture::continuous(0.2, 8000.0, 0.005),
            ],
        );
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 1000.0).unwrap();
        let samples = curves.curve(Channel::LungPressure).samples();
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[49], 0.0);
        // One sample into the second gesture.
        let expected = 8000.0 * (1.0 - (-0.001_f64 / 0.005).exp());
        assert!((samples[50] - expected).abs() < 1e-9);
        assert!((samples[250] - 8000.0).abs() < 1.0);
    }

    #[test]
    fn test_shorter_sequence_returns_to_neutral() {
        let mut map = single(Channel::LungPressure, vec![Gesture::continuous(0.1, 8000.0, 0.005)]);
        map.f0.append(Gesture::continuous(0.5, 90.0, 0.02));
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 1000.0).unwrap();
        assert!((curves.value_at(Channel::LungPressure, 0.1) - 8000.0).abs() < 1.0);
        assert!(curves.value_at(Channel::LungPressure, 0.4) < 1.0);
    }

    #[test]
    fn test_neutral_gesture_uses_neutral_value() {
        let map = single(Channel::F0, vec![Gesture::neutral(0.1, 0.02)]);
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 1000.0).unwrap();
        assert!(curves
            .curve(Channel::F0)
            .samples()
            .iter()
            .all(|v| (*v - 84.0).abs() < 1e-12));
    }

    #[test]
    fn test_slope_drives_target() {
        let map = single(
            Channel::F0,
            vec![Gesture::continuous(1.0, 80.0, 0.004).with_slope(10.0)],
        );
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 1000.0).unwrap();
        // With a fast lag the curve trails the ramp by about slope * tau.
        let v = curves.value_at(Channel::F0, 0.5);
        assert!((v - (85.0 - 10.0 * 0.004)).abs() < 0.01, "v={}", v);
    }

    #[test]
    fn test_nominal_activation_and_labels() {
        let map = single(
            Channel::Vowel,
            vec![
                Gesture::neutral(0.1, 0.004),
                Gesture::named(0.1, "a", 0.004),
            ],
        );
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 1000.0).unwrap();
        assert_eq!(curves.value_at(Channel::Vowel, 0.05), 0.0);
        assert!(curves.value_at(Channel::Vowel, 0.19) > 0.99);
        assert_eq!(curves.label_at(Channel::Vowel, 0.15), Some("a"));
        assert_eq!(curves.label_at(Channel::Vowel, 0.05), None);
        assert!(curves.labels(Channel::F0).is_empty());
    }

    #[test]
    fn test_value_at_interpolates_and_clamps() {
        let tf = TimeFunction::new(vec![0.0, 10.0, 20.0], 10.0);
        assert_eq!(tf.value_at(-1.0), 0.0);
        assert!((tf.value_at(0.05) - 5.0).abs() < 1e-12);
        assert!((tf.value_at(0.15) - 15.0).abs() < 1e-12);
        assert_eq!(tf.value_at(5.0), 20.0);
        assert_eq!(TimeFunction::new(Vec::new(), 10.0).value_at(0.0), 0.0);
    }

    #[test]
    fn test_invalid_sample_rate_falls_back() {
        let map = single(Channel::F0, vec![Gesture::continuous(0.01, 90.0, 0.02)]);
        let curves = ScoreCurves::generate(&map, &GlottisModel::default(), 0.0).unwrap();
        assert_eq!(curves.sample_rate_hz, DEFAULT_SAMPLE_RATE_HZ);
    }

    #[test]
    fn test_oversized_curves_are_refused() {
        let map = single(Channel::F0, vec![Gesture::continuous(10.0, 90.0, 0.02)]);
        for rate in [1e7, 1e12, f64::MAX] {
            match ScoreCurves::generate(&map, &GlottisModel::default(), rate) {
                Err(ScoreError::CurveTooLong { max_samples, .. }) => {
                    assert_eq!(max_samples, MAX_CURVE_SAMPLES)
                }
                other => panic!("rate {}: expected CurveTooLong, got {:?}", rate, other.is_ok()),
            }
        }
        assert_eq!(sample_count(1.0, 1000.0), Some(1001));
        assert_eq!(sample_count(f64::INFINITY, 1000.0), None);
    }
}
