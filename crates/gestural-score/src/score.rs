//! The gestural score: one gesture sequence per channel plus a glottis model.

use std::sync::Arc;

use tracing::debug;

use crate::channel::{Channel, ChannelMap};
use crate::curve::ScoreCurves;
use crate::error::ScoreResult;
use crate::gesture::Gesture;
use crate::glottis::GlottisModel;
use crate::sequence::GestureSequence;

/// A complete gestural score.
///
/// The dense curves are a cache: any mutable access to a sequence or the
/// glottis model drops them, and [`calc_curves`](Self::calc_curves)
/// regenerates them on demand.
#[derive(Debug, Clone)]
pub struct GesturalScore {
    sequences: ChannelMap<GestureSequence>,
    glottis: GlottisModel,
    curves: Option<ScoreCurves>,
}

impl GesturalScore {
    /// Creates an empty score.
    pub fn new(glottis: GlottisModel) -> Self {
        Self {
            sequences: ChannelMap::from_fn(GestureSequence::new),
            glottis,
            curves: None,
        }
    }

    /// Creates a short demo utterance, roughly /ba:/ with a falling pitch.
    pub fn test_score(glottis: GlottisModel) -> Self {
        let mut score = Self::new(glottis);

        let vowel = score.sequence_mut(Channel::Vowel);
        vowel.append(Gesture::neutral(0.05, 0.012));
        vowel.append(Gesture::named(0.30, "a", 0.012));
        vowel.append(Gesture::named(0.30, "a", 0.012));

        let lip = score.sequence_mut(Channel::Lip);
        lip.append(Gesture::neutral(0.02, 0.012));
        lip.append(Gesture::named(0.12, "ll-labial-closure", 0.012));
        lip.append(Gesture::neutral(0.51, 0.012));

        score
            .sequence_mut(Channel::TongueTip)
            .append(Gesture::neutral(0.65, 0.012));
        score
            .sequence_mut(Channel::TongueBody)
            .append(Gesture::neutral(0.65, 0.012));
        score
            .sequence_mut(Channel::Velic)
            .append(Gesture::continuous(0.65, 0.0, 0.012));

        let glottal = score.sequence_mut(Channel::GlottalShape);
        glottal.append(Gesture::named(0.60, "modal", 0.012));
        glottal.append(Gesture::named(0.05, "open", 0.012));

        let f0 = score.sequence_mut(Channel::F0);
        f0.append(Gesture::continuous(0.30, 84.0, 0.020));
        f0.append(Gesture::continuous(0.35, 82.0, 0.020).with_slope(-10.0));

        let pressure = score.sequence_mut(Channel::LungPressure);
        pressure.append(Gesture::continuous(0.05, 0.0, 0.005));
        pressure.append(Gesture::continuous(0.55, 8000.0, 0.005));
        pressure.append(Gesture::continuous(0.05, 0.0, 0.005));

        score
    }

    /// Removes all gestures from all sequences.
    pub fn clear(&mut self) {
        self.curves = None;
        for (_, seq) in self.sequences.iter_mut() {
            seq.clear();
        }
    }

    pub fn glottis(&self) -> &GlottisModel {
        &self.glottis
    }

    pub fn set_glottis(&mut self, glottis: GlottisModel) {
        self.curves = None;
        self.glottis = glottis;
    }

    pub fn sequences(&self) -> &ChannelMap<GestureSequence> {
        &self.sequences
    }

    pub fn sequence(&self, channel: Channel) -> &GestureSequence {
        self.sequences.get(channel)
    }

    /// Mutable access to a sequence. Drops the cached curves.
    pub fn sequence_mut(&mut self, channel: Channel) -> &mut GestureSequence {
        self.curves = None;
        self.sequences.get_mut(channel)
    }

    /// Iterates mutably over all sequences. Drops the cached curves.
    pub(crate) fn sequences_mut(&mut self) -> impl Iterator<Item = (Channel, &mut GestureSequence)> {
        self.curves = None;
        self.sequences.iter_mut()
    }

    /// Score duration: the longest sequence.
    pub fn duration_s(&self) -> f64 {
        self.sequences
            .iter()
            .map(|(_, seq)| seq.duration_s())
            .fold(0.0, f64::max)
    }

    /// Total number of gestures over all channels.
    pub fn num_gestures(&self) -> usize {
        self.sequences.iter().map(|(_, seq)| seq.len()).sum()
    }

    /// Lengthens every channel at `pos_s`. Returns the number of channels changed.
    pub fn lengthen_at(&mut self, pos_s: f64, step_s: f64) -> usize {
        let changed = self
            .sequences_mut()
            .map(|(_, seq)| seq.lengthen_at(pos_s, step_s))
            .filter(|changed| *changed)
            .count();
        debug!(pos_s, step_s, changed, "lengthened score at mark");
        changed
    }

    /// Shortens every channel at `pos_s`. Returns the number of channels changed.
    pub fn shorten_at(&mut self, pos_s: f64, step_s: f64) -> usize {
        let changed = self
            .sequences_mut()
            .map(|(_, seq)| seq.shorten_at(pos_s, step_s))
            .filter(|changed| *changed)
            .count();
        debug!(pos_s, step_s, changed, "shortened score at mark");
        changed
    }

    /// Returns the curves at `sample_rate_hz`, regenerating them if needed.
    pub fn calc_curves(&mut self, sample_rate_hz: f64) -> ScoreResult<&ScoreCurves> {
        let curves = match self.curves.take() {
            Some(curves) if curves.sample_rate_hz == sample_rate_hz => curves,
            _ => ScoreCurves::generate(&self.sequences, &self.glottis, sample_rate_hz)?,
        };
        let curves: &ScoreCurves = self.curves.insert(curves);
        Ok(curves)
    }

    /// Returns the cached curves, if any.
    pub fn cached_curves(&self) -> Option<&ScoreCurves> {
        self.curves.as_ref()
    }

    /// Returns an immutable copy of the curves for a synthesis worker.
    pub fn snapshot(&mut self, sample_rate_hz: f64) -> ScoreResult<Arc<ScoreCurves>> {
        Ok(Arc::new(self.calc_curves(sample_rate_hz)?.clone()))
    }
}

impl Default for GesturalScore {
    fn default() -> Self {
        Self::new(GlottisModel::default())
    }
}

impl PartialEq for GesturalScore {
    fn eq(&self, other: &Self) -> bool {
        self.sequences == other.sequences && self.glottis == other.glottis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;

    #[test]
    fn test_new_score_is_empty() {
        let score = GesturalScore::default();
        assert_eq!(score.num_gestures(), 0);
        assert_eq!(score.duration_s(), 0.0);
        for channel in Channel::ALL {
            assert_eq!(score.sequence(channel).channel(), channel);
        }
    }

    #[test]
    fn test_test_score_channels_are_equally_long() {
        let score = GesturalScore::test_score(GlottisModel::default());
        for (channel, seq) in score.sequences().iter() {
            assert!(
                (seq.duration_s() - 0.65).abs() < 1e-9,
                "{} lasts {}",
                channel,
                seq.duration_s()
            );
        }
    }

    #[test]
    fn test_clear() {
        let mut score = GesturalScore::test_score(GlottisModel::default());
        score.clear();
        assert_eq!(score.num_gestures(), 0);
    }

    #[test]
    fn test_curve_cache_invalidation() {
        let mut score = GesturalScore::test_score(GlottisModel::default());
        score.calc_curves(1000.0).unwrap();
        assert!(score.cached_curves().is_some());

        let _ = score.sequence(Channel::F0);
        assert!(score.cached_curves().is_some());

        score.sequence_mut(Channel::F0).set_value(0, 90.0);
        assert!(score.cached_curves().is_none());

        let curves = score.calc_curves(1000.0).unwrap();
        assert!((curves.value_at(Channel::F0, 0.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_calc_curves_regenerates_on_rate_change() {
        let mut score = GesturalScore::test_score(GlottisModel::default());
        assert_eq!(score.calc_curves(1000.0).unwrap().num_samples(), 651);
        assert_eq!(score.calc_curves(100.0).unwrap().num_samples(), 66);
    }

    #[test]
    fn test_calc_curves_refuses_oversized_rate() {
        let mut score = GesturalScore::test_score(GlottisModel::default());
        score.calc_curves(1000.0).unwrap();
        assert!(matches!(
            score.calc_curves(1e12),
            Err(ScoreError::CurveTooLong { .. })
        ));
        assert!(score.cached_curves().is_none());
        assert!(score.snapshot(1e12).is_err());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut score = GesturalScore::test_score(GlottisModel::default());
        let snapshot = score.snapshot(1000.0).unwrap();
        score.sequence_mut(Channel::F0).set_value(0, 100.0);
        assert!((snapshot.value_at(Channel::F0, 0.0) - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_lengthen_and_shorten_all_channels() {
        let mut score = GesturalScore::test_score(GlottisModel::default());
        assert_eq!(score.lengthen_at(0.2, 0.005), 8);
        assert!((score.duration_s() - 0.655).abs() < 1e-9);
        assert_eq!(score.shorten_at(0.2, 0.005), 8);
        assert!((score.duration_s() - 0.65).abs() < 1e-9);
        assert_eq!(score.lengthen_at(5.0, 0.005), 0);
    }
}
