//! Global score transforms and F0 statistics.
//!
//! Transforms are applied gesture by gesture and every result is clamped to
//! the channel bounds. Arguments that cannot produce a meaningful result
//! (NaN, infinities, non-positive time factors) leave the score untouched.

use serde::Serialize;
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::pitch::st_to_hz;
use crate::score::GesturalScore;
use crate::sequence::is_valid_duration;

/// Descriptive statistics of the non-neutral F0 targets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct F0Statistic {
    pub mean_st: f64,
    pub sd_st: f64,
    pub mean_hz: f64,
    pub sd_hz: f64,
}

fn mean_and_sd(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

impl GesturalScore {
    /// Population mean and standard deviation of the non-neutral F0 targets,
    /// in semitones and in Hertz. All zeros if there are none.
    pub fn f0_statistic(&self) -> F0Statistic {
        let st: Vec<f64> = self
            .sequence(Channel::F0)
            .iter()
            .filter(|g| !g.neutral)
            .map(|g| g.value)
            .collect();
        let hz: Vec<f64> = st.iter().map(|v| st_to_hz(*v)).collect();

        let (mean_st, sd_st) = mean_and_sd(&st);
        let (mean_hz, sd_hz) = mean_and_sd(&hz);
        F0Statistic {
            mean_st,
            sd_st,
            mean_hz,
            sd_hz,
        }
    }

    /// Shifts every F0 target by `delta_st` semitones.
    pub fn change_f0_offset(&mut self, delta_st: f64) {
        if !delta_st.is_finite() {
            warn!(delta_st, "ignoring non-finite F0 offset");
            return;
        }
        self.sequence_mut(Channel::F0)
            .edit_all(|g| g.value += delta_st);
        debug!(delta_st, "changed F0 offset");
    }

    /// Scales the F0 targets' deviation from their mean by `factor`.
    pub fn change_f0_range(&mut self, factor: f64) {
        if !factor.is_finite() {
            warn!(factor, "ignoring non-finite F0 range factor");
            return;
        }
        let mean = self.f0_statistic().mean_st;
        self.sequence_mut(Channel::F0).edit_all(|g| {
            if !g.neutral {
                g.value = mean + (g.value - mean) * factor;
            }
        });
        debug!(factor, mean_st = mean, "changed F0 range");
    }

    /// Adds `summand` (semitones per second) to every F0 slope.
    pub fn change_f0_target_slope(&mut self, summand: f64) {
        if !summand.is_finite() {
            warn!(summand, "ignoring non-finite F0 slope summand");
            return;
        }
        self.sequence_mut(Channel::F0)
            .edit_all(|g| g.slope += summand);
        debug!(summand, "changed F0 target slopes");
    }

    /// Multiplies every lung pressure target by `factor`.
    pub fn change_subglottal_pressure(&mut self, factor: f64) {
        if !factor.is_finite() {
            warn!(factor, "ignoring non-finite pressure factor");
            return;
        }
        self.sequence_mut(Channel::LungPressure)
            .edit_all(|g| g.value *= factor);
        debug!(factor, "changed subglottal pressure");
    }

    /// Multiplies every duration on every channel by `factor`.
    ///
    /// Begin and end times scale by the same factor. Factors that are not
    /// positive and finite, or that would push a gesture outside
    /// `(DURATION_EPSILON_S, MAX_EDIT_DURATION_S]`, are ignored.
    pub fn change_duration(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            warn!(factor, "ignoring invalid duration factor");
            return;
        }
        let representable = self.sequences().iter().all(|(_, seq)| {
            seq.iter().all(|g| is_valid_duration(g.duration_s * factor))
        });
        if !representable {
            warn!(factor, "duration factor would produce degenerate gestures");
            return;
        }
        for (_, seq) in self.sequences_mut() {
            seq.edit_all(|g| g.duration_s *= factor);
        }
        debug!(factor, "changed score duration");
    }

    /// Multiplies every time constant except those of F0 by `factor`.
    pub fn change_time_constants(&mut self, factor: f64) {
        if !factor.is_finite() {
            warn!(factor, "ignoring non-finite time constant factor");
            return;
        }
        for (channel, seq) in self.sequences_mut() {
            if channel != Channel::F0 {
                seq.edit_all(|g| g.tau_s *= factor);
            }
        }
        debug!(factor, "changed time constants");
    }

    /// Renames every glottal shape gesture called `old` to `new`.
    /// Returns the number of renamed gestures.
    pub fn substitute_glottal_shapes(&mut self, old: &str, new: &str) -> usize {
        let mut renamed = 0;
        self.sequence_mut(Channel::GlottalShape).edit_all(|g| {
            if g.nominal == old {
                g.nominal = new.to_string();
                renamed += 1;
            }
        });
        debug!(old, new, renamed, "substituted glottal shapes");
        renamed
    }
}
