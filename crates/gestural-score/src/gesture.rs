//! A single timed control segment.

use serde::{Deserialize, Serialize};

/// One gesture on one channel.
///
/// Whether `nominal` or `value` is the active target depends on the owning
/// sequence's channel. Both are kept so that switching a gesture between
/// channels (or round-tripping a file) loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    /// Duration in seconds. Always > 0 while the gesture is in a sequence.
    pub duration_s: f64,
    /// A neutral gesture occupies time but contributes no distinct target.
    pub neutral: bool,
    /// Symbolic target (e.g. a vowel or glottal shape name).
    pub nominal: String,
    /// Continuous target in the channel unit.
    pub value: f64,
    /// Linear target drift in channel units per second.
    pub slope: f64,
    /// Time constant of the exponential approach in seconds.
    pub tau_s: f64,
}

impl Gesture {
    /// Creates a non-neutral continuous gesture.
    pub fn continuous(duration_s: f64, value: f64, tau_s: f64) -> Self {
        Self {
            duration_s,
            neutral: false,
            nominal: String::new(),
            value,
            slope: 0.0,
            tau_s,
        }
    }

    /// Creates a non-neutral nominal gesture.
    pub fn named(duration_s: f64, nominal: impl Into<String>, tau_s: f64) -> Self {
        Self {
            duration_s,
            neutral: false,
            nominal: nominal.into(),
            value: 0.0,
            slope: 0.0,
            tau_s,
        }
    }

    /// Creates a neutral gesture.
    pub fn neutral(duration_s: f64, tau_s: f64) -> Self {
        Self {
            duration_s,
            neutral: true,
            nominal: String::new(),
            value: 0.0,
            slope: 0.0,
            tau_s,
        }
    }

    /// Sets the slope.
    pub fn with_slope(mut self, slope: f64) -> Self {
        self.slope = slope;
        self
    }

    /// Returns true if every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.duration_s.is_finite()
            && self.value.is_finite()
            && self.slope.is_finite()
            && self.tau_s.is_finite()
    }
}
