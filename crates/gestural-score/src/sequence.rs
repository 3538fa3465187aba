//! Ordered, contiguous gesture lists and their editing operations.
//!
//! A [`GestureSequence`] holds the gestures of one channel back to back:
//! gesture `i` ends exactly where gesture `i + 1` begins, so begin and end
//! times are derived from the durations and never stored. Every mutating
//! operation keeps all durations within `(DURATION_EPSILON_S,
//! MAX_EDIT_DURATION_S]` and clamps gesture parameters to the channel bounds. Invalid requests (out-of-range indices,
//! times outside the sequence, non-finite arguments) are no-ops that report
//! `false` or `None`.

use crate::channel::{Channel, ChannelBounds};
use crate::gesture::Gesture;

/// Durations at or below this are treated as zero.
pub const DURATION_EPSILON_S: f64 = 1e-9;

/// Default increment for lengthening and shortening at a mark.
pub const DEFAULT_EDIT_STEP_S: f64 = 0.005;

/// Shortest duration that direct duration edits can produce.
pub const MIN_EDIT_DURATION_S: f64 = 0.001;

/// Longest duration a single gesture can have.
pub const MAX_EDIT_DURATION_S: f64 = 10.0;

/// The gestures of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSequence {
    channel: Channel,
    bounds: ChannelBounds,
    gestures: Vec<Gesture>,
}

impl GestureSequence {
    /// Creates an empty sequence for a channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            bounds: ChannelBounds::for_channel(channel),
            gestures: Vec::new(),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn bounds(&self) -> &ChannelBounds {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gesture> {
        self.gestures.iter()
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    pub fn gesture(&self, index: usize) -> Option<&Gesture> {
        self.gestures.get(index)
    }

    /// Direct mutable access to a gesture.
    ///
    /// Writes through this reference bypass clamping; call
    /// [`limit_gesture_params`](Self::limit_gesture_params) afterwards, or
    /// prefer [`edit`](Self::edit) and the `set_*` methods.
    pub fn gesture_mut(&mut self, index: usize) -> Option<&mut Gesture> {
        self.gestures.get_mut(index)
    }

    /// Removes all gestures.
    pub fn clear(&mut self) {
        self.gestures.clear();
    }

    // ========================================================================
    // Timing queries
    // ========================================================================

    /// Total duration in seconds.
    pub fn duration_s(&self) -> f64 {
        self.gestures.iter().fold(0.0, |acc, g| acc + g.duration_s)
    }

    /// Start time of gesture `index`. Indices past the end yield the total duration.
    pub fn begin_s(&self, index: usize) -> f64 {
        self.gestures
            .iter()
            .take(index)
            .fold(0.0, |acc, g| acc + g.duration_s)
    }

    /// End time of gesture `index`. Indices past the end yield the total duration.
    pub fn end_s(&self, index: usize) -> f64 {
        self.gestures
            .iter()
            .take(index.saturating_add(1))
            .fold(0.0, |acc, g| acc + g.duration_s)
    }

    /// Returns the gesture whose `[begin, end)` interval contains `time_s`.
    ///
    /// A time exactly on a border belongs to the later gesture.
    pub fn index_at(&self, time_s: f64) -> Option<usize> {
        if !time_s.is_finite() || time_s < 0.0 {
            return None;
        }
        let mut begin = 0.0;
        for (i, gesture) in self.gestures.iter().enumerate() {
            let end = begin + gesture.duration_s;
            if time_s >= begin && time_s < end {
                return Some(i);
            }
            begin = end;
        }
        None
    }

    // ========================================================================
    // Parameter limits
    // ========================================================================

    /// Returns a gesture initialized with the channel defaults.
    ///
    /// The duration is [`MIN_EDIT_DURATION_S`]; callers set the real one.
    pub fn default_gesture(&self) -> Gesture {
        Gesture {
            duration_s: MIN_EDIT_DURATION_S,
            neutral: self.bounds.nominal_values,
            nominal: String::new(),
            value: self.bounds.default_value,
            slope: 0.0,
            tau_s: self.bounds.default_tau_s,
        }
    }

    /// Clamps value, slope and time constant to the channel bounds.
    ///
    /// Returns true if anything changed. Non-finite parameters are replaced
    /// by the channel defaults. The value of nominal channels is left alone.
    pub fn limit_gesture_params(&self, gesture: &mut Gesture) -> bool {
        let before = (gesture.value, gesture.slope, gesture.tau_s);
        limit_with(&self.bounds, gesture);

        // Compare bit patterns so that a NaN before counts as a change.
        before.0.to_bits() != gesture.value.to_bits()
            || before.1.to_bits() != gesture.slope.to_bits()
            || before.2.to_bits() != gesture.tau_s.to_bits()
    }

    /// Applies `f` to gesture `index` and clamps the result.
    ///
    /// A duration that `f` leaves outside the valid range is restored.
    pub fn edit(&mut self, index: usize, f: impl FnOnce(&mut Gesture)) -> bool {
        let Some(gesture) = self.gestures.get_mut(index) else {
            return false;
        };
        let duration_s = gesture.duration_s;
        f(gesture);
        if !is_valid_duration(gesture.duration_s) {
            gesture.duration_s = duration_s;
        }
        limit_with(&self.bounds, gesture);
        true
    }

    /// Applies `f` to every gesture and clamps the results.
    pub fn edit_all(&mut self, mut f: impl FnMut(&mut Gesture)) {
        for i in 0..self.gestures.len() {
            self.edit(i, &mut f);
        }
    }

    pub fn set_value(&mut self, index: usize, value: f64) -> bool {
        self.edit(index, |g| g.value = value)
    }

    pub fn set_nominal(&mut self, index: usize, nominal: impl Into<String>) -> bool {
        let nominal = nominal.into();
        self.edit(index, |g| g.nominal = nominal)
    }

    pub fn set_slope(&mut self, index: usize, slope: f64) -> bool {
        self.edit(index, |g| g.slope = slope)
    }

    pub fn set_tau(&mut self, index: usize, tau_s: f64) -> bool {
        self.edit(index, |g| g.tau_s = tau_s)
    }

    pub fn set_neutral(&mut self, index: usize, neutral: bool) -> bool {
        self.edit(index, |g| g.neutral = neutral)
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    /// Appends a gesture after clamping its parameters.
    ///
    /// Gestures whose duration is not in `(DURATION_EPSILON_S,
    /// MAX_EDIT_DURATION_S]` are rejected.
    pub fn append(&mut self, mut gesture: Gesture) -> bool {
        if !is_valid_duration(gesture.duration_s) {
            return false;
        }
        self.limit_gesture_params(&mut gesture);
        self.gestures.push(gesture);
        true
    }

    /// Inserts a gesture before `index` after clamping its parameters.
    pub fn insert(&mut self, index: usize, mut gesture: Gesture) -> bool {
        if index > self.gestures.len() || !is_valid_duration(gesture.duration_s) {
            return false;
        }
        self.limit_gesture_params(&mut gesture);
        self.gestures.insert(index, gesture);
        true
    }

    /// Removes a gesture. Later gestures move earlier by its duration.
    pub fn delete(&mut self, index: usize) -> Option<Gesture> {
        if index < self.gestures.len() {
            Some(self.gestures.remove(index))
        } else {
            None
        }
    }

    /// Removes a gesture and hands its duration to the preceding gesture.
    ///
    /// The first gesture has no predecessor, so its time is dropped. The
    /// merged duration is capped at [`MAX_EDIT_DURATION_S`].
    pub fn remove_and_merge(&mut self, index: usize) -> bool {
        let Some(removed) = self.delete(index) else {
            return false;
        };
        if index > 0 {
            let merged = &mut self.gestures[index - 1].duration_s;
            *merged = (*merged + removed.duration_s).min(MAX_EDIT_DURATION_S);
        }
        true
    }

    /// Inserts a gesture at `pos_s`.
    ///
    /// Inside a gesture, that gesture is split at `pos_s` and the index of
    /// the left half is returned. Past the end of the sequence, a default
    /// gesture reaching from the current end to `pos_s` is appended.
    pub fn insert_at(&mut self, pos_s: f64) -> Option<usize> {
        if !pos_s.is_finite() || pos_s < 0.0 {
            return None;
        }

        if let Some(index) = self.index_at(pos_s) {
            let begin = self.begin_s(index);
            let end = self.end_s(index);
            let left_s = pos_s - begin;
            let right_s = end - pos_s;
            if left_s <= DURATION_EPSILON_S || right_s <= DURATION_EPSILON_S {
                return None;
            }

            let mut left = self.gestures[index].clone();
            left.duration_s = left_s;
            self.limit_gesture_params(&mut left);
            self.gestures[index].duration_s = right_s;
            self.gestures.insert(index, left);

            limit_with(&self.bounds, &mut self.gestures[index + 1]);
            return Some(index);
        }

        let gap_s = pos_s - self.duration_s();
        if gap_s <= DURATION_EPSILON_S {
            return None;
        }
        let mut gesture = self.default_gesture();
        gesture.duration_s = gap_s;
        self.append(gesture).then(|| self.gestures.len() - 1)
    }

    /// Moves the border between gesture `index` and `index + 1` to `time_s`.
    ///
    /// Both neighbours keep at least [`MIN_EDIT_DURATION_S`] and at most
    /// [`MAX_EDIT_DURATION_S`]. The total duration does not change.
    pub fn move_border(&mut self, index: usize, time_s: f64) -> bool {
        if !time_s.is_finite() || index + 1 >= self.gestures.len() {
            return false;
        }
        let begin = self.begin_s(index);
        let combined = self.gestures[index].duration_s + self.gestures[index + 1].duration_s;
        if combined <= 2.0 * MIN_EDIT_DURATION_S {
            return false;
        }

        let border = time_s.clamp(
            begin + MIN_EDIT_DURATION_S.max(combined - MAX_EDIT_DURATION_S),
            begin + (combined - MIN_EDIT_DURATION_S).min(MAX_EDIT_DURATION_S),
        );
        let left_s = border - begin;
        self.gestures[index].duration_s = left_s;
        self.gestures[index + 1].duration_s = combined - left_s;
        true
    }

    /// Moves the end of gesture `index` to `time_s`. Later gestures shift.
    pub fn set_gesture_end(&mut self, index: usize, time_s: f64) -> bool {
        if !time_s.is_finite() || index >= self.gestures.len() {
            return false;
        }
        let duration_s =
            (time_s - self.begin_s(index)).clamp(MIN_EDIT_DURATION_S, MAX_EDIT_DURATION_S);
        self.gestures[index].duration_s = duration_s;
        true
    }

    /// Sets the duration of gesture `index`, clamped to
    /// `[MIN_EDIT_DURATION_S, MAX_EDIT_DURATION_S]`.
    pub fn set_duration(&mut self, index: usize, duration_s: f64) -> bool {
        if !duration_s.is_finite() {
            return false;
        }
        match self.gestures.get_mut(index) {
            Some(gesture) => {
                gesture.duration_s = duration_s.clamp(MIN_EDIT_DURATION_S, MAX_EDIT_DURATION_S);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Mark-relative edits
    // ========================================================================

    /// Lengthens the gesture covering `pos_s` by `step_s`.
    ///
    /// No other gesture changes. A gesture that would grow beyond
    /// [`MAX_EDIT_DURATION_S`] is left alone.
    pub fn lengthen_at(&mut self, pos_s: f64, step_s: f64) -> bool {
        if !is_valid_step(step_s) {
            return false;
        }
        let Some(index) = self.index_at(pos_s) else {
            return false;
        };
        let duration_s = self.gestures[index].duration_s + step_s;
        if !is_valid_duration(duration_s) {
            return false;
        }
        self.gestures[index].duration_s = duration_s;
        true
    }

    /// Removes `step_s` of time starting at `pos_s`.
    ///
    /// If the gesture covering `pos_s` extends beyond `pos_s + step_s` it is
    /// simply shortened. Otherwise it is cut at `pos_s`, every gesture that
    /// ends inside the removed span is deleted, and the first gesture ending
    /// after the span is trimmed to start at `pos_s`. A covering gesture that
    /// is cut down to nothing is deleted as well.
    pub fn shorten_at(&mut self, pos_s: f64, step_s: f64) -> bool {
        if !is_valid_step(step_s) {
            return false;
        }
        let Some(index) = self.index_at(pos_s) else {
            return false;
        };

        let cut_end = pos_s + step_s;
        if self.end_s(index) - cut_end > DURATION_EPSILON_S {
            self.gestures[index].duration_s -= step_s;
            return true;
        }

        let begin = self.begin_s(index);
        let follower = self.first_ending_after(index + 1, cut_end);
        match follower {
            Some((k, end_k)) => {
                self.gestures[k].duration_s = end_k - cut_end;
                self.gestures.drain(index + 1..k);
            }
            None => self.gestures.truncate(index + 1),
        }

        let remaining = pos_s - begin;
        if remaining <= DURATION_EPSILON_S {
            self.gestures.remove(index);
        } else {
            self.gestures[index].duration_s = remaining;
        }
        true
    }

    /// Returns the first gesture at or after `from` that ends later than
    /// `time_s` by more than [`DURATION_EPSILON_S`], with its end time.
    fn first_ending_after(&self, from: usize, time_s: f64) -> Option<(usize, f64)> {
        let mut end = self.begin_s(from);
        for (k, gesture) in self.gestures.iter().enumerate().skip(from) {
            end += gesture.duration_s;
            if end - time_s > DURATION_EPSILON_S {
                return Some((k, end));
            }
        }
        None
    }
}

fn limit_with(bounds: &ChannelBounds, gesture: &mut Gesture) {
    if !bounds.nominal_values {
        if !gesture.value.is_finite() {
            gesture.value = bounds.default_value;
        }
        gesture.value = gesture.value.clamp(bounds.min_value, bounds.max_value);
    }
    if !gesture.slope.is_finite() {
        gesture.slope = 0.0;
    }
    gesture.slope = gesture.slope.clamp(bounds.min_slope, bounds.max_slope);
    if !gesture.tau_s.is_finite() {
        gesture.tau_s = bounds.default_tau_s;
    }
    gesture.tau_s = gesture.tau_s.clamp(bounds.min_tau_s, bounds.max_tau_s);
}

/// Returns true if a gesture may last `duration_s`.
pub fn is_valid_duration(duration_s: f64) -> bool {
    duration_s.is_finite() && duration_s > DURATION_EPSILON_S && duration_s <= MAX_EDIT_DURATION_S
}

fn is_valid_step(step_s: f64) -> bool {
    step_s.is_finite() && step_s > 0.0
}
