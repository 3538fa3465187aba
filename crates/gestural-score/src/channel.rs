//! Articulatory and phonatory channels.
//!
//! Every gestural score has exactly one gesture sequence per [`Channel`].
//! Per-channel data is stored in a [`ChannelMap`], which has a named field for
//! every channel so that lookups are exhaustive and cannot go out of bounds.

use serde::{Deserialize, Serialize};

/// The controllable dimensions of the vocal system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Vowel targets (whole vocal tract shapes).
    Vowel,
    /// Lip constrictions.
    Lip,
    /// Tongue-tip constrictions.
    TongueTip,
    /// Tongue-body constrictions.
    TongueBody,
    /// Velum opening.
    Velic,
    /// Glottal shapes (named glottis configurations).
    GlottalShape,
    /// Fundamental frequency targets in semitones.
    F0,
    /// Subglottal (lung) pressure targets.
    LungPressure,
}

impl Channel {
    /// All channels in score order.
    pub const ALL: [Channel; 8] = [
        Channel::Vowel,
        Channel::Lip,
        Channel::TongueTip,
        Channel::TongueBody,
        Channel::Velic,
        Channel::GlottalShape,
        Channel::F0,
        Channel::LungPressure,
    ];

    /// Returns the sequence type name used in `.ges` files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Vowel => "vowel-gestures",
            Channel::Lip => "lip-gestures",
            Channel::TongueTip => "tongue-tip-gestures",
            Channel::TongueBody => "tongue-body-gestures",
            Channel::Velic => "velic-gestures",
            Channel::GlottalShape => "glottal-shape-gestures",
            Channel::F0 => "f0-gestures",
            Channel::LungPressure => "lung-pressure-gestures",
        }
    }

    /// Returns a short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Vowel => "vowel",
            Channel::Lip => "lip",
            Channel::TongueTip => "tongue tip",
            Channel::TongueBody => "tongue body",
            Channel::Velic => "velic",
            Channel::GlottalShape => "glottal shape",
            Channel::F0 => "F0",
            Channel::LungPressure => "lung pressure",
        }
    }

    /// Returns the channel-wide bounds and defaults.
    pub fn bounds(&self) -> ChannelBounds {
        ChannelBounds::for_channel(*self)
    }

    /// Returns true if gestures on this channel carry symbolic (named) targets.
    pub fn is_nominal(&self) -> bool {
        self.bounds().nominal_values
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown gesture sequence type: {}", s))
    }
}

/// Channel-wide bounds and defaults for gesture parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelBounds {
    /// Unit of continuous targets (empty for nominal channels).
    pub unit: &'static str,
    /// Whether targets are symbolic names instead of numbers.
    pub nominal_values: bool,
    /// Lower bound of continuous targets.
    pub min_value: f64,
    /// Upper bound of continuous targets.
    pub max_value: f64,
    /// Lower bound of the target slope (unit per second).
    pub min_slope: f64,
    /// Upper bound of the target slope (unit per second).
    pub max_slope: f64,
    /// Lower bound of the time constant in seconds.
    pub min_tau_s: f64,
    /// Upper bound of the time constant in seconds.
    pub max_tau_s: f64,
    /// Time constant given to new gestures.
    pub default_tau_s: f64,
    /// Target used for neutral gestures and after the end of the sequence.
    pub neutral_value: f64,
    /// Target value given to new gestures.
    pub default_value: f64,
}

impl ChannelBounds {
    /// Shortest time constant of any channel.
    pub const MIN_TAU_S: f64 = 0.004;

    /// Longest time constant of any channel.
    pub const MAX_TAU_S: f64 = 0.050;

    /// Returns the bounds for a channel.
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Vowel
            | Channel::Lip
            | Channel::TongueTip
            | Channel::TongueBody
            | Channel::GlottalShape => Self::nominal(),
            Channel::Velic => Self {
                unit: "",
                nominal_values: false,
                min_value: 0.0,
                max_value: 1.0,
                min_slope: 0.0,
                max_slope: 0.0,
                min_tau_s: Self::MIN_TAU_S,
                max_tau_s: Self::MAX_TAU_S,
                default_tau_s: 0.012,
                neutral_value: 0.0,
                default_value: 0.0,
            },
            Channel::F0 => Self {
                unit: "st",
                nominal_values: false,
                min_value: 0.0,
                max_value: 110.0,
                min_slope: -80.0,
                max_slope: 80.0,
                min_tau_s: Self::MIN_TAU_S,
                max_tau_s: Self::MAX_TAU_S,
                default_tau_s: 0.020,
                neutral_value: 84.0,
                default_value: 84.0,
            },
            Channel::LungPressure => Self {
                unit: "dPa",
                nominal_values: false,
                min_value: 0.0,
                max_value: 20_000.0,
                min_slope: 0.0,
                max_slope: 0.0,
                min_tau_s: Self::MIN_TAU_S,
                max_tau_s: Self::MAX_TAU_S,
                default_tau_s: 0.005,
                neutral_value: 0.0,
                default_value: 8000.0,
            },
        }
    }

    fn nominal() -> Self {
        Self {
            unit: "",
            nominal_values: true,
            min_value: 0.0,
            max_value: 0.0,
            min_slope: 0.0,
            max_slope: 0.0,
            min_tau_s: Self::MIN_TAU_S,
            max_tau_s: Self::MAX_TAU_S,
            default_tau_s: 0.012,
            neutral_value: 0.0,
            default_value: 0.0,
        }
    }

    /// Returns true if the slope of gestures on this channel can be adjusted.
    pub fn has_adjustable_slope(&self) -> bool {
        self.min_slope < self.max_slope
    }
}

/// One value per channel, stored in named fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelMap<T> {
    pub vowel: T,
    pub lip: T,
    pub tongue_tip: T,
    pub tongue_body: T,
    pub velic: T,
    pub glottal_shape: T,
    pub f0: T,
    pub lung_pressure: T,
}

impl<T> ChannelMap<T> {
    /// Builds a map by calling `f` once per channel in score order.
    pub fn from_fn(mut f: impl FnMut(Channel) -> T) -> Self {
        Self {
            vowel: f(Channel::Vowel),
            lip: f(Channel::Lip),
            tongue_tip: f(Channel::TongueTip),
            tongue_body: f(Channel::TongueBody),
            velic: f(Channel::Velic),
            glottal_shape: f(Channel::GlottalShape),
            f0: f(Channel::F0),
            lung_pressure: f(Channel::LungPressure),
        }
    }

    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::Vowel => &self.vowel,
            Channel::Lip => &self.lip,
            Channel::TongueTip => &self.tongue_tip,
            Channel::TongueBody => &self.tongue_body,
            Channel::Velic => &self.velic,
            Channel::GlottalShape => &self.glottal_shape,
            Channel::F0 => &self.f0,
            Channel::LungPressure => &self.lung_pressure,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::Vowel => &mut self.vowel,
            Channel::Lip => &mut self.lip,
            Channel::TongueTip => &mut self.tongue_tip,
            Channel::TongueBody => &mut self.tongue_body,
            Channel::Velic => &mut self.velic,
            Channel::GlottalShape => &mut self.glottal_shape,
            Channel::F0 => &mut self.f0,
            Channel::LungPressure => &mut self.lung_pressure,
        }
    }

    /// Iterates over all channels in score order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Iterates mutably over all channels in score order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Channel, &mut T)> {
        [
            (Channel::Vowel, &mut self.vowel),
            (Channel::Lip, &mut self.lip),
            (Channel::TongueTip, &mut self.tongue_tip),
            (Channel::TongueBody, &mut self.tongue_body),
            (Channel::Velic, &mut self.velic),
            (Channel::GlottalShape, &mut self.glottal_shape),
            (Channel::F0, &mut self.f0),
            (Channel::LungPressure, &mut self.lung_pressure),
        ]
        .into_iter()
    }

    /// Maps every entry to a new value.
    pub fn map<U>(&self, mut f: impl FnMut(Channel, &T) -> U) -> ChannelMap<U> {
        ChannelMap::from_fn(|c| f(c, self.get(c)))
    }
}
