//! Gestural Score Library
//!
//! This crate models gestural scores for articulatory speech synthesis and
//! turns them into dense control curves.
//!
//! # Overview
//!
//! A gestural score is a set of parallel timelines, one per [`Channel`]
//! (vowel, lips, tongue tip, tongue body, velum, glottal shape, F0 and lung
//! pressure). Each timeline is a contiguous [`GestureSequence`] of timed
//! [`Gesture`]s with a target, a slope and a time constant.
//!
//! - **Editing**: lookup by time, insertion and deletion, mark-relative
//!   lengthening and shortening, border moves, clamped field writes
//! - **Transforms**: F0 offset, range and slope, pressure, tempo, time constants
//! - **Curves**: per-sample exponential-lag trajectories for every channel
//! - **Persistence**: the `.ges` XML format
//! - **Synthesis**: a background worker over an immutable curve snapshot
//!
//! # Example
//!
//! ```
//! use gestural_score::{Channel, GesturalScore, GlottisModel};
//! use gestural_score::validation::validate_score;
//!
//! let mut score = GesturalScore::test_score(GlottisModel::default());
//! score.change_f0_offset(2.0);
//! score.lengthen_at(0.2, 0.005);
//! assert!(validate_score(&score).is_ok());
//!
//! let curves = score.calc_curves(1000.0).unwrap();
//! let f0_at_start = curves.value_at(Channel::F0, 0.0);
//! assert!((f0_at_start - 86.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! - [`channel`]: Channels, channel bounds and per-channel maps
//! - [`sequence`]: Gesture sequences and their editing operations
//! - [`score`]: The gestural score and its curve cache
//! - [`transform`]: Global transforms and F0 statistics
//! - [`curve`]: Curve generation
//! - [`ges`]: `.ges` reading and writing
//! - [`validation`]: Score validation
//! - [`settings`]: Named settings profiles
//! - [`worker`]: Background synthesis worker

pub mod channel;
pub mod curve;
pub mod error;
pub mod ges;
pub mod gesture;
pub mod glottis;
pub mod pitch;
pub mod score;
pub mod sequence;
pub mod settings;
pub mod transform;
pub mod validation;
pub mod worker;

// Re-export commonly used types at the crate root
pub use channel::{Channel, ChannelBounds, ChannelMap};
pub use curve::{LabelSegment, ScoreCurves, TargetFollower, TimeFunction, MAX_CURVE_SAMPLES};
pub use error::{
    ErrorCode, ScoreError, ScoreResult, ValidationError, ValidationResult, ValidationWarning,
    WarningCode,
};
pub use ges::{parse_ges, to_ges_string, LoadReport};
pub use gesture::Gesture;
pub use glottis::{GeometricParams, GlottisKind, GlottisModel, TriangularParams, TwoMassParams};
pub use pitch::{hz_to_st, st_to_hz};
pub use score::GesturalScore;
pub use sequence::{GestureSequence, DEFAULT_EDIT_STEP_S, MAX_EDIT_DURATION_S};
pub use settings::ScoreSettings;
pub use transform::F0Statistic;
pub use validation::validate_score;
pub use worker::{
    Frame, FrameRecorder, SynthesisWorker, Synthesizer, WorkerError, WorkerEvent, WorkerOutcome,
};
