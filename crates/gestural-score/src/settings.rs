//! Named settings profiles for curve generation and editing.
//!
//! Pre-defined profiles:
//! - `default`: audio-rate curves for direct synthesis
//! - `control`: 1 kHz control-rate curves
//! - `preview`: coarse curves for quick inspection
//!
//! Settings can also be read from a JSON file, e.g.
//! `{"name": "custom", "sample_rate_hz": 22050, "edit_step_s": 0.005, "progress_interval": 100}`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

/// Curve generation and editing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSettings {
    /// Profile name.
    pub name: String,
    /// Sample rate of generated curves.
    pub sample_rate_hz: u32,
    /// Increment for lengthening and shortening at a mark.
    pub edit_step_s: f64,
    /// Number of samples between worker progress events.
    pub progress_interval: usize,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            sample_rate_hz: 44_100,
            edit_step_s: 0.005,
            progress_interval: 200,
        }
    }
}

impl ScoreSettings {
    /// Names of the built-in profiles.
    pub const PROFILES: &'static [&'static str] = &["default", "control", "preview"];

    /// Control-rate profile.
    pub fn control() -> Self {
        Self {
            name: "control".to_string(),
            sample_rate_hz: 1000,
            edit_step_s: 0.005,
            progress_interval: 50,
        }
    }

    /// Coarse profile for previews.
    pub fn preview() -> Self {
        Self {
            name: "preview".to_string(),
            sample_rate_hz: 200,
            edit_step_s: 0.010,
            progress_interval: 20,
        }
    }

    /// Gets a profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "control" => Some(Self::control()),
            "preview" => Some(Self::preview()),
            _ => None,
        }
    }

    /// Reads settings from a JSON file and validates them.
    pub fn from_json_file(path: impl AsRef<Path>) -> ScoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the settings can drive curve generation.
    pub fn validate(&self) -> ScoreResult<()> {
        if self.sample_rate_hz == 0 {
            return Err(ScoreError::Settings(
                "sample_rate_hz must be positive".to_string(),
            ));
        }
        if !(self.edit_step_s.is_finite() && self.edit_step_s > 0.0) {
            return Err(ScoreError::Settings(format!(
                "edit_step_s must be positive, got {}",
                self.edit_step_s
            )));
        }
        if self.progress_interval == 0 {
            return Err(ScoreError::Settings(
                "progress_interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Sample rate as a float.
    pub fn sample_rate(&self) -> f64 {
        f64::from(self.sample_rate_hz)
    }
}
