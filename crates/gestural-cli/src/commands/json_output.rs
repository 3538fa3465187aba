//! JSON output types for machine-readable CLI output.
//!
//! These types back the `--json` flag on `info` and `validate`, so that
//! scripts can consume score summaries and validation reports directly.

use serde::{Deserialize, Serialize};

use gestural_score::{
    Channel, F0Statistic, GesturalScore, LoadReport, ValidationError, ValidationWarning,
};

/// Error codes for CLI operations.
///
/// These codes are stable. Validation error codes (E001...) pass through
/// unchanged.
pub mod error_codes {
    /// Score file could not be read or parsed
    pub const SCORE_LOAD: &str = "CLI_001";
}

/// Warning codes for CLI operations.
pub mod warning_codes {
    /// Values were clamped while loading the score
    pub const LOAD_CLAMPED: &str = "CLI_W001";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "E001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Location of the problem inside the score (e.g., "f0-gestures[2].value")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Suggestion for fixing the error (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: None,
            file: None,
            suggestion: None,
        }
    }

    /// Sets the score path for this error.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "CLI_W001", "W001")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
    /// Location of the problem inside the score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl JsonWarning {
    /// Creates a new warning with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: None,
        }
    }

    /// Sets the score path for this warning.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Converts a validation error.
pub fn validation_error_to_json(error: &ValidationError) -> JsonError {
    let json = JsonError::new(error.code.code(), &error.message);
    match &error.path {
        Some(path) => json.with_path(path),
        None => json,
    }
}

/// Converts a validation warning.
pub fn validation_warning_to_json(warning: &ValidationWarning) -> JsonWarning {
    let json = JsonWarning::new(warning.code.code(), &warning.message);
    match &warning.path {
        Some(path) => json.with_path(path),
        None => json,
    }
}

/// Converts the clamp warnings of a load report.
pub fn load_report_to_json(report: &LoadReport) -> Vec<JsonWarning> {
    report
        .warnings
        .iter()
        .map(|w| {
            let json = JsonWarning::new(warning_codes::LOAD_CLAMPED, &w.message);
            match &w.path {
                Some(path) => json.with_path(path),
                None => json,
            }
        })
        .collect()
}

/// Converts a load failure.
pub fn load_error_to_json(error: &anyhow::Error, file: &str) -> JsonError {
    JsonError::new(error_codes::SCORE_LOAD, format!("{:#}", error))
        .with_file(file)
        .with_suggestion("Check that the file exists and is a .ges gestural score")
}

/// Summary of one gesture sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequenceSummary {
    /// Sequence type as written in `.ges` files
    pub channel: String,
    /// Number of gestures
    pub gestures: usize,
    /// Total duration in seconds
    pub duration_s: f64,
}

/// Output of `gestural info --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfoOutput {
    /// Whether the score was loaded
    pub success: bool,
    /// BLAKE3 hash of the score file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    /// Glottis model used to interpret shape names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glottis: Option<String>,
    /// Score duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
    /// Total number of gestures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gestures: Option<usize>,
    /// Per-sequence summaries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequences: Vec<SequenceSummary>,
    /// F0 statistics over non-neutral F0 gestures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f0: Option<F0Summary>,
    /// Errors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
    /// Warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<JsonWarning>,
}

/// F0 statistics in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct F0Summary {
    pub mean_st: f64,
    pub sd_st: f64,
    pub mean_hz: f64,
    pub sd_hz: f64,
}

impl From<F0Statistic> for F0Summary {
    fn from(stat: F0Statistic) -> Self {
        Self {
            mean_st: stat.mean_st,
            sd_st: stat.sd_st,
            mean_hz: stat.mean_hz,
            sd_hz: stat.sd_hz,
        }
    }
}

impl InfoOutput {
    /// Builds a successful summary of `score`.
    pub fn success(score: &GesturalScore, source_hash: String, warnings: Vec<JsonWarning>) -> Self {
        let sequences = Channel::ALL
            .iter()
            .map(|&channel| {
                let seq = score.sequence(channel);
                SequenceSummary {
                    channel: channel.as_str().to_string(),
                    gestures: seq.len(),
                    duration_s: seq.duration_s(),
                }
            })
            .collect();

        Self {
            success: true,
            source_hash: Some(source_hash),
            glottis: Some(score.glottis().name().to_string()),
            duration_s: Some(score.duration_s()),
            gestures: Some(score.num_gestures()),
            sequences,
            f0: Some(score.f0_statistic().into()),
            errors: Vec::new(),
            warnings,
        }
    }

    /// Builds a failed output.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            source_hash: None,
            glottis: None,
            duration_s: None,
            gestures: None,
            sequences: Vec::new(),
            f0: None,
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Output of `gestural validate --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateOutput {
    /// Whether the score is valid
    pub success: bool,
    /// BLAKE3 hash of the score file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    /// Errors
    pub errors: Vec<JsonError>,
    /// Warnings
    pub warnings: Vec<JsonWarning>,
}

impl ValidateOutput {
    /// Creates a validation output.
    pub fn new(
        success: bool,
        source_hash: Option<String>,
        errors: Vec<JsonError>,
        warnings: Vec<JsonWarning>,
    ) -> Self {
        Self {
            success,
            source_hash,
            errors,
            warnings,
        }
    }

    /// Creates a failed output without a hash.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self::new(false, None, errors, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestural_score::{ErrorCode, GlottisModel};

    #[test]
    fn test_json_error_skips_empty_fields() {
        let error = JsonError::new(error_codes::SCORE_LOAD, "boom");
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"code":"CLI_001","message":"boom"}"#);
    }

    #[test]
    fn test_validation_error_keeps_code_and_path() {
        let error = ValidationError::with_path(
            ErrorCode::ValueOutOfRange,
            "value 150 outside [0, 110]",
            "f0-gestures[0].value",
        );
        let json = validation_error_to_json(&error);
        assert_eq!(json.code, "E002");
        assert_eq!(json.path.as_deref(), Some("f0-gestures[0].value"));
    }

    #[test]
    fn test_info_output_lists_all_sequences() {
        let score = GesturalScore::test_score(GlottisModel::default());
        let output = InfoOutput::success(&score, "abc".to_string(), Vec::new());
        assert!(output.success);
        assert_eq!(output.sequences.len(), Channel::ALL.len());
        assert_eq!(output.sequences[0].channel, "vowel-gestures");
        assert!(output.errors.is_empty());

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["source_hash"], "abc");
    }
}
