//! Error types for score loading, validation, and synthesis.

use thiserror::Error;

/// Error codes reported by score validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// E001: Gesture duration is zero or negative
    NonPositiveDuration,
    /// E002: Gesture target value outside the channel range
    ValueOutOfRange,
    /// E003: Gesture slope outside the channel range
    SlopeOutOfRange,
    /// E004: Gesture time constant outside the channel range
    TimeConstantOutOfRange,
    /// E005: NaN or infinite gesture parameter
    NonFiniteNumber,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::NonPositiveDuration => "E001",
            ErrorCode::ValueOutOfRange => "E002",
            ErrorCode::SlopeOutOfRange => "E003",
            ErrorCode::TimeConstantOutOfRange => "E004",
            ErrorCode::NonFiniteNumber => "E005",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes reported by score validation and loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Non-neutral nominal gesture without a name
    EmptyNominalValue,
    /// W002: Glottal shape not known to the selected glottis model
    UnknownGlottalShape,
    /// W003: Sequence durations differ by more than 1 ms
    SequenceLengthMismatch,
    /// W004: A loaded gesture parameter was clamped into range
    ValueClamped,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::EmptyNominalValue => "W001",
            WarningCode::UnknownGlottalShape => "W002",
            WarningCode::SequenceLengthMismatch => "W003",
            WarningCode::ValueClamped => "W004",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Location of the offending gesture (e.g., "f0-gestures\[3\].value").
    pub path: Option<String>,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {} (at {})", self.code, self.message, path),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and optional location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// Location of the offending gesture.
    pub path: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(
        code: WarningCode,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {} (at {})", self.code, self.message, path),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// Result of score validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed (no errors).
    pub ok: bool,
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates a failed validation result.
    pub fn failure(errors: Vec<ValidationError>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.ok = false;
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Returns true if any error carries the given code.
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Returns true if any warning carries the given code.
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        if self.ok {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

/// Top-level error type for score I/O and configuration.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML could not be tokenized.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute is missing or could not be parsed.
    #[error("invalid attribute '{name}' on <{element}>: {reason}")]
    Attribute {
        element: String,
        name: String,
        reason: String,
    },

    /// The document structure is not a gestural score.
    #[error("malformed gestural score: {0}")]
    Malformed(String),

    /// A `<gesture_sequence>` names a channel that does not exist.
    #[error("unknown gesture sequence type '{0}'")]
    UnknownSequence(String),

    /// Settings are invalid.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sampling the score would need more samples than a curve may hold.
    #[error("{duration_s} s at {sample_rate_hz} Hz needs more than {max_samples} samples per curve")]
    CurveTooLong {
        duration_s: f64,
        sample_rate_hz: f64,
        max_samples: usize,
    },
}

impl ScoreError {
    pub(crate) fn attribute(
        element: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ScoreError::Attribute {
            element: element.into(),
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for ScoreError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ScoreError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

/// Result alias for score operations.
pub type ScoreResult<T> = Result<T, ScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::NonPositiveDuration.code(), "E001");
        assert_eq!(ErrorCode::NonFiniteNumber.to_string(), "E005");
        assert_eq!(WarningCode::SequenceLengthMismatch.code(), "W003");
        assert_eq!(WarningCode::ValueClamped.to_string(), "W004");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::with_path(
            ErrorCode::ValueOutOfRange,
            "value 120 outside [0, 110]",
            "f0-gestures[2].value",
        );
        assert_eq!(
            err.to_string(),
            "E002: value 120 outside [0, 110] (at f0-gestures[2].value)"
        );
    }

    #[test]
    fn test_validation_result_tracks_errors() {
        let mut result = ValidationResult::success();
        result.add_warning(ValidationWarning::new(
            WarningCode::EmptyNominalValue,
            "empty",
        ));
        assert!(result.is_ok());
        assert!(result.has_warning(WarningCode::EmptyNominalValue));

        result.add_error(ValidationError::new(ErrorCode::NonPositiveDuration, "zero"));
        assert!(!result.is_ok());
        assert!(result.has_error(ErrorCode::NonPositiveDuration));
        assert_eq!(result.into_result().unwrap_err().len(), 1);
    }
}
