//! Glottis models that interpret the glottal-shape, F0 and pressure channels.
//!
//! The acoustic simulation of each model lives outside this crate. Here a
//! model is only its identity, its control parameters and the glottal shapes
//! it knows, which is what the score needs for validation and for handing
//! curves to a synthesizer.

use serde::{Deserialize, Serialize};

/// The available glottis models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlottisKind {
    /// Geometric model with a parametric glottal area.
    Geometric,
    /// Classic two-mass model.
    TwoMass,
    /// Triangular glottis with two rest displacements.
    Triangular,
}

impl GlottisKind {
    pub const ALL: [GlottisKind; 3] = [
        GlottisKind::Geometric,
        GlottisKind::TwoMass,
        GlottisKind::Triangular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlottisKind::Geometric => "geometric",
            GlottisKind::TwoMass => "two_mass",
            GlottisKind::Triangular => "triangular",
        }
    }
}

impl std::fmt::Display for GlottisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GlottisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geometric" => Ok(GlottisKind::Geometric),
            "two_mass" | "two-mass" => Ok(GlottisKind::TwoMass),
            "triangular" => Ok(GlottisKind::Triangular),
            _ => Err(format!("unknown glottis model: {}", s)),
        }
    }
}

/// Control parameters of the geometric glottis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricParams {
    pub f0_hz: f64,
    pub pressure_dpa: f64,
    pub lower_end_x_cm: f64,
    pub upper_end_x_cm: f64,
    pub chink_area_cm2: f64,
    pub phase_lag_rad: f64,
    pub relative_amp: f64,
    pub double_pulsing: f64,
    pub pulse_skewness: f64,
    pub flutter_percent: f64,
    pub aspiration_strength_db: f64,
}

impl Default for GeometricParams {
    fn default() -> Self {
        Self {
            f0_hz: 120.0,
            pressure_dpa: 8000.0,
            lower_end_x_cm: 0.03,
            upper_end_x_cm: 0.03,
            chink_area_cm2: 0.0,
            phase_lag_rad: 0.0,
            relative_amp: 1.0,
            double_pulsing: 0.0,
            pulse_skewness: 0.0,
            flutter_percent: 25.0,
            aspiration_strength_db: -40.0,
        }
    }
}

/// Control parameters of the two-mass glottis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoMassParams {
    pub f0_hz: f64,
    pub pressure_dpa: f64,
    pub rest_displacement_cm: f64,
    pub aspiration_strength_db: f64,
}

impl Default for TwoMassParams {
    fn default() -> Self {
        Self {
            f0_hz: 120.0,
            pressure_dpa: 8000.0,
            rest_displacement_cm: 0.01,
            aspiration_strength_db: -40.0,
        }
    }
}

/// Control parameters of the triangular glottis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangularParams {
    pub f0_hz: f64,
    pub pressure_dpa: f64,
    pub rest_disp_1_cm: f64,
    pub rest_disp_2_cm: f64,
    pub ary_area_cm2: f64,
    pub aspiration_strength_db: f64,
}

impl Default for TriangularParams {
    fn default() -> Self {
        Self {
            f0_hz: 120.0,
            pressure_dpa: 8000.0,
            rest_disp_1_cm: 0.01,
            rest_disp_2_cm: 0.01,
            ary_area_cm2: 0.0,
            aspiration_strength_db: -40.0,
        }
    }
}

/// The selected glottis model with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlottisModel {
    Geometric(GeometricParams),
    TwoMass(TwoMassParams),
    Triangular(TriangularParams),
}

const GEOMETRIC_PARAMS: &[&str] = &[
    "f0",
    "pressure",
    "lower_end_x",
    "upper_end_x",
    "chink_area",
    "phase_lag",
    "relative_amp",
    "double_pulsing",
    "pulse_skewness",
    "flutter",
    "aspiration_strength",
];

const TWO_MASS_PARAMS: &[&str] = &["f0", "pressure", "rest_displacement", "aspiration_strength"];

const TRIANGULAR_PARAMS: &[&str] = &[
    "f0",
    "pressure",
    "rest_disp_1",
    "rest_disp_2",
    "ary_area",
    "aspiration_strength",
];

const GEOMETRIC_SHAPES: &[&str] = &[
    "default",
    "modal",
    "slightly-breathy",
    "breathy",
    "slightly-pressed",
    "pressed",
    "open",
    "stop",
];

const SELF_OSCILLATING_SHAPES: &[&str] = &["default", "modal", "breathy", "pressed", "open", "stop"];

impl GlottisModel {
    /// Returns the model with default parameters for a kind.
    pub fn default_for(kind: GlottisKind) -> Self {
        match kind {
            GlottisKind::Geometric => GlottisModel::Geometric(GeometricParams::default()),
            GlottisKind::TwoMass => GlottisModel::TwoMass(TwoMassParams::default()),
            GlottisKind::Triangular => GlottisModel::Triangular(TriangularParams::default()),
        }
    }

    pub fn kind(&self) -> GlottisKind {
        match self {
            GlottisModel::Geometric(_) => GlottisKind::Geometric,
            GlottisModel::TwoMass(_) => GlottisKind::TwoMass,
            GlottisModel::Triangular(_) => GlottisKind::Triangular,
        }
    }

    /// Human-readable model name.
    pub fn name(&self) -> &'static str {
        match self {
            GlottisModel::Geometric(_) => "Geometric glottis",
            GlottisModel::TwoMass(_) => "Two-mass model",
            GlottisModel::Triangular(_) => "Triangular glottis",
        }
    }

    /// Names of the control parameters, in the order of [`control_values`](Self::control_values).
    pub fn control_param_names(&self) -> &'static [&'static str] {
        match self {
            GlottisModel::Geometric(_) => GEOMETRIC_PARAMS,
            GlottisModel::TwoMass(_) => TWO_MASS_PARAMS,
            GlottisModel::Triangular(_) => TRIANGULAR_PARAMS,
        }
    }

    /// Current control parameter values.
    pub fn control_values(&self) -> Vec<f64> {
        match self {
            GlottisModel::Geometric(p) => vec![
                p.f0_hz,
                p.pressure_dpa,
                p.lower_end_x_cm,
                p.upper_end_x_cm,
                p.chink_area_cm2,
                p.phase_lag_rad,
                p.relative_amp,
                p.double_pulsing,
                p.pulse_skewness,
                p.flutter_percent,
                p.aspiration_strength_db,
            ],
            GlottisModel::TwoMass(p) => vec![
                p.f0_hz,
                p.pressure_dpa,
                p.rest_displacement_cm,
                p.aspiration_strength_db,
            ],
            GlottisModel::Triangular(p) => vec![
                p.f0_hz,
                p.pressure_dpa,
                p.rest_disp_1_cm,
                p.rest_disp_2_cm,
                p.ary_area_cm2,
                p.aspiration_strength_db,
            ],
        }
    }

    /// Index of the control parameter that best represents the glottal aperture.
    pub fn aperture_param(&self) -> usize {
        match self {
            GlottisModel::Geometric(_) => 2,
            GlottisModel::TwoMass(_) => 2,
            GlottisModel::Triangular(_) => 2,
        }
    }

    /// Glottal shapes this model defines.
    pub fn shape_names(&self) -> &'static [&'static str] {
        match self {
            GlottisModel::Geometric(_) => GEOMETRIC_SHAPES,
            GlottisModel::TwoMass(_) | GlottisModel::Triangular(_) => SELF_OSCILLATING_SHAPES,
        }
    }

    /// Returns true if the model defines a glottal shape with this name.
    pub fn has_shape(&self, name: &str) -> bool {
        self.shape_names().contains(&name)
    }
}

impl Default for GlottisModel {
    fn default() -> Self {
        GlottisModel::default_for(GlottisKind::Geometric)
    }
}
