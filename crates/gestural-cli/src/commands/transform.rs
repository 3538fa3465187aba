//! Transform command implementation
//!
//! Applies global transforms to a score and saves it.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use gestural_score::{GesturalScore, GlottisKind};
use std::path::Path;
use std::process::ExitCode;

use crate::input::{load_score, output_path, print_load_report, LoadResult};

/// Transforms requested on the command line. Unset fields are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformArgs {
    /// F0 offset in semitones
    pub f0_offset: Option<f64>,
    /// F0 range factor around the mean
    pub f0_range: Option<f64>,
    /// Summand added to every F0 slope (st/s)
    pub f0_slope: Option<f64>,
    /// Lung pressure factor
    pub pressure: Option<f64>,
    /// Tempo factor for all durations
    pub duration: Option<f64>,
    /// Factor for all time constants except F0
    pub time_constants: Option<f64>,
    /// Glottal shape renames as `OLD=NEW`
    pub substitute: Vec<String>,
}

impl TransformArgs {
    /// Returns true if no transform was requested.
    pub fn is_empty(&self) -> bool {
        self.f0_offset.is_none()
            && self.f0_range.is_none()
            && self.f0_slope.is_none()
            && self.pressure.is_none()
            && self.duration.is_none()
            && self.time_constants.is_none()
            && self.substitute.is_empty()
    }
}

/// Splits an `OLD=NEW` glottal shape rename.
pub fn parse_substitution(text: &str) -> Result<(&str, &str)> {
    let (old, new) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected OLD=NEW, got '{}'", text))?;
    if old.is_empty() {
        return Err(anyhow!("empty shape name in '{}'", text));
    }
    Ok((old, new))
}

/// Applies the requested transforms in a fixed order and returns a line per step.
pub fn apply(score: &mut GesturalScore, args: &TransformArgs) -> Result<Vec<String>> {
    let mut applied = Vec::new();

    if let Some(delta) = args.f0_offset {
        score.change_f0_offset(delta);
        applied.push(format!("F0 offset {:+} st", delta));
    }
    if let Some(factor) = args.f0_range {
        score.change_f0_range(factor);
        applied.push(format!("F0 range x{}", factor));
    }
    if let Some(summand) = args.f0_slope {
        score.change_f0_target_slope(summand);
        applied.push(format!("F0 slope {:+} st/s", summand));
    }
    if let Some(factor) = args.pressure {
        score.change_subglottal_pressure(factor);
        applied.push(format!("lung pressure x{}", factor));
    }
    if let Some(factor) = args.duration {
        score.change_duration(factor);
        applied.push(format!("duration x{}", factor));
    }
    if let Some(factor) = args.time_constants {
        score.change_time_constants(factor);
        applied.push(format!("time constants x{}", factor));
    }
    for rename in &args.substitute {
        let (old, new) = parse_substitution(rename)?;
        let count = score.substitute_glottal_shapes(old, new);
        applied.push(format!("glottal shape '{}' -> '{}' ({} gestures)", old, new, count));
    }

    Ok(applied)
}

/// Run the transform command
///
/// # Arguments
/// * `score_path` - Path to the `.ges` file
/// * `glottis` - Glottis model used while loading
/// * `args` - Requested transforms
/// * `out` - Output path (default: overwrite the input)
pub fn run(
    score_path: &str,
    glottis: GlottisKind,
    args: &TransformArgs,
    out: Option<&str>,
) -> Result<ExitCode> {
    if args.is_empty() {
        println!("{} no transform requested", "!".yellow());
        return Ok(ExitCode::from(1));
    }

    let LoadResult {
        mut score, report, ..
    } = load_score(Path::new(score_path), glottis)?;
    let applied = apply(&mut score, args)?;

    let target = output_path(score_path, out);
    score
        .save_ges(target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!("{} {}", "Transformed:".cyan().bold(), score_path);
    print_load_report(&report);
    for line in &applied {
        println!("  {} {}", "+".green(), line);
    }
    println!("{} {}", "Wrote:".dimmed(), target.display());

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestural_score::{Channel, GlottisModel};

    #[test]
    fn test_parse_substitution() {
        assert_eq!(parse_substitution("modal=breathy").unwrap(), ("modal", "breathy"));
        assert_eq!(parse_substitution("modal=").unwrap(), ("modal", ""));
        assert!(parse_substitution("modal").is_err());
        assert!(parse_substitution("=breathy").is_err());
    }

    #[test]
    fn test_apply_in_order() {
        let mut score = GesturalScore::test_score(GlottisModel::default());
        let args = TransformArgs {
            f0_offset: Some(2.0),
            duration: Some(2.0),
            substitute: vec!["modal=pressed".to_string()],
            ..Default::default()
        };
        let applied = apply(&mut score, &args).unwrap();
        assert_eq!(applied.len(), 3);

        let f0 = score.sequence(Channel::F0);
        assert_eq!(f0.gesture(0).unwrap().value, 86.0);
        assert!((score.duration_s() - 1.3).abs() < 1e-9);
        assert_eq!(
            score.sequence(Channel::GlottalShape).gesture(0).unwrap().nominal,
            "pressed"
        );
    }

    #[test]
    fn test_empty_args() {
        assert!(TransformArgs::default().is_empty());
        let code = run(
            "unused.ges",
            GlottisKind::Geometric,
            &TransformArgs::default(),
            None,
        )
        .unwrap();
        assert_eq!(code, ExitCode::from(1));
    }
}
