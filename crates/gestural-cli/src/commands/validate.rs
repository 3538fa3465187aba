//! Validate command implementation
//!
//! Checks a score against the channel bounds and reports errors and warnings.

use anyhow::Result;
use colored::Colorize;
use gestural_score::{validate_score, GlottisKind, ValidationResult};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{
    load_error_to_json, load_report_to_json, validation_error_to_json,
    validation_warning_to_json, JsonWarning, ValidateOutput,
};
use crate::input::{load_score, LoadResult};

/// Run the validate command
///
/// # Arguments
/// * `score_path` - Path to the `.ges` file
/// * `glottis` - Glottis model used to check glottal shape names
/// * `json_output` - Whether to output machine-readable JSON diagnostics
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(score_path: &str, glottis: GlottisKind, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(score_path, glottis)
    } else {
        run_human(score_path, glottis)
    }
}

/// Run validate with human-readable (colored) output
fn run_human(score_path: &str, glottis: GlottisKind) -> Result<ExitCode> {
    println!("{} {}", "Validating:".cyan().bold(), score_path);

    let LoadResult {
        score,
        report,
        source_hash,
    } = load_score(Path::new(score_path), glottis)?;

    println!("{} {}", "Source:".dimmed(), &source_hash[..16]);
    for warning in &report.warnings {
        let location = warning
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [load]{}: {}",
            "!".yellow(),
            location.dimmed(),
            warning.message
        );
    }

    let result = validate_score(&score);
    print_validation_results(&result);

    if result.is_ok() {
        println!("\n{} Score is valid", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n{} Score has {} error(s)",
            "FAILED".red().bold(),
            result.errors.len()
        );
        Ok(ExitCode::from(1))
    }
}

/// Run validate with machine-readable JSON output
fn run_json(score_path: &str, glottis: GlottisKind) -> Result<ExitCode> {
    let LoadResult {
        score,
        report,
        source_hash,
    } = match load_score(Path::new(score_path), glottis) {
        Ok(loaded) => loaded,
        Err(e) => {
            let output = ValidateOutput::failure(vec![load_error_to_json(&e, score_path)]);
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(ExitCode::from(1));
        }
    };

    let result = validate_score(&score);

    let mut warnings: Vec<JsonWarning> = load_report_to_json(&report);
    warnings.extend(result.warnings.iter().map(validation_warning_to_json));
    let errors = result.errors.iter().map(validation_error_to_json).collect();

    let output = ValidateOutput::new(result.is_ok(), Some(source_hash), errors, warnings);
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_validation_results(result: &ValidationResult) {
    for error in &result.errors {
        let path = error
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "x".red(),
            error.code,
            path.dimmed(),
            error.message
        );
    }
    for warning in &result.warnings {
        let path = warning
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "!".yellow(),
            warning.code,
            path.dimmed(),
            warning.message
        );
    }
}
