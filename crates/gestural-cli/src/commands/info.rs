//! Info command implementation
//!
//! Prints a summary of a score: sequences, durations and F0 statistics.

use anyhow::Result;
use colored::Colorize;
use gestural_score::{Channel, GlottisKind};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{load_error_to_json, load_report_to_json, InfoOutput};
use crate::input::{load_score, print_load_report, LoadResult};

/// Run the info command
///
/// # Arguments
/// * `score_path` - Path to the `.ges` file
/// * `glottis` - Glottis model used to interpret shape names
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(score_path: &str, glottis: GlottisKind, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(score_path, glottis)
    } else {
        run_human(score_path, glottis)
    }
}

fn run_human(score_path: &str, glottis: GlottisKind) -> Result<ExitCode> {
    println!("{} {}", "Score:".cyan().bold(), score_path);

    let LoadResult {
        score,
        report,
        source_hash,
    } = load_score(Path::new(score_path), glottis)?;

    println!("{} {}", "Hash:".dimmed(), &source_hash[..16]);
    println!("{} {}", "Glottis:".dimmed(), score.glottis().name());
    print_load_report(&report);

    println!(
        "\n{:<26} {:>8} {:>12}",
        "Sequence".bold(),
        "Gestures".bold(),
        "Duration".bold()
    );
    for channel in Channel::ALL {
        let sequence = score.sequence(channel);
        println!(
            "{:<26} {:>8} {:>10.3} s",
            channel.label(),
            sequence.len(),
            sequence.duration_s()
        );
    }

    println!(
        "\n{} {:.3} s, {} gestures",
        "Total:".cyan().bold(),
        score.duration_s(),
        score.num_gestures()
    );

    let f0 = score.f0_statistic();
    println!(
        "{} mean {:.2} st ({:.1} Hz), sd {:.2} st ({:.1} Hz)",
        "F0:".cyan().bold(),
        f0.mean_st,
        f0.mean_hz,
        f0.sd_st,
        f0.sd_hz
    );

    Ok(ExitCode::SUCCESS)
}

fn run_json(score_path: &str, glottis: GlottisKind) -> Result<ExitCode> {
    let (output, code) = match load_score(Path::new(score_path), glottis) {
        Ok(LoadResult {
            score,
            report,
            source_hash,
        }) => (
            InfoOutput::success(&score, source_hash, load_report_to_json(&report)),
            ExitCode::SUCCESS,
        ),
        Err(e) => (
            InfoOutput::failure(vec![load_error_to_json(&e, score_path)]),
            ExitCode::from(1),
        ),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}
