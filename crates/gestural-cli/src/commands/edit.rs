//! Edit command implementation
//!
//! Lengthens or shortens every sequence at a time mark and saves the score.
//! The step comes from `--step`, or else from the selected settings.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use gestural_score::GlottisKind;
use std::path::Path;
use std::process::ExitCode;

use crate::input::{load_score, output_path, print_load_report, resolve_settings, LoadResult};

/// Direction of a mark edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Lengthen,
    Shorten,
}

/// A mark edit requested on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct EditArgs {
    /// Time mark in seconds
    pub at_s: f64,
    /// Lengthen or shorten
    pub kind: EditKind,
    /// Amount of time added or removed; defaults to the settings' edit step
    pub step_s: Option<f64>,
    /// Settings profile name
    pub profile: Option<String>,
    /// Settings JSON file
    pub config: Option<String>,
}

/// Run the edit command
///
/// # Arguments
/// * `score_path` - Path to the `.ges` file
/// * `glottis` - Glottis model used while loading
/// * `args` - The requested edit
/// * `out` - Output path (default: overwrite the input)
pub fn run(
    score_path: &str,
    glottis: GlottisKind,
    args: &EditArgs,
    out: Option<&str>,
) -> Result<ExitCode> {
    let at_s = args.at_s;
    if !(at_s.is_finite() && at_s >= 0.0) {
        bail!("time mark must be a non-negative number, got {}", at_s);
    }
    let step_s = match args.step_s {
        Some(step_s) => step_s,
        None => resolve_settings(args.profile.as_deref(), args.config.as_deref())?.edit_step_s,
    };
    if !(step_s.is_finite() && step_s > 0.0) {
        bail!("step must be positive, got {}", step_s);
    }
    let kind = args.kind;

    let LoadResult {
        mut score, report, ..
    } = load_score(Path::new(score_path), glottis)?;
    print_load_report(&report);
    let before = score.duration_s();

    let changed = match kind {
        EditKind::Lengthen => score.lengthen_at(at_s, step_s),
        EditKind::Shorten => score.shorten_at(at_s, step_s),
    };

    let target = output_path(score_path, out);
    score
        .save_ges(target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    let verb = match kind {
        EditKind::Lengthen => "Lengthened",
        EditKind::Shorten => "Shortened",
    };
    println!(
        "{} {} sequence(s) at {:.3} s by {:.3} s",
        verb.green().bold(),
        changed,
        at_s,
        step_s
    );
    println!(
        "{} {:.3} s -> {:.3} s",
        "Duration:".dimmed(),
        before,
        score.duration_s()
    );
    println!("{} {}", "Wrote:".dimmed(), target.display());

    Ok(ExitCode::SUCCESS)
}
