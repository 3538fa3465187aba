//! Init command implementation
//!
//! Writes the built-in demo score as a starting point for editing.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use gestural_score::{GesturalScore, GlottisKind, GlottisModel};
use std::path::Path;
use std::process::ExitCode;

/// Run the init command
///
/// # Arguments
/// * `out` - Path of the new `.ges` file
/// * `glottis` - Glottis model of the demo score
/// * `force` - Overwrite an existing file
pub fn run(out: &str, glottis: GlottisKind, force: bool) -> Result<ExitCode> {
    let path = Path::new(out);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", out);
    }

    let score = GesturalScore::test_score(GlottisModel::default_for(glottis));
    score
        .save_ges(path)
        .with_context(|| format!("Failed to write {}", out))?;

    println!(
        "{} {} ({} gestures, {:.3} s)",
        "Created:".green().bold(),
        out,
        score.num_gestures(),
        score.duration_s()
    );
    Ok(ExitCode::SUCCESS)
}
