//! Curves command implementation
//!
//! Renders a score into control curves on the synthesis worker and writes
//! them as CSV, one row per frame.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use gestural_score::{
    Channel, Frame, FrameRecorder, GlottisKind, ScoreCurves, SynthesisWorker, WorkerEvent,
    WorkerOutcome,
};
use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;

use crate::input::{load_score, print_load_report, resolve_settings, LoadResult};

/// Default frame rate of the CSV output.
pub const DEFAULT_FRAME_RATE_HZ: f64 = 100.0;

/// Run the curves command
///
/// # Arguments
/// * `score_path` - Path to the `.ges` file
/// * `glottis` - Glottis model used while loading
/// * `profile` - Settings profile name (default, control, preview)
/// * `config` - Settings JSON file, instead of a profile
/// * `frame_rate_hz` - Rows per second in the CSV
/// * `out` - CSV output path
pub fn run(
    score_path: &str,
    glottis: GlottisKind,
    profile: Option<&str>,
    config: Option<&str>,
    frame_rate_hz: f64,
    out: &str,
) -> Result<ExitCode> {
    if !(frame_rate_hz.is_finite() && frame_rate_hz > 0.0) {
        bail!("frame rate must be positive, got {}", frame_rate_hz);
    }
    let settings = resolve_settings(profile, config)?;

    println!("{} {}", "Rendering:".cyan().bold(), score_path);
    println!(
        "{} {} ({} Hz)",
        "Settings:".dimmed(),
        settings.name,
        settings.sample_rate_hz
    );

    let LoadResult {
        mut score, report, ..
    } = load_score(Path::new(score_path), glottis)?;
    print_load_report(&report);
    let curves = score
        .snapshot(settings.sample_rate())
        .with_context(|| format!("Failed to render {}", score_path))?;

    let worker = SynthesisWorker::spawn(
        curves.clone(),
        FrameRecorder::new(frame_rate_hz),
        settings.progress_interval,
    );

    let mut last_reported = 0;
    for event in worker.events().iter() {
        match event {
            WorkerEvent::Progress(percent) if percent >= last_reported + 25 => {
                last_reported = percent - percent % 25;
                println!("  {} {}%", "..".dimmed(), percent);
            }
            WorkerEvent::Progress(_) => {}
            WorkerEvent::Finished | WorkerEvent::Cancelled => break,
        }
    }

    let frames = match worker.wait()? {
        WorkerOutcome::Completed(frames) => frames,
        WorkerOutcome::Cancelled { at_sample } => {
            println!(
                "\n{} rendering cancelled at sample {}",
                "FAILED".red().bold(),
                at_sample
            );
            return Ok(ExitCode::from(1));
        }
    };

    let csv = format_csv(&curves, &frames);
    std::fs::write(out, csv).with_context(|| format!("Failed to write {}", out))?;

    println!(
        "\n{} {} frames over {:.3} s written to {}",
        "SUCCESS".green().bold(),
        frames.len(),
        curves.duration_s,
        out
    );
    Ok(ExitCode::SUCCESS)
}

/// Formats frames as CSV. Nominal channels get an extra label column.
pub fn format_csv(curves: &ScoreCurves, frames: &[Frame]) -> String {
    let mut csv = String::from("time_s");
    for channel in Channel::ALL {
        csv.push(',');
        csv.push_str(channel.as_str());
        if channel.is_nominal() {
            let _ = write!(csv, ",{}-label", channel.as_str());
        }
    }
    csv.push('\n');

    for frame in frames {
        let _ = write!(csv, "{}", frame.time_s);
        for channel in Channel::ALL {
            let _ = write!(csv, ",{}", frame.values.get(channel));
            if channel.is_nominal() {
                let label = curves.label_at(channel, frame.time_s).unwrap_or("");
                csv.push(',');
                csv.push_str(&csv_escape(label));
            }
        }
        csv.push('\n');
    }
    csv
}

/// Escape a string for CSV output.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestural_score::{GesturalScore, GlottisModel};

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("modal"), "modal");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"a\""), "\"say \"\"a\"\"\"");
    }

    #[test]
    fn test_curves_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("demo.ges");
        let output = dir.path().join("curves.csv");
        GesturalScore::test_score(GlottisModel::default())
            .save_ges(&input)
            .unwrap();

        let code = run(
            input.to_str().unwrap(),
            GlottisKind::Geometric,
            Some("control"),
            None,
            100.0,
            output.to_str().unwrap(),
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let csv = std::fs::read_to_string(&output).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("time_s,vowel-gestures,vowel-gestures-label"));
        assert!(header.ends_with("lung-pressure-gestures"));
        assert_eq!(lines.count(), 66);
    }
}
