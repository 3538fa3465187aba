//! Loading gestural scores and settings.
//!
//! Every command that reads a score goes through [`load_score`], which also
//! records a BLAKE3 hash of the file content for provenance output.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use gestural_score::{
    parse_ges, GesturalScore, GlottisKind, GlottisModel, LoadReport, ScoreSettings,
};
use tracing::{info, warn};

/// Recognized score extensions.
pub const SCORE_EXTENSIONS: &[&str] = &["ges"];

/// Result of loading a score file.
#[derive(Debug)]
pub struct LoadResult {
    /// The parsed score.
    pub score: GesturalScore,
    /// Values that were clamped while loading.
    pub report: LoadReport,
    /// BLAKE3 hash of the source file content (hex string).
    pub source_hash: String,
}

/// Loads a score from a `.ges` file.
///
/// Shape names on the glottal-shape sequence are interpreted with the
/// default parameters of `glottis`.
pub fn load_score(path: &Path, glottis: GlottisKind) -> Result<LoadResult> {
    let has_known_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SCORE_EXTENSIONS.contains(&e));
    if !has_known_extension {
        warn!(path = %path.display(), "score file does not have a .ges extension");
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let source_hash = blake3::hash(&bytes).to_hex().to_string();
    let xml = String::from_utf8(bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;

    let (score, report) = parse_ges(&xml, GlottisModel::default_for(glottis))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!(
        path = %path.display(),
        gestures = score.num_gestures(),
        hash = &source_hash[..16],
        "loaded score"
    );
    if let Some(message) = report.message() {
        warn!(path = %path.display(), clamped = report.clamped(), "{}", message);
    }

    Ok(LoadResult {
        score,
        report,
        source_hash,
    })
}

/// Prints the load report message, if values were clamped while loading.
pub fn print_load_report(report: &LoadReport) {
    if let Some(message) = report.message() {
        println!("  {} {}", "!".yellow(), message);
    }
}

/// Resolves settings from a profile name or a JSON settings file.
pub fn resolve_settings(profile: Option<&str>, config: Option<&str>) -> Result<ScoreSettings> {
    match (profile, config) {
        (Some(_), Some(_)) => bail!("--profile and --config are mutually exclusive"),
        (_, Some(path)) => ScoreSettings::from_json_file(path)
            .with_context(|| format!("Failed to load settings from {}", path)),
        (Some(name), None) => ScoreSettings::by_name(name).ok_or_else(|| {
            anyhow!(
                "unknown settings profile: {} (expected {})",
                name,
                ScoreSettings::PROFILES.join(", ")
            )
        }),
        (None, None) => Ok(ScoreSettings::default()),
    }
}

/// Path the edited score is written to: `out` if given, else the input.
pub fn output_path<'a>(input: &'a str, out: Option<&'a str>) -> &'a Path {
    Path::new(out.unwrap_or(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestural_score::to_ges_string;

    #[test]
    fn test_load_score_hashes_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.ges");
        let score = GesturalScore::test_score(GlottisModel::default());
        let text = to_ges_string(&score).unwrap();
        std::fs::write(&path, &text).unwrap();

        let loaded = load_score(&path, GlottisKind::Geometric).unwrap();
        assert_eq!(loaded.score, score);
        assert!(loaded.report.is_clean());
        assert_eq!(
            loaded.source_hash,
            blake3::hash(text.as_bytes()).to_hex().to_string()
        );
        assert_eq!(loaded.source_hash.len(), 64);
    }

    #[test]
    fn test_load_score_missing_file() {
        let err = load_score(Path::new("/nonexistent/score.ges"), GlottisKind::Geometric)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read"));
    }

    #[test]
    fn test_load_score_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ges");
        std::fs::write(&path, "<gestural_score><gesture_sequence type=\"nope\"/>").unwrap();
        let err = load_score(&path, GlottisKind::Geometric).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test]
    fn test_load_score_keeps_clamp_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clamped.ges");
        std::fs::write(
            &path,
            r#"<gestural_score><gesture_sequence type="f0-gestures">
            <gesture value="200" duration_s="0.1"/>
            </gesture_sequence></gestural_score>"#,
        )
        .unwrap();

        let loaded = load_score(&path, GlottisKind::Geometric).unwrap();
        assert_eq!(loaded.report.clamped(), 1);
        assert!(loaded.report.message().is_some());
    }

    #[test]
    fn test_resolve_settings() {
        assert_eq!(resolve_settings(None, None).unwrap().name, "default");
        assert_eq!(
            resolve_settings(Some("preview"), None).unwrap().sample_rate_hz,
            200
        );
        let err = resolve_settings(Some("turbo"), None).unwrap_err();
        assert!(err.to_string().contains("default, control, preview"));
        assert!(resolve_settings(Some("preview"), Some("x.json")).is_err());
    }

    #[test]
    fn test_output_path_defaults_to_input() {
        assert_eq!(output_path("a.ges", None), Path::new("a.ges"));
        assert_eq!(output_path("a.ges", Some("b.ges")), Path::new("b.ges"));
    }
}
