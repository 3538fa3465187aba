//! Score fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use gestural_score::{Channel, GesturalScore, Gesture, GlottisModel};

/// A two-sequence score with every value in range.
pub const MINIMAL_GES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gestural_score>
  <gesture_sequence type="vowel-gestures" unit="">
    <gesture value="" slope="0" duration_s="0.1" time_constant_s="0.012" neutral="1"/>
    <gesture value="a" slope="0" duration_s="0.2" time_constant_s="0.012" neutral="0"/>
  </gesture_sequence>
  <gesture_sequence type="f0-gestures" unit="st">
    <gesture value="84" slope="0" duration_s="0.15" time_constant_s="0.02" neutral="0"/>
    <gesture value="80" slope="-5" duration_s="0.15" time_constant_s="0.02" neutral="0"/>
  </gesture_sequence>
</gestural_score>
"#;

/// A score whose F0 gesture and pressure time constant are out of range.
pub const CLAMPED_GES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gestural_score>
  <gesture_sequence type="f0-gestures" unit="st">
    <gesture value="84" slope="0" duration_s="0.1" time_constant_s="0.02" neutral="0"/>
    <gesture value="150" slope="200" duration_s="0.1" time_constant_s="0.02" neutral="0"/>
  </gesture_sequence>
  <gesture_sequence type="lung-pressure-gestures" unit="dPa">
    <gesture value="8000" slope="0" duration_s="0.2" time_constant_s="0.5" neutral="0"/>
  </gesture_sequence>
</gestural_score>
"#;

/// A temporary directory holding score files.
pub struct ScoreFixture {
    pub root: TempDir,
}

impl ScoreFixture {
    /// Create a new empty fixture.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write raw `.ges` text under `name`.
    pub fn add_ges(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).expect("Failed to write score file");
        path
    }

    /// Save a score under `name`.
    pub fn add_score(&self, name: &str, score: &GesturalScore) -> PathBuf {
        let path = self.path().join(name);
        score.save_ges(&path).expect("Failed to save score");
        path
    }

    /// Save the demo score under `name`.
    pub fn add_demo(&self, name: &str) -> PathBuf {
        self.add_score(name, &demo_score())
    }
}

impl Default for ScoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in demo score with the default glottis.
pub fn demo_score() -> GesturalScore {
    GesturalScore::test_score(GlottisModel::default())
}

/// A score with a single F0 sequence of the given targets, 0.1 s each.
pub fn f0_score(targets: &[f64]) -> GesturalScore {
    let mut score = GesturalScore::default();
    let f0 = score.sequence_mut(Channel::F0);
    for &target in targets {
        f0.append(Gesture::continuous(0.1, target, 0.02));
    }
    score
}
