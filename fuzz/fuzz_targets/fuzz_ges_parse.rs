#![no_main]

use gestural_score::{parse_ges, to_ges_string, validate_score, GlottisModel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok((score, _report)) = parse_ges(text, GlottisModel::default()) else {
        return;
    };

    // Anything that loads is clamped into range and survives a save/load cycle.
    assert!(validate_score(&score).is_ok());
    let saved = to_ges_string(&score).expect("loaded score must serialize");
    let (reloaded, report) =
        parse_ges(&saved, GlottisModel::default()).expect("saved score must parse");
    assert!(report.is_clean());
    assert_eq!(reloaded, score);
});
