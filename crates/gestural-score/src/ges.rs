//! Reading and writing gestural scores in the `.ges` XML format.
//!
//! ```xml
//! <gestural_score>
//!   <gesture_sequence type="f0-gestures" unit="st">
//!     <gesture value="84" slope="0" duration_s="0.3" time_constant_s="0.02" neutral="0"/>
//!   </gesture_sequence>
//! </gestural_score>
//! ```
//!
//! Numbers are written in their shortest exact form, so a save followed by a
//! load reproduces every gesture bit for bit. Out-of-range parameters are
//! clamped on load and reported in a [`LoadReport`].

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{info, warn};

use crate::channel::Channel;
use crate::error::{ScoreError, ScoreResult, ValidationWarning, WarningCode};
use crate::gesture::Gesture;
use crate::glottis::GlottisModel;
use crate::score::GesturalScore;
use crate::sequence::{is_valid_duration, DURATION_EPSILON_S, MAX_EDIT_DURATION_S};

const ROOT: &str = "gestural_score";
const SEQUENCE: &str = "gesture_sequence";
const GESTURE: &str = "gesture";

/// Warnings produced while loading a score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub warnings: Vec<ValidationWarning>,
}

impl LoadReport {
    /// Returns true if nothing was clamped.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of gestures whose parameters were clamped.
    pub fn clamped(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.code == WarningCode::ValueClamped)
            .count()
    }

    /// User-facing summary, if there is anything to report.
    pub fn message(&self) -> Option<&'static str> {
        (self.clamped() > 0)
            .then_some("Some gesture values in the score were out of range and have been constricted.")
    }
}

/// Parses a score from `.ges` text.
pub fn parse_ges(xml: &str, glottis: GlottisModel) -> ScoreResult<(GesturalScore, LoadReport)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut score = GesturalScore::new(glottis);
    let mut report = LoadReport::default();
    let mut in_root = false;
    let mut seen_root = false;
    let mut current: Option<Channel> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"gestural_score" => {
                    if seen_root {
                        return Err(ScoreError::Malformed(format!("more than one <{}>", ROOT)));
                    }
                    in_root = true;
                    seen_root = true;
                }
                b"gesture_sequence" => {
                    current = Some(open_sequence(&e, in_root, current)?);
                }
                b"gesture" => read_gesture(&e, current, &mut score, &mut report)?,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"gestural_score" => {
                    seen_root = true;
                }
                b"gesture_sequence" => {
                    open_sequence(&e, in_root, current)?;
                }
                b"gesture" => read_gesture(&e, current, &mut score, &mut report)?,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"gesture_sequence" => current = None,
                b"gestural_score" => in_root = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ScoreError::Malformed(format!("missing <{}> element", ROOT)));
    }
    if in_root || current.is_some() {
        return Err(ScoreError::Malformed("unexpected end of document".to_string()));
    }
    Ok((score, report))
}

fn open_sequence(
    e: &BytesStart<'_>,
    in_root: bool,
    current: Option<Channel>,
) -> ScoreResult<Channel> {
    if !in_root {
        return Err(ScoreError::Malformed(format!(
            "<{}> outside <{}>",
            SEQUENCE, ROOT
        )));
    }
    if current.is_some() {
        return Err(ScoreError::Malformed(format!("nested <{}>", SEQUENCE)));
    }
    let type_name = attribute(e, SEQUENCE, "type")?
        .ok_or_else(|| ScoreError::attribute(SEQUENCE, "type", "missing"))?;
    type_name
        .parse::<Channel>()
        .map_err(|_| ScoreError::UnknownSequence(type_name))
}

fn read_gesture(
    e: &BytesStart<'_>,
    current: Option<Channel>,
    score: &mut GesturalScore,
    report: &mut LoadReport,
) -> ScoreResult<()> {
    let channel = current.ok_or_else(|| {
        ScoreError::Malformed(format!("<{}> outside <{}>", GESTURE, SEQUENCE))
    })?;
    let sequence = score.sequence_mut(channel);
    let bounds = sequence.bounds().clone();

    let value = attribute(e, GESTURE, "value")?
        .ok_or_else(|| ScoreError::attribute(GESTURE, "value", "missing"))?;
    let duration_s = number(e, "duration_s")?
        .ok_or_else(|| ScoreError::attribute(GESTURE, "duration_s", "missing"))?;
    if !is_valid_duration(duration_s) {
        return Err(ScoreError::attribute(
            GESTURE,
            "duration_s",
            format!(
                "duration must be in ({}, {}] s, got {}",
                DURATION_EPSILON_S, MAX_EDIT_DURATION_S, duration_s
            ),
        ));
    }
    let slope = number(e, "slope")?.unwrap_or(0.0);
    let tau_s = number(e, "time_constant_s")?.unwrap_or(bounds.default_tau_s);
    let neutral = match attribute(e, GESTURE, "neutral")?.as_deref() {
        None | Some("0") | Some("false") => false,
        Some("1") | Some("true") => true,
        Some(other) => {
            return Err(ScoreError::attribute(
                GESTURE,
                "neutral",
                format!("expected 0 or 1, got '{}'", other),
            ))
        }
    };

    let mut gesture = Gesture {
        duration_s,
        neutral,
        nominal: String::new(),
        value: 0.0,
        slope,
        tau_s,
    };
    if bounds.nominal_values {
        gesture.nominal = value;
    } else {
        gesture.value = value.trim().parse().map_err(|_| {
            ScoreError::attribute(GESTURE, "value", format!("'{}' is not a number", value))
        })?;
    }

    let index = sequence.len();
    if sequence.limit_gesture_params(&mut gesture) {
        report.warnings.push(ValidationWarning::with_path(
            WarningCode::ValueClamped,
            "gesture parameters were out of range and have been clamped",
            format!("{}[{}]", channel, index),
        ));
    }
    if !sequence.append(gesture) {
        return Err(ScoreError::Malformed(format!(
            "{}[{}] could not be appended",
            channel, index
        )));
    }
    Ok(())
}

fn attribute(e: &BytesStart<'_>, element: &str, name: &str) -> ScoreResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| ScoreError::attribute(element, name, err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn number(e: &BytesStart<'_>, name: &str) -> ScoreResult<Option<f64>> {
    match attribute(e, GESTURE, name)? {
        None => Ok(None),
        Some(text) => text.trim().parse::<f64>().map(Some).map_err(|_| {
            ScoreError::attribute(GESTURE, name, format!("'{}' is not a number", text))
        }),
    }
}

/// Serializes a score to `.ges` text.
pub fn to_ges_string(score: &GesturalScore) -> ScoreResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

    for (channel, sequence) in score.sequences().iter() {
        let mut start = BytesStart::new(SEQUENCE);
        start.push_attribute(("type", channel.as_str()));
        start.push_attribute(("unit", sequence.bounds().unit));
        writer.write_event(Event::Start(start))?;

        for gesture in sequence.iter() {
            let value = if sequence.bounds().nominal_values {
                gesture.nominal.clone()
            } else {
                gesture.value.to_string()
            };
            let mut element = BytesStart::new(GESTURE);
            element.push_attribute(("value", value.as_str()));
            element.push_attribute(("slope", gesture.slope.to_string().as_str()));
            element.push_attribute(("duration_s", gesture.duration_s.to_string().as_str()));
            element.push_attribute(("time_constant_s", gesture.tau_s.to_string().as_str()));
            element.push_attribute(("neutral", if gesture.neutral { "1" } else { "0" }));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new(SEQUENCE)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;

    let mut text = String::from_utf8(writer.into_inner())
        .map_err(|e| ScoreError::Malformed(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

impl GesturalScore {
    /// Loads a score from a `.ges` file using the given glottis model.
    pub fn load_ges(
        path: impl AsRef<Path>,
        glottis: GlottisModel,
    ) -> ScoreResult<(Self, LoadReport)> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let (score, report) = parse_ges(&xml, glottis)?;
        info!(
            path = %path.display(),
            gestures = score.num_gestures(),
            "loaded gestural score"
        );
        if let Some(message) = report.message() {
            warn!(path = %path.display(), clamped = report.clamped(), "{}", message);
        }
        Ok((score, report))
    }

    /// Replaces this score with the contents of a `.ges` file.
    ///
    /// The glottis model is kept. On error the score is left unchanged.
    pub fn read_ges_file(&mut self, path: impl AsRef<Path>) -> ScoreResult<LoadReport> {
        let (score, report) = Self::load_ges(path, self.glottis().clone())?;
        *self = score;
        Ok(report)
    }

    /// Writes this score to a `.ges` file.
    pub fn save_ges(&self, path: impl AsRef<Path>) -> ScoreResult<()> {
        let path = path.as_ref();
        std::fs::write(path, to_ges_string(self)?)?;
        info!(
            path = %path.display(),
            gestures = self.num_gestures(),
            "saved gestural score"
        );
        Ok(())
    }
}
