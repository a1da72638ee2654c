//! Inbound telemetry decoding and shape-based classification.
//!
//! The device tags nothing. An inbound message is a JSON object whose
//! *shape* (which optional fields are present) determines its meaning, and
//! several shapes are structural supersets of others (a speed report with a
//! `direction` rider contains a plain speed report). Classification is
//! therefore an ordered list of predicates evaluated top to bottom with
//! first-match-wins semantics: the first rule whose required fields are all
//! present fires and evaluation stops, even if later rules would also match.
//!
//! This is a protocol smell inherited from the wire format, not a design
//! choice of this crate. Do not reorder the rules or merge overlapping
//! shapes without a protocol change on the device side.
//!
//! Messages matching no rule are ignored by design; malformed JSON is a
//! caller-side diagnostic (see the driver), never a crash.

use serde::Deserialize;

use crate::Result;
use crate::state::Direction;

/// Mirror of the loosely-typed wire object. Every field is optional; the
/// classifier decides which combination means what.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTelemetry {
    #[serde(default)]
    pub ok: bool,

    #[serde(default, rename = "motorStarted")]
    pub motor_started: Option<bool>,
    #[serde(default, rename = "motorTurnedoff")]
    pub motor_turnedoff: Option<bool>,

    #[serde(default)]
    pub streaming: Option<bool>,
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default, rename = "photoPath")]
    pub photo_path: Option<String>,
    #[serde(default, rename = "videoPath")]
    pub video_path: Option<String>,

    #[serde(default)]
    pub motorspeed: Option<f64>,
    #[serde(default)]
    pub motorangle: Option<f64>,
    #[serde(default)]
    pub angle: Option<f64>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub stopping: Option<bool>,
    #[serde(default)]
    pub straightening: Option<bool>,

    #[serde(default, rename = "audioDuration")]
    pub audio_duration: Option<String>,
    #[serde(default, rename = "audioName")]
    pub audio_name: Option<String>,
    #[serde(default, rename = "currentAudioTime")]
    pub current_audio_time: Option<f64>,
    #[serde(default, rename = "endSound")]
    pub end_sound: Option<bool>,

    #[serde(default)]
    pub sendingvideo: Option<bool>,
    #[serde(default, rename = "videoChunk")]
    pub video_chunk: Option<String>,
    #[serde(default, rename = "videoCompleted")]
    pub video_completed: Option<bool>,
}

/// A classified telemetry event.
#[derive(Debug, Clone, PartialEq)]
pub enum Telemetry {
    MotorStarted,
    MotorTurnedOff,
    /// One base64 JPEG camera frame from the live preview.
    Frame { data: String },
    PhotoSaved { path: String },
    VideoSaved { path: String },
    /// Speed report, optionally riding a confirmed direction and a
    /// stopping flag that clears the motion-type directions.
    Speed { speed: f64, direction: Option<Direction>, stopping: bool },
    /// Steering report, optionally riding a confirmed direction and a
    /// straightening flag that clears the steering-type directions.
    Angle { angle: f64, direction: Option<Direction>, straightening: bool },
    /// Upload confirmed: playback begins with this total duration (`m:ss`).
    AudioLoaded { name: String, duration: String },
    AudioPosition { seconds: f64 },
    AudioEnded,
    /// One base64 chunk of a recorded-video transfer. The only rule not
    /// gated on `ok`.
    VideoChunk { data: String },
    /// Terminal signal of a chunked-video transfer.
    VideoCompleted,
}

fn truthy(flag: &Option<bool>) -> bool {
    *flag == Some(true)
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|s| !s.is_empty())
}

/// Classify a raw message into at most one event.
///
/// The rule order below is load-bearing; see the module docs. `None` means
/// the shape matched nothing and the message is ignored.
pub fn classify(raw: &RawTelemetry) -> Option<Telemetry> {
    let direction = raw.direction.as_deref().and_then(Direction::parse);

    if raw.ok && truthy(&raw.motor_started) {
        return Some(Telemetry::MotorStarted);
    }
    if raw.ok && truthy(&raw.motor_turnedoff) {
        return Some(Telemetry::MotorTurnedOff);
    }
    if raw.ok && truthy(&raw.streaming) {
        if let Some(frame) = non_empty(&raw.frame) {
            return Some(Telemetry::Frame { data: frame.to_string() });
        }
    }
    if raw.ok {
        if let Some(path) = non_empty(&raw.photo_path) {
            return Some(Telemetry::PhotoSaved { path: path.to_string() });
        }
    }
    if raw.ok {
        if let Some(path) = non_empty(&raw.video_path) {
            return Some(Telemetry::VideoSaved { path: path.to_string() });
        }
    }
    if raw.ok {
        if let Some(speed) = raw.motorspeed {
            return Some(Telemetry::Speed { speed, direction, stopping: truthy(&raw.stopping) });
        }
    }
    if raw.ok {
        // The device emits `motorangle` but older firmware used `angle`;
        // either field name is accepted, `motorangle` preferred.
        if let Some(angle) = raw.motorangle.or(raw.angle) {
            return Some(Telemetry::Angle {
                angle,
                direction,
                straightening: truthy(&raw.straightening),
            });
        }
    }
    if raw.ok {
        if let (Some(duration), Some(name)) =
            (non_empty(&raw.audio_duration), non_empty(&raw.audio_name))
        {
            return Some(Telemetry::AudioLoaded {
                name: name.to_string(),
                duration: duration.to_string(),
            });
        }
    }
    if raw.ok {
        // Matches the source protocol's truthiness check: a position of
        // exactly zero does not match and falls through to "ignored".
        if let Some(seconds) = raw.current_audio_time.filter(|s| *s != 0.0) {
            return Some(Telemetry::AudioPosition { seconds });
        }
    }
    if raw.ok && truthy(&raw.end_sound) {
        return Some(Telemetry::AudioEnded);
    }
    if truthy(&raw.sendingvideo) {
        if let Some(chunk) = non_empty(&raw.video_chunk) {
            return Some(Telemetry::VideoChunk { data: chunk.to_string() });
        }
    }
    if raw.ok && truthy(&raw.video_completed) {
        return Some(Telemetry::VideoCompleted);
    }

    None
}

/// Parse one inbound text frame and classify it.
///
/// `Err` means the text was not valid JSON for the wire object; `Ok(None)`
/// means valid JSON that matched no documented shape.
pub fn decode(text: &str) -> Result<Option<Telemetry>> {
    let raw: RawTelemetry = serde_json::from_str(text)?;
    Ok(classify(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_some(text: &str) -> Telemetry {
        decode(text).unwrap().expect("message should classify")
    }

    #[test]
    fn motor_status_messages() {
        assert_eq!(decode_some(r#"{"ok":true,"motorStarted":true}"#), Telemetry::MotorStarted);
        assert_eq!(decode_some(r#"{"ok":true,"motorTurnedoff":true}"#), Telemetry::MotorTurnedOff);
    }

    #[test]
    fn streaming_frame_requires_all_three_fields() {
        assert_eq!(
            decode_some(r#"{"ok":true,"streaming":true,"frame":"abcd"}"#),
            Telemetry::Frame { data: "abcd".to_string() }
        );
        // Missing frame: falls through and matches nothing.
        assert_eq!(decode(r#"{"ok":true,"streaming":true}"#).unwrap(), None);
    }

    #[test]
    fn saved_media_paths() {
        assert_eq!(
            decode_some(r#"{"ok":true,"photoPath":"user/photos/p.jpg"}"#),
            Telemetry::PhotoSaved { path: "user/photos/p.jpg".to_string() }
        );
        assert_eq!(
            decode_some(r#"{"ok":true,"videoPath":"user/videos/v.avi"}"#),
            Telemetry::VideoSaved { path: "user/videos/v.avi".to_string() }
        );
    }

    #[test]
    fn speed_with_riders() {
        assert_eq!(
            decode_some(r#"{"ok":true,"motorspeed":-12,"direction":"backward"}"#),
            Telemetry::Speed {
                speed: -12.0,
                direction: Some(Direction::Backward),
                stopping: false
            }
        );
        assert_eq!(
            decode_some(r#"{"ok":true,"motorspeed":3,"stopping":true}"#),
            Telemetry::Speed { speed: 3.0, direction: None, stopping: true }
        );
        // Zero is a present value for speed, unlike the audio clock.
        assert_eq!(
            decode_some(r#"{"ok":true,"motorspeed":0}"#),
            Telemetry::Speed { speed: 0.0, direction: None, stopping: false }
        );
    }

    #[test]
    fn angle_accepts_either_field_name() {
        assert_eq!(
            decode_some(r#"{"ok":true,"motorangle":-30}"#),
            Telemetry::Angle { angle: -30.0, direction: None, straightening: false }
        );
        assert_eq!(
            decode_some(r#"{"ok":true,"angle":15,"direction":"right"}"#),
            Telemetry::Angle {
                angle: 15.0,
                direction: Some(Direction::Right),
                straightening: false
            }
        );
    }

    #[test]
    fn first_match_wins_on_superset_shapes() {
        // Contains both a speed and an angle; the speed rule is earlier and
        // must be the only one that fires.
        assert_eq!(
            decode_some(r#"{"ok":true,"motorspeed":5,"motorangle":20}"#),
            Telemetry::Speed { speed: 5.0, direction: None, stopping: false }
        );

        // A frame message also carrying a photoPath classifies as a frame.
        assert_eq!(
            decode_some(r#"{"ok":true,"streaming":true,"frame":"zz","photoPath":"p.jpg"}"#),
            Telemetry::Frame { data: "zz".to_string() }
        );
    }

    #[test]
    fn audio_messages() {
        assert_eq!(
            decode_some(r#"{"ok":true,"audioDuration":"3:25","audioName":"track.mp3"}"#),
            Telemetry::AudioLoaded {
                name: "track.mp3".to_string(),
                duration: "3:25".to_string()
            }
        );
        assert_eq!(
            decode_some(r#"{"ok":true,"currentAudioTime":12.5}"#),
            Telemetry::AudioPosition { seconds: 12.5 }
        );
        assert_eq!(decode_some(r#"{"ok":true,"endSound":true}"#), Telemetry::AudioEnded);

        // Duration without a name is not a load confirmation.
        assert_eq!(decode(r#"{"ok":true,"audioDuration":"3:25"}"#).unwrap(), None);
        // A zero clock does not match (source-protocol truthiness).
        assert_eq!(decode(r#"{"ok":true,"currentAudioTime":0}"#).unwrap(), None);
    }

    #[test]
    fn video_chunks_are_not_gated_on_ok() {
        assert_eq!(
            decode_some(r#"{"sendingvideo":true,"videoChunk":"AAAA"}"#),
            Telemetry::VideoChunk { data: "AAAA".to_string() }
        );
        assert_eq!(decode_some(r#"{"ok":true,"videoCompleted":true}"#), Telemetry::VideoCompleted);
    }

    #[test]
    fn classification_is_total() {
        for text in [
            r#"{}"#,
            r#"{"ok":true}"#,
            r#"{"ok":false,"motorStarted":true}"#,
            r#"{"ok":true,"somethingElse":42}"#,
            r#"{"sendingvideo":false,"videoChunk":"AAAA"}"#,
            r#"{"ok":true,"streaming":true,"frame":""}"#,
        ] {
            assert_eq!(decode(text).unwrap(), None, "{text} should be ignored");
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(decode("not json").is_err());
        assert!(decode(r#"{"ok":"#).is_err());
    }

    #[test]
    fn unknown_direction_tag_is_dropped_not_fatal() {
        assert_eq!(
            decode_some(r#"{"ok":true,"motorspeed":4,"direction":"sideways"}"#),
            Telemetry::Speed { speed: 4.0, direction: None, stopping: false }
        );
    }
}
