//! Outbound command vocabulary and wire encoding.
//!
//! A [`Command`] is a named user intent; encoding it yields exactly one JSON
//! text frame of the form `{"type": <name>, "content": <value>}` (plus a
//! `"name"` field for audio uploads). Commands are immutable once built,
//! fire-and-forget on the wire, and never batched.
//!
//! Content typing is enforced by construction: continuous controls carry
//! numbers, discrete controls carry label strings, turbo/brake carry
//! percentage strings, and pure triggers carry an empty string.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::state::Gear;

/// A discrete user intent bound for the device.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Request the live camera feed. Always the first command after connect.
    StartVideoStreaming,

    // Movement triggers (two independent axes)
    MoveForward,
    MoveBackward,
    StopMoving,
    TurnLeft,
    TurnRight,
    UnturnLeft,
    UnturnRight,

    // Vehicle controls
    ToggleMotorStatus,
    SwitchGear(Gear),
    /// Turbo boost as a percentage, 0-100.
    SetTurbo(u8),
    /// Brake intensity as a percentage, 1-100.
    SetBrakeIntensity(u8),

    // Camera controls
    TakePicture,
    StartRecording,
    StopRecording,
    ToggleNightMode(bool),
    /// Zoom multiplier, 0.5-3.0.
    SetZoom(f64),

    // Audio controls
    /// Upload a track; the payload is base64-encoded on the wire.
    NewAudio { name: String, data: Vec<u8> },
    PauseAudio,
    ResumeAudio,
    RestartAudio,
    ToggleMute,
    ToggleLoop,
    /// Signed angle from the volume knob.
    SetSoundVolume(f64),
    /// Signed angle from the pan knob.
    SetSoundPan(f64),
}

/// Wire payload value. The protocol is loosely typed: content is a number,
/// a string, or the empty string for triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Content {
    fn empty() -> Self {
        Content::Text(String::new())
    }
}

/// The serialized form of a command, matching the device's expectations
/// byte-for-byte in field naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireCommand {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Content,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Command {
    /// Wire name for this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartVideoStreaming => "start-video-streaming",
            Command::MoveForward => "move-forward",
            Command::MoveBackward => "move-backward",
            Command::StopMoving => "stop-moving",
            Command::TurnLeft => "turn-left",
            Command::TurnRight => "turn-right",
            Command::UnturnLeft => "unturn-left",
            Command::UnturnRight => "unturn-right",
            Command::ToggleMotorStatus => "toggle-motor-status",
            Command::SwitchGear(_) => "switch-gear",
            Command::SetTurbo(_) => "set-turbo",
            Command::SetBrakeIntensity(_) => "set-brake-intensity",
            Command::TakePicture => "take-picture",
            Command::StartRecording => "start-recording",
            Command::StopRecording => "stop-recording",
            Command::ToggleNightMode(_) => "toggle-night-mode",
            Command::SetZoom(_) => "set-zoom",
            Command::NewAudio { .. } => "new-audio",
            Command::PauseAudio => "pause-audio",
            Command::ResumeAudio => "resume-audio",
            Command::RestartAudio => "restart-audio",
            Command::ToggleMute => "toggle-mute",
            Command::ToggleLoop => "toggle-loop",
            Command::SetSoundVolume(_) => "set-sound-volume",
            Command::SetSoundPan(_) => "set-sound-pan",
        }
    }

    /// Build the wire representation.
    pub fn to_wire(&self) -> WireCommand {
        let (content, name) = match self {
            Command::ToggleNightMode(on) => (Content::Integer(i64::from(*on)), None),
            Command::SwitchGear(gear) => (Content::Text(gear.as_str().to_string()), None),
            Command::SetTurbo(percent) => (Content::Text(format!("{percent}%")), None),
            Command::SetBrakeIntensity(percent) => (Content::Text(format!("{percent}%")), None),
            Command::SetZoom(zoom) => (Content::Number(*zoom), None),
            Command::SetSoundVolume(angle) => (Content::Number(*angle), None),
            Command::SetSoundPan(angle) => (Content::Number(*angle), None),
            Command::NewAudio { name, data } => {
                (Content::Text(BASE64.encode(data)), Some(name.clone()))
            }
            _ => (Content::empty(), None),
        };

        WireCommand { kind: self.name().to_string(), content, name }
    }

    /// Encode to a single JSON text frame.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_wire())?)
    }
}
