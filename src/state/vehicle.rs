//! Derived vehicle state and its two mutation paths.
//!
//! `VehicleState` is the single source of truth the presentation layer reads.
//! It is owned by the driver task and mutated through exactly two entry
//! points: [`VehicleState::apply_telemetry`] (authoritative, from the device)
//! and [`VehicleState::apply_echo`] (optimistic, from local input). Telemetry
//! always wins over stale optimism because it is applied last-writer-wins
//! over the same fields.

use serde::{Deserialize, Serialize};

use super::directions::{ActiveDirections, Axis, Direction};
use super::playback::AudioPlayback;
use crate::protocol::telemetry::Telemetry;

/// Physical steering stop in degrees. The hardware cannot turn further;
/// reported angles outside the stop are clamped.
const MAX_STEERING_ANGLE: f64 = 60.0;

/// Gear labels understood by the device.
///
/// `F` is the neutral ("free") position, `R` is reverse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gear {
    Fourth,
    Third,
    Second,
    First,
    #[default]
    Neutral,
    Reverse,
}

impl Gear {
    /// Wire label for this gear.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gear::Fourth => "4",
            Gear::Third => "3",
            Gear::Second => "2",
            Gear::First => "1",
            Gear::Neutral => "F",
            Gear::Reverse => "R",
        }
    }

    /// Parse a wire label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "4" => Some(Gear::Fourth),
            "3" => Some(Gear::Third),
            "2" => Some(Gear::Second),
            "1" => Some(Gear::First),
            "F" => Some(Gear::Neutral),
            "R" => Some(Gear::Reverse),
            _ => None,
        }
    }
}

/// Display tone for the speed readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedTone {
    /// Negative speed: reversing.
    Reverse,
    /// Exactly zero.
    Idle,
    /// Positive speed: moving forward.
    Forward,
}

/// Speed readout rule: magnitude plus a tone derived from the sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedReadout {
    /// Signed speed in km/h as reported by the device.
    pub raw: f64,
}

impl SpeedReadout {
    /// Displayed text, always the magnitude (`-12` shows as `12 km/h`).
    pub fn display(&self) -> String {
        let shown = if self.raw == 0.0 { 0.0 } else { self.raw.abs() };
        format!("{} km/h", shown)
    }

    pub fn tone(&self) -> SpeedTone {
        if self.raw < 0.0 {
            SpeedTone::Reverse
        } else if self.raw == 0.0 {
            SpeedTone::Idle
        } else {
            SpeedTone::Forward
        }
    }
}

/// A local, optimistic state change mirroring a command that was just sent.
///
/// Echoes flow into the driver's inbox so the state struct is only ever
/// touched from one task. The confirming telemetry may later overwrite any
/// of these silently.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEcho {
    /// A movement key went down.
    DirectionDown(Direction),
    /// A movement key came up; clears the optimistic directions on that axis.
    AxisReleased(Axis),
    PowerToggled,
    NightMode(bool),
    GearSelected(Gear),
    Zoom(f64),
    Recording(bool),
    PauseToggled,
    MuteToggled,
    LoopToggled,
}

/// Snapshot of everything the presentation layer needs.
///
/// Cheap to clone; the driver publishes an updated copy through a watch
/// channel whenever a mutation actually changed something.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Device power as last confirmed or assumed.
    pub powered: bool,
    /// Signed speed in km/h; negative is reverse.
    pub speed: f64,
    /// Steering angle in degrees; negative is left.
    pub steering_angle: f64,
    pub directions: ActiveDirections,
    pub gear: Gear,
    /// Camera zoom multiplier.
    pub zoom: f64,
    pub night_mode: bool,
    pub recording: bool,
    /// Playback state of the uploaded track, if any.
    pub playback: Option<AudioPlayback>,
}

impl VehicleState {
    pub fn new() -> Self {
        Self { zoom: 1.0, ..Self::default() }
    }

    pub fn speed_readout(&self) -> SpeedReadout {
        SpeedReadout { raw: self.speed }
    }

    /// Apply an authoritative telemetry event. Returns whether anything
    /// changed.
    ///
    /// Media and notification events are not state: the driver routes them
    /// elsewhere and they fall through here unchanged.
    pub fn apply_telemetry(&mut self, event: &Telemetry) -> bool {
        let before = self.clone();

        match event {
            Telemetry::MotorStarted => self.powered = true,
            Telemetry::MotorTurnedOff => self.powered = false,
            Telemetry::Speed { speed, direction, stopping } => {
                self.speed = *speed;
                if let Some(direction) = direction {
                    self.directions.insert(*direction);
                }
                if *stopping {
                    self.directions.clear_longitudinal();
                }
            }
            Telemetry::Angle { angle, direction, straightening } => {
                self.steering_angle = angle.clamp(-MAX_STEERING_ANGLE, MAX_STEERING_ANGLE);
                if let Some(direction) = direction {
                    self.directions.insert(*direction);
                }
                if *straightening {
                    self.directions.clear_lateral();
                }
            }
            Telemetry::AudioLoaded { name, duration } => {
                self.playback = AudioPlayback::from_confirmation(name.clone(), duration);
            }
            Telemetry::AudioPosition { seconds } => {
                // Short-circuit until a confirmation established the duration.
                if let Some(playback) = self.playback.as_mut() {
                    playback.position_secs = *seconds;
                }
            }
            Telemetry::AudioEnded => self.playback = None,
            Telemetry::Frame { .. }
            | Telemetry::PhotoSaved { .. }
            | Telemetry::VideoSaved { .. }
            | Telemetry::VideoChunk { .. }
            | Telemetry::VideoCompleted => {}
        }

        *self != before
    }

    /// Apply an optimistic local echo. Returns whether anything changed.
    pub fn apply_echo(&mut self, echo: &LocalEcho) -> bool {
        let before = self.clone();

        match echo {
            LocalEcho::DirectionDown(direction) => self.directions.insert(*direction),
            LocalEcho::AxisReleased(Axis::Longitudinal) => self.directions.clear_longitudinal(),
            LocalEcho::AxisReleased(Axis::Lateral) => self.directions.clear_lateral(),
            LocalEcho::PowerToggled => self.powered = !self.powered,
            LocalEcho::NightMode(on) => self.night_mode = *on,
            LocalEcho::GearSelected(gear) => self.gear = *gear,
            LocalEcho::Zoom(zoom) => self.zoom = *zoom,
            LocalEcho::Recording(on) => self.recording = *on,
            LocalEcho::PauseToggled => {
                if let Some(playback) = self.playback.as_mut() {
                    playback.paused = !playback.paused;
                }
            }
            LocalEcho::MuteToggled => {
                if let Some(playback) = self.playback.as_mut() {
                    playback.muted = !playback.muted;
                }
            }
            LocalEcho::LoopToggled => {
                if let Some(playback) = self.playback.as_mut() {
                    playback.looping = !playback.looping;
                }
            }
        }

        *self != before
    }
}
