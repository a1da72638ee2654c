//! Controller facade: reconciled input on one side, guarded sends on the
//! other.
//!
//! Every intent passes through a [`CommandSink`] whose send is best-effort:
//! when the link is not open the command is dropped, not queued. Control is
//! real-time; a stale command has no value once the link comes back.
//! Optimistic echoes are forwarded to the driver's inbox only when the
//! command was actually accepted for sending.

use tokio::sync::mpsc;
use tracing::debug;

use super::analog::{KnobTracker, SliderTracker};
use super::keys::KeyTracker;
use super::toggles::Toggles;
use crate::protocol::Command;
use crate::state::{Direction, Gear, LocalEcho};

/// Best-effort command output. Implemented by the live connection handle
/// and by test doubles.
pub trait CommandSink {
    /// Attempt to send; `false` means the command was dropped without any
    /// wire write (link not open or queue full).
    fn try_send(&self, command: &Command) -> bool;
}

/// Wires the input trackers to a command sink and the driver's echo inbox.
pub struct Controller<S: CommandSink> {
    sink: S,
    echoes: mpsc::UnboundedSender<LocalEcho>,
    keys: KeyTracker,
    toggles: Toggles,
    volume: KnobTracker,
    pan: KnobTracker,
    zoom: SliderTracker,
    turbo: SliderTracker,
    brake: SliderTracker,
}

impl<S: CommandSink> Controller<S> {
    pub fn new(sink: S, echoes: mpsc::UnboundedSender<LocalEcho>) -> Self {
        Self {
            sink,
            echoes,
            keys: KeyTracker::new(),
            toggles: Toggles::new(),
            volume: KnobTracker::signed_angle(),
            pan: KnobTracker::signed_angle(),
            zoom: SliderTracker::zoom(),
            turbo: SliderTracker::percent(20.0),
            brake: SliderTracker::new(1.0, 100.0, Some(1.0), 20.0),
        }
    }

    fn dispatch(&self, command: Command, echo: Option<LocalEcho>) -> bool {
        if !self.sink.try_send(&command) {
            debug!(command = command.name(), "link not open, intent dropped");
            return false;
        }
        if let Some(echo) = echo {
            // The driver going away is surfaced through the link state, not
            // through input calls.
            let _ = self.echoes.send(echo);
        }
        true
    }

    // Keyboard

    pub fn key_down(&mut self, direction: Direction) -> bool {
        let (command, echo) = self.keys.key_down(direction);
        self.dispatch(command, Some(echo))
    }

    pub fn key_up(&mut self, direction: Direction) -> bool {
        let (command, echo) = self.keys.key_up(direction);
        self.dispatch(command, Some(echo))
    }

    // Continuous controls

    /// Drag the volume knob by a delta in degrees. Emits only when the
    /// clamped angle changed.
    pub fn drag_volume(&mut self, delta: f64) -> bool {
        match self.volume.drag(delta) {
            Some(angle) => self.dispatch(Command::SetSoundVolume(angle), None),
            None => false,
        }
    }

    /// Drag the pan knob by a delta in degrees.
    pub fn drag_pan(&mut self, delta: f64) -> bool {
        match self.pan.drag(delta) {
            Some(angle) => self.dispatch(Command::SetSoundPan(angle), None),
            None => false,
        }
    }

    /// Point the volume knob at an absolute cursor position relative to
    /// the knob's center, as the rotary widget reports during a drag.
    pub fn point_volume(&mut self, center_x: f64, center_y: f64, x: f64, y: f64) -> bool {
        match self.volume.point_at(center_x, center_y, x, y) {
            Some(angle) => self.dispatch(Command::SetSoundVolume(angle), None),
            None => false,
        }
    }

    /// Point the pan knob at an absolute cursor position.
    pub fn point_pan(&mut self, center_x: f64, center_y: f64, x: f64, y: f64) -> bool {
        match self.pan.point_at(center_x, center_y, x, y) {
            Some(angle) => self.dispatch(Command::SetSoundPan(angle), None),
            None => false,
        }
    }

    /// Move the zoom slider to an absolute value (clamped to 0.5-3.0).
    pub fn set_zoom(&mut self, value: f64) -> bool {
        match self.zoom.set(value) {
            Some(zoom) => self.dispatch(Command::SetZoom(zoom), Some(LocalEcho::Zoom(zoom))),
            None => false,
        }
    }

    pub fn set_turbo(&mut self, percent: f64) -> bool {
        match self.turbo.set(percent) {
            Some(value) => self.dispatch(Command::SetTurbo(value as u8), None),
            None => false,
        }
    }

    pub fn set_brake(&mut self, percent: f64) -> bool {
        match self.brake.set(percent) {
            Some(value) => self.dispatch(Command::SetBrakeIntensity(value as u8), None),
            None => false,
        }
    }

    // Toggles

    pub fn toggle_pause(&mut self) -> bool {
        let (command, echo) = self.toggles.toggle_pause();
        self.dispatch(command, Some(echo))
    }

    pub fn toggle_mute(&mut self) -> bool {
        let (command, echo) = self.toggles.toggle_mute();
        self.dispatch(command, Some(echo))
    }

    pub fn toggle_loop(&mut self) -> bool {
        let (command, echo) = self.toggles.toggle_loop();
        self.dispatch(command, Some(echo))
    }

    pub fn toggle_night_mode(&mut self) -> bool {
        let (command, echo) = self.toggles.toggle_night_mode();
        self.dispatch(command, Some(echo))
    }

    pub fn toggle_power(&mut self) -> bool {
        let (command, echo) = self.toggles.toggle_power();
        self.dispatch(command, Some(echo))
    }

    pub fn start_recording(&mut self) -> bool {
        let (command, echo) = self.toggles.start_recording();
        self.dispatch(command, Some(echo))
    }

    pub fn stop_recording(&mut self) -> bool {
        let (command, echo) = self.toggles.stop_recording();
        self.dispatch(command, Some(echo))
    }

    // Discrete controls

    pub fn switch_gear(&mut self, gear: Gear) -> bool {
        self.dispatch(Command::SwitchGear(gear), Some(LocalEcho::GearSelected(gear)))
    }

    pub fn take_picture(&self) -> bool {
        self.dispatch(Command::TakePicture, None)
    }

    pub fn restart_audio(&self) -> bool {
        self.dispatch(Command::RestartAudio, None)
    }

    /// Upload a locally chosen audio file. The payload is base64-encoded
    /// by the wire layer.
    pub fn upload_audio(&self, name: impl Into<String>, data: Vec<u8>) -> bool {
        self.dispatch(Command::NewAudio { name: name.into(), data }, None)
    }

    /// Read access for presentation glue that renders the knobs.
    pub fn volume_angle(&self) -> f64 {
        self.volume.value()
    }

    pub fn pan_angle(&self) -> f64 {
        self.pan.value()
    }

    pub fn zoom_value(&self) -> f64 {
        self.zoom.value()
    }
}
