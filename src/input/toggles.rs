//! Toggle path: one command per click, optimistic local state.
//!
//! Each toggle flips its local guess immediately and emits exactly one
//! command. The device's confirming telemetry is allowed to silently
//! overwrite the guess later (last-writer-wins; telemetry beats stale
//! optimism).

use crate::protocol::Command;
use crate::state::LocalEcho;

/// Optimistic toggle state for the clickable controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Toggles {
    pub paused: bool,
    pub muted: bool,
    pub looping: bool,
    pub night_mode: bool,
    pub powered: bool,
    pub recording: bool,
}

impl Toggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause alternates between two distinct commands depending on the
    /// current optimistic guess.
    pub fn toggle_pause(&mut self) -> (Command, LocalEcho) {
        self.paused = !self.paused;
        let command = if self.paused { Command::PauseAudio } else { Command::ResumeAudio };
        (command, LocalEcho::PauseToggled)
    }

    pub fn toggle_mute(&mut self) -> (Command, LocalEcho) {
        self.muted = !self.muted;
        (Command::ToggleMute, LocalEcho::MuteToggled)
    }

    pub fn toggle_loop(&mut self) -> (Command, LocalEcho) {
        self.looping = !self.looping;
        (Command::ToggleLoop, LocalEcho::LoopToggled)
    }

    /// Night mode carries its new value on the wire (0/1).
    pub fn toggle_night_mode(&mut self) -> (Command, LocalEcho) {
        self.night_mode = !self.night_mode;
        (Command::ToggleNightMode(self.night_mode), LocalEcho::NightMode(self.night_mode))
    }

    pub fn toggle_power(&mut self) -> (Command, LocalEcho) {
        self.powered = !self.powered;
        (Command::ToggleMotorStatus, LocalEcho::PowerToggled)
    }

    pub fn start_recording(&mut self) -> (Command, LocalEcho) {
        self.recording = true;
        (Command::StartRecording, LocalEcho::Recording(true))
    }

    pub fn stop_recording(&mut self) -> (Command, LocalEcho) {
        self.recording = false;
        (Command::StopRecording, LocalEcho::Recording(false))
    }
}
