//! Keyboard path of the input reconciler.
//!
//! Two independent physical axes: longitudinal (forward/backward) and
//! lateral (left/right). Each key transition maps to exactly one command,
//! and transitions on one axis never affect the other, so releasing a
//! steering key while a movement key is held does not stop the vehicle.

use crate::protocol::Command;
use crate::state::{ActiveDirections, Axis, Direction, LocalEcho};

/// Tracks which movement keys are held and maps key transitions to
/// commands plus optimistic echoes.
///
/// Key-down is always a fresh intent: platform auto-repeat produces
/// redundant-but-harmless duplicate commands, and idempotence lives in the
/// direction set, not here.
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: ActiveDirections,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directions whose keys are currently held.
    pub fn held(&self) -> ActiveDirections {
        self.held
    }

    /// A movement key went down. Emits the directional command for that key.
    pub fn key_down(&mut self, direction: Direction) -> (Command, LocalEcho) {
        self.held.insert(direction);

        let command = match direction {
            Direction::Forward => Command::MoveForward,
            Direction::Backward => Command::MoveBackward,
            Direction::Left => Command::TurnLeft,
            Direction::Right => Command::TurnRight,
        };

        (command, LocalEcho::DirectionDown(direction))
    }

    /// A movement key came up. Emits the stop/neutral command for that
    /// key's axis only.
    pub fn key_up(&mut self, direction: Direction) -> (Command, LocalEcho) {
        self.held.remove(direction);

        let command = match direction {
            Direction::Forward | Direction::Backward => Command::StopMoving,
            Direction::Left => Command::UnturnLeft,
            Direction::Right => Command::UnturnRight,
        };

        (command, LocalEcho::AxisReleased(direction.axis()))
    }
}
