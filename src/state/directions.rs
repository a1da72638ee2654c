//! Movement directions and the active-direction set.

use serde::{Deserialize, Serialize};

/// A movement direction reported by telemetry or asserted by local input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

/// The two independent physical axes a direction belongs to.
///
/// Longitudinal (forward/backward) and lateral (left/right) inputs never
/// interact: releasing a steering key must not stop forward motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Longitudinal,
    Lateral,
}

impl Direction {
    /// Wire tag for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parse a wire tag. Unknown tags yield `None` (permissive policy).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "forward" => Some(Direction::Forward),
            "backward" => Some(Direction::Backward),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// The axis this direction moves along.
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Forward | Direction::Backward => Axis::Longitudinal,
            Direction::Left | Direction::Right => Axis::Lateral,
        }
    }
}

/// Set of directions the vehicle is currently (assumed or confirmed) moving in.
///
/// Written optimistically by the input path and authoritatively by telemetry.
/// Both writers only ever add or remove individual directions, never replace
/// the whole set, so concurrent intent cannot be clobbered. Adds and removes
/// are idempotent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDirections {
    bits: u8,
}

impl ActiveDirections {
    const fn bit(direction: Direction) -> u8 {
        match direction {
            Direction::Forward => 0b0001,
            Direction::Backward => 0b0010,
            Direction::Left => 0b0100,
            Direction::Right => 0b1000,
        }
    }

    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a direction active. Repeated inserts are no-ops.
    pub fn insert(&mut self, direction: Direction) {
        self.bits |= Self::bit(direction);
    }

    /// Mark a direction inactive. Removing an absent direction is a no-op.
    pub fn remove(&mut self, direction: Direction) {
        self.bits &= !Self::bit(direction);
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.bits & Self::bit(direction) != 0
    }

    /// Clear only the motion-type directions (forward/backward).
    ///
    /// Used when telemetry reports the vehicle is stopping; steering state
    /// is untouched.
    pub fn clear_longitudinal(&mut self) {
        self.bits &= !(Self::bit(Direction::Forward) | Self::bit(Direction::Backward));
    }

    /// Clear only the steering-type directions (left/right).
    ///
    /// Used when telemetry reports the wheels are straightening.
    pub fn clear_lateral(&mut self) {
        self.bits &= !(Self::bit(Direction::Left) | Self::bit(Direction::Right));
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterate the active directions in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        [Direction::Forward, Direction::Backward, Direction::Left, Direction::Right]
            .into_iter()
            .filter(|d| self.contains(*d))
    }
}
