//! Derived client-side state.
//!
//! Small value objects mutated only by the driver task: either
//! authoritatively from classified telemetry or optimistically from local
//! input echoes. Presentation collaborators consume read-only snapshots
//! published over a watch channel; they never mutate state directly.

mod directions;
mod playback;
mod vehicle;

pub use directions::{ActiveDirections, Axis, Direction};
pub use playback::{AudioPlayback, parse_duration};
pub use vehicle::{Gear, LocalEcho, SpeedReadout, SpeedTone, VehicleState};
