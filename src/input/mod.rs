//! Input reconciliation: concurrent physical inputs to a coherent command
//! stream.
//!
//! Three paths with different reconciliation rules. The keyboard path maps
//! every key transition to exactly one command across two independent axes.
//! The continuous path (knobs, sliders) clamps and change-gates so drags
//! never flood the link with near-duplicate values. The toggle path flips
//! optimistic state and emits one command per click.

mod analog;
mod controller;
mod keys;
mod toggles;

pub use analog::{KnobTracker, SliderTracker};
pub use controller::{CommandSink, Controller};
pub use keys::KeyTracker;
pub use toggles::Toggles;
