//! Wire protocol: outbound commands and inbound telemetry.
//!
//! Outbound frames are `{"type": <command-name>, "content": <value>}`;
//! inbound frames are `{"ok": bool, ...}` objects classified by shape.
//! The protocol is unversioned; see `telemetry` for the consequences.

pub mod command;
pub mod telemetry;

pub use command::{Command, Content, WireCommand};
pub use telemetry::{RawTelemetry, Telemetry, classify, decode};
