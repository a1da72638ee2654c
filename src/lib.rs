//! Async command/telemetry synchronization core for remote-controlled
//! vehicles.
//!
//! Roverlink is the protocol layer of a remote-control client: it encodes
//! user intents into fire-and-forget JSON commands, classifies the device's
//! loosely-tagged telemetry into typed events, reconstructs streamed media
//! (live preview frames and chunked video transfers), and reconciles
//! overlapping physical inputs into a coherent command stream, all over
//! one persistent WebSocket connection.
//!
//! # Features
//!
//! - **Guarded sends**: commands are dropped, never queued, when the link
//!   is not open; control is real-time and stale commands are worthless
//! - **Shape-based telemetry routing**: ordered first-match-wins
//!   classification, faithful to the unversioned wire protocol
//! - **Media reconstruction**: latest-wins camera frames and ordered
//!   chunked-video reassembly
//! - **Input reconciliation**: independent movement axes, change-gated
//!   analog controls, optimistic toggles
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use roverlink::{Direction, Roverlink};
//!
//! #[tokio::main]
//! async fn main() -> roverlink::Result<()> {
//!     let link = Roverlink::connect("wss://localhost:8765").await?;
//!     let mut controller = link.controller();
//!     let mut frames = std::pin::pin!(link.frame_stream());
//!
//!     controller.key_down(Direction::Forward);
//!
//!     while let Some(frame) = frames.next().await {
//!         println!("frame: {} bytes", frame.jpeg.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod media;
pub mod protocol;
pub mod state;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Link architecture
pub mod connection;
pub mod driver;
pub mod input;
pub mod stream;
pub mod transport;

// Core exports
pub use error::{LinkError, Result};
pub use media::{CameraFrame, VideoArtifact, VideoAssembler};
pub use protocol::{Command, Telemetry};
pub use state::{
    ActiveDirections, AudioPlayback, Axis, Direction, Gear, LocalEcho, SpeedReadout, SpeedTone,
    VehicleState,
};

// Link exports
pub use connection::{CommandHandle, LinkConnection, LinkState};
pub use driver::Notice;
pub use input::{Controller, KeyTracker, KnobTracker, SliderTracker, Toggles};

/// Unified entry point for device sessions.
///
/// # Examples
///
/// ```rust,no_run
/// use roverlink::Roverlink;
///
/// #[tokio::main]
/// async fn main() -> roverlink::Result<()> {
///     let link = Roverlink::connect("wss://localhost:8765").await?;
///     // Use link...
///     Ok(())
/// }
/// ```
pub struct Roverlink;

impl Roverlink {
    /// Connect to the device's control endpoint.
    ///
    /// Establishes the WebSocket session, starts the routing tasks, and
    /// requests the live camera preview as the first outbound command.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable or the WebSocket
    /// handshake fails. There is no retry; reconnection is the caller's
    /// decision.
    pub async fn connect(url: &str) -> Result<LinkConnection> {
        LinkConnection::connect(url).await
    }
}
