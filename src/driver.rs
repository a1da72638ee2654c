//! Driver task: routes inbound telemetry and local echoes into state,
//! media, and notices.
//!
//! One task owns everything mutable (the vehicle state and the video
//! assembler), so no locking exists anywhere. The task has two inboxes
//! (transport messages, local echoes) and publishes through latest-wins
//! watch channels plus a broadcast channel for discrete notices.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::connection::LinkState;
use crate::media::{CameraFrame, VideoArtifact, VideoAssembler};
use crate::protocol::Telemetry;
use crate::protocol::telemetry;
use crate::state::{LocalEcho, VehicleState};
use crate::transport::Transport;

/// Capacity of the notice broadcast. Laggards lose the oldest notices,
/// which is acceptable for user-facing notifications.
const NOTICE_CAPACITY: usize = 64;

/// A discrete, user-visible event that is not part of the derived state.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The device saved a photo at this path.
    PhotoSaved { path: String },
    /// The device saved a recorded video at this path.
    VideoSaved { path: String },
    /// A chunked video transfer completed and was reassembled.
    VideoReady(Arc<VideoArtifact>),
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Receiver for decoded camera frames (latest wins)
    pub frames: watch::Receiver<Option<Arc<CameraFrame>>>,
    /// Receiver for vehicle state snapshots
    pub state: watch::Receiver<Arc<VehicleState>>,
    /// Notice broadcast; call `.subscribe()` per consumer
    pub notices: broadcast::Sender<Notice>,
    /// Sender for optimistic local echoes from the input path
    pub echoes: mpsc::UnboundedSender<LocalEcho>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the telemetry routing task
pub struct Driver;

impl Driver {
    /// Spawn the driver task over the given transport.
    ///
    /// `link_state` is updated when the transport closes or fails; the
    /// driver never reconnects on its own. The sender is shared with the
    /// connection's writer task.
    pub fn spawn<T>(transport: T, link_state: Arc<watch::Sender<LinkState>>) -> DriverChannels
    where
        T: Transport,
    {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(Arc::new(VehicleState::new()));
        let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);
        let (echo_tx, echo_rx) = mpsc::unbounded_channel();

        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();
        let notices = notice_tx.clone();

        tokio::spawn(async move {
            Self::route_task(transport, frame_tx, state_tx, notice_tx, echo_rx, link_state, cancel_task)
                .await;
        });

        DriverChannels { frames: frame_rx, state: state_rx, notices, echoes: echo_tx, cancel }
    }

    /// Routing task: single owner of state and the video assembler.
    async fn route_task<T>(
        mut transport: T,
        frame_tx: watch::Sender<Option<Arc<CameraFrame>>>,
        state_tx: watch::Sender<Arc<VehicleState>>,
        notice_tx: broadcast::Sender<Notice>,
        mut echo_rx: mpsc::UnboundedReceiver<LocalEcho>,
        link_state: Arc<watch::Sender<LinkState>>,
        cancel: CancellationToken,
    ) where
        T: Transport,
    {
        info!("telemetry router started");
        let mut state = VehicleState::new();
        let mut assembler = VideoAssembler::new();
        let mut message_count = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("telemetry router cancelled");
                    let _ = link_state.send(LinkState::Closed);
                    break;
                }

                echo = echo_rx.recv() => {
                    match echo {
                        Some(echo) => {
                            if state.apply_echo(&echo) {
                                let _ = state_tx.send(Arc::new(state.clone()));
                            }
                        }
                        // Input side dropped; telemetry continues alone.
                        None => trace!("echo channel closed"),
                    }
                }

                message = transport.next_message() => {
                    match message {
                        Ok(Some(text)) => {
                            message_count += 1;
                            Self::route_message(
                                &text,
                                &mut state,
                                &mut assembler,
                                &frame_tx,
                                &state_tx,
                                &notice_tx,
                            );
                        }
                        Ok(None) => {
                            info!("transport closed after {} messages", message_count);
                            let _ = link_state.send(LinkState::Closed);
                            break;
                        }
                        Err(e) => {
                            // No retry: reconnection is a user decision.
                            error!("transport error: {}", e);
                            let _ = link_state.send(LinkState::Errored);
                            break;
                        }
                    }
                }
            }
        }

        info!("telemetry router ended ({} messages routed)", message_count);
    }

    /// Classify one text frame and dispatch it to exactly one place.
    fn route_message(
        text: &str,
        state: &mut VehicleState,
        assembler: &mut VideoAssembler,
        frame_tx: &watch::Sender<Option<Arc<CameraFrame>>>,
        state_tx: &watch::Sender<Arc<VehicleState>>,
        notice_tx: &broadcast::Sender<Notice>,
    ) {
        let event = match telemetry::decode(text) {
            Ok(Some(event)) => event,
            Ok(None) => {
                // Permissive by default: unmatched shapes are not errors.
                trace!("unclassified telemetry ignored");
                return;
            }
            Err(e) => {
                warn!("malformed telemetry discarded: {}", e);
                return;
            }
        };

        match event {
            Telemetry::Frame { data } => match CameraFrame::from_base64(&data) {
                // Watch semantics: an undelivered frame is superseded.
                Ok(frame) => {
                    let _ = frame_tx.send(Some(Arc::new(frame)));
                }
                Err(e) => warn!("undecodable camera frame discarded: {}", e),
            },
            Telemetry::VideoChunk { data } => {
                if let Err(e) = assembler.append_base64(&data) {
                    warn!("undecodable video chunk discarded: {}", e);
                } else {
                    trace!(chunks = assembler.chunk_count(), "video chunk buffered");
                }
            }
            Telemetry::VideoCompleted => {
                let artifact = assembler.finalize();
                debug!(bytes = artifact.len(), "video artifact ready");
                let _ = notice_tx.send(Notice::VideoReady(Arc::new(artifact)));
            }
            Telemetry::PhotoSaved { path } => {
                let _ = notice_tx.send(Notice::PhotoSaved { path });
            }
            Telemetry::VideoSaved { path } => {
                let _ = notice_tx.send(Notice::VideoSaved { path });
            }
            other => {
                if state.apply_telemetry(&other) {
                    let _ = state_tx.send(Arc::new(state.clone()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Direction;
    use crate::test_utils::ScriptedTransport;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use tokio::time::{Duration, timeout};

    async fn changed<T: Clone>(rx: &mut watch::Receiver<T>) -> T {
        timeout(Duration::from_secs(1), rx.changed()).await.expect("timed out").expect("closed");
        rx.borrow_and_update().clone()
    }

    #[tokio::test]
    async fn routes_speed_telemetry_into_state() {
        let transport =
            ScriptedTransport::new(vec![r#"{"ok":true,"motorspeed":-12,"direction":"backward"}"#]);
        let (link_tx, _link_rx) = watch::channel(LinkState::Open);
        let link_tx = Arc::new(link_tx);
        let mut channels = Driver::spawn(transport, link_tx);

        let snapshot = changed(&mut channels.state).await;
        assert_eq!(snapshot.speed, -12.0);
        assert!(snapshot.directions.contains(Direction::Backward));
    }

    #[tokio::test]
    async fn malformed_and_unknown_messages_mutate_nothing() {
        let transport = ScriptedTransport::new(vec![
            "this is not json",
            r#"{"ok":true,"mystery":1}"#,
            r#"{"ok":true,"motorStarted":true}"#,
        ]);
        let (link_tx, _link_rx) = watch::channel(LinkState::Open);
        let link_tx = Arc::new(link_tx);
        let mut channels = Driver::spawn(transport, link_tx);

        // The only published snapshot is from the one valid message.
        let snapshot = changed(&mut channels.state).await;
        assert!(snapshot.powered);
    }

    #[tokio::test]
    async fn frame_watch_always_holds_the_latest() {
        let first = BASE64.encode(b"frame-1");
        let second = BASE64.encode(b"frame-2");
        let transport = ScriptedTransport::new(vec![
            format!(r#"{{"ok":true,"streaming":true,"frame":"{first}"}}"#),
            format!(r#"{{"ok":true,"streaming":true,"frame":"{second}"}}"#),
        ]);
        let (link_tx, mut link_rx) = watch::channel(LinkState::Open);
        let link_tx = Arc::new(link_tx);
        let channels = Driver::spawn(transport, link_tx);

        // Wait for the transport to drain, then read once: only the newest
        // frame is observable (drop-old-on-new).
        timeout(Duration::from_secs(1), link_rx.wait_for(|s| *s == LinkState::Closed))
            .await
            .expect("timed out")
            .expect("closed");
        let frame = channels.frames.borrow().clone().expect("frame published");
        assert_eq!(frame.jpeg, b"frame-2");
    }

    #[tokio::test]
    async fn chunked_video_is_reassembled_in_order() {
        let chunks: Vec<String> = [b"c1".as_slice(), b"c2", b"c3"]
            .iter()
            .map(|c| format!(r#"{{"sendingvideo":true,"videoChunk":"{}"}}"#, BASE64.encode(c)))
            .collect();
        let mut script = chunks;
        script.push(r#"{"ok":true,"videoCompleted":true}"#.to_string());

        let transport = ScriptedTransport::new(script);
        let (link_tx, _link_rx) = watch::channel(LinkState::Open);
        let link_tx = Arc::new(link_tx);
        let channels = Driver::spawn(transport, link_tx);
        let mut notices = channels.notices.subscribe();

        let notice = timeout(Duration::from_secs(1), notices.recv())
            .await
            .expect("timed out")
            .expect("notice");
        match notice {
            Notice::VideoReady(artifact) => assert_eq!(artifact.bytes, b"c1c2c3"),
            other => panic!("unexpected notice: {other:?}"),
        }
    }

    #[tokio::test]
    async fn saved_paths_become_notices() {
        let transport = ScriptedTransport::new(vec![
            r#"{"ok":true,"photoPath":"user/photos/p.jpg"}"#,
            r#"{"ok":true,"videoPath":"user/videos/v.avi"}"#,
        ]);
        let (link_tx, _link_rx) = watch::channel(LinkState::Open);
        let link_tx = Arc::new(link_tx);
        let channels = Driver::spawn(transport, link_tx);
        let mut notices = channels.notices.subscribe();

        let first = timeout(Duration::from_secs(1), notices.recv()).await.unwrap().unwrap();
        assert_eq!(first, Notice::PhotoSaved { path: "user/photos/p.jpg".to_string() });
        let second = timeout(Duration::from_secs(1), notices.recv()).await.unwrap().unwrap();
        assert_eq!(second, Notice::VideoSaved { path: "user/videos/v.avi".to_string() });
    }

    #[tokio::test]
    async fn echoes_update_state_optimistically() {
        let transport = ScriptedTransport::pending();
        let (link_tx, _link_rx) = watch::channel(LinkState::Open);
        let link_tx = Arc::new(link_tx);
        let mut channels = Driver::spawn(transport, link_tx);

        channels.echoes.send(LocalEcho::DirectionDown(Direction::Forward)).unwrap();
        let snapshot = changed(&mut channels.state).await;
        assert!(snapshot.directions.contains(Direction::Forward));
    }

    #[tokio::test]
    async fn transport_close_surfaces_as_link_state() {
        let transport = ScriptedTransport::new(Vec::<String>::new());
        let (link_tx, mut link_rx) = watch::channel(LinkState::Open);
        let link_tx = Arc::new(link_tx);
        let _channels = Driver::spawn(transport, link_tx);

        timeout(Duration::from_secs(1), link_rx.wait_for(|s| *s == LinkState::Closed))
            .await
            .expect("timed out")
            .expect("closed");
    }
}
