//! Connection manager: socket lifecycle and the guarded send primitive.
//!
//! Owns the single WebSocket session. The read half feeds the driver task;
//! the write half is owned by a writer task fed through a bounded queue.
//! Sends are best-effort: [`CommandHandle::try_send`] performs no write and
//! returns `false` unless the link is `Open`. There is no automatic
//! reconnect; a closed or errored link is surfaced through the state watch
//! and reconnecting is the caller's decision.


use std::sync::Arc;

use futures::Stream;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::driver::{Driver, DriverChannels, Notice};
use crate::input::{CommandSink, Controller};
use crate::media::CameraFrame;
use crate::protocol::Command;
use crate::state::{LocalEcho, VehicleState};
use crate::stream::DistinctExt;
use crate::transport::WsTransport;
use crate::{LinkError, Result};

/// Outbound queue depth. Control traffic is small and real-time; anything
/// that backs up this far is better dropped than delivered late.
const COMMAND_QUEUE: usize = 32;

/// Lifecycle of the one transport handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closing,
    Closed,
    Errored,
}

/// Cloneable, guarded command output.
///
/// The open-state check happens here, before every send, for every caller.
#[derive(Clone)]
pub struct CommandHandle {
    queue: mpsc::Sender<String>,
    state: watch::Receiver<LinkState>,
}

impl CommandHandle {
    /// Send a command if the link is open. Returns `false` and performs no
    /// write otherwise. Fire-and-forget: no acknowledgement is tracked.
    pub fn try_send(&self, command: &Command) -> bool {
        if *self.state.borrow() != LinkState::Open {
            return false;
        }

        let text = match command.encode() {
            Ok(text) => text,
            Err(e) => {
                // Unreachable for well-formed commands; encoding is total.
                warn!("command failed to encode: {}", e);
                return false;
            }
        };

        match self.queue.try_send(text) {
            Ok(()) => true,
            Err(e) => {
                debug!(command = command.name(), "outbound queue refused: {}", e);
                false
            }
        }
    }

    /// Current link state as seen by this handle.
    pub fn link_state(&self) -> LinkState {
        *self.state.borrow()
    }

    #[cfg(test)]
    pub(crate) fn for_tests(
        queue: mpsc::Sender<String>,
        state: watch::Receiver<LinkState>,
    ) -> Self {
        Self { queue, state }
    }
}

impl CommandSink for CommandHandle {
    fn try_send(&self, command: &Command) -> bool {
        CommandHandle::try_send(self, command)
    }
}

/// One live command/telemetry session with the device.
pub struct LinkConnection {
    handle: CommandHandle,
    frames: watch::Receiver<Option<Arc<CameraFrame>>>,
    state: watch::Receiver<Arc<VehicleState>>,
    notices: broadcast::Sender<Notice>,
    echoes: mpsc::UnboundedSender<LocalEcho>,
    link_state: Arc<watch::Sender<LinkState>>,
    link_state_rx: watch::Receiver<LinkState>,
    cancel: CancellationToken,
}

impl LinkConnection {
    /// Connect to the device and start the session tasks.
    ///
    /// The first outbound command is always `start-video-streaming`: the
    /// client requests the live preview before anything else happens.
    pub async fn connect(url: &str) -> Result<Self> {
        info!(url, "connecting to device");
        let (link_state, link_state_rx) = watch::channel(LinkState::Connecting);
        let link_state = Arc::new(link_state);

        let (ws, _response) = connect_async(url).await.map_err(|e| {
            LinkError::connection_failed_with_source(format!("websocket connect to {url}"), Box::new(e))
        })?;
        let (sink, reader) = ws.split();

        let _ = link_state.send(LinkState::Open);
        info!("link established");

        // Writer task owns the sink; the bounded queue is the only way in.
        let (queue_tx, queue_rx) = mpsc::channel(COMMAND_QUEUE);

        let DriverChannels { frames, state, notices, echoes, cancel } =
            Driver::spawn(WsTransport::new(reader), Arc::clone(&link_state));

        tokio::spawn(writer_task(sink, queue_rx, Arc::clone(&link_state), cancel.clone()));

        let handle = CommandHandle { queue: queue_tx, state: link_state_rx.clone() };

        // The implicit first command. The link just opened, so a refusal
        // here only means the writer already died.
        if !handle.try_send(&Command::StartVideoStreaming) {
            warn!("failed to request live preview on open");
        }

        Ok(Self {
            handle,
            frames,
            state,
            notices,
            echoes,
            link_state,
            link_state_rx,
            cancel,
        })
    }

    /// Guarded command output; cheap to clone and hand to input glue.
    pub fn handle(&self) -> CommandHandle {
        self.handle.clone()
    }

    /// A controller wired to this connection's send guard and echo inbox.
    pub fn controller(&self) -> Controller<CommandHandle> {
        Controller::new(self.handle.clone(), self.echoes.clone())
    }

    /// Latest decoded camera frame. A newly arriving frame supersedes any
    /// undelivered predecessor.
    pub fn latest_frame(&self) -> Option<Arc<CameraFrame>> {
        self.frames.borrow().clone()
    }

    /// Stream of camera frames (drop-old-on-new).
    pub fn frame_stream(&self) -> impl Stream<Item = Arc<CameraFrame>> + 'static {
        WatchStream::new(self.frames.clone()).filter_map(|opt| async move { opt })
    }

    /// Current vehicle state snapshot.
    pub fn current_state(&self) -> Arc<VehicleState> {
        self.state.borrow().clone()
    }

    /// Stream of state snapshots, duplicates suppressed.
    pub fn state_updates(&self) -> impl Stream<Item = Arc<VehicleState>> + 'static {
        WatchStream::new(self.state.clone()).distinct()
    }

    /// Subscribe to discrete notices (saved media, finished transfers).
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Watch the link lifecycle.
    pub fn link_state(&self) -> watch::Receiver<LinkState> {
        self.link_state_rx.clone()
    }

    /// Close the session. Pending outbound commands are discarded.
    pub fn close(self) {
        let _ = self.link_state.send(LinkState::Closing);
        self.cancel.cancel();
    }
}

impl Drop for LinkConnection {
    fn drop(&mut self) {
        debug!("dropping link connection");
        self.cancel.cancel();
    }
}

async fn writer_task<S>(
    mut sink: S,
    mut queue: mpsc::Receiver<String>,
    link_state: Arc<watch::Sender<LinkState>>,
    cancel: CancellationToken,
) where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("writer cancelled");
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            next = queue.recv() => {
                match next {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            warn!("wire write failed: {}", e);
                            let _ = link_state.send(LinkState::Errored);
                            break;
                        }
                    }
                    None => {
                        debug!("all command handles dropped");
                        break;
                    }
                }
            }
        }
    }
}
