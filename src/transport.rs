//! Transport trait for the inbound message stream.
//!
//! The driver consumes text frames through this trait so it can be driven
//! by the live WebSocket in production and by a scripted transport in
//! tests. The transport delivers messages in wire order; the whole
//! chunked-video sub-protocol depends on that ordering.

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::SplitStream;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::trace;

use crate::{LinkError, Result};

/// Source of inbound telemetry text frames.
///
/// Returns:
/// - `Ok(Some(text))` - next message, in transport order
/// - `Ok(None)` - orderly close (normal termination)
/// - `Err(e)` - transport failure
#[async_trait]
pub trait Transport: Send + 'static {
    async fn next_message(&mut self) -> Result<Option<String>>;
}

/// Read half of the live WebSocket session.
pub struct WsTransport {
    reader: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl WsTransport {
    pub fn new(reader: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn next_message(&mut self) -> Result<Option<String>> {
        loop {
            match self.reader.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(other)) => {
                    // Pings and pongs are handled by tungstenite itself;
                    // the device never sends binary frames.
                    trace!(kind = ?other, "ignoring non-text frame");
                }
                Some(Err(e)) => {
                    return Err(LinkError::transport("websocket read", Box::new(e)));
                }
            }
        }
    }
}
