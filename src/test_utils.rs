//! Shared test helpers.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::Result;
use crate::transport::Transport;

/// Transport that replays a fixed script of inbound messages.
///
/// After the script drains it either reports an orderly close (default) or
/// stays open forever (`pending`), for tests that only exercise the echo
/// inbox.
pub struct ScriptedTransport {
    script: VecDeque<String>,
    hold_open: bool,
}

impl ScriptedTransport {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { script: script.into_iter().map(Into::into).collect(), hold_open: false }
    }

    /// A transport that delivers nothing and never closes.
    pub fn pending() -> Self {
        Self { script: VecDeque::new(), hold_open: true }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn next_message(&mut self) -> Result<Option<String>> {
        match self.script.pop_front() {
            Some(message) => Ok(Some(message)),
            None if self.hold_open => futures::future::pending().await,
            None => Ok(None),
        }
    }
}
