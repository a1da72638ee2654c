//! Error types for the command/telemetry link.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The link is deliberately forgiving: most wire-level problems
//! (malformed telemetry, unknown message shapes, undecodable media payloads)
//! are handled as diagnostics inside the driver and never surface here. The
//! variants below cover the cases a caller can actually observe.
//!
//! ## Error Categories
//!
//! - **Connection Errors**: failures establishing the WebSocket session
//! - **Transport Errors**: the socket broke after it was established
//! - **Parse Errors**: inbound text that is not valid telemetry JSON
//! - **Media Errors**: base64 payloads that do not decode
//! - **Channel Errors**: an internal task went away
//!
//! ## Recovery
//!
//! ```rust
//! use roverlink::LinkError;
//!
//! let error = LinkError::connection_failed("device not reachable");
//! if error.is_retryable() {
//!     println!("Can retry this operation");
//! }
//! ```

use thiserror::Error;

/// Result type alias for link operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Main error type for link operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Failed to connect to device: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Transport failure: {context}")]
    Transport {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Media decode error in {context}")]
    MediaDecode {
        context: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Internal channel closed: {context}")]
    ChannelClosed { context: String },
}

impl LinkError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// Reconnection is always a caller decision; this only classifies whether
    /// a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinkError::Connection { .. } => true,
            LinkError::Transport { .. } => true,
            LinkError::Parse { .. } => false,
            LinkError::MediaDecode { .. } => false,
            LinkError::ChannelClosed { .. } => false,
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        LinkError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for transport errors.
    pub fn transport(
        context: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Transport { context: context.into(), source: Some(source) }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        LinkError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for media decode errors.
    pub fn media_decode(context: impl Into<String>, source: base64::DecodeError) -> Self {
        LinkError::MediaDecode { context: context.into(), source }
    }

    /// Helper constructor for closed internal channels.
    pub fn channel_closed(context: impl Into<String>) -> Self {
        LinkError::ChannelClosed { context: context.into() }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Parse { context: "telemetry json".to_string(), details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_format_correctly_with_arbitrary_context(
            reason in ".*",
            context in "\\w+",
            details in ".*"
          ) {
            // Property: Error messages contain the context they were built with
            let connection_error = LinkError::connection_failed(reason.clone());
            let parse_error = LinkError::parse_error(context.clone(), details.clone());
            let channel_error = LinkError::channel_closed(context.clone());

            prop_assert!(connection_error.to_string().contains(&reason));
            prop_assert!(parse_error.to_string().contains(&context));
            prop_assert!(parse_error.to_string().contains(&details));
            prop_assert!(channel_error.to_string().contains(&context));

            // Property: No error message should be empty
            prop_assert!(!connection_error.to_string().is_empty());
            prop_assert!(!parse_error.to_string().is_empty());
            prop_assert!(!channel_error.to_string().is_empty());
          }

          #[test]
          fn error_source_chaining_preserves_information(
            base_message in ".*",
            reason in ".*"
          ) {
            // Property: The source chain keeps the underlying cause reachable
            let base: Box<dyn std::error::Error + Send + Sync> =
              Box::new(std::io::Error::other(base_message.clone()));
            let top = LinkError::connection_failed_with_source(reason, base);

            let source = std::error::Error::source(&top);
            prop_assert!(source.is_some());
            if let Some(source) = source {
              prop_assert!(source.to_string().contains(&base_message));
            }
          }
        }
    }

    #[test]
    fn error_constructors_validation() {
        let conn_error = LinkError::connection_failed("test");
        assert!(matches!(conn_error, LinkError::Connection { .. }));

        let parse_error = LinkError::parse_error("frame", "bad json");
        assert!(matches!(parse_error, LinkError::Parse { .. }));

        let channel_error = LinkError::channel_closed("writer");
        assert!(matches!(channel_error, LinkError::ChannelClosed { .. }));
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: LinkError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<LinkError>();

        let error = LinkError::connection_failed("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retryability_classification() {
        assert!(LinkError::connection_failed("test").is_retryable());
        assert!(!LinkError::parse_error("frame", "bad").is_retryable());
        assert!(!LinkError::channel_closed("writer").is_retryable());
    }

    #[test]
    fn from_serde_json_is_a_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let link_err: LinkError = json_err.into();
        assert!(matches!(link_err, LinkError::Parse { .. }));
    }
}
