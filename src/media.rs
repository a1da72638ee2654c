//! Media reconstruction: live preview frames and chunked video transfers.
//!
//! Two paths with different lifetimes. A preview frame is complete in a
//! single message and only the newest one matters; the driver publishes
//! decoded frames through a watch channel, so an undelivered frame is
//! silently superseded by the next (drop-old-on-new). A recorded video
//! arrives as a sequence of base64 chunks with a terminal completion signal
//! and is reassembled here.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use crate::{LinkError, Result};

/// One decoded camera frame (JPEG bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    pub jpeg: Vec<u8>,
}

impl CameraFrame {
    /// Decode a frame from its base64 wire payload.
    pub fn from_base64(data: &str) -> Result<Self> {
        let jpeg = BASE64.decode(data).map_err(|e| LinkError::media_decode("camera frame", e))?;
        Ok(Self { jpeg })
    }
}

/// A completed video transfer, ready to be saved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub bytes: Vec<u8>,
}

impl VideoArtifact {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Accumulates a chunked video transfer between its implicit start and the
/// terminal completion signal.
///
/// The wire protocol carries no sequence numbers or integrity check: chunk
/// order is arrival order, which is only sound because the sub-protocol
/// runs over a single ordered transport connection. The assembler trusts
/// that ordering and nothing else.
#[derive(Debug, Default)]
pub struct VideoAssembler {
    chunks: Vec<Vec<u8>>,
}

impl VideoAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and append one chunk in arrival order.
    ///
    /// An undecodable chunk is rejected without touching the buffer; the
    /// driver logs it and the transfer continues with what it has.
    pub fn append_base64(&mut self, data: &str) -> Result<()> {
        let bytes = BASE64.decode(data).map_err(|e| LinkError::media_decode("video chunk", e))?;
        self.chunks.push(bytes);
        Ok(())
    }

    /// Number of chunks buffered so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Concatenate everything received into one artifact and clear the
    /// buffer unconditionally, even when empty, so an aborted transfer can
    /// never leak into the next one.
    pub fn finalize(&mut self) -> VideoArtifact {
        let total: usize = self.chunks.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for chunk in self.chunks.drain(..) {
            bytes.extend_from_slice(&chunk);
        }
        debug!(bytes = bytes.len(), "video transfer finalized");
        VideoArtifact { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    #[test]
    fn frame_decodes_base64_jpeg() {
        let payload = BASE64.encode([0xFF, 0xD8, 0xFF, 0xE0]);
        let frame = CameraFrame::from_base64(&payload).unwrap();
        assert_eq!(frame.jpeg, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn frame_rejects_invalid_base64() {
        let err = CameraFrame::from_base64("!!! not base64 !!!").unwrap_err();
        assert!(matches!(err, LinkError::MediaDecode { .. }));
    }

    #[test]
    fn chunks_concatenate_in_arrival_order() {
        let mut assembler = VideoAssembler::new();
        assembler.append_base64(&BASE64.encode(b"c1")).unwrap();
        assembler.append_base64(&BASE64.encode(b"c2")).unwrap();
        assembler.append_base64(&BASE64.encode(b"c3")).unwrap();
        assert_eq!(assembler.chunk_count(), 3);

        let artifact = assembler.finalize();
        assert_eq!(artifact.bytes, b"c1c2c3");
        // Buffer is empty immediately after finalization.
        assert_eq!(assembler.chunk_count(), 0);
    }

    #[test]
    fn finalize_on_empty_buffer_yields_empty_artifact() {
        let mut assembler = VideoAssembler::new();
        let artifact = assembler.finalize();
        assert!(artifact.is_empty());
        assert_eq!(artifact.len(), 0);
    }

    #[test]
    fn bad_chunk_leaves_buffer_intact() {
        let mut assembler = VideoAssembler::new();
        assembler.append_base64(&BASE64.encode(b"good")).unwrap();
        assert!(assembler.append_base64("%%%").is_err());
        assert_eq!(assembler.chunk_count(), 1);
        assert_eq!(assembler.finalize().bytes, b"good");
    }

    #[test]
    fn aborted_transfer_does_not_leak_into_next() {
        let mut assembler = VideoAssembler::new();
        assembler.append_base64(&BASE64.encode(b"stale")).unwrap();
        // Completion arrives (possibly for an aborted transfer): clear.
        let _ = assembler.finalize();

        assembler.append_base64(&BASE64.encode(b"fresh")).unwrap();
        assert_eq!(assembler.finalize().bytes, b"fresh");
    }
}
