//! Video recording for EndoStudio
//!
//! The recorder never encodes video itself. It asks a [`MediaEncoder`] for the
//! first container it supports, lets it run against the current stream, and
//! collects the chunks it produces either in memory or straight into a file.
//!
//! # Example
//! ```rust,ignore
//! use endostudio::recording::{select_mime, Recorder, RecordingTarget};
//!
//! let mime = select_mime(encoder.as_ref())?;
//! let mut recorder = Recorder::new();
//! recorder.start(encoder.as_ref(), stream, mime, RecordingTarget::Buffered)?;
//!
//! // Later:
//! let outcome = recorder.stop().await?;
//! ```

mod encoder;
mod mime;
mod recorder;

pub use encoder::NativeEncoder;
pub use mime::{select_mime, MimeType};
pub use recorder::{format_elapsed, Recorder, RecorderSnapshot, RecordingOutcome, RecordingTarget};

use crate::errors::StudioError;
use crate::platform::SharedStream;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Media-encoding capability (the platform's MediaRecorder)
pub trait MediaEncoder: Send + Sync {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Start encoding `stream` as `mime`. Encoded data is sent on `chunks` in
    /// order until the session is stopped.
    fn start(
        &self,
        stream: SharedStream,
        mime: MimeType,
        chunks: mpsc::UnboundedSender<Bytes>,
    ) -> Result<Box<dyn EncodingSession>, StudioError>;
}

/// A running encoder
pub trait EncodingSession: Send {
    /// Stop encoding, emit any remaining data and close the chunk channel.
    /// Blocks until the encoder has finished.
    fn stop(self: Box<Self>) -> Result<(), StudioError>;
}

#[cfg(test)]
mod tests;
