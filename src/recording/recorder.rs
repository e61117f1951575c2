//! Recorder: runs an encoder against a stream and collects its output

use super::{EncodingSession, MediaEncoder, MimeType};
use crate::artifact::Artifact;
use crate::errors::StudioError;
use crate::platform::SharedStream;
use crate::storage::FileStore;
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Where encoded chunks go while recording
pub enum RecordingTarget {
    /// Keep everything in memory; one artifact on stop
    Buffered,
    /// Append each chunk to `path` in the file store as it arrives
    Incremental {
        files: Arc<dyn FileStore>,
        path: String,
    },
}

/// Result of stopping a recording
#[derive(Debug)]
pub enum RecordingOutcome {
    /// In-memory recording; `None` when the encoder produced no data
    Buffered(Option<Artifact>),
    /// Incremental recording, already complete on disk
    Written { path: String, bytes: u64 },
}

/// Progress of the current recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderSnapshot {
    pub is_recording: bool,
    pub recording_id: Option<String>,
    pub mime_type: Option<String>,
    /// `HH:MM:SS`
    pub elapsed: String,
    pub elapsed_secs: f64,
    pub chunks: u64,
    pub bytes: u64,
}

#[derive(Default)]
struct Progress {
    chunks: AtomicU64,
    bytes: AtomicU64,
}

impl Progress {
    fn record(&self, len: usize) {
        self.chunks.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len as u64, Ordering::Relaxed);
    }
}

enum Collected {
    Buffer(BytesMut),
    Written { path: String, bytes: u64 },
}

struct ActiveRecording {
    id: Uuid,
    mime: MimeType,
    started: Instant,
    session: Box<dyn EncodingSession>,
    collector: JoinHandle<Result<Collected, StudioError>>,
    progress: Arc<Progress>,
}

/// `HH:MM:SS`, hours not wrapped
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// At most one recording at a time
#[derive(Default)]
pub struct Recorder {
    active: Option<ActiveRecording>,
}

impl Recorder {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn mime(&self) -> Option<MimeType> {
        self.active.as_ref().map(|a| a.mime)
    }

    /// Start recording `stream` as `mime` into `target` and return the recording id.
    ///
    /// Must be called from within a Tokio runtime; chunks are collected on a task.
    pub fn start(
        &mut self,
        encoder: &dyn MediaEncoder,
        stream: SharedStream,
        mime: MimeType,
        target: RecordingTarget,
    ) -> Result<String, StudioError> {
        if self.active.is_some() {
            return Err(StudioError::AlreadyRecording);
        }
        if !encoder.is_type_supported(mime.as_str()) {
            return Err(StudioError::NoSupportedEncoding);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let session = encoder.start(stream, mime, tx)?;

        let progress = Arc::new(Progress::default());
        let collector = tokio::spawn(collect(rx, target, progress.clone()));

        let id = Uuid::new_v4();
        log::info!("Recording {} started as {}", id, mime);

        self.active = Some(ActiveRecording {
            id,
            mime,
            started: Instant::now(),
            session,
            collector,
            progress,
        });

        Ok(id.to_string())
    }

    /// Stop the encoder, drain the remaining chunks and finalize
    pub async fn stop(&mut self) -> Result<RecordingOutcome, StudioError> {
        let ActiveRecording {
            id,
            mime,
            started,
            session,
            collector,
            ..
        } = self.active.take().ok_or(StudioError::NotRecording)?;

        // The session closes the chunk channel when it returns, which ends the collector
        let stopped = tokio::task::spawn_blocking(move || session.stop())
            .await
            .map_err(|e| StudioError::Encoding(format!("Encoder task failed: {}", e)))
            .and_then(|result| result);

        let collected = collector
            .await
            .map_err(|e| StudioError::WriteFailure(format!("Chunk writer failed: {}", e)))?;

        stopped?;
        let collected = collected?;

        log::info!(
            "Recording {} stopped after {}",
            id,
            format_elapsed(started.elapsed())
        );

        Ok(match collected {
            Collected::Buffer(buffer) if buffer.is_empty() => {
                log::warn!("Recording {} produced no data", id);
                RecordingOutcome::Buffered(None)
            }
            Collected::Buffer(buffer) => RecordingOutcome::Buffered(Some(Artifact::new(
                buffer.freeze(),
                mime.as_str(),
                mime.extension(),
            ))),
            Collected::Written { path, bytes } => RecordingOutcome::Written { path, bytes },
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.active
            .as_ref()
            .map(|a| a.started.elapsed())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> RecorderSnapshot {
        let elapsed = self.elapsed();
        let (chunks, bytes) = self
            .active
            .as_ref()
            .map(|a| {
                (
                    a.progress.chunks.load(Ordering::Relaxed),
                    a.progress.bytes.load(Ordering::Relaxed),
                )
            })
            .unwrap_or((0, 0));

        RecorderSnapshot {
            is_recording: self.active.is_some(),
            recording_id: self.active.as_ref().map(|a| a.id.to_string()),
            mime_type: self.active.as_ref().map(|a| a.mime.as_str().to_string()),
            elapsed: format_elapsed(elapsed),
            elapsed_secs: elapsed.as_secs_f64(),
            chunks,
            bytes,
        }
    }
}

async fn collect(
    mut rx: mpsc::UnboundedReceiver<Bytes>,
    target: RecordingTarget,
    progress: Arc<Progress>,
) -> Result<Collected, StudioError> {
    match target {
        RecordingTarget::Buffered => {
            let mut buffer = BytesMut::new();
            while let Some(chunk) = rx.recv().await {
                if chunk.is_empty() {
                    continue;
                }
                progress.record(chunk.len());
                buffer.extend_from_slice(&chunk);
            }
            Ok(Collected::Buffer(buffer))
        }
        RecordingTarget::Incremental { files, path } => {
            let mut failure = {
                let files = files.clone();
                let path = path.clone();
                // Creates the file if needed; never truncates a reserved one
                match tokio::task::spawn_blocking(move || files.append(&path, &[])).await {
                    Ok(Ok(_)) => None,
                    Ok(Err(e)) => Some(e),
                    Err(e) => Some(StudioError::WriteFailure(e.to_string())),
                }
            };
            let mut written = 0u64;

            // Keep draining after a failure so the encoder never blocks on us
            while let Some(chunk) = rx.recv().await {
                if chunk.is_empty() || failure.is_some() {
                    continue;
                }
                progress.record(chunk.len());

                let len = chunk.len() as u64;
                let files = files.clone();
                let chunk_path = path.clone();
                match tokio::task::spawn_blocking(move || files.append(&chunk_path, &chunk)).await {
                    Ok(Ok(())) => written += len,
                    Ok(Err(e)) => {
                        log::error!("Failed to append recording chunk to {}: {}", path, e);
                        failure = Some(e);
                    }
                    Err(e) => failure = Some(StudioError::WriteFailure(e.to_string())),
                }
            }

            match failure {
                Some(e) => Err(e),
                None => Ok(Collected::Written {
                    path: files.resolve(&path),
                    bytes: written,
                }),
            }
        }
    }
}
