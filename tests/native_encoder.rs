//! H.264/MP4 recording through the native encoder
//!
//! Run with: cargo test --test native_encoder --features recording

use endostudio::config::RecordingConfig;
use endostudio::platform::{MediaStream, SharedStream};
use endostudio::recording::{
    select_mime, MediaEncoder, MimeType, NativeEncoder, Recorder, RecordingOutcome,
    RecordingTarget,
};
use endostudio::storage::LocalFileStore;
use endostudio::testing::SyntheticStream;
use endostudio::types::StreamRequest;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

fn synthetic_stream(width: u32, height: u32) -> SharedStream {
    let stream: Box<dyn MediaStream> =
        Box::new(SyntheticStream::new(StreamRequest::new("0"), width, height));
    Arc::new(Mutex::new(stream))
}

fn encoder() -> NativeEncoder {
    NativeEncoder::new(RecordingConfig {
        fps: 15.0,
        chunk_size: 4 * 1024,
        ..RecordingConfig::default()
    })
}

fn has_box(data: &[u8], name: &[u8; 4]) -> bool {
    data.windows(4).any(|w| w == name)
}

#[test]
fn test_native_encoder_offers_mp4_only() {
    let encoder = encoder();
    assert!(encoder.is_type_supported("video/mp4"));
    assert!(!encoder.is_type_supported("video/webm"));
    assert_eq!(select_mime(&encoder).unwrap(), MimeType::Mp4);
}

#[tokio::test]
async fn test_buffered_recording_is_mp4() {
    let encoder = encoder();
    let mut recorder = Recorder::new();

    recorder
        .start(&encoder, synthetic_stream(64, 48), MimeType::Mp4, RecordingTarget::Buffered)
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    let artifact = match recorder.stop().await.unwrap() {
        RecordingOutcome::Buffered(Some(artifact)) => artifact,
        other => panic!("expected buffered data, got {:?}", other),
    };

    assert_eq!(artifact.mime_type, "video/mp4");
    assert_eq!(artifact.extension, "mp4");
    assert_eq!(&artifact.data[4..8], b"ftyp");
    assert!(has_box(&artifact.data, b"moov"));
    assert!(has_box(&artifact.data, b"mdat"));
}

#[tokio::test]
async fn test_incremental_recording_with_odd_dimensions() {
    let dir = TempDir::new().unwrap();
    let files = Arc::new(LocalFileStore::new(dir.path()));
    let encoder = encoder();
    let mut recorder = Recorder::new();

    let target = RecordingTarget::Incremental {
        files,
        path: "Scope/Scope.001.mp4".to_string(),
    };
    recorder
        .start(&encoder, synthetic_stream(65, 49), MimeType::Mp4, target)
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    let (path, bytes) = match recorder.stop().await.unwrap() {
        RecordingOutcome::Written { path, bytes } => (path, bytes),
        other => panic!("expected a written file, got {:?}", other),
    };

    let data = std::fs::read(&path).unwrap();
    assert_eq!(data.len() as u64, bytes);
    assert_eq!(&data[4..8], b"ftyp");
    assert!(has_box(&data, b"moov"));
}
