use super::*;
use crate::platform::SharedStream;
use crate::storage::{FileStore, LocalFileStore};
use crate::testing::{SyntheticEncoder, SyntheticStream, SYNTHETIC_TRAILER};
use crate::types::StreamRequest;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

fn stream() -> SharedStream {
    Arc::new(Mutex::new(Box::new(SyntheticStream::new(
        StreamRequest::new("0"),
        32,
        24,
    ))))
}

#[test]
fn test_select_mime_follows_preference_order() {
    let encoder = SyntheticEncoder::new(vec![MimeType::Mov, MimeType::Webm]);
    assert_eq!(select_mime(&encoder).unwrap(), MimeType::Webm);

    let encoder = SyntheticEncoder::new(vec![MimeType::Avi]);
    assert_eq!(select_mime(&encoder).unwrap(), MimeType::Avi);
}

#[test]
fn test_select_mime_without_support_fails() {
    let encoder = SyntheticEncoder::unsupported();
    assert!(matches!(
        select_mime(&encoder),
        Err(crate::errors::StudioError::NoSupportedEncoding)
    ));
}

#[test]
fn test_format_elapsed() {
    assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00:00");
    assert_eq!(format_elapsed(Duration::from_secs(61)), "00:01:01");
    assert_eq!(format_elapsed(Duration::from_secs(3 * 3600 + 7)), "03:00:07");
}

#[tokio::test]
async fn test_buffered_recording_produces_artifact() {
    let encoder = SyntheticEncoder::mp4();
    let mut recorder = Recorder::new();

    let id = recorder
        .start(&encoder, stream(), MimeType::Mp4, RecordingTarget::Buffered)
        .unwrap();
    assert!(!id.is_empty());
    assert!(recorder.is_recording());
    assert_eq!(recorder.mime(), Some(MimeType::Mp4));

    tokio::time::sleep(Duration::from_millis(20)).await;
    let outcome = recorder.stop().await.unwrap();

    match outcome {
        RecordingOutcome::Buffered(Some(artifact)) => {
            assert_eq!(artifact.mime_type, "video/mp4");
            assert_eq!(artifact.extension, "mp4");
            assert!(artifact.data.ends_with(SYNTHETIC_TRAILER));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!recorder.is_recording());
}

#[tokio::test]
async fn test_silent_encoder_yields_no_artifact() {
    let encoder = SyntheticEncoder::silent(vec![MimeType::Webm]);
    let mut recorder = Recorder::new();
    recorder
        .start(&encoder, stream(), MimeType::Webm, RecordingTarget::Buffered)
        .unwrap();

    let outcome = recorder.stop().await.unwrap();
    assert!(matches!(outcome, RecordingOutcome::Buffered(None)));
}

#[tokio::test]
async fn test_incremental_recording_appends_to_file() {
    let dir = TempDir::new().unwrap();
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(dir.path()));
    let encoder = SyntheticEncoder::mp4();
    let mut recorder = Recorder::new();

    recorder
        .start(
            &encoder,
            stream(),
            MimeType::Mp4,
            RecordingTarget::Incremental {
                files: files.clone(),
                path: "Case 7/Case 7.001.mp4".to_string(),
            },
        )
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let snapshot = recorder.snapshot();
    assert!(snapshot.is_recording);
    assert_eq!(snapshot.mime_type.as_deref(), Some("video/mp4"));

    let outcome = recorder.stop().await.unwrap();
    let RecordingOutcome::Written { path, bytes } = outcome else {
        panic!("expected a written recording");
    };

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk.len() as u64, bytes);
    assert!(on_disk.ends_with(SYNTHETIC_TRAILER));
    assert!(dir.path().join("Case 7/Case 7.001.mp4").is_file());
}

#[tokio::test]
async fn test_start_twice_and_stop_idle() {
    let encoder = SyntheticEncoder::mp4();
    let mut recorder = Recorder::new();

    assert!(matches!(
        recorder.stop().await,
        Err(crate::errors::StudioError::NotRecording)
    ));

    recorder
        .start(&encoder, stream(), MimeType::Mp4, RecordingTarget::Buffered)
        .unwrap();
    assert!(matches!(
        recorder.start(&encoder, stream(), MimeType::Mp4, RecordingTarget::Buffered),
        Err(crate::errors::StudioError::AlreadyRecording)
    ));

    recorder.stop().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_mime_is_rejected() {
    let encoder = SyntheticEncoder::new(vec![MimeType::Webm]);
    let mut recorder = Recorder::new();
    assert!(recorder
        .start(&encoder, stream(), MimeType::Mp4, RecordingTarget::Buffered)
        .is_err());
    assert!(!recorder.is_recording());
}

#[test]
fn test_native_encoder_support_matches_feature() {
    let encoder = NativeEncoder::new(crate::config::RecordingConfig::default());
    assert_eq!(encoder.is_type_supported("video/mp4"), cfg!(feature = "recording"));
    assert!(!encoder.is_type_supported("video/webm"));
}
