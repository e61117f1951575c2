//! Tauri command layer driven against an installed synthetic studio
//!
//! The commands share one global studio, so everything runs in a single
//! sequential test.

use endostudio::commands::{
    agree_to_terms, get_recording_status, get_save_location, get_session, get_studio_state,
    get_zoom, has_agreed_to_terms, install_studio, pinch_end, pinch_move, pinch_start,
    refresh_devices, rename_session, reset_zoom, select_camera, set_save_location, set_zoom,
    shutdown_studio, start_camera, start_recording, stop_camera, stop_recording, take_photo,
    toggle_mute, zoom_key, zoom_wheel,
};
use endostudio::config::StudioConfig;
use endostudio::save_location::SaveLocation;
use endostudio::studio::Studio;
use endostudio::testing::web_test_host;
use endostudio::zoom::{PreviewRect, TouchPoint};
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_command_workflow() {
    shutdown_studio().await.unwrap();

    // Nothing works before a studio exists
    let err = get_session().await.unwrap_err();
    assert!(err.contains("initialize_studio"));
    assert!(take_photo().await.is_err());

    let dir = TempDir::new().unwrap();
    let studio = Studio::new(web_test_host(dir.path()), StudioConfig::default()).unwrap();
    install_studio(studio).await;

    let state = get_studio_state().await.unwrap();
    assert!(state.session_name.starts_with("EndoStudio "));
    assert!(!state.streaming);

    // Session
    let session = rename_session("Cmd Run".to_string()).await.unwrap();
    assert_eq!(session.name(), "Cmd Run");
    let err = rename_session("  ".to_string()).await.unwrap_err();
    assert!(err.starts_with("Invalid input"));
    assert_eq!(get_session().await.unwrap().name(), "Cmd Run");

    // Devices and preview
    let devices = refresh_devices().await.unwrap();
    assert_eq!(devices.cameras.len(), 2);
    assert_eq!(devices.microphones.len(), 1);
    assert!(select_camera("missing".to_string()).await.is_err());
    select_camera("0".to_string()).await.unwrap();
    let geometry = start_camera().await.unwrap().unwrap();
    assert_eq!((geometry.width, geometry.height), (1024, 768));
    assert!(!toggle_mute().await.unwrap());

    // Photos and save location
    let photo = take_photo().await.unwrap();
    assert_eq!(photo.file_name, "Cmd_Run.001.jpeg");
    assert_eq!(get_save_location().await.unwrap(), SaveLocation::Downloads);
    assert_eq!(
        set_save_location(SaveLocation::CameraRoll).await.unwrap(),
        SaveLocation::CameraRoll
    );
    let photo = take_photo().await.unwrap();
    assert_eq!(photo.location, SaveLocation::Downloads);
    assert_eq!(photo.file_name, "Cmd_Run.002.jpeg");

    // Zoom
    assert_eq!(get_zoom().await.unwrap().zoom, 1.0);
    let view = zoom_key("+".to_string()).await.unwrap();
    assert!((view.zoom - 1.1).abs() < 1e-9);
    let view = zoom_wheel(120.0).await.unwrap();
    assert!((view.zoom - 1.0).abs() < 1e-9);
    assert_eq!(set_zoom(10.0).await.unwrap().zoom, 3.0);
    assert_eq!(reset_zoom().await.unwrap().zoom, 1.0);

    let rect = PreviewRect {
        left: 0.0,
        top: 0.0,
        width: 200.0,
        height: 100.0,
    };
    let view = pinch_start(TouchPoint::new(50.0, 50.0), TouchPoint::new(150.0, 50.0), rect)
        .await
        .unwrap();
    assert_eq!(view.transform_origin, "50% 50%");
    let view = pinch_move(TouchPoint::new(25.0, 50.0), TouchPoint::new(175.0, 50.0))
        .await
        .unwrap();
    assert!((view.zoom - 1.5).abs() < 1e-9);
    pinch_end(1).await.unwrap();
    reset_zoom().await.unwrap();

    // Recording
    let id = start_recording().await.unwrap();
    assert!(start_recording().await.is_err());
    assert!(toggle_mute().await.unwrap_err().contains("Cannot mute while recording"));
    let status = get_recording_status().await.unwrap();
    assert!(status.is_recording);
    assert_eq!(status.recording_id.as_deref(), Some(id.as_str()));
    tokio::time::sleep(Duration::from_millis(30)).await;
    let saved = stop_recording().await.unwrap().unwrap();
    assert_eq!(saved.file_name, "Cmd_Run.003.mp4");
    assert!(!get_recording_status().await.unwrap().saving);
    assert_eq!(
        stop_recording().await.unwrap_err(),
        "No recording in progress"
    );

    // Disclaimer
    assert!(!has_agreed_to_terms().await.unwrap());
    agree_to_terms().await.unwrap();
    assert!(has_agreed_to_terms().await.unwrap());

    stop_camera().await.unwrap();
    shutdown_studio().await.unwrap();
    assert!(get_studio_state().await.is_err());
}
