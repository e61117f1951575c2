//! Tauri commands for video recording

use super::init::STUDIO;
use super::{report, studio_mut};
use crate::artifact::SavedArtifact;
use crate::studio::RecordingStatus;
use tauri::command;

/// Start recording the preview stream. Returns the recording id.
#[command]
pub async fn start_recording() -> Result<String, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    let id = studio
        .start_recording()
        .await
        .map_err(|e| report("start recording", e))?;
    log::info!("Recording started");
    Ok(id)
}

/// Stop recording and save it; `None` when there was no data to save
#[command]
pub async fn stop_recording() -> Result<Option<SavedArtifact>, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    let saved = studio
        .stop_recording()
        .await
        .map_err(|e| report("save recording", e))?;
    if let Some(saved) = &saved {
        log::info!("Recording saved: {}", saved.path);
    }
    Ok(saved)
}

#[command]
pub async fn get_recording_status() -> Result<RecordingStatus, String> {
    let mut guard = STUDIO.lock().await;
    Ok(studio_mut(&mut guard)?.recording_status())
}
