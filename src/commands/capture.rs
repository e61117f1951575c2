//! Device, preview, photo and zoom commands

use super::init::STUDIO;
use super::{report, studio_mut};
use crate::artifact::SavedArtifact;
use crate::capture::PreviewGeometry;
use crate::devices::DeviceList;
use crate::zoom::{PreviewRect, TouchPoint, ZoomView};
use tauri::command;

/// Enumerate devices, select the preferred camera and start its preview
#[command]
pub async fn refresh_devices() -> Result<DeviceList, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio
        .refresh_devices()
        .await
        .map_err(|e| report("get devices", e))
}

#[command]
pub async fn select_camera(device_id: String) -> Result<(), String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    log::info!("Selecting camera {}", device_id);
    studio
        .select_camera(&device_id)
        .await
        .map_err(|e| report("select camera", e))
}

#[command]
pub async fn select_microphone(device_id: String) -> Result<(), String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    log::info!("Selecting microphone {}", device_id);
    studio
        .select_microphone(&device_id)
        .await
        .map_err(|e| report("select microphone", e))
}

/// Returns whether audio is now recorded
#[command]
pub async fn toggle_mute() -> Result<bool, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.toggle_mute().await.map_err(|e| report("toggle mute", e))
}

#[command]
pub async fn start_camera() -> Result<Option<PreviewGeometry>, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio
        .start_camera()
        .await
        .map_err(|e| report("start camera", e))?;
    Ok(studio.geometry())
}

#[command]
pub async fn stop_camera() -> Result<(), String> {
    let mut guard = STUDIO.lock().await;
    studio_mut(&mut guard)?
        .stop_camera()
        .map_err(|e| report("stop camera", e))
}

#[command]
pub async fn take_photo() -> Result<SavedArtifact, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    let saved = studio
        .take_photo()
        .await
        .map_err(|e| report("take photo", e))?;
    log::info!("Image saved: {}", saved.path);
    Ok(saved)
}

#[command]
pub async fn get_zoom() -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    Ok(studio_mut(&mut guard)?.zoom_view())
}

#[command]
pub async fn set_zoom(zoom: f64) -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.zoom_mut().set_zoom(zoom);
    Ok(studio.zoom_view())
}

#[command]
pub async fn reset_zoom() -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.zoom_mut().reset();
    Ok(studio.zoom_view())
}

/// Keyboard zoom; unrelated keys leave the zoom alone
#[command]
pub async fn zoom_key(key: String) -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.zoom_mut().handle_key(&key);
    Ok(studio.zoom_view())
}

#[command]
pub async fn zoom_wheel(delta_y: f64) -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.zoom_mut().handle_wheel(delta_y);
    Ok(studio.zoom_view())
}

#[command]
pub async fn pinch_start(
    first: TouchPoint,
    second: TouchPoint,
    rect: PreviewRect,
) -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.zoom_mut().pinch_start(first, second, &rect);
    Ok(studio.zoom_view())
}

#[command]
pub async fn pinch_move(first: TouchPoint, second: TouchPoint) -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.zoom_mut().pinch_move(first, second);
    Ok(studio.zoom_view())
}

#[command]
pub async fn pinch_end(remaining_touches: usize) -> Result<ZoomView, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio.zoom_mut().pinch_end(remaining_touches);
    Ok(studio.zoom_view())
}
