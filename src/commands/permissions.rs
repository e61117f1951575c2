use super::init::STUDIO;
use super::report;
use crate::permissions::{check_media_permissions, MediaPermissions};
use crate::platform::{MediaDevices, NokhwaMedia};
use std::sync::Arc;
use tauri::command;

/// Ask for camera and microphone access (shows the system prompt where there is one)
#[command]
pub async fn request_media_permissions() -> Result<MediaPermissions, String> {
    log::info!("Requesting camera and microphone permission");

    let media: Arc<dyn MediaDevices> = {
        let guard = STUDIO.lock().await;
        match guard.as_ref() {
            Some(studio) => studio.host().media(),
            None => Arc::new(NokhwaMedia::new()),
        }
    };

    tokio::task::spawn_blocking(move || media.request_access())
        .await
        .map_err(|e| format!("Permission task failed: {}", e))?
        .map_err(|e| report("get camera permission", e))
}

#[command]
pub async fn check_media_permission_status() -> Result<MediaPermissions, String> {
    log::debug!("Checking media permission status");
    Ok(tokio::task::spawn_blocking(check_media_permissions)
        .await
        .map_err(|e| format!("Permission task failed: {}", e))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::MediaKind;

    #[tokio::test]
    async fn test_status_reports_both_kinds() {
        let status = check_media_permission_status().await.unwrap();
        assert_eq!(status.camera.kind, MediaKind::Camera);
        assert_eq!(status.microphone.kind, MediaKind::Microphone);
    }
}
