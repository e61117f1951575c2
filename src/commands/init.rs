use super::{report, studio_mut};
use crate::platform::{Host, NativeHost};
use crate::studio::{Studio, StudioState};
use crate::types::Platform;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tauri::command;
use tokio::sync::Mutex as AsyncMutex;

lazy_static::lazy_static! {
    pub(crate) static ref STUDIO: Arc<AsyncMutex<Option<Studio>>> = Arc::new(AsyncMutex::new(None));
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub version: String,
    pub recording: bool,
    pub audio: bool,
}

/// Replace the current studio, e.g. with one built on a custom host
pub async fn install_studio(studio: Studio) {
    let mut guard = STUDIO.lock().await;
    if guard.is_some() {
        log::info!("Replacing the running studio");
    }
    *guard = Some(studio);
}

/// Create the studio on the native host using the current configuration
#[command]
pub async fn initialize_studio() -> Result<StudioState, String> {
    let config = super::config::current_config()?;

    let host: Arc<dyn Host> = Arc::new(
        NativeHost::from_config(&config).map_err(|e| report("create native host", e))?,
    );
    let studio = Studio::new(host, config).map_err(|e| report("initialize studio", e))?;
    let state = studio.state();

    install_studio(studio).await;
    log::info!("Studio initialized with session {:?}", state.session_name);
    Ok(state)
}

/// Stop the preview and drop the studio. A running recording is stopped and saved first.
#[command]
pub async fn shutdown_studio() -> Result<(), String> {
    let mut guard = STUDIO.lock().await;
    if let Some(studio) = guard.as_mut() {
        if studio.recording_status().is_recording {
            studio
                .stop_recording()
                .await
                .map_err(|e| report("stop recording on shutdown", e))?;
        }
    }
    *guard = None;
    log::info!("Studio shut down");
    Ok(())
}

#[command]
pub async fn get_studio_state() -> Result<StudioState, String> {
    let mut guard = STUDIO.lock().await;
    Ok(studio_mut(&mut guard)?.state())
}

#[command]
pub async fn get_platform_info() -> Result<PlatformInfo, String> {
    Ok(PlatformInfo {
        platform: Platform::current(),
        version: crate::VERSION.to_string(),
        recording: cfg!(feature = "recording"),
        audio: cfg!(feature = "audio"),
    })
}
