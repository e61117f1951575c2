//! EndoStudio: preview, record and photograph USB endoscope cameras from Tauri apps
//!
//! This crate provides the capture core of a borescope/endoscope viewer:
//! device selection that prefers USB cameras, a zoomable preview, video
//! recording and photo capture, with session-based file naming and a choice
//! of save locations.
//!
//! # Features
//! - Session naming with per-session, never reused file numbers
//! - Save to app files, downloads or a camera-roll album
//! - Recording through the platform encoder (`recording` feature: H.264/MP4)
//! - Photos scaled to a fixed width with an optional watermark
//! - Keyboard, wheel and pinch zoom
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! endostudio = { version = "0.3", features = ["recording"] }
//! tauri = { version = "2.0", features = ["protocol-asset"] }
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(endostudio::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
pub mod artifact;
pub mod capture;
pub mod commands;
pub mod config;
pub mod devices;
pub mod errors;
pub mod permissions;
pub mod photo;
pub mod platform;
pub mod recording;
pub mod save_location;
pub mod session;
pub mod storage;
pub mod studio;
pub mod types;
pub mod zoom;

// Testing utilities - synthetic devices and hosts for offline testing
pub mod testing;

// Re-exports for convenience
pub use artifact::{Artifact, SavedArtifact};
pub use config::StudioConfig;
pub use errors::StudioError;
pub use platform::{Host, NativeHost, WebHost};
pub use save_location::SaveLocation;
pub use session::Session;
pub use studio::Studio;
pub use types::{DeviceDescriptor, DeviceKind, Platform};

use tauri::{
    plugin::{Builder, TauriPlugin},
    Runtime,
};

/// Initialize the EndoStudio plugin with all commands
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("endostudio")
        .invoke_handler(tauri::generate_handler![
            // Studio lifecycle
            commands::init::initialize_studio,
            commands::init::shutdown_studio,
            commands::init::get_studio_state,
            commands::init::get_platform_info,
            // Permission commands
            commands::permissions::request_media_permissions,
            commands::permissions::check_media_permission_status,
            // Devices, preview and photos
            commands::capture::refresh_devices,
            commands::capture::select_camera,
            commands::capture::select_microphone,
            commands::capture::toggle_mute,
            commands::capture::start_camera,
            commands::capture::stop_camera,
            commands::capture::take_photo,
            // Zoom
            commands::capture::get_zoom,
            commands::capture::set_zoom,
            commands::capture::reset_zoom,
            commands::capture::zoom_key,
            commands::capture::zoom_wheel,
            commands::capture::pinch_start,
            commands::capture::pinch_move,
            commands::capture::pinch_end,
            // Recording
            commands::recording::start_recording,
            commands::recording::stop_recording,
            commands::recording::get_recording_status,
            // Session, save location, disclaimer
            commands::session::get_session,
            commands::session::rename_session,
            commands::session::get_save_location,
            commands::session::set_save_location,
            commands::session::has_agreed_to_terms,
            commands::session::agree_to_terms,
            // Configuration commands
            commands::config::get_config,
            commands::config::update_config,
            commands::config::reset_config,
            commands::config::get_storage_config,
            commands::config::update_storage_config,
            commands::config::update_watermark_config,
        ])
        .build()
}

/// Initialize logging
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "endostudio=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        platform: Platform::current(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub platform: Platform,
}
