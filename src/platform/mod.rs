//! Host capability providers
//!
//! A [`Host`] bundles everything the studio needs from the runtime it lives in:
//! camera access, a media encoder, preferences, and the three save targets.
//! [`NativeHost`] has all of them; [`WebHost`] behaves like a browser page and
//! can only hand artifacts out as downloads.

#[cfg(feature = "audio")]
mod audio;
mod native;
mod web;

#[cfg(feature = "audio")]
pub use audio::list_audio_devices;
pub use native::{NativeHost, NokhwaMedia, NokhwaStream};
pub use web::WebHost;

use crate::errors::StudioError;
use crate::permissions::MediaPermissions;
use crate::recording::MediaEncoder;
use crate::save_location::SaveLocation;
use crate::storage::{AlbumStore, DownloadSink, FileStore, PreferenceStore};
use crate::types::{DeviceDescriptor, StreamRequest, VideoFrame};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// An open capture stream for one camera (and possibly a microphone)
pub trait MediaStream: Send {
    fn id(&self) -> &str;
    fn request(&self) -> &StreamRequest;
    /// Native resolution, once known
    fn resolution(&self) -> Option<(u32, u32)>;
    /// Grab the current frame as RGB24
    fn grab_frame(&mut self) -> Result<VideoFrame, StudioError>;
    fn is_active(&self) -> bool;
    /// Stop all tracks; later grabs fail
    fn stop(&mut self);
}

/// A stream shared between preview, photo capture and the recorder
pub type SharedStream = Arc<Mutex<Box<dyn MediaStream>>>;

/// Device enumeration and capture
pub trait MediaDevices: Send + Sync {
    /// Ask for camera (and microphone) access; fails with `PermissionDenied` if blocked
    fn request_access(&self) -> Result<MediaPermissions, StudioError>;
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, StudioError>;
    fn open(&self, request: &StreamRequest) -> Result<Box<dyn MediaStream>, StudioError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostKind {
    Native,
    Web,
}

/// Capability provider for the runtime the studio runs in
pub trait Host: Send + Sync {
    fn kind(&self) -> HostKind;
    fn media(&self) -> Arc<dyn MediaDevices>;
    fn encoder(&self) -> Arc<dyn MediaEncoder>;
    fn preferences(&self) -> Arc<dyn PreferenceStore>;
    /// App-managed files, if the host has them
    fn files(&self) -> Option<Arc<dyn FileStore>>;
    /// Media library, if the host has one
    fn albums(&self) -> Option<Arc<dyn AlbumStore>>;
    fn downloads(&self) -> Arc<dyn DownloadSink>;

    fn is_native(&self) -> bool {
        self.kind() == HostKind::Native
    }

    /// Save location used when no valid preference is stored
    fn default_save_location(&self) -> SaveLocation {
        match self.kind() {
            HostKind::Native => SaveLocation::Files,
            HostKind::Web => SaveLocation::Downloads,
        }
    }

    /// Whether artifacts can actually be written to `location` here
    fn supports(&self, location: SaveLocation) -> bool {
        match location {
            SaveLocation::Files => self.files().is_some(),
            SaveLocation::CameraRoll => self.albums().is_some(),
            SaveLocation::Downloads => true,
        }
    }
}

/// Run a closure against a shared stream, mapping a poisoned lock to a capture error
pub fn with_stream<T>(
    stream: &SharedStream,
    f: impl FnOnce(&mut dyn MediaStream) -> Result<T, StudioError>,
) -> Result<T, StudioError> {
    let mut guard = stream
        .lock()
        .map_err(|_| StudioError::Capture("Stream lock poisoned".to_string()))?;
    f(guard.as_mut())
}
