use super::{Host, HostKind, MediaDevices, MediaStream};
use crate::config::StudioConfig;
use crate::errors::StudioError;
use crate::permissions::{self, MediaKind, MediaPermissions, PermissionStatus};
use crate::recording::{MediaEncoder, NativeEncoder};
use crate::storage::{
    AlbumStore, DirectoryAlbumStore, DirectoryDownloadSink, DownloadSink, FileStore,
    JsonPreferenceStore, LocalFileStore, PreferenceStore,
};
use crate::types::{AudioRequest, DeviceDescriptor, StreamRequest, VideoFrame};
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
    CallbackCamera,
};
use std::sync::Arc;

/// Cameras through nokhwa, microphones through cpal when the `audio` feature is on
#[derive(Default)]
pub struct NokhwaMedia;

impl NokhwaMedia {
    pub fn new() -> Self {
        Self
    }
}

impl MediaDevices for NokhwaMedia {
    fn request_access(&self) -> Result<MediaPermissions, StudioError> {
        let mut status = permissions::check_media_permissions();

        #[cfg(target_os = "macos")]
        {
            if status.camera.status == PermissionStatus::NotDetermined && status.camera.can_request {
                status.camera = permissions::request_access_macos(MediaKind::Camera)?;
            }
            if status.microphone.status == PermissionStatus::NotDetermined
                && status.microphone.can_request
            {
                status.microphone = permissions::request_access_macos(MediaKind::Microphone)?;
            }
        }

        if status.camera.is_blocking() {
            log::error!("Camera permission blocked: {}", status.camera.message);
            return Err(StudioError::PermissionDenied(status.camera.message.clone()));
        }
        if status.microphone.is_blocking() {
            // Video still works without a microphone
            log::warn!("Microphone permission blocked: {}", status.microphone.message);
        }
        if status.camera.status != PermissionStatus::Granted {
            log::debug!("Camera permission {}: {}", status.camera.status, status.camera.message);
        }
        debug_assert_eq!(status.camera.kind, MediaKind::Camera);

        Ok(status)
    }

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, StudioError> {
        let cameras = query(ApiBackend::Auto).map_err(|e| {
            StudioError::Initialization(format!("Failed to query cameras: {}", e))
        })?;

        let mut devices: Vec<DeviceDescriptor> = cameras
            .into_iter()
            .map(|info| DeviceDescriptor::video(info.index().to_string(), info.human_name()))
            .collect();

        #[cfg(feature = "audio")]
        match super::list_audio_devices() {
            Ok(audio) => devices.extend(audio),
            Err(e) => log::warn!("Failed to list microphones: {}", e),
        }

        log::debug!("Enumerated {} input devices", devices.len());
        Ok(devices)
    }

    fn open(&self, request: &StreamRequest) -> Result<Box<dyn MediaStream>, StudioError> {
        let index = match request.video_device.parse::<u32>() {
            Ok(i) => CameraIndex::Index(i),
            Err(_) => CameraIndex::String(request.video_device.clone()),
        };

        let requested_format =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = CallbackCamera::new(index, requested_format, |_| {}).map_err(|e| {
            StudioError::Initialization(format!(
                "Failed to open camera {}: {}",
                request.video_device, e
            ))
        })?;

        camera.open_stream().map_err(|e| {
            StudioError::Initialization(format!("Failed to start stream: {}", e))
        })?;

        // Negotiated size, known before the first frame arrives
        let resolution = match camera.resolution() {
            Ok(res) => Some((res.width_x, res.height_y)),
            Err(e) => {
                log::warn!("Camera {} did not report a resolution: {}", request.video_device, e);
                None
            }
        };

        if request.audio != AudioRequest::Disabled {
            log::debug!(
                "Audio requested ({:?}); native capture records the video track",
                request.audio
            );
        }

        log::info!("Opened stream for camera {}", request.video_device);
        Ok(Box::new(NokhwaStream {
            id: uuid::Uuid::new_v4().to_string(),
            request: request.clone(),
            camera,
            resolution,
            active: true,
        }))
    }
}

/// A running nokhwa camera stream
pub struct NokhwaStream {
    id: String,
    request: StreamRequest,
    camera: CallbackCamera,
    resolution: Option<(u32, u32)>,
    active: bool,
}

impl MediaStream for NokhwaStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn request(&self) -> &StreamRequest {
        &self.request
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }

    fn grab_frame(&mut self) -> Result<VideoFrame, StudioError> {
        if !self.active {
            return Err(StudioError::Capture("Stream has been stopped".to_string()));
        }

        let buffer = self
            .camera
            .poll_frame()
            .map_err(|e| StudioError::Capture(format!("Failed to capture frame: {}", e)))?;

        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| StudioError::Capture(format!("Failed to decode frame: {}", e)))?;

        let (width, height) = (image.width(), image.height());
        self.resolution = Some((width, height));

        Ok(VideoFrame::new(
            image.into_raw(),
            width,
            height,
            self.request.video_device.clone(),
        ))
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {}", e);
        }
        log::info!("Stopped stream for camera {}", self.request.video_device);
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop();
    }
}

// Only ever used behind the SharedStream mutex
unsafe impl Send for NokhwaStream {}

/// Desktop/mobile host: real cameras, app files, albums and downloads
pub struct NativeHost {
    media: Arc<dyn MediaDevices>,
    encoder: Arc<dyn MediaEncoder>,
    preferences: Arc<dyn PreferenceStore>,
    files: Arc<dyn FileStore>,
    albums: Arc<dyn AlbumStore>,
    downloads: Arc<dyn DownloadSink>,
}

impl NativeHost {
    /// Build the host from the storage roots in the configuration
    pub fn from_config(config: &StudioConfig) -> Result<Self, StudioError> {
        let storage = &config.storage;
        let preferences = JsonPreferenceStore::open(&storage.preferences_path)?;

        Ok(Self {
            media: Arc::new(NokhwaMedia::new()),
            encoder: Arc::new(NativeEncoder::new(config.recording.clone())),
            preferences: Arc::new(preferences),
            files: Arc::new(LocalFileStore::new(&storage.documents_directory)),
            albums: Arc::new(DirectoryAlbumStore::new(&storage.albums_directory)),
            downloads: Arc::new(DirectoryDownloadSink::new(&storage.downloads_directory)),
        })
    }

    /// Assemble a host from explicit providers
    pub fn with_providers(
        media: Arc<dyn MediaDevices>,
        encoder: Arc<dyn MediaEncoder>,
        preferences: Arc<dyn PreferenceStore>,
        files: Arc<dyn FileStore>,
        albums: Arc<dyn AlbumStore>,
        downloads: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            media,
            encoder,
            preferences,
            files,
            albums,
            downloads,
        }
    }
}

impl Host for NativeHost {
    fn kind(&self) -> HostKind {
        HostKind::Native
    }

    fn media(&self) -> Arc<dyn MediaDevices> {
        self.media.clone()
    }

    fn encoder(&self) -> Arc<dyn MediaEncoder> {
        self.encoder.clone()
    }

    fn preferences(&self) -> Arc<dyn PreferenceStore> {
        self.preferences.clone()
    }

    fn files(&self) -> Option<Arc<dyn FileStore>> {
        Some(self.files.clone())
    }

    fn albums(&self) -> Option<Arc<dyn AlbumStore>> {
        Some(self.albums.clone())
    }

    fn downloads(&self) -> Arc<dyn DownloadSink> {
        self.downloads.clone()
    }
}
