//! In-memory capability providers: cameras that render gradients and an
//! encoder that turns frames into predictable chunks

use super::synthetic_data::{synthetic_devices, synthetic_video_frame};
use crate::errors::StudioError;
use crate::permissions::{MediaKind, MediaPermissions, PermissionInfo, PermissionStatus};
use crate::platform::{with_stream, Host, MediaDevices, MediaStream, NativeHost, SharedStream, WebHost};
use crate::recording::{EncodingSession, MediaEncoder, MimeType};
use crate::storage::{
    DirectoryAlbumStore, DirectoryDownloadSink, LocalFileStore, MemoryPreferenceStore,
};
use crate::types::{DeviceDescriptor, StreamRequest, VideoFrame};
use bytes::Bytes;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

/// Bytes every synthetic recording ends with
pub const SYNTHETIC_TRAILER: &[u8] = b"END";

pub struct SyntheticStream {
    id: String,
    request: StreamRequest,
    width: u32,
    height: u32,
    frames: u64,
    active: bool,
}

impl SyntheticStream {
    pub fn new(request: StreamRequest, width: u32, height: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            width,
            height,
            frames: 0,
            active: true,
        }
    }
}

impl MediaStream for SyntheticStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn request(&self) -> &StreamRequest {
        &self.request
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn grab_frame(&mut self) -> Result<VideoFrame, StudioError> {
        if !self.active {
            return Err(StudioError::Capture("Stream has been stopped".to_string()));
        }
        let mut frame = synthetic_video_frame(self.frames, self.width, self.height);
        frame.device_id = self.request.video_device.clone();
        self.frames += 1;
        Ok(frame)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        self.active = false;
    }
}

/// Fake device layer; records every stream it opens
pub struct SyntheticMedia {
    devices: Vec<DeviceDescriptor>,
    camera_status: PermissionStatus,
    resolution: (u32, u32),
    opened: Mutex<Vec<StreamRequest>>,
}

impl Default for SyntheticMedia {
    fn default() -> Self {
        Self::new(synthetic_devices())
    }
}

impl SyntheticMedia {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices,
            camera_status: PermissionStatus::Granted,
            resolution: (64, 48),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Camera access blocked, as if the user said no
    pub fn denied() -> Self {
        Self {
            camera_status: PermissionStatus::Denied,
            ..Self::default()
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = (width, height);
        self
    }

    /// Requests passed to `open`, oldest first
    pub fn opened(&self) -> Vec<StreamRequest> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl MediaDevices for SyntheticMedia {
    fn request_access(&self) -> Result<MediaPermissions, StudioError> {
        let camera = PermissionInfo {
            kind: MediaKind::Camera,
            status: self.camera_status,
            message: format!("Synthetic camera {}", self.camera_status),
            can_request: false,
        };
        if camera.is_blocking() {
            return Err(StudioError::PermissionDenied(camera.message));
        }
        Ok(MediaPermissions {
            camera,
            microphone: PermissionInfo::granted(MediaKind::Microphone, "Synthetic microphone"),
        })
    }

    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, StudioError> {
        Ok(self.devices.clone())
    }

    fn open(&self, request: &StreamRequest) -> Result<Box<dyn MediaStream>, StudioError> {
        if !self
            .devices
            .iter()
            .any(|d| d.is_video() && d.id == request.video_device)
        {
            return Err(StudioError::Initialization(format!(
                "No camera with id {}",
                request.video_device
            )));
        }
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(request.clone());
        }
        let (w, h) = self.resolution;
        Ok(Box::new(SyntheticStream::new(request.clone(), w, h)))
    }
}

/// Encoder supporting a fixed MIME list. While running it emits the first
/// bytes of each frame as a chunk, and [`SYNTHETIC_TRAILER`] when stopped.
pub struct SyntheticEncoder {
    supported: Vec<MimeType>,
    silent: bool,
}

impl SyntheticEncoder {
    pub fn new(supported: Vec<MimeType>) -> Self {
        Self {
            supported,
            silent: false,
        }
    }

    pub fn mp4() -> Self {
        Self::new(vec![MimeType::Mp4])
    }

    /// Supports nothing, like a platform without MediaRecorder formats
    pub fn unsupported() -> Self {
        Self::new(Vec::new())
    }

    /// Runs but never emits data
    pub fn silent(supported: Vec<MimeType>) -> Self {
        Self {
            supported,
            silent: true,
        }
    }
}

struct SyntheticSession {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EncodingSession for SyntheticSession {
    fn stop(mut self: Box<Self>) -> Result<(), StudioError> {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| StudioError::Encoding("Synthetic encoder panicked".to_string()))?;
        }
        Ok(())
    }
}

impl MediaEncoder for SyntheticEncoder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        MimeType::parse(mime_type).is_some_and(|mime| self.supported.contains(&mime))
    }

    fn start(
        &self,
        stream: SharedStream,
        mime: MimeType,
        chunks: mpsc::UnboundedSender<Bytes>,
    ) -> Result<Box<dyn EncodingSession>, StudioError> {
        if !self.supported.contains(&mime) {
            return Err(StudioError::NoSupportedEncoding);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let silent = self.silent;

        let handle = std::thread::spawn(move || {
            if silent {
                while !flag.load(Ordering::Acquire) {
                    std::thread::sleep(Duration::from_millis(2));
                }
                return;
            }
            while !flag.load(Ordering::Acquire) {
                match with_stream(&stream, |s| s.grab_frame()) {
                    Ok(frame) => {
                        let len = frame.data.len().min(16);
                        let _ = chunks.send(Bytes::copy_from_slice(&frame.data[..len]));
                    }
                    Err(_) => break,
                }
                std::thread::sleep(Duration::from_millis(2));
            }
            let _ = chunks.send(Bytes::from_static(SYNTHETIC_TRAILER));
        });

        Ok(Box::new(SyntheticSession {
            stop,
            handle: Some(handle),
        }))
    }
}

/// Native host over `root`: files in `root/files`, albums in `root/albums`,
/// downloads in `root/downloads`, preferences in memory
pub fn native_test_host(root: &Path) -> Arc<dyn Host> {
    native_test_host_with(root, SyntheticMedia::default(), SyntheticEncoder::mp4())
}

pub fn native_test_host_with(
    root: &Path,
    media: SyntheticMedia,
    encoder: SyntheticEncoder,
) -> Arc<dyn Host> {
    Arc::new(NativeHost::with_providers(
        Arc::new(media),
        Arc::new(encoder),
        Arc::new(MemoryPreferenceStore::new()),
        Arc::new(LocalFileStore::new(root.join("files"))),
        Arc::new(DirectoryAlbumStore::new(root.join("albums"))),
        Arc::new(DirectoryDownloadSink::new(root.join("downloads"))),
    ))
}

/// Web host over `root`: downloads in `root/downloads`, preferences in memory
pub fn web_test_host(root: &Path) -> Arc<dyn Host> {
    web_test_host_with(root, SyntheticMedia::default(), SyntheticEncoder::mp4())
}

pub fn web_test_host_with(
    root: &Path,
    media: SyntheticMedia,
    encoder: SyntheticEncoder,
) -> Arc<dyn Host> {
    Arc::new(WebHost::new(
        Arc::new(media),
        Arc::new(encoder),
        Arc::new(MemoryPreferenceStore::new()),
        Arc::new(DirectoryDownloadSink::new(root.join("downloads"))),
    ))
}
