//! The studio: one capture session with its devices, stream, recorder and output
//!
//! Every user action of the app is a method here. The studio owns the session
//! name and file counter, so two artifacts of one session never share a number.

use crate::artifact::{Artifact, ArtifactWriter, SavedArtifact};
use crate::capture::{CaptureController, PreviewGeometry};
use crate::config::StudioConfig;
use crate::devices::{list_devices, DeviceList, DeviceSelection};
use crate::errors::StudioError;
use crate::photo::PhotoCapturer;
use crate::platform::{with_stream, Host, HostKind};
use crate::recording::{select_mime, Recorder, RecordingOutcome, RecordingTarget};
use crate::save_location::{SaveLocation, SaveLocationResolver};
use crate::session::{default_session_name, ArtifactName, Session};
use crate::storage::FileStore;
use crate::zoom::{ZoomState, ZoomView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Preference key set once the user accepts the disclaimer
pub const TERMS_AGREED_KEY: &str = "agreedToTerms";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingStatus {
    pub is_recording: bool,
    pub recording_id: Option<String>,
    pub mime_type: Option<String>,
    /// `HH:MM:SS`
    pub elapsed: String,
    pub elapsed_secs: f64,
    pub chunks: u64,
    pub bytes: u64,
    pub saving: bool,
}

/// Everything the UI needs to draw itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioState {
    pub host: HostKind,
    pub session_name: String,
    pub safe_session_name: String,
    pub save_location: SaveLocation,
    pub devices: DeviceList,
    pub selection: DeviceSelection,
    pub record_audio: bool,
    pub streaming: bool,
    pub recording: RecordingStatus,
    pub zoom: ZoomView,
    pub geometry: Option<PreviewGeometry>,
}

/// Numbers tried before a save gives up on finding a free file name
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Names already in the camera-roll album
fn album_entries(host: &dyn Host, album: &str) -> Vec<String> {
    let Some(albums) = host.albums() else {
        return Vec::new();
    };
    albums.list_media(album).unwrap_or_else(|e| {
        log::warn!("Failed to list album {:?}: {}", album, e);
        Vec::new()
    })
}

/// Seed a session's counter from the files directory and the album
fn seed_session(session: &mut Session, host: &dyn Host, album: &str) -> Result<(), StudioError> {
    session.reset_counter(host.files().as_deref())?;
    let entries = album_entries(host, album);
    session.skip_existing(entries.iter().map(String::as_str));
    Ok(())
}

fn join_error(e: tokio::task::JoinError) -> StudioError {
    StudioError::Capture(format!("Background task failed: {}", e))
}

pub struct Studio {
    host: Arc<dyn Host>,
    config: StudioConfig,
    session: Session,
    resolver: SaveLocationResolver,
    writer: ArtifactWriter,
    capture: CaptureController,
    photo: Arc<PhotoCapturer>,
    recorder: Recorder,
    /// Name reserved by an incremental recording
    recording_name: Option<ArtifactName>,
    devices: DeviceList,
    selection: DeviceSelection,
    saving: watch::Sender<bool>,
}

impl Studio {
    /// Open a studio with a timestamped default session
    pub fn new(host: Arc<dyn Host>, config: StudioConfig) -> Result<Self, StudioError> {
        config.validate().map_err(StudioError::Config)?;

        let name = default_session_name(&config.session.product_name, &chrono::Local::now());
        let mut session = Session::new(name);
        seed_session(&mut session, host.as_ref(), &config.storage.album_name)?;

        let resolver = SaveLocationResolver::new(host.preferences(), host.default_save_location());
        let writer = ArtifactWriter::new(host.clone(), config.storage.album_name.clone());
        let capture = CaptureController::new(&config.capture, &config.zoom);
        let photo = Arc::new(PhotoCapturer::from_config(&config)?);
        let (saving, _) = watch::channel(false);

        log::info!(
            "Studio ready ({:?} host), session {:?}",
            host.kind(),
            session.name()
        );

        Ok(Self {
            host,
            config,
            session,
            resolver,
            writer,
            capture,
            photo,
            recorder: Recorder::new(),
            recording_name: None,
            devices: DeviceList::default(),
            selection: DeviceSelection::default(),
            saving,
        })
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    pub fn selection(&self) -> &DeviceSelection {
        &self.selection
    }

    pub fn is_streaming(&self) -> bool {
        self.capture.is_streaming()
    }

    pub fn record_audio(&self) -> bool {
        self.capture.record_audio()
    }

    // Devices and stream

    /// Stop the preview, enumerate devices, pick defaults and start the preferred camera
    pub async fn refresh_devices(&mut self) -> Result<DeviceList, StudioError> {
        if self.recorder.is_recording() {
            return Err(StudioError::AlreadyRecording);
        }
        self.capture.detach();

        let media = self.host.media();
        let devices = tokio::task::spawn_blocking(move || list_devices(media.as_ref()))
            .await
            .map_err(join_error)??;

        self.devices = DeviceList::from_devices(&devices);
        self.selection = DeviceSelection::pick_default(&devices, &self.config.capture.preferred_label);

        if self.selection.camera.is_some() {
            self.start_camera().await?;
        }
        Ok(self.devices.clone())
    }

    pub async fn select_camera(&mut self, device_id: &str) -> Result<(), StudioError> {
        if !self.devices.cameras.is_empty() && !self.devices.contains_camera(device_id) {
            return Err(StudioError::InvalidInput(format!(
                "Unknown camera: {}",
                device_id
            )));
        }
        self.selection.camera = Some(device_id.to_string());
        self.start_camera().await
    }

    /// Pick a microphone and reopen the stream with it
    pub async fn select_microphone(&mut self, device_id: &str) -> Result<(), StudioError> {
        if !self.devices.microphones.is_empty() && !self.devices.contains_microphone(device_id) {
            return Err(StudioError::InvalidInput(format!(
                "Unknown microphone: {}",
                device_id
            )));
        }
        self.selection.microphone = Some(device_id.to_string());
        if self.selection.camera.is_some() {
            self.start_camera().await?;
        }
        Ok(())
    }

    /// Flip the microphone on or off and reopen the stream. Returns the new setting.
    pub async fn toggle_mute(&mut self) -> Result<bool, StudioError> {
        if self.recorder.is_recording() {
            return Err(StudioError::InvalidInput(
                "Cannot mute while recording".to_string(),
            ));
        }

        let record_audio = !self.capture.record_audio();
        self.capture.set_record_audio(record_audio);
        log::info!(
            "Microphone {}",
            if record_audio { "unmuted" } else { "muted" }
        );

        if self.selection.camera.is_some() {
            self.start_camera().await?;
        }
        Ok(record_audio)
    }

    /// (Re)open the selected camera as the preview stream
    pub async fn start_camera(&mut self) -> Result<(), StudioError> {
        let camera = self
            .selection
            .camera
            .clone()
            .ok_or(StudioError::NoDeviceSelected)?;
        if self.recorder.is_recording() {
            return Err(StudioError::AlreadyRecording);
        }

        let request = self
            .capture
            .stream_request(&camera, self.selection.microphone.as_deref());
        // Release the device before opening it again
        self.capture.detach();

        let media = self.host.media();
        let stream = tokio::task::spawn_blocking(move || media.open(&request))
            .await
            .map_err(join_error)??;

        self.capture.attach(stream);
        log::info!("Preview started for camera {}", camera);
        Ok(())
    }

    pub fn stop_camera(&mut self) -> Result<(), StudioError> {
        if self.recorder.is_recording() {
            return Err(StudioError::AlreadyRecording);
        }
        self.capture.detach();
        Ok(())
    }

    pub fn geometry(&self) -> Option<PreviewGeometry> {
        self.capture.geometry()
    }

    // Session and save location

    /// Rename the session; numbering restarts for the new name
    pub async fn rename_session(&mut self, raw: &str) -> Result<bool, StudioError> {
        let mut session = self.session.clone();
        let host = self.host.clone();
        let album = self.config.storage.album_name.clone();
        let raw = raw.to_string();

        let (session, changed) = tokio::task::spawn_blocking(move || {
            let changed = session.set_name(&raw, None)?;
            if changed {
                seed_session(&mut session, host.as_ref(), &album)?;
            }
            Ok::<_, StudioError>((session, changed))
        })
        .await
        .map_err(join_error)??;

        self.session = session;
        Ok(changed)
    }

    pub fn save_location(&self) -> SaveLocation {
        self.resolver.resolve()
    }

    pub fn set_save_location(&self, location: SaveLocation) -> Result<(), StudioError> {
        self.resolver.set(location)
    }

    // Recording

    pub async fn start_recording(&mut self) -> Result<String, StudioError> {
        let stream = self.capture.stream().ok_or(StudioError::NoDeviceSelected)?;
        if self.recorder.is_recording() {
            return Err(StudioError::AlreadyRecording);
        }

        let encoder = self.host.encoder();
        let mime = select_mime(encoder.as_ref())?;

        let location = self.writer.effective_location(self.save_location());
        let target = match (self.host.is_native(), location, self.host.files()) {
            (true, SaveLocation::Files, Some(files)) => {
                let name = self.reserve_file(files.clone(), mime.extension()).await?;
                let path = name.relative_path();
                self.recording_name = Some(name);
                RecordingTarget::Incremental { files, path }
            }
            _ => RecordingTarget::Buffered,
        };

        let result = self.recorder.start(encoder.as_ref(), stream, mime, target);
        if result.is_err() {
            if let Some(name) = self.recording_name.take() {
                log::warn!("Recording did not start, {} stays empty", name.relative_path());
            }
        }
        self.saving.send_replace(false);
        result
    }

    /// Stop recording and save the result. `None` when nothing was recorded.
    pub async fn stop_recording(&mut self) -> Result<Option<SavedArtifact>, StudioError> {
        if !self.recorder.is_recording() {
            return Err(StudioError::NotRecording);
        }

        self.saving.send_replace(true);
        let result = self.finish_recording().await;
        self.saving.send_replace(false);
        result
    }

    async fn finish_recording(&mut self) -> Result<Option<SavedArtifact>, StudioError> {
        let outcome = self.recorder.stop().await;
        let reserved = self.recording_name.take();

        match outcome? {
            RecordingOutcome::Buffered(None) => {
                log::info!("No recording data to save");
                Ok(None)
            }
            RecordingOutcome::Buffered(Some(artifact)) => self.save_artifact(artifact).await.map(Some),
            RecordingOutcome::Written { path, bytes } => {
                let file_name = reserved.map(|n| n.file_name).unwrap_or_else(|| {
                    path.rsplit(['/', '\\']).next().unwrap_or(&path).to_string()
                });
                log::info!("Recording saved to {} ({} bytes)", path, bytes);
                Ok(Some(SavedArtifact {
                    location: SaveLocation::Files,
                    file_name,
                    path,
                    bytes,
                }))
            }
        }
    }

    pub fn recording_status(&self) -> RecordingStatus {
        let snapshot = self.recorder.snapshot();
        RecordingStatus {
            is_recording: snapshot.is_recording,
            recording_id: snapshot.recording_id,
            mime_type: snapshot.mime_type,
            elapsed: snapshot.elapsed,
            elapsed_secs: snapshot.elapsed_secs,
            chunks: snapshot.chunks,
            bytes: snapshot.bytes,
            saving: self.is_saving(),
        }
    }

    pub fn is_saving(&self) -> bool {
        *self.saving.borrow()
    }

    /// Follow the saving flag
    pub fn subscribe_saving(&self) -> watch::Receiver<bool> {
        self.saving.subscribe()
    }

    // Photos

    pub async fn take_photo(&mut self) -> Result<SavedArtifact, StudioError> {
        let stream = self.capture.stream().ok_or(StudioError::NoDeviceSelected)?;
        let photo = self.photo.clone();

        let artifact = tokio::task::spawn_blocking(move || {
            let frame = with_stream(&stream, |s| s.grab_frame())?;
            photo.capture(&frame)
        })
        .await
        .map_err(join_error)??;

        self.saving.send_replace(true);
        let saved = self.save_artifact(artifact).await;
        self.saving.send_replace(false);
        saved
    }

    /// Route an artifact under the next free session number
    async fn save_artifact(&mut self, artifact: Artifact) -> Result<SavedArtifact, StudioError> {
        let location = self.save_location();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = self.session.next_artifact_name(&artifact.extension);
            let writer = self.writer.clone();
            let artifact = artifact.clone();

            match tokio::task::spawn_blocking(move || writer.write(location, &name, &artifact))
                .await
                .map_err(join_error)?
            {
                Err(StudioError::AlreadyExists(path)) => {
                    log::warn!("{} already exists, trying the next number", path);
                }
                result => return result,
            }
        }
        Err(StudioError::WriteFailure(format!(
            "No free file name after {} attempts",
            MAX_NAME_ATTEMPTS
        )))
    }

    /// Create an empty file under the next free session number for an incremental recording
    async fn reserve_file(
        &mut self,
        files: Arc<dyn FileStore>,
        extension: &str,
    ) -> Result<ArtifactName, StudioError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = self.session.next_artifact_name(extension);
            let path = name.relative_path();
            let files = files.clone();

            match tokio::task::spawn_blocking(move || files.create(&path, &[]))
                .await
                .map_err(join_error)?
            {
                Ok(_) => return Ok(name),
                Err(StudioError::AlreadyExists(path)) => {
                    log::warn!("{} already exists, trying the next number", path);
                }
                Err(e) => return Err(e),
            }
        }
        Err(StudioError::WriteFailure(format!(
            "No free file name after {} attempts",
            MAX_NAME_ATTEMPTS
        )))
    }

    // Zoom

    pub fn zoom(&self) -> &ZoomState {
        self.capture.zoom()
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomState {
        self.capture.zoom_mut()
    }

    pub fn zoom_view(&self) -> ZoomView {
        self.capture.zoom().view()
    }

    // Disclaimer

    pub fn has_agreed_to_terms(&self) -> bool {
        match self.host.preferences().get(TERMS_AGREED_KEY) {
            Ok(Some(serde_json::Value::Bool(agreed))) => agreed,
            Ok(_) => false,
            Err(e) => {
                log::warn!("Failed to read {}: {}", TERMS_AGREED_KEY, e);
                false
            }
        }
    }

    pub fn agree_to_terms(&self) -> Result<(), StudioError> {
        self.host
            .preferences()
            .set(TERMS_AGREED_KEY, serde_json::Value::Bool(true))?;
        log::info!("Disclaimer accepted");
        Ok(())
    }

    pub fn state(&self) -> StudioState {
        StudioState {
            host: self.host.kind(),
            session_name: self.session.name().to_string(),
            safe_session_name: self.session.safe_name(),
            save_location: self.save_location(),
            devices: self.devices.clone(),
            selection: self.selection.clone(),
            record_audio: self.capture.record_audio(),
            streaming: self.capture.is_streaming(),
            recording: self.recording_status(),
            zoom: self.zoom_view(),
            geometry: self.capture.geometry(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{native_test_host, web_test_host};
    use tempfile::TempDir;

    fn studio(host: Arc<dyn Host>) -> Studio {
        Studio::new(host, StudioConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_default_session_name_uses_product() {
        let dir = TempDir::new().unwrap();
        let studio = studio(web_test_host(dir.path()));
        assert!(studio.session().name().starts_with("EndoStudio "));
        assert_eq!(studio.save_location(), SaveLocation::Downloads);
    }

    #[tokio::test]
    async fn test_refresh_selects_usb_camera_and_starts_preview() {
        let dir = TempDir::new().unwrap();
        let mut studio = studio(native_test_host(dir.path()));

        let devices = studio.refresh_devices().await.unwrap();
        assert_eq!(devices.cameras.len(), 2);
        assert_eq!(studio.selection().camera.as_deref(), Some("1"));
        assert!(studio.is_streaming());
        assert_eq!(studio.geometry().map(|g| (g.width, g.height)), Some((1024, 768)));
    }

    #[tokio::test]
    async fn test_mute_is_rejected_while_recording() {
        let dir = TempDir::new().unwrap();
        let mut studio = studio(web_test_host(dir.path()));
        studio.refresh_devices().await.unwrap();

        assert!(!studio.toggle_mute().await.unwrap());
        assert!(studio.toggle_mute().await.unwrap());

        studio.start_recording().await.unwrap();
        assert!(studio.toggle_mute().await.is_err());
        studio.stop_recording().await.unwrap();
    }

    #[tokio::test]
    async fn test_terms_agreement_persists() {
        let dir = TempDir::new().unwrap();
        let studio = studio(native_test_host(dir.path()));
        assert!(!studio.has_agreed_to_terms());
        studio.agree_to_terms().unwrap();
        assert!(studio.has_agreed_to_terms());
    }

    #[tokio::test]
    async fn test_unknown_camera_is_rejected_after_refresh() {
        let dir = TempDir::new().unwrap();
        let mut studio = studio(native_test_host(dir.path()));
        studio.refresh_devices().await.unwrap();
        assert!(matches!(
            studio.select_camera("nope").await,
            Err(StudioError::InvalidInput(_))
        ));
    }
}
