//! Artifacts and where they get written

use crate::errors::StudioError;
use crate::platform::Host;
use crate::save_location::SaveLocation;
use crate::session::ArtifactName;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Encoded media waiting to be saved
#[derive(Debug, Clone)]
pub struct Artifact {
    pub data: Bytes,
    pub mime_type: String,
    pub extension: String,
}

impl Artifact {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            extension: extension.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Where an artifact ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedArtifact {
    pub location: SaveLocation,
    pub file_name: String,
    pub path: String,
    pub bytes: u64,
}

/// Downloaded files carry no spaces
pub fn download_file_name(file_name: &str) -> String {
    file_name.replace(' ', "_")
}

/// Routes artifacts to the host's files, album or downloads
#[derive(Clone)]
pub struct ArtifactWriter {
    host: Arc<dyn Host>,
    album_name: String,
}

impl ArtifactWriter {
    pub fn new(host: Arc<dyn Host>, album_name: impl Into<String>) -> Self {
        Self {
            host,
            album_name: album_name.into(),
        }
    }

    pub fn album_name(&self) -> &str {
        &self.album_name
    }

    /// `requested` if the host can write there, otherwise downloads
    pub fn effective_location(&self, requested: SaveLocation) -> SaveLocation {
        if self.host.supports(requested) {
            requested
        } else {
            log::warn!(
                "Save location {} is not available on this host, using downloads",
                requested
            );
            SaveLocation::Downloads
        }
    }

    /// Write an artifact. Blocking; run under `spawn_blocking` from async code.
    pub fn write(
        &self,
        requested: SaveLocation,
        name: &ArtifactName,
        artifact: &Artifact,
    ) -> Result<SavedArtifact, StudioError> {
        let location = self.effective_location(requested);

        let (file_name, path) = match location {
            SaveLocation::Files => self.write_file(name, artifact)?,
            SaveLocation::CameraRoll => self.write_album(name, artifact)?,
            SaveLocation::Downloads => self.write_download(name, artifact)?,
        };

        log::info!(
            "Saved {} ({} bytes) to {}: {}",
            file_name,
            artifact.len(),
            location,
            path
        );

        Ok(SavedArtifact {
            location,
            file_name,
            path,
            bytes: artifact.len() as u64,
        })
    }

    fn write_file(&self, name: &ArtifactName, artifact: &Artifact) -> Result<(String, String), StudioError> {
        let files = self
            .host
            .files()
            .ok_or_else(|| StudioError::WriteFailure("Host has no file store".to_string()))?;

        files.mkdir(&name.directory)?;
        let path = files.create(&name.relative_path(), &artifact.data)?;
        Ok((name.file_name.clone(), path))
    }

    fn write_album(&self, name: &ArtifactName, artifact: &Artifact) -> Result<(String, String), StudioError> {
        let albums = self
            .host
            .albums()
            .ok_or_else(|| StudioError::WriteFailure("Host has no media library".to_string()))?;

        if !albums.album_exists(&self.album_name)? {
            log::info!("Creating album {:?}", self.album_name);
            albums.create_album(&self.album_name)?;
        }
        let path = albums.save_media(&self.album_name, &name.file_name, &artifact.data)?;
        Ok((name.file_name.clone(), path))
    }

    fn write_download(&self, name: &ArtifactName, artifact: &Artifact) -> Result<(String, String), StudioError> {
        let file_name = download_file_name(&name.file_name);
        let path = self
            .host
            .downloads()
            .deliver(&file_name, &artifact.mime_type, &artifact.data)?;
        Ok((file_name, path))
    }
}
