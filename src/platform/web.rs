use super::{Host, HostKind, MediaDevices};
use crate::recording::MediaEncoder;
use crate::storage::{AlbumStore, DownloadSink, FileStore, PreferenceStore};
use std::sync::Arc;

/// Browser-like host: no app files and no media library, artifacts leave as downloads
pub struct WebHost {
    media: Arc<dyn MediaDevices>,
    encoder: Arc<dyn MediaEncoder>,
    preferences: Arc<dyn PreferenceStore>,
    downloads: Arc<dyn DownloadSink>,
}

impl WebHost {
    pub fn new(
        media: Arc<dyn MediaDevices>,
        encoder: Arc<dyn MediaEncoder>,
        preferences: Arc<dyn PreferenceStore>,
        downloads: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            media,
            encoder,
            preferences,
            downloads,
        }
    }
}

impl Host for WebHost {
    fn kind(&self) -> HostKind {
        HostKind::Web
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
        None
    }

    fn albums(&self) -> Option<Arc<dyn AlbumStore>> {
        None
    }

    fn downloads(&self) -> Arc<dyn DownloadSink> {
        self.downloads.clone()
    }
}
