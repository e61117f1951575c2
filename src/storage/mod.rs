//! Storage capability providers
//!
//! The studio never touches a filesystem or a media library directly. It goes
//! through these traits, which the host (see [`crate::platform`]) supplies:
//!
//! - [`PreferenceStore`]: persistent key-value preferences
//! - [`FileStore`]: hierarchical app-managed files (the "files" save location)
//! - [`AlbumStore`]: photo/video albums (the "camera-roll" save location)
//! - [`DownloadSink`]: browser-style downloads (the "downloads" save location)
//!
//! All methods are blocking; async callers run them under `spawn_blocking`.

mod album;
mod downloads;
mod files;
mod preferences;

pub use album::DirectoryAlbumStore;
pub use downloads::DirectoryDownloadSink;
pub use files::LocalFileStore;
pub use preferences::{JsonPreferenceStore, MemoryPreferenceStore};

use crate::errors::StudioError;

/// Persistent key-value preferences
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StudioError>;
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StudioError>;
    fn remove(&self, key: &str) -> Result<(), StudioError>;
}

/// Hierarchical file storage rooted at an app-managed directory.
///
/// Paths are relative to the store root and use `/` separators.
pub trait FileStore: Send + Sync {
    /// Create a new file, creating parent directories. Fails with
    /// `AlreadyExists` instead of replacing a file that is already there.
    fn create(&self, path: &str, data: &[u8]) -> Result<String, StudioError>;
    /// Append to a file, creating it and its parent directories if missing
    fn append(&self, path: &str, data: &[u8]) -> Result<(), StudioError>;
    /// Create a directory and its parents
    fn mkdir(&self, path: &str) -> Result<(), StudioError>;
    /// Entry names of a directory, or `None` if it does not exist
    fn read_dir(&self, path: &str) -> Result<Option<Vec<String>>, StudioError>;
    /// Absolute location of a relative path, for reporting
    fn resolve(&self, path: &str) -> String;
}

/// Photo/video album management
pub trait AlbumStore: Send + Sync {
    fn album_exists(&self, name: &str) -> Result<bool, StudioError>;
    fn create_album(&self, name: &str) -> Result<(), StudioError>;
    /// Names of the media in an album; empty if the album does not exist
    fn list_media(&self, album: &str) -> Result<Vec<String>, StudioError>;
    /// Save media into an existing album and return its location.
    /// Fails with `AlreadyExists` if the album already holds `file_name`.
    fn save_media(&self, album: &str, file_name: &str, data: &[u8]) -> Result<String, StudioError>;
}

/// Browser-style download: the user receives a file under the suggested name
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, file_name: &str, mime_type: &str, data: &[u8]) -> Result<String, StudioError>;
}

/// Reject absolute paths and parent traversal in store-relative paths
pub(crate) fn check_relative(path: &str) -> Result<(), StudioError> {
    let p = std::path::Path::new(path);
    if path.is_empty() || p.is_absolute() {
        return Err(StudioError::InvalidInput(format!(
            "Expected a relative path, got {:?}",
            path
        )));
    }
    if p
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)))
    {
        return Err(StudioError::InvalidInput(format!(
            "Path must not leave the store root: {:?}",
            path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_relative() {
        assert!(check_relative("Session/Session.001.jpeg").is_ok());
        assert!(check_relative("../escape").is_err());
        assert!(check_relative("/etc/passwd").is_err());
        assert!(check_relative("").is_err());
        assert!(check_relative("a/./b").is_ok());
    }
}
