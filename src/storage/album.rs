use super::files::write_new;
use super::{check_relative, AlbumStore};
use crate::errors::StudioError;
use std::fs;
use std::path::{Path, PathBuf};

/// Media library where every album is a directory under one root
pub struct DirectoryAlbumStore {
    root: PathBuf,
}

impl DirectoryAlbumStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn album_path(&self, name: &str) -> Result<PathBuf, StudioError> {
        check_relative(name)?;
        if name.contains('/') || name.contains('\\') {
            return Err(StudioError::InvalidInput(format!(
                "Album name must not contain path separators: {:?}",
                name
            )));
        }
        Ok(self.root.join(name))
    }
}

impl AlbumStore for DirectoryAlbumStore {
    fn album_exists(&self, name: &str) -> Result<bool, StudioError> {
        Ok(self.album_path(name)?.is_dir())
    }

    fn create_album(&self, name: &str) -> Result<(), StudioError> {
        let path = self.album_path(name)?;
        fs::create_dir_all(&path).map_err(|e| {
            StudioError::WriteFailure(format!("Failed to create album {:?}: {}", name, e))
        })?;
        log::info!("Created album {:?} at {:?}", name, path);
        Ok(())
    }

    fn list_media(&self, album: &str) -> Result<Vec<String>, StudioError> {
        let album_path = self.album_path(album)?;
        if !album_path.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&album_path)? {
            names.push(entry?.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    fn save_media(&self, album: &str, file_name: &str, data: &[u8]) -> Result<String, StudioError> {
        let album_path = self.album_path(album)?;
        if !album_path.is_dir() {
            return Err(StudioError::WriteFailure(format!(
                "Album {:?} does not exist",
                album
            )));
        }
        check_relative(file_name)?;
        let target = album_path.join(file_name);
        write_new(&target, data)?;
        Ok(target.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let albums = DirectoryAlbumStore::new(dir.path());

        assert!(!albums.album_exists("EndoStudio").unwrap());
        assert!(albums.save_media("EndoStudio", "a.jpeg", b"x").is_err());

        albums.create_album("EndoStudio").unwrap();
        assert!(albums.album_exists("EndoStudio").unwrap());

        let saved = albums.save_media("EndoStudio", "a.jpeg", b"x").unwrap();
        assert!(Path::new(&saved).exists());
        assert_eq!(albums.list_media("EndoStudio").unwrap(), vec!["a.jpeg".to_string()]);
    }

    #[test]
    fn test_save_media_never_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let albums = DirectoryAlbumStore::new(dir.path());
        albums.create_album("EndoStudio").unwrap();

        albums.save_media("EndoStudio", "Pipe.001.jpeg", b"FIRST").unwrap();
        assert!(matches!(
            albums.save_media("EndoStudio", "Pipe.001.jpeg", b"SECOND"),
            Err(StudioError::AlreadyExists(_))
        ));
        assert_eq!(
            fs::read(dir.path().join("EndoStudio/Pipe.001.jpeg")).unwrap(),
            b"FIRST"
        );
    }

    #[test]
    fn test_missing_album_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let albums = DirectoryAlbumStore::new(dir.path());
        assert!(albums.list_media("Nowhere").unwrap().is_empty());
    }

    #[test]
    fn test_album_name_cannot_nest() {
        let dir = tempfile::tempdir().unwrap();
        let albums = DirectoryAlbumStore::new(dir.path());
        assert!(albums.create_album("a/b").is_err());
    }
}
