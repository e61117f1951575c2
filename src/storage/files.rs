use super::{check_relative, FileStore};
use crate::errors::StudioError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File store rooted at a local directory (the app's documents directory)
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, StudioError> {
        check_relative(path)?;
        Ok(self.root.join(path))
    }

    fn ensure_parent(full: &Path) -> Result<(), StudioError> {
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StudioError::WriteFailure(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }
        Ok(())
    }
}

/// Write a file that must not exist yet
pub(crate) fn write_new(full: &Path, data: &[u8]) -> Result<(), StudioError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(full)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => {
                StudioError::AlreadyExists(full.to_string_lossy().to_string())
            }
            _ => StudioError::WriteFailure(format!("Failed to create {:?}: {}", full, e)),
        })?;
    file.write_all(data)
        .map_err(|e| StudioError::WriteFailure(format!("Failed to write {:?}: {}", full, e)))
}

impl FileStore for LocalFileStore {
    fn create(&self, path: &str, data: &[u8]) -> Result<String, StudioError> {
        let full = self.full_path(path)?;
        Self::ensure_parent(&full)?;
        write_new(&full, data)?;
        log::debug!("Wrote {} bytes to {:?}", data.len(), full);
        Ok(full.to_string_lossy().to_string())
    }

    fn append(&self, path: &str, data: &[u8]) -> Result<(), StudioError> {
        let full = self.full_path(path)?;
        Self::ensure_parent(&full)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full)
            .map_err(|e| StudioError::WriteFailure(format!("Failed to open {:?}: {}", full, e)))?;
        file.write_all(data)
            .map_err(|e| StudioError::WriteFailure(format!("Failed to append to {:?}: {}", full, e)))?;
        Ok(())
    }

    fn mkdir(&self, path: &str) -> Result<(), StudioError> {
        let full = self.full_path(path)?;
        fs::create_dir_all(&full)
            .map_err(|e| StudioError::WriteFailure(format!("Failed to create {:?}: {}", full, e)))
    }

    fn read_dir(&self, path: &str) -> Result<Option<Vec<String>>, StudioError> {
        let full = self.full_path(path)?;
        if !full.is_dir() {
            return Ok(None);
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&full)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(Some(names))
    }

    fn resolve(&self, path: &str) -> String {
        self.root.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_session_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        let written = store.create("Run 1/Run 1.001.jpeg", b"jpeg").unwrap();
        assert!(written.ends_with("Run 1.001.jpeg"));
        assert_eq!(
            store.read_dir("Run 1").unwrap(),
            Some(vec!["Run 1.001.jpeg".to_string()])
        );
    }

    #[test]
    fn test_append_accumulates_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        store.append("s/s.001.mp4", b"abc").unwrap();
        store.append("s/s.001.mp4", b"def").unwrap();
        let bytes = fs::read(dir.path().join("s/s.001.mp4")).unwrap();
        assert_eq!(bytes, b"abcdef");
    }

    #[test]
    fn test_read_dir_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        assert_eq!(store.read_dir("nope").unwrap(), None);
        store.mkdir("nope").unwrap();
        assert_eq!(store.read_dir("nope").unwrap(), Some(vec![]));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        assert!(store.create("../outside.jpeg", b"x").is_err());
    }

    #[test]
    fn test_create_never_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        store.create("Pipe/Pipe.003.jpeg", b"THREE").unwrap();
        assert!(matches!(
            store.create("Pipe/Pipe.003.jpeg", b"NEW"),
            Err(StudioError::AlreadyExists(_))
        ));
        assert_eq!(fs::read(dir.path().join("Pipe/Pipe.003.jpeg")).unwrap(), b"THREE");
    }

    #[test]
    fn test_empty_append_keeps_existing_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        store.create("v/v.001.mp4", b"video").unwrap();
        store.append("v/v.001.mp4", &[]).unwrap();
        assert_eq!(fs::read(dir.path().join("v/v.001.mp4")).unwrap(), b"video");
    }
}
