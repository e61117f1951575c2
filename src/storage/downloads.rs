use super::{check_relative, DownloadSink};
use crate::errors::StudioError;
use std::fs;
use std::path::{Path, PathBuf};

/// Downloads land in a directory; clashing names get a " (n)" suffix the way browsers do it
pub struct DirectoryDownloadSink {
    dir: PathBuf,
}

impl DirectoryDownloadSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn unused_path(&self, file_name: &str) -> PathBuf {
        let candidate = self.dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, ext) = match file_name.rfind('.') {
            Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
            _ => (file_name, ""),
        };
        let mut n = 1;
        loop {
            let candidate = self.dir.join(format!("{} ({}){}", stem, n, ext));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn deliver(&self, file_name: &str, mime_type: &str, data: &[u8]) -> Result<String, StudioError> {
        check_relative(file_name)?;
        fs::create_dir_all(&self.dir).map_err(|e| {
            StudioError::WriteFailure(format!("Failed to create downloads directory: {}", e))
        })?;

        let target = self.unused_path(file_name);
        fs::write(&target, data).map_err(|e| {
            StudioError::WriteFailure(format!("Failed to write download {:?}: {}", target, e))
        })?;

        log::info!(
            "Downloaded {} ({}, {} bytes) to {:?}",
            file_name,
            mime_type,
            data.len(),
            target
        );
        Ok(target.to_string_lossy().to_string())
    }
}
