use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("No supported video MIME types found")]
    NoSupportedEncoding,
    #[error("Please select a camera first")]
    NoDeviceSelected,
    #[error("Write failure: {0}")]
    WriteFailure(String),
    #[error("File already exists: {0}")]
    AlreadyExists(String),
    #[error("Initialization error: {0}")]
    Initialization(String),
    #[error("Capture error: {0}")]
    Capture(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Recording already in progress")]
    AlreadyRecording,
    #[error("No recording in progress")]
    NotRecording,
}

impl StudioError {
    /// True for the failures a user can fix by acting (granting access, picking a camera).
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            StudioError::PermissionDenied(_)
                | StudioError::NoDeviceSelected
                | StudioError::InvalidInput(_)
                | StudioError::AlreadyRecording
                | StudioError::NotRecording
        )
    }
}

impl From<std::io::Error> for StudioError {
    fn from(e: std::io::Error) -> Self {
        StudioError::WriteFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_user_notifications() {
        assert_eq!(
            StudioError::NoDeviceSelected.to_string(),
            "Please select a camera first"
        );
        assert_eq!(
            StudioError::NoSupportedEncoding.to_string(),
            "No supported video MIME types found"
        );
    }

    #[test]
    fn test_io_errors_become_write_failures() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StudioError = io.into();
        assert!(matches!(err, StudioError::WriteFailure(ref m) if m.contains("read-only")));
        assert!(!err.is_user_actionable());
    }

    #[test]
    fn test_existing_file_error_names_the_path() {
        let err = StudioError::AlreadyExists("Pipe/Pipe.001.jpeg".to_string());
        assert_eq!(err.to_string(), "File already exists: Pipe/Pipe.001.jpeg");
        assert!(!err.is_user_actionable());
    }
}
