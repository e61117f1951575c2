//! Container formats the recorder can ask an encoder for

use super::MediaEncoder;
use crate::errors::StudioError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    Mp4,
    Webm,
    Ogg,
    Avi,
    Mov,
}

impl MimeType {
    /// Tried in this order; the first supported one wins
    pub const PREFERENCE: [MimeType; 5] = [
        MimeType::Mp4,
        MimeType::Webm,
        MimeType::Ogg,
        MimeType::Avi,
        MimeType::Mov,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Mp4 => "video/mp4",
            MimeType::Webm => "video/webm",
            MimeType::Ogg => "video/ogg",
            MimeType::Avi => "video/avi",
            MimeType::Mov => "video/mov",
        }
    }

    /// File extension: the subtype after the slash
    pub fn extension(&self) -> &'static str {
        let mime = self.as_str();
        &mime[mime.find('/').map_or(0, |i| i + 1)..]
    }

    pub fn parse(mime: &str) -> Option<Self> {
        Self::PREFERENCE
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(mime.trim()))
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the first MIME type from [`MimeType::PREFERENCE`] that the encoder supports
pub fn select_mime(encoder: &dyn MediaEncoder) -> Result<MimeType, StudioError> {
    let selected = MimeType::PREFERENCE
        .into_iter()
        .find(|mime| encoder.is_type_supported(mime.as_str()));

    match selected {
        Some(mime) => {
            log::debug!("Selected recording format {}", mime);
            Ok(mime)
        }
        None => {
            log::error!("No supported video MIME types found");
            Err(StudioError::NoSupportedEncoding)
        }
    }
}
