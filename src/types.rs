//! Shared value types: platforms, device descriptors, frames and stream requests.

use serde::{Deserialize, Serialize};

/// Operating system the studio is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    Android,
    IOS,
    Unknown,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::IOS
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOS => "macos",
            Platform::Linux => "linux",
            Platform::Android => "android",
            Platform::IOS => "ios",
            Platform::Unknown => "unknown",
        }
    }
}

/// Kind of input device, named after the browser's `MediaDeviceInfo.kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "videoinput")]
    VideoInput,
    #[serde(rename = "audioinput")]
    AudioInput,
}

/// An input device as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub label: String,
    pub kind: DeviceKind,
}

impl DeviceDescriptor {
    pub fn video(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: DeviceKind::VideoInput,
        }
    }

    pub fn audio(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: DeviceKind::AudioInput,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == DeviceKind::VideoInput
    }

    pub fn is_audio(&self) -> bool {
        self.kind == DeviceKind::AudioInput
    }
}

/// A single RGB24 video frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub device_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl VideoFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, device_id: String) -> Self {
        Self {
            width,
            height,
            data,
            device_id,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Whether the buffer length matches width * height * 3
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == (self.width as usize) * (self.height as usize) * 3
    }
}

/// Audio constraint for opening a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioRequest {
    /// Microphone muted: no audio track
    Disabled,
    /// Any microphone the platform picks
    Any,
    /// A specific microphone
    Exact(String),
}

/// What to open: one camera plus an audio constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRequest {
    pub video_device: String,
    pub audio: AudioRequest,
}

impl StreamRequest {
    pub fn new(video_device: impl Into<String>) -> Self {
        Self {
            video_device: video_device.into(),
            audio: AudioRequest::Disabled,
        }
    }

    /// Build the audio constraint from the mute flag and the selected microphone
    pub fn with_audio(mut self, record_audio: bool, microphone: Option<&str>) -> Self {
        self.audio = match (record_audio, microphone) {
            (false, _) => AudioRequest::Disabled,
            (true, None) => AudioRequest::Any,
            (true, Some(id)) if id.is_empty() => AudioRequest::Any,
            (true, Some(id)) => AudioRequest::Exact(id.to_string()),
        };
        self
    }
}
