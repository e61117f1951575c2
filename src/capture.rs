//! Capture controller: the current preview stream, its geometry and zoom

use crate::config::{CaptureConfig, ZoomConfig};
use crate::platform::{MediaStream, SharedStream};
use crate::types::StreamRequest;
use crate::zoom::ZoomState;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Canvas size for a source resolution scaled to a fixed output width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewGeometry {
    pub source_width: u32,
    pub source_height: u32,
    pub width: u32,
    pub height: u32,
}

impl PreviewGeometry {
    /// height = source_height / source_width * output_width, rounded
    pub fn for_source(source_width: u32, source_height: u32, output_width: u32) -> Self {
        let height = if source_width == 0 {
            0
        } else {
            (source_height as f64 / source_width as f64 * output_width as f64).round() as u32
        };

        Self {
            source_width,
            source_height,
            width: output_width,
            height,
        }
    }
}

pub struct CaptureController {
    stream: Option<SharedStream>,
    zoom: ZoomState,
    output_width: u32,
    record_audio: bool,
}

impl CaptureController {
    pub fn new(capture: &CaptureConfig, zoom: &ZoomConfig) -> Self {
        Self {
            stream: None,
            zoom: ZoomState::new(zoom),
            output_width: capture.output_width,
            record_audio: capture.record_audio,
        }
    }

    pub fn stream(&self) -> Option<SharedStream> {
        self.stream.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    pub fn record_audio(&self) -> bool {
        self.record_audio
    }

    pub fn set_record_audio(&mut self, record_audio: bool) {
        self.record_audio = record_audio;
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomState {
        &mut self.zoom
    }

    /// Request for a camera with the current audio setting
    pub fn stream_request(&self, video_device: &str, microphone: Option<&str>) -> StreamRequest {
        StreamRequest::new(video_device).with_audio(self.record_audio, microphone)
    }

    /// Make `stream` the current preview, stopping the previous one
    pub fn attach(&mut self, stream: Box<dyn MediaStream>) -> SharedStream {
        self.detach();
        let shared: SharedStream = Arc::new(Mutex::new(stream));
        self.stream = Some(shared.clone());
        shared
    }

    /// Stop all tracks of the current stream and forget it
    pub fn detach(&mut self) {
        if let Some(stream) = self.stream.take() {
            match stream.lock() {
                Ok(mut s) => s.stop(),
                Err(_) => log::warn!("Preview stream lock poisoned; dropping it"),
            }
        }
    }

    /// Canvas geometry of the current stream, once its resolution is known
    pub fn geometry(&self) -> Option<PreviewGeometry> {
        let stream = self.stream.as_ref()?;
        let (w, h) = stream.lock().ok()?.resolution()?;
        Some(PreviewGeometry::for_source(w, h, self.output_width))
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.detach();
    }
}
