//! Native encoder: H.264 via openh264, muxed to MP4 by muxide
//!
//! Only available with the `recording` feature. Without it the encoder reports
//! no supported types, and starting a recording fails with `NoSupportedEncoding`.

use super::{EncodingSession, MediaEncoder, MimeType};
use crate::config::RecordingConfig;
use crate::errors::StudioError;
use crate::platform::SharedStream;
use bytes::Bytes;
use tokio::sync::mpsc;

pub struct NativeEncoder {
    config: RecordingConfig,
}

impl NativeEncoder {
    pub fn new(config: RecordingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }
}

impl MediaEncoder for NativeEncoder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        cfg!(feature = "recording") && MimeType::parse(mime_type) == Some(MimeType::Mp4)
    }

    fn start(
        &self,
        stream: SharedStream,
        mime: MimeType,
        chunks: mpsc::UnboundedSender<Bytes>,
    ) -> Result<Box<dyn EncodingSession>, StudioError> {
        if !self.is_type_supported(mime.as_str()) {
            return Err(StudioError::NoSupportedEncoding);
        }

        #[cfg(feature = "recording")]
        {
            let session = mp4::Mp4Session::spawn(self.config.clone(), stream, chunks)?;
            Ok(Box::new(session))
        }

        #[cfg(not(feature = "recording"))]
        {
            let _ = (stream, chunks);
            Err(StudioError::NoSupportedEncoding)
        }
    }
}

#[cfg(feature = "recording")]
mod mp4 {
    use super::super::EncodingSession;
    use crate::config::RecordingConfig;
    use crate::errors::StudioError;
    use crate::platform::{with_stream, SharedStream};
    use crate::types::VideoFrame;
    use bytes::Bytes;
    use muxide::api::{Metadata, MuxerBuilder, VideoCodec};
    use openh264::encoder::{Encoder, FrameType};
    use openh264::formats::YUVBuffer;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread::JoinHandle;
    use std::time::{Duration, Instant};
    use tokio::sync::mpsc;

    /// `Write` sink that hands muxer output to the recorder in chunks
    pub(super) struct ChunkWriter {
        tx: mpsc::UnboundedSender<Bytes>,
        buffer: Vec<u8>,
        chunk_size: usize,
    }

    impl ChunkWriter {
        pub(super) fn new(tx: mpsc::UnboundedSender<Bytes>, chunk_size: usize) -> Self {
            Self {
                tx,
                buffer: Vec::with_capacity(chunk_size),
                chunk_size: chunk_size.max(1),
            }
        }

        fn emit(&mut self) -> io::Result<()> {
            if self.buffer.is_empty() {
                return Ok(());
            }
            let chunk = Bytes::from(std::mem::take(&mut self.buffer));
            self.tx
                .send(chunk)
                .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "recorder is gone"))
        }
    }

    impl Write for ChunkWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            if self.buffer.len() >= self.chunk_size {
                self.emit()?;
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.emit()
        }
    }

    impl Drop for ChunkWriter {
        fn drop(&mut self) {
            let _ = self.emit();
        }
    }

    pub(super) struct Mp4Session {
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<Result<(), StudioError>>>,
    }

    impl Mp4Session {
        pub(super) fn spawn(
            config: RecordingConfig,
            stream: SharedStream,
            chunks: mpsc::UnboundedSender<Bytes>,
        ) -> Result<Self, StudioError> {
            let stop = Arc::new(AtomicBool::new(false));
            let flag = stop.clone();

            let handle = std::thread::Builder::new()
                .name("endostudio-encoder".to_string())
                .spawn(move || encode_loop(config, stream, chunks, flag))
                .map_err(|e| StudioError::Encoding(format!("Failed to start encoder thread: {}", e)))?;

            Ok(Self {
                stop,
                handle: Some(handle),
            })
        }
    }

    impl EncodingSession for Mp4Session {
        fn stop(mut self: Box<Self>) -> Result<(), StudioError> {
            self.stop.store(true, Ordering::Release);
            match self.handle.take() {
                Some(handle) => handle
                    .join()
                    .map_err(|_| StudioError::Encoding("Encoder thread panicked".to_string()))?,
                None => Ok(()),
            }
        }
    }

    impl Drop for Mp4Session {
        fn drop(&mut self) {
            self.stop.store(true, Ordering::Release);
        }
    }

    fn encode_loop(
        config: RecordingConfig,
        stream: SharedStream,
        chunks: mpsc::UnboundedSender<Bytes>,
        stop: Arc<AtomicBool>,
    ) -> Result<(), StudioError> {
        let first = with_stream(&stream, |s| s.grab_frame())?;
        // YUV420 needs even dimensions; odd edges are cropped
        let (width, height) = (first.width & !1, first.height & !1);
        if width == 0 || height == 0 || !first.is_valid() {
            return Err(StudioError::Encoding(format!(
                "Cannot encode {}x{} frames",
                first.width, first.height
            )));
        }

        let mut encoder = Encoder::new()
            .map_err(|e| StudioError::Encoding(format!("Failed to create encoder: {}", e)))?;

        let mut muxer = MuxerBuilder::new(ChunkWriter::new(chunks, config.chunk_size))
            .video(VideoCodec::H264, width, height, config.fps)
            .with_fast_start(false)
            .with_metadata(Metadata::new().with_current_time())
            .build()
            .map_err(|e| StudioError::Encoding(format!("Failed to create muxer: {}", e)))?;

        let frame_interval = Duration::from_secs_f64(1.0 / config.fps);
        let mut frame_count = 0u64;
        let mut pending = Some(first);

        while !stop.load(Ordering::Acquire) {
            let tick = Instant::now();

            let frame = match pending.take() {
                Some(frame) => frame,
                None => match with_stream(&stream, |s| s.grab_frame()) {
                    Ok(frame) => frame,
                    Err(e) => {
                        log::warn!("Stream ended while recording: {}", e);
                        break;
                    }
                },
            };

            if let Some(encoded) = encode_frame(&mut encoder, &frame, width, height)? {
                let pts = frame_count as f64 / config.fps;
                muxer
                    .write_video(pts, &encoded.0, encoded.1)
                    .map_err(|e| StudioError::Encoding(format!("Failed to write frame: {}", e)))?;
                frame_count += 1;
            }

            if let Some(rest) = frame_interval.checked_sub(tick.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        let stats = muxer
            .finish_with_stats()
            .map_err(|e| StudioError::Encoding(format!("Failed to finalize recording: {}", e)))?;
        log::info!(
            "Encoded {} frames ({:.1}s, {} bytes)",
            stats.video_frames,
            stats.duration_secs,
            stats.bytes_written
        );
        Ok(())
    }

    /// Annex B data and keyframe flag, or `None` for frames to skip
    fn encode_frame(
        encoder: &mut Encoder,
        frame: &VideoFrame,
        width: u32,
        height: u32,
    ) -> Result<Option<(Vec<u8>, bool)>, StudioError> {
        if !frame.is_valid() || frame.width & !1 != width || frame.height & !1 != height {
            log::debug!("Skipping {}x{} frame", frame.width, frame.height);
            return Ok(None);
        }

        let yuv = rgb_to_yuv420(&frame.data, frame.width, width, height);
        let buffer = YUVBuffer::from_vec(yuv, width as usize, height as usize);
        let bitstream = encoder
            .encode(&buffer)
            .map_err(|e| StudioError::Encoding(format!("Encoding failed: {}", e)))?;

        let is_keyframe = matches!(bitstream.frame_type(), FrameType::IDR | FrameType::I);
        let data = bitstream.to_vec();
        Ok((!data.is_empty()).then_some((data, is_keyframe)))
    }

    /// RGB24 with row length `stride` to planar YUV420 (BT.601) of `width`x`height`
    pub(super) fn rgb_to_yuv420(rgb: &[u8], stride: u32, width: u32, height: u32) -> Vec<u8> {
        let (s, w, h) = (stride as usize, width as usize, height as usize);
        let y_size = w * h;
        let uv_size = (w / 2) * (h / 2);
        let mut yuv = vec![0u8; y_size + uv_size * 2];

        let (y_plane, uv_planes) = yuv.split_at_mut(y_size);
        let (u_plane, v_plane) = uv_planes.split_at_mut(uv_size);

        for y in 0..h {
            for x in 0..w {
                let idx = (y * s + x) * 3;
                let r = rgb[idx] as i32;
                let g = rgb[idx + 1] as i32;
                let b = rgb[idx + 2] as i32;

                y_plane[y * w + x] = (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16).clamp(0, 255) as u8;

                if y % 2 == 0 && x % 2 == 0 {
                    let uv = (y / 2) * (w / 2) + (x / 2);
                    u_plane[uv] = (((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
                    v_plane[uv] = (((112 * r - 94 * g - 18 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
                }
            }
        }

        yuv
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_yuv_size_with_cropped_stride() {
            let rgb = vec![128u8; 641 * 481 * 3];
            let yuv = rgb_to_yuv420(&rgb, 641, 640, 480);
            assert_eq!(yuv.len(), 640 * 480 * 3 / 2);
        }

        #[test]
        fn test_chunk_writer_splits_and_flushes() {
            let (tx, mut rx) = mpsc::unbounded_channel();
            {
                let mut writer = ChunkWriter::new(tx, 4);
                writer.write_all(&[1, 2, 3]).unwrap();
                assert!(rx.try_recv().is_err());
                writer.write_all(&[4, 5]).unwrap();
                writer.write_all(&[6]).unwrap();
            }
            assert_eq!(rx.try_recv().unwrap().as_ref(), &[1, 2, 3, 4, 5]);
            assert_eq!(rx.try_recv().unwrap().as_ref(), &[6]);
            assert!(rx.try_recv().is_err());
        }
    }
}
