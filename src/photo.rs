//! Photo capture: scale the current frame, stamp the watermark, encode JPEG

use crate::artifact::Artifact;
use crate::capture::PreviewGeometry;
use crate::config::{StudioConfig, WatermarkConfig};
use crate::errors::StudioError;
use crate::types::VideoFrame;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};

pub const PHOTO_MIME_TYPE: &str = "image/jpeg";
pub const PHOTO_EXTENSION: &str = "jpeg";

#[derive(Debug, Clone)]
struct Watermark {
    /// Alpha already multiplied by the configured opacity
    image: RgbaImage,
    offset: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct PhotoCapturer {
    output_width: u32,
    jpeg_quality: u8,
    watermark: Option<Watermark>,
}

impl PhotoCapturer {
    pub fn new(output_width: u32, jpeg_quality: u8) -> Self {
        Self {
            output_width,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            watermark: None,
        }
    }

    /// Build from configuration, loading the watermark image when enabled
    pub fn from_config(config: &StudioConfig) -> Result<Self, StudioError> {
        let capturer = Self::new(config.capture.output_width, config.storage.jpeg_quality);
        Self::apply_watermark_config(capturer, &config.watermark)
    }

    fn apply_watermark_config(
        capturer: Self,
        watermark: &WatermarkConfig,
    ) -> Result<Self, StudioError> {
        if !watermark.enabled {
            return Ok(capturer);
        }
        let Some(path) = watermark.path.as_deref() else {
            log::warn!("Watermark enabled but no image path configured");
            return Ok(capturer);
        };

        let image = image::open(path).map_err(|e| {
            StudioError::Config(format!("Failed to load watermark {}: {}", path, e))
        })?;
        log::info!("Loaded watermark {} ({}x{})", path, image.width(), image.height());

        Ok(capturer.with_watermark(image, watermark.opacity, watermark.offset))
    }

    pub fn with_watermark(mut self, image: DynamicImage, opacity: f32, offset: [u32; 2]) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        let mut image = image.to_rgba8();
        for pixel in image.pixels_mut() {
            pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
        }
        self.watermark = Some(Watermark {
            image,
            offset: (offset[0], offset[1]),
        });
        self
    }

    pub fn has_watermark(&self) -> bool {
        self.watermark.is_some()
    }

    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    /// Draw the frame on a canvas `output_width` wide, plus the watermark
    pub fn render(&self, frame: &VideoFrame) -> Result<RgbImage, StudioError> {
        let source = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| {
                StudioError::Capture(format!(
                    "Frame buffer does not match {}x{} RGB (got {} bytes)",
                    frame.width,
                    frame.height,
                    frame.data.len()
                ))
            })?;

        let geometry = PreviewGeometry::for_source(frame.width, frame.height, self.output_width);
        if geometry.width == 0 || geometry.height == 0 {
            return Err(StudioError::Capture(format!(
                "Cannot draw a {}x{} frame",
                frame.width, frame.height
            )));
        }

        let canvas = if (geometry.width, geometry.height) == (frame.width, frame.height) {
            source
        } else {
            imageops::resize(&source, geometry.width, geometry.height, FilterType::Triangle)
        };

        let Some(watermark) = &self.watermark else {
            return Ok(canvas);
        };

        let mut canvas = DynamicImage::ImageRgb8(canvas).to_rgba8();
        imageops::overlay(
            &mut canvas,
            &watermark.image,
            watermark.offset.0 as i64,
            watermark.offset.1 as i64,
        );
        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    /// Render and encode as JPEG
    pub fn capture(&self, frame: &VideoFrame) -> Result<Artifact, StudioError> {
        let canvas = self.render(frame)?;

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .encode_image(&canvas)
            .map_err(|e| StudioError::Encoding(format!("JPEG encoding failed: {}", e)))?;

        log::debug!(
            "Encoded {}x{} photo ({} bytes)",
            canvas.width(),
            canvas.height(),
            jpeg.len()
        );
        Ok(Artifact::new(jpeg, PHOTO_MIME_TYPE, PHOTO_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::synthetic_video_frame;
    use image::Rgba;

    #[test]
    fn test_render_scales_to_output_width() {
        let capturer = PhotoCapturer::new(100, 90);
        let canvas = capturer.render(&synthetic_video_frame(0, 200, 150)).unwrap();
        assert_eq!(canvas.dimensions(), (100, 75));
    }

    #[test]
    fn test_capture_is_jpeg() {
        let capturer = PhotoCapturer::new(64, 90);
        let artifact = capturer.capture(&synthetic_video_frame(3, 64, 48)).unwrap();
        assert_eq!(artifact.mime_type, "image/jpeg");
        assert_eq!(artifact.extension, "jpeg");
        assert_eq!(&artifact.data[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&artifact.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_watermark_blends_at_half_opacity() {
        let black = VideoFrame::new(vec![0; 8 * 8 * 3], 8, 8, "t".to_string());
        let white = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])));
        let capturer = PhotoCapturer::new(8, 90).with_watermark(white, 0.5, [2, 2]);
        assert!(capturer.has_watermark());

        let canvas = capturer.render(&black).unwrap();
        let stamped = canvas.get_pixel(2, 2)[0];
        assert!((120..=136).contains(&stamped), "got {}", stamped);
        assert_eq!(canvas.get_pixel(0, 0)[0], 0);
        assert_eq!(canvas.get_pixel(4, 4)[0], 0);
    }

    #[test]
    fn test_bad_frame_is_rejected() {
        let capturer = PhotoCapturer::new(64, 90);
        let frame = VideoFrame::new(vec![0; 10], 64, 48, "t".to_string());
        assert!(capturer.capture(&frame).is_err());
    }
}
