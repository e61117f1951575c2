//! Configuration management for EndoStudio
//!
//! Provides configuration loading, saving, and management for capture output,
//! zoom limits, session naming, storage roots, the photo watermark and the
//! native recorder.

use crate::errors::StudioError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub capture: CaptureConfig,
    pub zoom: ZoomConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub watermark: WatermarkConfig,
    pub recording: RecordingConfig,
}

/// Preview and photo output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Width of the photo canvas; height follows the source aspect ratio
    pub output_width: u32,
    /// Open streams with a microphone track
    pub record_audio: bool,
    /// Label fragment that marks the preferred camera (case-insensitive)
    pub preferred_label: String,
}

/// Zoom limits for the preview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Session naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix for the timestamped default session name
    pub product_name: String,
}

/// Roots for the save locations and the preference file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// App-managed document directory ("files")
    pub documents_directory: String,
    /// Platform downloads directory ("downloads")
    pub downloads_directory: String,
    /// Media library root holding one directory per album ("camera-roll")
    pub albums_directory: String,
    /// Album created for camera-roll saves
    pub album_name: String,
    /// Persistent key-value preference file
    pub preferences_path: String,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

/// Watermark composited onto photos
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub enabled: bool,
    /// Image file for the watermark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Opacity (0.0-1.0)
    pub opacity: f32,
    /// Offset from the top-left corner [x, y]
    pub offset: [u32; 2],
}

/// Native recorder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Frames per second, between 1 and 240
    pub fps: f64,
    /// Bytes collected before a chunk is handed to the recorder
    pub chunk_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_width: 1024,
            record_audio: true,
            preferred_label: "usb".to_string(),
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 3.0,
            step: 0.1,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            product_name: "EndoStudio".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            documents_directory: "./captures".to_string(),
            downloads_directory: "./downloads".to_string(),
            albums_directory: "./albums".to_string(),
            album_name: "EndoStudio".to_string(),
            preferences_path: "./endostudio-preferences.json".to_string(),
            jpeg_quality: 92,
        }
    }
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            opacity: 0.5,
            offset: [20, 20],
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            chunk_size: 256 * 1024,
        }
    }
}

impl StudioConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StudioError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| StudioError::Config(format!("Failed to read config file: {}", e)))?;

        let config: StudioConfig = toml::from_str(&contents)
            .map_err(|e| StudioError::Config(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load the TOML file (if any) with `ENDOSTUDIO__SECTION__KEY` environment overrides on top
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self, StudioError> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("ENDOSTUDIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| StudioError::Config(format!("Failed to build configuration: {}", e)))?;

        let config: StudioConfig = settings
            .try_deserialize()
            .map_err(|e| StudioError::Config(format!("Failed to parse configuration: {}", e)))?;

        config.validate().map_err(StudioError::Config)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StudioError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StudioError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| StudioError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| StudioError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("endostudio.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_layered(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.capture.output_width == 0 || self.capture.output_width > 8192 {
            return Err("Output width must be between 1 and 8192".to_string());
        }

        if self.zoom.min <= 0.0 || self.zoom.min > self.zoom.max {
            return Err("Zoom limits must satisfy 0 < min <= max".to_string());
        }
        if self.zoom.step <= 0.0 {
            return Err("Zoom step must be positive".to_string());
        }

        if self.session.product_name.trim().is_empty() {
            return Err("Product name must not be empty".to_string());
        }

        if self.storage.jpeg_quality == 0 || self.storage.jpeg_quality > 100 {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }
        if self.storage.album_name.trim().is_empty() {
            return Err("Album name must not be empty".to_string());
        }

        if !(0.0..=1.0).contains(&self.watermark.opacity) {
            return Err("Watermark opacity must be between 0.0 and 1.0".to_string());
        }
        if self.watermark.enabled && self.watermark.path.is_none() {
            return Err("Watermark enabled without an image path".to_string());
        }

        if !(1.0..=240.0).contains(&self.recording.fps) {
            return Err("Invalid recording FPS (must be 1-240)".to_string());
        }
        if self.recording.chunk_size == 0 {
            return Err("Chunk size must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.capture.output_width, 1024);
        assert_eq!(config.zoom.min, 0.5);
        assert_eq!(config.zoom.max, 3.0);
        assert_eq!(config.session.product_name, "EndoStudio");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad_zoom = StudioConfig::default();
        bad_zoom.zoom.min = 4.0;
        assert!(bad_zoom.validate().is_err());

        let mut bad_quality = StudioConfig::default();
        bad_quality.storage.jpeg_quality = 0;
        assert!(bad_quality.validate().is_err());

        let mut bad_watermark = StudioConfig::default();
        bad_watermark.watermark.enabled = true;
        assert!(bad_watermark.validate().is_err());
    }

    #[test]
    fn test_recording_fps_range() {
        let mut config = StudioConfig::default();
        for fps in [0.0, 0.5, 240.5, f64::NAN] {
            config.recording.fps = fps;
            let err = config.validate().unwrap_err();
            assert_eq!(err, "Invalid recording FPS (must be 1-240)");
        }
        for fps in [1.0, 15.0, 240.0] {
            config.recording.fps = fps;
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_old_bitrate_setting_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("old.toml");
        fs::write(&config_path, "[recording]\nfps = 24.0\nbitrate = 5000000\n").unwrap();

        let loaded = StudioConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.recording.fps, 24.0);

        let toml_string = toml::to_string_pretty(&loaded).unwrap();
        assert!(!toml_string.contains("bitrate"));
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("endostudio.toml");

        let mut config = StudioConfig::default();
        config.storage.album_name = "Borescope".to_string();
        config.save_to_file(&config_path).unwrap();

        let loaded = StudioConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.storage.album_name, "Borescope");
        assert_eq!(loaded.capture.output_width, config.capture.output_width);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("partial.toml");
        fs::write(&config_path, "[capture]\noutput_width = 640\n").unwrap();

        let loaded = StudioConfig::load_layered(&config_path).unwrap();
        assert_eq!(loaded.capture.output_width, 640);
        assert!(loaded.capture.record_audio);
        assert_eq!(loaded.zoom.step, 0.1);
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&StudioConfig::default()).unwrap();
        assert!(toml_string.contains("[capture]"));
        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("[watermark]"));
        assert!(toml_string.contains("album_name"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = StudioConfig::load_from_file("nonexistent_file.toml");
        assert_eq!(result.unwrap().capture.output_width, 1024);
    }
}
