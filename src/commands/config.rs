use crate::config::{StorageConfig, StudioConfig, WatermarkConfig};
use std::sync::{Arc, RwLock};
use tauri::command;

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: Arc<RwLock<StudioConfig>> = Arc::new(RwLock::new(StudioConfig::load_or_default()));
}

/// Snapshot of the configuration new studios are built from
pub(crate) fn current_config() -> Result<StudioConfig, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.clone())
}

fn store(new_config: StudioConfig) -> Result<(), String> {
    new_config.validate()?;

    {
        let mut config = GLOBAL_CONFIG.write().map_err(|e| e.to_string())?;
        *config = new_config.clone();
    }

    new_config
        .save_to_file(StudioConfig::default_path())
        .map_err(|e| e.to_string())
}

/// Get the current configuration
#[command]
pub async fn get_config() -> Result<StudioConfig, String> {
    current_config()
}

/// Update configuration. Takes effect for the next `initialize_studio`.
#[command]
pub async fn update_config(new_config: StudioConfig) -> Result<(), String> {
    store(new_config)
}

/// Reset configuration to defaults
#[command]
pub async fn reset_config() -> Result<StudioConfig, String> {
    let default_config = StudioConfig::default();
    store(default_config.clone())?;
    Ok(default_config)
}

#[command]
pub async fn get_storage_config() -> Result<StorageConfig, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.storage.clone())
}

#[command]
pub async fn update_storage_config(storage_config: StorageConfig) -> Result<(), String> {
    let mut config = current_config()?;
    config.storage = storage_config;
    store(config)
}

#[command]
pub async fn update_watermark_config(watermark_config: WatermarkConfig) -> Result<(), String> {
    let mut config = current_config()?;
    config.watermark = watermark_config;
    store(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_is_valid() {
        let config = tokio_test::block_on(get_config()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_config_matches_full_config() {
        let storage = tokio_test::block_on(get_storage_config()).unwrap();
        let config = tokio_test::block_on(get_config()).unwrap();
        assert_eq!(storage.album_name, config.storage.album_name);
    }
}
