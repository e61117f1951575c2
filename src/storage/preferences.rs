use super::PreferenceStore;
use crate::errors::StudioError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Preferences kept in a single JSON object on disk
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
}

impl JsonPreferenceStore {
    /// Open the store, reading the file if it exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StudioError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                StudioError::Initialization(format!("Failed to read preferences: {}", e))
            })?;
            match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    log::warn!("Preferences at {:?} are not a JSON object, starting empty", path);
                    Map::new()
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), StudioError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| StudioError::WriteFailure(format!("Failed to encode preferences: {}", e)))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StudioError> {
        let values = self
            .values
            .read()
            .map_err(|_| StudioError::Initialization("Preference lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StudioError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StudioError::Initialization("Preference lock poisoned".to_string()))?;
        // Memory only changes once the file holds the new values
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StudioError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StudioError::Initialization("Preference lock poisoned".to_string()))?;
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

/// In-memory preferences, for hosts without persistent storage and for tests
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StudioError> {
        let values = self
            .values
            .read()
            .map_err(|_| StudioError::Initialization("Preference lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StudioError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StudioError::Initialization("Preference lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StudioError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StudioError::Initialization("Preference lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}
