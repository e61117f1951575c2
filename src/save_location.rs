//! Save-location preference and its resolution

use crate::errors::StudioError;
use crate::storage::PreferenceStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Preference key holding the save location
pub const SAVE_LOCATION_KEY: &str = "saveLocation";

/// Where produced artifacts go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaveLocation {
    /// App-managed document directory
    #[serde(rename = "files")]
    Files,
    /// Platform downloads
    #[serde(rename = "downloads")]
    Downloads,
    /// Photo/video album
    #[serde(rename = "camera-roll")]
    CameraRoll,
}

impl SaveLocation {
    pub const ALL: [SaveLocation; 3] = [
        SaveLocation::Files,
        SaveLocation::Downloads,
        SaveLocation::CameraRoll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaveLocation::Files => "files",
            SaveLocation::Downloads => "downloads",
            SaveLocation::CameraRoll => "camera-roll",
        }
    }
}

impl fmt::Display for SaveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaveLocation {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "files" => Ok(SaveLocation::Files),
            "downloads" => Ok(SaveLocation::Downloads),
            "camera-roll" => Ok(SaveLocation::CameraRoll),
            other => Err(StudioError::InvalidInput(format!(
                "Unknown save location: {:?}",
                other
            ))),
        }
    }
}

/// Reads and writes the save-location preference
#[derive(Clone)]
pub struct SaveLocationResolver {
    store: Arc<dyn PreferenceStore>,
    fallback: SaveLocation,
}

impl SaveLocationResolver {
    /// `fallback` is the host default, used when nothing valid is persisted
    pub fn new(store: Arc<dyn PreferenceStore>, fallback: SaveLocation) -> Self {
        Self { store, fallback }
    }

    pub fn fallback(&self) -> SaveLocation {
        self.fallback
    }

    /// The persisted location if valid, otherwise the host default
    pub fn resolve(&self) -> SaveLocation {
        match self.store.get(SAVE_LOCATION_KEY) {
            Ok(Some(serde_json::Value::String(value))) => match value.parse() {
                Ok(location) => location,
                Err(_) => {
                    log::warn!(
                        "Ignoring unknown save location {:?}, using {}",
                        value,
                        self.fallback
                    );
                    self.fallback
                }
            },
            Ok(Some(other)) => {
                log::warn!("Ignoring malformed save location {}, using {}", other, self.fallback);
                self.fallback
            }
            Ok(None) => self.fallback,
            Err(e) => {
                log::warn!("Failed to read save location ({}), using {}", e, self.fallback);
                self.fallback
            }
        }
    }

    /// Persist a new preference
    pub fn set(&self, location: SaveLocation) -> Result<(), StudioError> {
        self.store
            .set(SAVE_LOCATION_KEY, serde_json::Value::String(location.as_str().to_string()))?;
        log::info!("Save location set to {}", location);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPreferenceStore;
    use serde_json::json;

    fn resolver(fallback: SaveLocation) -> (Arc<MemoryPreferenceStore>, SaveLocationResolver) {
        let store = Arc::new(MemoryPreferenceStore::new());
        let resolver = SaveLocationResolver::new(store.clone(), fallback);
        (store, resolver)
    }

    #[test]
    fn test_defaults_to_host_fallback() {
        let (_, native) = resolver(SaveLocation::Files);
        assert_eq!(native.resolve(), SaveLocation::Files);

        let (_, web) = resolver(SaveLocation::Downloads);
        assert_eq!(web.resolve(), SaveLocation::Downloads);
    }

    #[test]
    fn test_persisted_value_wins() {
        let (_, resolver) = resolver(SaveLocation::Files);
        resolver.set(SaveLocation::CameraRoll).unwrap();
        assert_eq!(resolver.resolve(), SaveLocation::CameraRoll);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let (store, resolver) = resolver(SaveLocation::Downloads);
        store.set(SAVE_LOCATION_KEY, json!("dropbox")).unwrap();
        assert_eq!(resolver.resolve(), SaveLocation::Downloads);

        store.set(SAVE_LOCATION_KEY, json!(3)).unwrap();
        assert_eq!(resolver.resolve(), SaveLocation::Downloads);
    }

    #[test]
    fn test_wire_names() {
        for location in SaveLocation::ALL {
            let json = serde_json::to_string(&location).unwrap();
            assert_eq!(json, format!("\"{}\"", location.as_str()));
            assert_eq!(location.as_str().parse::<SaveLocation>().unwrap(), location);
        }
    }
}
