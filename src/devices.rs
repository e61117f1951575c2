//! Device enumeration and default selection

use crate::errors::StudioError;
use crate::platform::MediaDevices;
use crate::types::DeviceDescriptor;
use serde::{Deserialize, Serialize};

/// Request camera/microphone access, then list every input device.
///
/// Fails with `PermissionDenied` when access is blocked.
pub fn list_devices(media: &dyn MediaDevices) -> Result<Vec<DeviceDescriptor>, StudioError> {
    let permissions = media.request_access()?;
    log::debug!(
        "Media permissions: camera {}, microphone {}",
        permissions.camera.status,
        permissions.microphone.status
    );

    let devices = media.enumerate()?;
    log::info!(
        "Found {} cameras and {} microphones",
        devices.iter().filter(|d| d.is_video()).count(),
        devices.iter().filter(|d| d.is_audio()).count()
    );
    Ok(devices)
}

/// First camera whose label contains `preferred_label`, case-insensitively
pub fn preferred_camera<'a>(
    devices: &'a [DeviceDescriptor],
    preferred_label: &str,
) -> Option<&'a DeviceDescriptor> {
    let needle = preferred_label.to_lowercase();
    devices
        .iter()
        .filter(|d| d.is_video())
        .find(|d| d.label.to_lowercase().contains(&needle))
}

/// Selected camera and microphone ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    pub camera: Option<String>,
    pub microphone: Option<String>,
}

impl DeviceSelection {
    /// Preferred camera (none if no label matches) and the first microphone
    pub fn pick_default(devices: &[DeviceDescriptor], preferred_label: &str) -> Self {
        let camera = preferred_camera(devices, preferred_label).map(|d| d.id.clone());
        if camera.is_none() {
            log::warn!("No camera labelled {:?} found", preferred_label);
        }

        Self {
            camera,
            microphone: devices.iter().find(|d| d.is_audio()).map(|d| d.id.clone()),
        }
    }
}

/// Cameras and microphones split the way the device pickers show them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceList {
    pub cameras: Vec<DeviceDescriptor>,
    pub microphones: Vec<DeviceDescriptor>,
}

impl DeviceList {
    pub fn from_devices(devices: &[DeviceDescriptor]) -> Self {
        Self {
            cameras: devices.iter().filter(|d| d.is_video()).cloned().collect(),
            microphones: devices.iter().filter(|d| d.is_audio()).cloned().collect(),
        }
    }

    pub fn contains_camera(&self, id: &str) -> bool {
        self.cameras.iter().any(|d| d.id == id)
    }

    pub fn contains_microphone(&self, id: &str) -> bool {
        self.microphones.iter().any(|d| d.id == id)
    }
}
