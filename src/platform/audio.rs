//! Microphone enumeration through cpal

use crate::errors::StudioError;
use crate::types::DeviceDescriptor;
use cpal::traits::{DeviceTrait, HostTrait};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// cpal has no stable device ids on every platform, so derive one from position and name
fn audio_device_id(index: usize, name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    format!("audio_{}_{:08x}", index, hasher.finish() & 0xFFFF_FFFF)
}

/// List microphones, system default first and the rest by name
pub fn list_audio_devices() -> Result<Vec<DeviceDescriptor>, StudioError> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let mut devices: Vec<(bool, DeviceDescriptor)> = host
        .input_devices()
        .map_err(|e| StudioError::Initialization(format!("Failed to enumerate audio devices: {}", e)))?
        .enumerate()
        .filter_map(|(index, device)| {
            let name = device.name().ok()?;
            let is_default = default_name.as_deref() == Some(name.as_str());
            Some((is_default, DeviceDescriptor::audio(audio_device_id(index, &name), name)))
        })
        .collect();

    devices.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.label.cmp(&b.1.label)));

    Ok(devices.into_iter().map(|(_, device)| device).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_device_id_is_stable() {
        assert_eq!(audio_device_id(2, "USB Mic"), audio_device_id(2, "USB Mic"));
        assert!(audio_device_id(0, "Built-in").starts_with("audio_0_"));
    }
}
