use serde::{Deserialize, Serialize};

/// Permission status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    /// Permission granted
    Granted,
    /// Permission denied
    Denied,
    /// Permission not determined (user hasn't been asked yet)
    NotDetermined,
    /// Permission restricted (parental controls, etc)
    Restricted,
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NotDetermined => write!(f, "not_determined"),
            PermissionStatus::Restricted => write!(f, "restricted"),
        }
    }
}

/// Which capture permission is being asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Camera,
    Microphone,
}

/// Detailed permission information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub kind: MediaKind,
    pub status: PermissionStatus,
    pub message: String,
    pub can_request: bool,
}

impl PermissionInfo {
    pub fn granted(kind: MediaKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: PermissionStatus::Granted,
            message: message.into(),
            can_request: false,
        }
    }

    /// Denied and restricted both block capture
    pub fn is_blocking(&self) -> bool {
        matches!(
            self.status,
            PermissionStatus::Denied | PermissionStatus::Restricted
        )
    }
}

/// Camera and microphone status together, as shown before enumerating devices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPermissions {
    pub camera: PermissionInfo,
    pub microphone: PermissionInfo,
}

/// Check camera and microphone together
pub fn check_media_permissions() -> MediaPermissions {
    MediaPermissions {
        camera: check_permission_detailed(MediaKind::Camera),
        microphone: check_permission_detailed(MediaKind::Microphone),
    }
}

/// Check permission status with detailed information
pub fn check_permission_detailed(kind: MediaKind) -> PermissionInfo {
    #[cfg(target_os = "windows")]
    {
        check_permission_windows(kind)
    }

    #[cfg(target_os = "macos")]
    {
        check_permission_macos(kind)
    }

    #[cfg(target_os = "linux")]
    {
        check_permission_linux(kind)
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        PermissionInfo {
            kind,
            status: PermissionStatus::NotDetermined,
            message: "Platform not supported".to_string(),
            can_request: false,
        }
    }
}

#[cfg(target_os = "windows")]
fn check_permission_windows(kind: MediaKind) -> PermissionInfo {
    if kind == MediaKind::Microphone {
        // Microphone privacy is only enforced when a stream opens
        return PermissionInfo {
            kind,
            status: PermissionStatus::NotDetermined,
            message: "Microphone access is checked by Windows when recording starts".to_string(),
            can_request: false,
        };
    }

    // Enumerating devices succeeds only when Privacy settings allow camera access
    match nokhwa::query(nokhwa::utils::ApiBackend::Auto) {
        Ok(devices) if !devices.is_empty() => {
            PermissionInfo::granted(kind, "Camera access granted via Windows Privacy settings")
        }
        Ok(_) => PermissionInfo {
            kind,
            status: PermissionStatus::NotDetermined,
            message: "No cameras found - permission may not be granted".to_string(),
            can_request: true,
        },
        Err(e) => PermissionInfo {
            kind,
            status: PermissionStatus::Denied,
            message: format!("Camera access denied: {}", e),
            can_request: true,
        },
    }
}

#[cfg(target_os = "macos")]
pub(crate) fn av_media_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Camera => "vide",
        MediaKind::Microphone => "soun",
    }
}

#[cfg(target_os = "macos")]
fn check_permission_macos(kind: MediaKind) -> PermissionInfo {
    use objc::runtime::{Class, Object};
    use objc::{msg_send, sel, sel_impl};
    use std::ffi::CString;

    let Some(av_capture_device_class) = Class::get("AVCaptureDevice") else {
        return PermissionInfo {
            kind,
            status: PermissionStatus::NotDetermined,
            message: "AVFoundation not available".to_string(),
            can_request: false,
        };
    };

    let Ok(media_type_name) = CString::new(av_media_type(kind)) else {
        return PermissionInfo {
            kind,
            status: PermissionStatus::NotDetermined,
            message: "Invalid media type".to_string(),
            can_request: false,
        };
    };

    // AVAuthorizationStatus: 0 NotDetermined, 1 Restricted, 2 Denied, 3 Authorized
    let auth_status: i64 = unsafe {
        let media_type: *mut Object =
            msg_send![av_capture_device_class, mediaTypeForString: media_type_name.as_ptr()];
        msg_send![av_capture_device_class, authorizationStatusForMediaType: media_type]
    };

    match auth_status {
        3 => PermissionInfo::granted(kind, format!("{:?} access authorized", kind)),
        2 => PermissionInfo {
            kind,
            status: PermissionStatus::Denied,
            message: format!(
                "{:?} access denied - enable in System Settings > Privacy & Security",
                kind
            ),
            can_request: false,
        },
        1 => PermissionInfo {
            kind,
            status: PermissionStatus::Restricted,
            message: format!("{:?} access restricted by system policy", kind),
            can_request: false,
        },
        _ => PermissionInfo {
            kind,
            status: PermissionStatus::NotDetermined,
            message: format!("{:?} permission not yet requested", kind),
            can_request: true,
        },
    }
}

/// Show the system prompt and wait for the user's answer
#[cfg(target_os = "macos")]
pub(crate) fn request_access_macos(
    kind: MediaKind,
) -> Result<PermissionInfo, crate::errors::StudioError> {
    use crate::errors::StudioError;
    use block::ConcreteBlock;
    use objc::runtime::{Class, Object};
    use objc::{msg_send, sel, sel_impl};
    use std::ffi::CString;
    use std::sync::mpsc;
    use std::time::Duration;

    log::info!("Requesting macOS {:?} permission", kind);

    let av_capture_device_class = Class::get("AVCaptureDevice")
        .ok_or_else(|| StudioError::PermissionDenied("AVFoundation not available".to_string()))?;
    let media_type_name = CString::new(av_media_type(kind))
        .map_err(|e| StudioError::InvalidInput(e.to_string()))?;

    let (tx, rx) = mpsc::channel();
    let handler = ConcreteBlock::new(move |granted: bool| {
        let _ = tx.send(granted);
    });
    // Heap copy outlives this frame for the async completion
    let handler = handler.copy();

    unsafe {
        let media_type: *mut Object =
            msg_send![av_capture_device_class, mediaTypeForString: media_type_name.as_ptr()];
        let _: () = msg_send![av_capture_device_class, requestAccessForMediaType:media_type completionHandler:&*handler];
    }

    match rx.recv_timeout(Duration::from_secs(60)) {
        Ok(true) => {
            log::info!("{:?} permission granted", kind);
            Ok(PermissionInfo::granted(kind, format!("{:?} access authorized", kind)))
        }
        Ok(false) => {
            log::warn!("{:?} permission denied", kind);
            Ok(PermissionInfo {
                kind,
                status: PermissionStatus::Denied,
                message: format!("{:?} access denied by user", kind),
                can_request: false,
            })
        }
        Err(_) => {
            log::error!("Permission request timed out");
            Err(StudioError::PermissionDenied(
                "Permission request timed out".to_string(),
            ))
        }
    }
}

#[cfg(target_os = "linux")]
fn check_permission_linux(kind: MediaKind) -> PermissionInfo {
    use std::path::Path;

    let (candidates, groups): (Vec<String>, &[&str]) = match kind {
        MediaKind::Camera => (
            (0..10).map(|i| format!("/dev/video{}", i)).collect(),
            &["video", "plugdev"][..],
        ),
        MediaKind::Microphone => (vec!["/dev/snd".to_string()], &["audio", "pulse-access"][..]),
    };

    let Some(first_device) = candidates.iter().find(|path| Path::new(path.as_str()).exists())
    else {
        return PermissionInfo {
            kind,
            status: PermissionStatus::NotDetermined,
            message: format!("No {:?} devices found", kind),
            can_request: false,
        };
    };

    // Desktop sessions grant device access through logind ACLs or group membership
    if check_linux_group_membership(groups) || device_is_readable(first_device) {
        PermissionInfo::granted(kind, format!("{:?} access granted ({} found)", kind, first_device))
    } else {
        PermissionInfo {
            kind,
            status: PermissionStatus::Denied,
            message: format!(
                "{} exists but is not accessible - run: sudo usermod -a -G {} $USER",
                first_device, groups[0]
            ),
            can_request: true,
        }
    }
}

#[cfg(target_os = "linux")]
fn device_is_readable(path: &str) -> bool {
    let path = std::path::Path::new(path);
    if path.is_dir() {
        std::fs::read_dir(path).is_ok()
    } else {
        std::fs::OpenOptions::new().read(true).open(path).is_ok()
    }
}

#[cfg(target_os = "linux")]
fn check_linux_group_membership(wanted: &[&str]) -> bool {
    use std::process::Command;

    let output = Command::new("groups").output().ok();

    if let Some(output) = output {
        if let Ok(groups) = String::from_utf8(output.stdout) {
            return groups
                .split_whitespace()
                .any(|group| wanted.contains(&group));
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(PermissionStatus::Granted.to_string(), "granted");
        assert_eq!(PermissionStatus::NotDetermined.to_string(), "not_determined");
    }

    #[test]
    fn test_blocking_statuses() {
        let mut info = PermissionInfo::granted(MediaKind::Camera, "ok");
        assert!(!info.is_blocking());
        info.status = PermissionStatus::Restricted;
        assert!(info.is_blocking());
        info.status = PermissionStatus::NotDetermined;
        assert!(!info.is_blocking());
    }

    #[test]
    fn test_check_media_permissions_reports_both_kinds() {
        let permissions = check_media_permissions();
        assert_eq!(permissions.camera.kind, MediaKind::Camera);
        assert_eq!(permissions.microphone.kind, MediaKind::Microphone);
    }
}
