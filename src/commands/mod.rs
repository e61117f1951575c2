pub mod capture;
pub mod config;
pub mod init;
pub mod permissions;
pub mod recording;
pub mod session;

pub use capture::*;
pub use config::*;
pub use init::*;
pub use permissions::*;
pub use recording::*;
pub use session::*;

use crate::errors::StudioError;
use crate::studio::Studio;

/// Log a failed action and turn the error into the message the frontend shows
pub(crate) fn report(action: &str, e: StudioError) -> String {
    if e.is_user_actionable() {
        log::warn!("Failed to {}: {}", action, e);
    } else {
        log::error!("Failed to {}: {}", action, e);
    }
    e.to_string()
}

pub(crate) fn studio_mut(studio: &mut Option<Studio>) -> Result<&mut Studio, String> {
    studio
        .as_mut()
        .ok_or_else(|| "Studio not initialized - call initialize_studio first".to_string())
}
