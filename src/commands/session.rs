//! Session name, save location and disclaimer commands

use super::init::STUDIO;
use super::{report, studio_mut};
use crate::save_location::SaveLocation;
use crate::session::Session;
use tauri::command;

#[command]
pub async fn get_session() -> Result<Session, String> {
    let mut guard = STUDIO.lock().await;
    Ok(studio_mut(&mut guard)?.session().clone())
}

/// Rename the session and return the name in effect
#[command]
pub async fn rename_session(name: String) -> Result<Session, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio
        .rename_session(&name)
        .await
        .map_err(|e| report("rename session", e))?;
    Ok(studio.session().clone())
}

#[command]
pub async fn get_save_location() -> Result<SaveLocation, String> {
    let mut guard = STUDIO.lock().await;
    Ok(studio_mut(&mut guard)?.save_location())
}

#[command]
pub async fn set_save_location(location: SaveLocation) -> Result<SaveLocation, String> {
    let mut guard = STUDIO.lock().await;
    let studio = studio_mut(&mut guard)?;
    studio
        .set_save_location(location)
        .map_err(|e| report("set save location", e))?;
    Ok(studio.save_location())
}

#[command]
pub async fn has_agreed_to_terms() -> Result<bool, String> {
    let mut guard = STUDIO.lock().await;
    Ok(studio_mut(&mut guard)?.has_agreed_to_terms())
}

#[command]
pub async fn agree_to_terms() -> Result<(), String> {
    let mut guard = STUDIO.lock().await;
    studio_mut(&mut guard)?
        .agree_to_terms()
        .map_err(|e| report("save disclaimer agreement", e))
}
