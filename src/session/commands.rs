use chrono::NaiveDate;
use tauri::State;

use crate::models::{UserProfile, WasteSchedule};
use crate::AppState;

use super::{AppView, SessionSnapshot};

#[tauri::command]
pub async fn get_session_state(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(state.session.snapshot().await)
}

#[tauri::command]
pub async fn complete_profile_setup(
    state: State<'_, AppState>,
    profile: UserProfile,
) -> Result<SessionSnapshot, String> {
    state
        .session
        .complete_setup(profile)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn logout(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    state.session.logout().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_active_view(state: State<'_, AppState>, view: AppView) -> Result<(), String> {
    state.session.set_active_view(view).await;
    Ok(())
}

#[tauri::command]
pub async fn update_waste_schedule(
    state: State<'_, AppState>,
    schedules: Vec<WasteSchedule>,
) -> Result<SessionSnapshot, String> {
    state
        .session
        .update_waste_schedule(schedules)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn add_waste_entry(
    state: State<'_, AppState>,
    waste_type: String,
    next_date: NaiveDate,
) -> Result<SessionSnapshot, String> {
    state
        .session
        .add_waste_entry(waste_type, next_date)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn remove_waste_entry(
    state: State<'_, AppState>,
    index: usize,
) -> Result<SessionSnapshot, String> {
    state
        .session
        .remove_waste_entry(index)
        .await
        .map_err(|e| e.to_string())
}
