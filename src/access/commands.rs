use tauri::State;

use crate::AppState;

use super::AccessTokenState;

#[tauri::command]
pub async fn access_view_entered(state: State<'_, AppState>) -> Result<AccessTokenState, String> {
    state.access.view_entered().await;
    Ok(state.access.snapshot().await)
}

#[tauri::command]
pub async fn access_view_left(state: State<'_, AppState>) -> Result<(), String> {
    state.access.view_left().await;
    Ok(())
}

#[tauri::command]
pub async fn get_access_token(state: State<'_, AppState>) -> Result<AccessTokenState, String> {
    Ok(state.access.snapshot().await)
}
