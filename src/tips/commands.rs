use tauri::State;

use crate::AppState;

use super::advice::EnergyTipsState;
use super::carousel::CarouselSnapshot;

#[tauri::command]
pub async fn utilities_view_entered(
    state: State<'_, AppState>,
) -> Result<CarouselSnapshot, String> {
    state.carousel.view_entered().await;
    Ok(state.carousel.snapshot().await)
}

#[tauri::command]
pub async fn utilities_view_left(state: State<'_, AppState>) -> Result<(), String> {
    state.carousel.view_left().await;
    Ok(())
}

#[tauri::command]
pub async fn get_tip_carousel(state: State<'_, AppState>) -> Result<CarouselSnapshot, String> {
    Ok(state.carousel.snapshot().await)
}

#[tauri::command]
pub async fn get_energy_tips(state: State<'_, AppState>) -> Result<EnergyTipsState, String> {
    Ok(state.tips.snapshot().await)
}
