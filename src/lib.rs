mod access;
mod mock_data;
mod models;
mod session;
mod store;
mod tips;

use access::AccessTokenController;
use session::SessionController;
use store::Store;
use tauri::Manager;
use tips::{AdviceService, CarouselController};

use access::commands::{access_view_entered, access_view_left, get_access_token};
use session::commands::{
    add_waste_entry, complete_profile_setup, get_session_state, logout, remove_waste_entry,
    set_active_view, update_waste_schedule,
};
use tips::commands::{
    get_energy_tips, get_tip_carousel, utilities_view_entered, utilities_view_left,
};

pub(crate) struct AppState {
    pub(crate) session: SessionController,
    pub(crate) access: AccessTokenController,
    pub(crate) carousel: CarouselController,
    pub(crate) tips: AdviceService,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("HemKollen starting up...");

    tauri::Builder::default()
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let store = Store::new(app_data_dir.join("hemkollen.sqlite3"))?;

                let advice = AdviceService::new(app.handle().clone())?;
                let session =
                    SessionController::new(app.handle().clone(), store, advice.clone());

                // Bring a persisted profile back before the webview loads so
                // a returning resident lands directly on the dashboard.
                {
                    let session_for_restore = session.clone();
                    tauri::async_runtime::block_on(async move {
                        session_for_restore.restore().await
                    })?;
                }

                app.manage(AppState {
                    session,
                    access: AccessTokenController::new(app.handle().clone()),
                    carousel: CarouselController::new(app.handle().clone()),
                    tips: advice,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_session_state,
            complete_profile_setup,
            logout,
            set_active_view,
            update_waste_schedule,
            add_waste_entry,
            remove_waste_entry,
            access_view_entered,
            access_view_left,
            get_access_token,
            utilities_view_entered,
            utilities_view_left,
            get_tip_carousel,
            get_energy_tips,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
