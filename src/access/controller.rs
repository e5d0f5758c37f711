use std::{sync::Arc, time::Duration};

use log::{debug, error};
use tauri::{AppHandle, Emitter};
use tokio::{sync::Mutex, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use super::state::AccessTokenState;

const TICK_INTERVAL: Duration = Duration::from_secs(1);
const TOKEN_EVENT: &str = "access-token-changed";

struct RotatorTask {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Owns the rotating access token and its one-second ticker. The ticker is a
/// scoped resource: spawned when the access view is entered, cancelled and
/// joined when it is left, so no tick can be delivered after release.
#[derive(Clone)]
pub struct AccessTokenController {
    state: Arc<Mutex<AccessTokenState>>,
    task: Arc<Mutex<Option<RotatorTask>>>,
    app_handle: AppHandle,
}

impl AccessTokenController {
    pub fn new(app_handle: AppHandle) -> Self {
        Self {
            state: Arc::new(Mutex::new(AccessTokenState::idle())),
            task: Arc::new(Mutex::new(None)),
            app_handle,
        }
    }

    pub async fn snapshot(&self) -> AccessTokenState {
        self.state.lock().await.clone()
    }

    /// Entering the access view always starts fresh: new token, full
    /// countdown, new ticker. A stale ticker from a previous visit is torn
    /// down first.
    pub async fn view_entered(&self) {
        self.stop_ticker().await;

        let snapshot = {
            let mut guard = self.state.lock().await;
            guard.activate();
            guard.clone()
        };
        let _ = self.app_handle.emit(TOKEN_EVENT, snapshot);

        self.spawn_ticker().await;
    }

    pub async fn view_left(&self) {
        self.stop_ticker().await;
        self.state.lock().await.deactivate();
    }

    async fn spawn_ticker(&self) {
        let cancel = CancellationToken::new();
        let cancelled = cancel.clone();
        let state = self.state.clone();
        let app_handle = self.app_handle.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(TICK_INTERVAL);
            // The first interval tick completes immediately; consume it so
            // the full countdown stays visible for one second.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        let snapshot = {
                            let mut guard = state.lock().await;
                            if !guard.active {
                                break;
                            }
                            if guard.tick() {
                                debug!("Access token rotated");
                            }
                            guard.clone()
                        };
                        let _ = app_handle.emit(TOKEN_EVENT, snapshot);
                    }
                }
            }
        });

        *self.task.lock().await = Some(RotatorTask { handle, cancel });
    }

    async fn stop_ticker(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.cancel.cancel();
            if let Err(err) = task.handle.await {
                error!("Access token ticker failed to join: {err}");
            }
        }
    }
}
