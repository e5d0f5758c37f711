use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tauri::{AppHandle, Emitter};
use tokio::sync::Mutex;

use crate::models::{UserProfile, WasteSchedule};
use crate::store::Store;
use crate::tips::AdviceService;

use super::state::{AppView, Session, SessionSnapshot};

const SESSION_EVENT: &str = "session-changed";

/// Tauri-facing wrapper around the session machine: serializes access behind
/// one lock, pushes `session-changed` events, and keys one advice refresh per
/// utility-snapshot change.
#[derive(Clone)]
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    store: Store,
    advice: AdviceService,
    app_handle: AppHandle,
}

impl SessionController {
    pub fn new(app_handle: AppHandle, store: Store, advice: AdviceService) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::NoProfile)),
            store,
            advice,
            app_handle,
        }
    }

    /// Loads the persisted profile at startup; with one present the session
    /// goes straight to `Active` and the first utility snapshot triggers an
    /// advice refresh.
    pub async fn restore(&self) -> Result<()> {
        let restored = Session::restore(&self.store).await?;
        let (snapshot, usage) = {
            let mut guard = self.session.lock().await;
            *guard = restored;
            (guard.snapshot(), guard.current_usage())
        };

        self.emit(snapshot);
        if let Some((electricity, water)) = usage {
            self.advice.refresh(electricity, water);
        }
        Ok(())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn complete_setup(&self, profile: UserProfile) -> Result<SessionSnapshot> {
        let mut guard = self.session.lock().await;
        let transitioned = guard.complete_setup(&self.store, profile).await?;
        let snapshot = guard.snapshot();
        let usage = guard.current_usage();
        drop(guard);

        if transitioned {
            self.emit(snapshot.clone());
            if let Some((electricity, water)) = usage {
                self.advice.refresh(electricity, water);
            }
        }
        Ok(snapshot)
    }

    pub async fn logout(&self) -> Result<SessionSnapshot> {
        let snapshot = {
            let mut guard = self.session.lock().await;
            guard.logout(&self.store).await?;
            guard.snapshot()
        };

        self.emit(snapshot.clone());
        Ok(snapshot)
    }

    pub async fn set_active_view(&self, view: AppView) {
        self.session.lock().await.set_view(view);
    }

    pub async fn update_waste_schedule(
        &self,
        schedule: Vec<WasteSchedule>,
    ) -> Result<SessionSnapshot> {
        let mut guard = self.session.lock().await;
        let changed = guard.update_waste(&self.store, schedule).await?;
        self.finish_waste_change(guard, changed)
    }

    pub async fn add_waste_entry(
        &self,
        waste_type: String,
        next_date: NaiveDate,
    ) -> Result<SessionSnapshot> {
        let mut guard = self.session.lock().await;
        let changed = guard
            .add_waste_entry(&self.store, waste_type, next_date)
            .await?;
        self.finish_waste_change(guard, changed)
    }

    pub async fn remove_waste_entry(&self, index: usize) -> Result<SessionSnapshot> {
        let mut guard = self.session.lock().await;
        let changed = guard.remove_waste_entry(&self.store, index).await?;
        self.finish_waste_change(guard, changed)
    }

    fn finish_waste_change(
        &self,
        guard: tokio::sync::MutexGuard<'_, Session>,
        changed: bool,
    ) -> Result<SessionSnapshot> {
        let snapshot = guard.snapshot();
        let usage = guard.current_usage();
        drop(guard);

        if changed {
            self.emit(snapshot.clone());
            if let Some((electricity, water)) = usage {
                self.advice.refresh(electricity, water);
            }
        }
        Ok(snapshot)
    }

    fn emit(&self, snapshot: SessionSnapshot) {
        let _ = self.app_handle.emit(SESSION_EVENT, snapshot);
    }
}
