//! Durable key-value storage for the profile and per-address waste schedules.
//!
//! A single SQLite connection lives on a dedicated worker thread; callers
//! submit closures over an mpsc inbox and await the reply on a oneshot
//! channel. Values are JSON-encoded, one logical record per key, so every
//! write is a single row upsert and atomic from the caller's point of view.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::oneshot;

mod migrations;

use crate::models::{UserProfile, WasteSchedule};
use migrations::run_migrations;

/// Fixed key the single profile is stored under.
const PROFILE_KEY: &str = "hc_user_profile";
/// Waste schedules are scoped per address: `hc_waste_<address>`.
const WASTE_KEY_PREFIX: &str = "hc_waste_";

fn waste_key(address: &str) -> String {
    format!("{WASTE_KEY_PREFIX}{address}")
}

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
    path: Arc<PathBuf>,
}

impl Store {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create store directory {}", parent.display()))?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = path.clone();

        let worker = thread::Builder::new()
            .name("hemkollen-store".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(
                            Err(anyhow::Error::new(err).context("failed to open SQLite store")),
                        );
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result = run_migrations(&mut conn).context("failed to run store migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("Store initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut conn),
                        StoreCommand::Shutdown => break,
                    }
                }

                info!("Store thread shutting down");
            })
            .context("failed to spawn store worker thread")?;

        ready_rx
            .recv()
            .context("store worker exited before signaling readiness")??;

        info!("Store opened at {}", path.display());

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            path: Arc::new(path),
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to store thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("store thread terminated unexpectedly"))?
    }

    async fn get_raw(&self, key: String) -> Result<Option<String>> {
        self.execute(move |conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .context("failed to read value")
        })
        .await
    }

    async fn put_raw(&self, key: String, value: String) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .context("failed to write value")?;
            Ok(())
        })
        .await
    }

    async fn delete_raw(&self, key: String) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .context("failed to delete value")?;
            Ok(())
        })
        .await
    }

    /// Decode a stored JSON value. An unparsable value is treated the same as
    /// a missing one, so a corrupt record can never fault startup.
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key.to_string()).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!("Discarding unparsable stored value for '{key}': {err}");
                Ok(None)
            }
        }
    }

    async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).context("failed to encode value")?;
        self.put_raw(key.to_string(), raw).await
    }

    pub async fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.get_json(PROFILE_KEY).await
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.put_json(PROFILE_KEY, profile).await
    }

    pub async fn clear_profile(&self) -> Result<()> {
        self.delete_raw(PROFILE_KEY.to_string()).await
    }

    /// Waste schedules survive logout; only the profile pointer is cleared.
    /// Re-entering the same address later restores the saved list.
    pub async fn load_waste_schedule(&self, address: &str) -> Result<Option<Vec<WasteSchedule>>> {
        self.get_json(&waste_key(address)).await
    }

    pub async fn save_waste_schedule(
        &self,
        address: &str,
        schedule: &[WasteSchedule],
    ) -> Result<()> {
        self.put_json(&waste_key(address), &schedule).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WasteStatus;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn temp_store() -> (Store, PathBuf) {
        let path = std::env::temp_dir().join(format!("hemkollen-test-{}.sqlite3", Uuid::new_v4()));
        let store = Store::new(path.clone()).unwrap();
        (store, path)
    }

    fn sample_profile() -> UserProfile {
        UserProfile {
            name: "Erik Johansson".into(),
            address: "Storgatan 12".into(),
            postal_code: "123 45".into(),
            city: "Stockholm".into(),
        }
    }

    fn sample_schedule() -> Vec<WasteSchedule> {
        vec![
            WasteSchedule {
                waste_type: "Restavfall".into(),
                next_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
                status: WasteStatus::Upcoming,
            },
            WasteSchedule {
                waste_type: "Matavfall".into(),
                next_date: NaiveDate::from_ymd_opt(2024, 5, 18).unwrap(),
                status: WasteStatus::Today,
            },
        ]
    }

    #[tokio::test]
    async fn profile_round_trips() {
        let (store, _path) = temp_store();
        assert!(store.load_profile().await.unwrap().is_none());

        let profile = sample_profile();
        store.save_profile(&profile).await.unwrap();
        assert_eq!(store.load_profile().await.unwrap(), Some(profile));

        store.clear_profile().await.unwrap();
        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_survives_store_reopen() {
        let (store, _path) = temp_store();
        let profile = sample_profile();
        store.save_profile(&profile).await.unwrap();
        let path = store.path().to_path_buf();
        drop(store);

        let reopened = Store::new(path).unwrap();
        assert_eq!(reopened.load_profile().await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn waste_schedule_is_scoped_per_address() {
        let (store, _path) = temp_store();
        let schedule = sample_schedule();

        store
            .save_waste_schedule("Storgatan 12", &schedule)
            .await
            .unwrap();

        assert_eq!(
            store.load_waste_schedule("Storgatan 12").await.unwrap(),
            Some(schedule)
        );
        assert!(store
            .load_waste_schedule("Lillgatan 3")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn clearing_profile_keeps_waste_schedule() {
        let (store, _path) = temp_store();
        let schedule = sample_schedule();

        store.save_profile(&sample_profile()).await.unwrap();
        store
            .save_waste_schedule("Storgatan 12", &schedule)
            .await
            .unwrap();
        store.clear_profile().await.unwrap();

        assert_eq!(
            store.load_waste_schedule("Storgatan 12").await.unwrap(),
            Some(schedule)
        );
    }

    #[tokio::test]
    async fn unparsable_stored_value_reads_as_absent() {
        let (store, _path) = temp_store();
        store
            .put_raw(PROFILE_KEY.to_string(), "{not json".to_string())
            .await
            .unwrap();

        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saving_replaces_previous_value() {
        let (store, _path) = temp_store();
        let schedule = sample_schedule();
        store
            .save_waste_schedule("Storgatan 12", &schedule)
            .await
            .unwrap();

        let shorter = vec![schedule[0].clone()];
        store
            .save_waste_schedule("Storgatan 12", &shorter)
            .await
            .unwrap();

        assert_eq!(
            store.load_waste_schedule("Storgatan 12").await.unwrap(),
            Some(shorter)
        );
    }
}
