use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::mock_data::{mock_messages, mock_utility_snapshot};
use crate::models::{Message, UserProfile, UtilitySnapshot, WasteSchedule};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppView {
    Dashboard,
    Messages,
    Utilities,
    Recycling,
    Profile,
}

impl Default for AppView {
    fn default() -> Self {
        AppView::Dashboard
    }
}

/// The profile-gated session machine. There is no terminal state; it runs for
/// the life of the process.
#[derive(Debug, Clone)]
pub enum Session {
    NoProfile,
    Active(ActiveSession),
}

#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub profile: UserProfile,
    pub view: AppView,
    pub messages: Vec<Message>,
    pub utilities: UtilitySnapshot,
}

/// Frontend-facing projection of the session. `profile` and `utilities` are
/// populated together or not at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub profile: Option<UserProfile>,
    pub active_view: AppView,
    pub messages: Vec<Message>,
    pub utilities: Option<UtilitySnapshot>,
}

impl Session {
    /// Startup state: directly `Active` when a profile was persisted,
    /// otherwise the setup gate.
    pub async fn restore(store: &Store) -> Result<Self> {
        match store.load_profile().await? {
            Some(profile) => Ok(Session::Active(ActiveSession::derive(store, profile).await?)),
            None => Ok(Session::NoProfile),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Session::Active(_))
    }

    /// Current meter usages, handed to the advice refresh whenever the
    /// utility snapshot changes.
    pub fn current_usage(&self) -> Option<(f64, f64)> {
        match self {
            Session::Active(active) => Some((
                active.utilities.electricity.current_usage,
                active.utilities.water.current_usage,
            )),
            Session::NoProfile => None,
        }
    }

    /// Setup submission. Only a complete profile submitted at the gate causes
    /// a transition; anything else is a silent no-op with no persistence
    /// write. Returns whether the transition happened.
    pub async fn complete_setup(&mut self, store: &Store, profile: UserProfile) -> Result<bool> {
        if self.is_active() {
            debug!("Ignoring setup submission while a session is active");
            return Ok(false);
        }
        if !profile.is_complete() {
            debug!("Ignoring setup submission with empty fields");
            return Ok(false);
        }

        store.save_profile(&profile).await?;
        *self = Session::Active(ActiveSession::derive(store, profile).await?);
        Ok(true)
    }

    /// Clears the persisted profile but not the per-address waste schedule;
    /// re-entering the same address later restores the saved list. The next
    /// activation starts back at the dashboard.
    pub async fn logout(&mut self, store: &Store) -> Result<()> {
        store.clear_profile().await?;
        *self = Session::NoProfile;
        Ok(())
    }

    /// View changes are pure: any view reachable from any view, no side
    /// effects. Ignored at the setup gate.
    pub fn set_view(&mut self, view: AppView) {
        if let Session::Active(active) = self {
            active.view = view;
        }
    }

    /// Full-replacement waste schedule update. Persists under the current
    /// address first, then swaps the in-memory list, so a storage failure
    /// leaves state untouched. Without an active profile this is a no-op,
    /// not an error.
    pub async fn update_waste(
        &mut self,
        store: &Store,
        schedule: Vec<WasteSchedule>,
    ) -> Result<bool> {
        let Session::Active(active) = self else {
            debug!("Ignoring waste schedule update without an active profile");
            return Ok(false);
        };

        store
            .save_waste_schedule(&active.profile.address, &schedule)
            .await?;
        active.utilities.waste = schedule;
        Ok(true)
    }

    /// Appends an entry with its status decided against today's calendar
    /// date, then runs the full-replacement update. Entries without a type
    /// are rejected silently, mirroring the add form.
    pub async fn add_waste_entry(
        &mut self,
        store: &Store,
        waste_type: String,
        next_date: NaiveDate,
    ) -> Result<bool> {
        let Session::Active(active) = &*self else {
            return Ok(false);
        };
        if waste_type.is_empty() {
            return Ok(false);
        }

        let today = Utc::now().date_naive();
        let mut schedule = active.utilities.waste.clone();
        schedule.push(WasteSchedule::new(waste_type, next_date, today));
        self.update_waste(store, schedule).await
    }

    /// Removal is by position; an out-of-range index leaves the list as-is.
    pub async fn remove_waste_entry(&mut self, store: &Store, index: usize) -> Result<bool> {
        let Session::Active(active) = &*self else {
            return Ok(false);
        };
        if index >= active.utilities.waste.len() {
            return Ok(false);
        }

        let mut schedule = active.utilities.waste.clone();
        schedule.remove(index);
        self.update_waste(store, schedule).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match self {
            Session::NoProfile => SessionSnapshot {
                profile: None,
                active_view: AppView::default(),
                messages: Vec::new(),
                utilities: None,
            },
            Session::Active(active) => SessionSnapshot {
                profile: Some(active.profile.clone()),
                active_view: active.view,
                messages: active.messages.clone(),
                utilities: Some(active.utilities.clone()),
            },
        }
    }
}

impl ActiveSession {
    /// Per-session state for a profile: fresh message feed and utility
    /// snapshot, with a previously saved waste schedule for this exact
    /// address overlaid when present.
    async fn derive(store: &Store, profile: UserProfile) -> Result<Self> {
        let messages = mock_messages(&profile.address);
        let mut utilities = mock_utility_snapshot();
        if let Some(saved) = store.load_waste_schedule(&profile.address).await? {
            utilities.waste = saved;
        }

        Ok(Self {
            profile,
            view: AppView::default(),
            messages,
            utilities,
        })
    }
}
