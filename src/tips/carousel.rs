use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::{sync::Mutex, task::JoinHandle, time};

/// The fixed local tip list the carousel cycles through when no AI-sourced
/// tips are shown.
pub const ENERGY_TIPS: [&str; 7] = [
    "Sänk innetemperaturen med en grad för att spara 5% energi.",
    "Tvätta i 40 grader istället för 60 när det är möjligt.",
    "Använd vattenkokare istället för spisen när du kokar vatten.",
    "Se till att tätningslister runt fönster och dörrar är hela.",
    "Duscha några minuter kortare för att spara både vatten och el.",
    "Släck lampor i rum där ingen vistas.",
    "Fyll alltid tvätt- och diskmaskinen helt innan start.",
];

const ADVANCE_INTERVAL: Duration = Duration::from_secs(5);
const TRANSITION_PHASE: Duration = Duration::from_millis(400);
const CAROUSEL_EVENT: &str = "tip-carousel-changed";

/// Position in the cycle. `transitioning` is a display-only flag raised
/// during the slide-out phase of a swap.
#[derive(Debug, Clone, Default)]
pub struct CarouselState {
    pub index: usize,
    pub transitioning: bool,
}

impl CarouselState {
    /// index := (index + 1) mod N, wrapping indefinitely.
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % ENERGY_TIPS.len();
    }

    pub fn current_tip(&self) -> &'static str {
        ENERGY_TIPS[self.index]
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSnapshot {
    pub index: usize,
    pub tip: String,
    pub transitioning: bool,
}

impl From<&CarouselState> for CarouselSnapshot {
    fn from(state: &CarouselState) -> Self {
        Self {
            index: state.index,
            tip: state.current_tip().to_string(),
            transitioning: state.transitioning,
        }
    }
}

/// Advances the carousel every five seconds while the utilities view is
/// mounted, independent of user interaction. Restarts from the first tip on
/// every re-entry.
#[derive(Clone)]
pub struct CarouselController {
    state: Arc<Mutex<CarouselState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    app_handle: AppHandle,
}

impl CarouselController {
    pub fn new(app_handle: AppHandle) -> Self {
        Self {
            state: Arc::new(Mutex::new(CarouselState::default())),
            ticker: Arc::new(Mutex::new(None)),
            app_handle,
        }
    }

    pub async fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot::from(&*self.state.lock().await)
    }

    pub async fn view_entered(&self) {
        self.cancel_ticker().await;

        {
            let mut guard = self.state.lock().await;
            *guard = CarouselState::default();
            emit_carousel(&self.app_handle, &guard);
        }

        self.spawn_ticker().await;
    }

    pub async fn view_left(&self) {
        self.cancel_ticker().await;
        *self.state.lock().await = CarouselState::default();
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let app_handle = self.app_handle.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(ADVANCE_INTERVAL);
            // The first interval tick completes immediately; consume it so
            // the first tip holds for the full period.
            interval.tick().await;

            loop {
                interval.tick().await;

                {
                    let mut guard = state.lock().await;
                    guard.transitioning = true;
                    emit_carousel(&app_handle, &guard);
                }

                // Cosmetic slide-out phase; the swap happens after it.
                time::sleep(TRANSITION_PHASE).await;

                {
                    let mut guard = state.lock().await;
                    guard.advance();
                    guard.transitioning = false;
                    emit_carousel(&app_handle, &guard);
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

fn emit_carousel(app_handle: &AppHandle, state: &CarouselState) {
    let _ = app_handle.emit(CAROUSEL_EVENT, CarouselSnapshot::from(state));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_in_order_and_wraps() {
        let mut state = CarouselState::default();
        assert_eq!(state.index, 0);

        for expected in [1, 2, 3, 4, 5, 6, 0, 1] {
            state.advance();
            assert_eq!(state.index, expected);
        }
    }

    #[test]
    fn cycles_through_every_tip_without_skipping() {
        let mut state = CarouselState::default();
        let mut seen = vec![state.current_tip()];

        for _ in 1..ENERGY_TIPS.len() {
            state.advance();
            seen.push(state.current_tip());
        }

        assert_eq!(seen, ENERGY_TIPS.to_vec());
        state.advance();
        assert_eq!(state.index, 0);
    }
}
