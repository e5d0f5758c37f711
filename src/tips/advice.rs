use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Emitter};
use tokio::sync::Mutex;

/// Shown whenever the generative endpoint cannot deliver: missing key,
/// network failure, malformed response.
pub const FALLBACK_TIPS: [&str; 3] = [
    "Släck lampor i rum du inte vistas i.",
    "Kör endast fulla tvättmaskiner.",
    "Installera snålspolande munstycken på kranar.",
];

const EXPECTED_TIP_COUNT: usize = 3;
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-3-flash-preview";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const TIPS_EVENT: &str = "energy-tips-changed";

/// Boundary to the generative-AI text endpoint. The contract is narrow:
/// given today's meter usages, produce exactly three short Swedish tips.
/// Every failure collapses to [`FALLBACK_TIPS`]; nothing propagates.
pub struct AdviceClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl AdviceClient {
    pub fn from_env() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to create HTTP client")?;

        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            info!("No {API_KEY_ENV} set; energy advice falls back to the built-in tips");
        }

        Ok(Self { http, api_key })
    }

    pub fn fallback() -> Vec<String> {
        FALLBACK_TIPS.iter().map(|tip| tip.to_string()).collect()
    }

    /// Never fails and never blocks anything but its own task; any error is
    /// logged and swapped for the fallback list.
    pub async fn fetch(&self, electricity_usage: f64, water_usage: f64) -> Vec<String> {
        match self.request(electricity_usage, water_usage).await {
            Ok(tips) => tips,
            Err(err) => {
                warn!("Energy advice request failed, using fallback tips: {err:#}");
                Self::fallback()
            }
        }
    }

    async fn request(&self, electricity_usage: f64, water_usage: f64) -> Result<Vec<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no API key configured"))?;

        let prompt = format!(
            "Som en energiexpert, analysera följande data för ett hushåll och ge 3 korta, \
             konkreta tips på svenska för att minska förbrukningen.\n\
             Elförbrukning idag: {electricity_usage} kWh.\n\
             Vattenförbrukning idag: {water_usage} liter.\n\
             Håll svaret i JSON-format med ett fält 'tips' som är en array av strängar."
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "tips": { "type": "ARRAY", "items": { "type": "STRING" } }
                    }
                }
            }
        });

        let response = self
            .http
            .post(format!("{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent"))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .context("advice request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("advice endpoint returned {status}");
        }

        let payload: serde_json::Value =
            response.json().await.context("response was not JSON")?;
        extract_tips(&payload)
    }
}

#[derive(Deserialize)]
struct TipsPayload {
    tips: Vec<String>,
}

/// Pulls the model's JSON text out of a `generateContent` response and
/// decodes the tip list. Anything that isn't exactly three strings counts
/// as malformed.
fn extract_tips(payload: &serde_json::Value) -> Result<Vec<String>> {
    let text = payload["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| anyhow!("response carried no text part"))?;

    let parsed: TipsPayload =
        serde_json::from_str(text.trim()).context("tips text was not valid JSON")?;

    if parsed.tips.len() != EXPECTED_TIP_COUNT {
        bail!(
            "expected {EXPECTED_TIP_COUNT} tips, got {}",
            parsed.tips.len()
        );
    }
    Ok(parsed.tips)
}

/// Tip list currently shown on the dashboard, plus the loading placeholder
/// flag while a request is in flight.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyTipsState {
    pub tips: Vec<String>,
    pub loading: bool,
}

/// Issues exactly one fetch per utility-snapshot change. Overlapping
/// refreshes are allowed to race; there is no cancellation and the last
/// response to land wins.
#[derive(Clone)]
pub struct AdviceService {
    state: Arc<Mutex<EnergyTipsState>>,
    client: Arc<AdviceClient>,
    app_handle: AppHandle,
}

impl AdviceService {
    pub fn new(app_handle: AppHandle) -> Result<Self> {
        Ok(Self {
            state: Arc::new(Mutex::new(EnergyTipsState::default())),
            client: Arc::new(AdviceClient::from_env()?),
            app_handle,
        })
    }

    pub async fn snapshot(&self) -> EnergyTipsState {
        self.state.lock().await.clone()
    }

    pub fn refresh(&self, electricity_usage: f64, water_usage: f64) {
        let service = self.clone();

        tauri::async_runtime::spawn(async move {
            {
                let mut guard = service.state.lock().await;
                guard.loading = true;
                service.emit(guard.clone());
            }

            // The lock is never held across this await; the UI stays
            // responsive however long the collaborator takes.
            let tips = service.client.fetch(electricity_usage, water_usage).await;

            let mut guard = service.state.lock().await;
            guard.tips = tips;
            guard.loading = false;
            service.emit(guard.clone());
        });
    }

    fn emit(&self, state: EnergyTipsState) {
        let _ = self.app_handle.emit(TIPS_EVENT, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_key() -> AdviceClient {
        AdviceClient {
            http: reqwest::Client::new(),
            api_key: None,
        }
    }

    fn gemini_response(tips_json: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": tips_json }] }
            }]
        })
    }

    #[test]
    fn fallback_is_exactly_three_tips() {
        assert_eq!(AdviceClient::fallback().len(), 3);
        assert_eq!(AdviceClient::fallback(), FALLBACK_TIPS.to_vec());
    }

    #[tokio::test]
    async fn fetch_without_key_returns_fallback_without_error() {
        let client = client_without_key();
        let tips = client.fetch(2.4, 142.0).await;
        assert_eq!(tips, AdviceClient::fallback());
    }

    #[test]
    fn extract_tips_reads_a_well_formed_response() {
        let payload =
            gemini_response(r#"{"tips": ["Tips ett.", "Tips två.", "Tips tre."]}"#);
        let tips = extract_tips(&payload).unwrap();
        assert_eq!(tips, vec!["Tips ett.", "Tips två.", "Tips tre."]);
    }

    #[test]
    fn extract_tips_rejects_wrong_count() {
        let payload = gemini_response(r#"{"tips": ["bara ett tips"]}"#);
        assert!(extract_tips(&payload).is_err());
    }

    #[test]
    fn extract_tips_rejects_malformed_bodies() {
        assert!(extract_tips(&gemini_response("not json at all")).is_err());
        assert!(extract_tips(&serde_json::json!({ "candidates": [] })).is_err());
        assert!(extract_tips(&serde_json::json!({})).is_err());
    }
}
