use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One bar in a consumption chart. Sequences are chronological, oldest first,
/// so the frontend can highlight the final (most recent) entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionData {
    pub date: String,
    pub value: f64,
}

/// Per-meter consumption report. Both meters expose the same three
/// granularities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReport {
    pub current_usage: f64,
    pub provider: String,
    pub daily_data: Vec<ConsumptionData>,
    pub weekly_data: Vec<ConsumptionData>,
    pub monthly_data: Vec<ConsumptionData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteStatus {
    Upcoming,
    Today,
    Done,
}

impl WasteStatus {
    /// Status is decided once, when an entry is created, by comparing the
    /// pickup date against the current calendar date. It is stored verbatim
    /// from then on and never recomputed as time passes.
    pub fn for_date(next_date: NaiveDate, today: NaiveDate) -> Self {
        if next_date == today {
            WasteStatus::Today
        } else {
            WasteStatus::Upcoming
        }
    }
}

/// A single pickup entry. Duplicate types are allowed; the list keeps
/// insertion order and entries are removed by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteSchedule {
    #[serde(rename = "type")]
    pub waste_type: String,
    pub next_date: NaiveDate,
    pub status: WasteStatus,
}

impl WasteSchedule {
    pub fn new(waste_type: impl Into<String>, next_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            waste_type: waste_type.into(),
            next_date,
            status: WasteStatus::for_date(next_date, today),
        }
    }
}

/// The per-session bundle of consumption series plus the waste schedule.
/// Only `waste` round-trips to persisted storage (keyed by address); the
/// meter reports are regenerated every time a profile becomes active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilitySnapshot {
    pub electricity: MeterReport,
    pub water: MeterReport,
    pub waste: Vec<WasteSchedule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_is_today_only_on_exact_date_match() {
        let today = date(2024, 5, 18);
        assert_eq!(WasteStatus::for_date(today, today), WasteStatus::Today);
        assert_eq!(
            WasteStatus::for_date(date(2024, 5, 20), today),
            WasteStatus::Upcoming
        );
        // Past dates are not special-cased; the snapshot model never
        // produces `done`.
        assert_eq!(
            WasteStatus::for_date(date(2024, 5, 1), today),
            WasteStatus::Upcoming
        );
    }

    #[test]
    fn waste_schedule_serializes_with_original_field_names() {
        let entry = WasteSchedule::new("Matavfall", date(2024, 5, 18), date(2024, 5, 18));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "Matavfall");
        assert_eq!(json["nextDate"], "2024-05-18");
        assert_eq!(json["status"], "today");
    }
}
