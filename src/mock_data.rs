//! Local generation of the message feed and utility snapshot. The app has no
//! server backend; these stand in for the municipal data feeds and are
//! regenerated every time a profile becomes active.

use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::models::{
    ConsumptionData, Message, MessagePriority, MeterReport, UtilitySnapshot, WasteSchedule,
};

fn series(count: usize, min: f64, max: f64, prefix: &str) -> Vec<ConsumptionData> {
    let mut rng = rand::thread_rng();
    (1..=count)
        .map(|i| ConsumptionData {
            date: format!("{prefix} {i}"),
            value: rng.gen_range(min..max),
        })
        .collect()
}

/// Three municipal notifications scoped to the given street address. Read
/// state and priorities are fixed at generation.
pub fn mock_messages(address: &str) -> Vec<Message> {
    let now = Utc::now();

    vec![
        Message {
            id: Uuid::new_v4().to_string(),
            sender: "Message Pro".into(),
            title: "Driftstörning i ditt område".into(),
            body: format!(
                "Hej boende på {address}. Vi utför underhållsarbete på vattenledningar \
                 under tisdagen mellan 08:00 - 12:00."
            ),
            timestamp: now,
            is_read: false,
            priority: MessagePriority::High,
        },
        Message {
            id: Uuid::new_v4().to_string(),
            sender: "Avfallsappen".into(),
            title: "Påminnelse: Matavfall".into(),
            body: "Imorgon är det dags för tömning av matavfall. Glöm inte att ställa ut kärlet!"
                .into(),
            timestamp: now - Duration::hours(1),
            is_read: true,
            priority: MessagePriority::Medium,
        },
        Message {
            id: Uuid::new_v4().to_string(),
            sender: "MyEnergi".into(),
            title: "Ny månadsrapport tillgänglig".into(),
            body: "Din förbrukningsrapport för förra månaden finns nu att läsa i appen.".into(),
            timestamp: now - Duration::hours(24),
            is_read: true,
            priority: MessagePriority::Low,
        },
    ]
}

/// Fresh consumption series for both meters plus a default waste schedule
/// anchored around today's date.
pub fn mock_utility_snapshot() -> UtilitySnapshot {
    let today = Utc::now().date_naive();

    UtilitySnapshot {
        electricity: MeterReport {
            current_usage: 2.4,
            provider: "MyEnergi (Digpro)".into(),
            daily_data: series(7, 8.0, 15.0, "Dag"),
            weekly_data: series(4, 60.0, 100.0, "Vecka"),
            monthly_data: series(12, 250.0, 400.0, "Månad"),
        },
        water: MeterReport {
            current_usage: 142.0,
            provider: "READy (Kamstrup)".into(),
            daily_data: series(7, 100.0, 180.0, "Dag"),
            weekly_data: series(4, 700.0, 1000.0, "Vecka"),
            monthly_data: series(12, 3000.0, 4500.0, "Månad"),
        },
        waste: vec![
            WasteSchedule::new("Matavfall", today, today),
            WasteSchedule::new("Restavfall", today + Duration::days(2), today),
            WasteSchedule::new("Pappersförpackningar", today + Duration::days(7), today),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WasteStatus;

    #[test]
    fn messages_are_scoped_to_the_address() {
        let messages = mock_messages("Storgatan 12");
        assert_eq!(messages.len(), 3);
        assert!(messages[0].body.contains("Storgatan 12"));
        assert_eq!(
            messages.iter().filter(|m| !m.is_read).count(),
            1,
            "exactly the disruption notice starts unread"
        );
    }

    #[test]
    fn message_ids_are_unique_within_the_feed() {
        let messages = mock_messages("Storgatan 12");
        assert_ne!(messages[0].id, messages[1].id);
        assert_ne!(messages[1].id, messages[2].id);
    }

    #[test]
    fn snapshot_exposes_all_three_granularities() {
        let snapshot = mock_utility_snapshot();
        for meter in [&snapshot.electricity, &snapshot.water] {
            assert_eq!(meter.daily_data.len(), 7);
            assert_eq!(meter.weekly_data.len(), 4);
            assert_eq!(meter.monthly_data.len(), 12);
            assert!(meter.daily_data.iter().all(|d| d.value >= 0.0));
        }
    }

    #[test]
    fn default_waste_schedule_has_one_pickup_today() {
        let snapshot = mock_utility_snapshot();
        assert_eq!(snapshot.waste.len(), 3);
        assert_eq!(snapshot.waste[0].status, WasteStatus::Today);
        assert!(snapshot.waste[1..]
            .iter()
            .all(|w| w.status == WasteStatus::Upcoming));
    }
}
