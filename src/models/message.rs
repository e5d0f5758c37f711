use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessagePriority {
    Low,
    Medium,
    High,
}

/// A municipal notification scoped to the active profile's address. The feed
/// is regenerated on every activation and never mutated afterwards; `is_read`
/// is fixed at generation time (no operation toggles it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub title: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub priority: MessagePriority,
}
