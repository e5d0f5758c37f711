use serde::{Deserialize, Serialize};

/// The single resident identity gating app access. `address` doubles as the
/// key under which derived data (message feed, waste schedule) is scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
}

impl UserProfile {
    /// Setup only succeeds when every field carries a value.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && !self.address.is_empty()
            && !self.postal_code.is_empty()
            && !self.city.is_empty()
    }
}
