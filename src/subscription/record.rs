//! Raw subscription facts as delivered by the backend.

use serde::{Deserialize, Deserializer, Serialize};

/// The user's current subscription, read once per page load.
///
/// The backend sends camelCase JSON; identifiers may arrive as numbers or
/// strings and are normalised to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    /// Plan identifier, absent when the user never subscribed.
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub plan_id: Option<String>,
    /// Display name of the plan. Empty means no subscription.
    #[serde(default)]
    pub plan_name: Option<String>,
    /// Expiry as a Unix timestamp. `None` or `0` means the plan never expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Day of month on which traffic resets. `None` or `0` means no periodic reset.
    #[serde(default)]
    pub reset_day: Option<u32>,
    #[serde(default)]
    pub upload_bytes: u64,
    #[serde(default)]
    pub download_bytes: u64,
    #[serde(default)]
    pub quota_bytes: u64,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub is_traffic_depleted: bool,
    #[serde(default)]
    pub is_available: bool,
}

impl SubscriptionRecord {
    /// Whether the record names a plan at all.
    #[must_use]
    pub fn has_plan(&self) -> bool {
        self.plan_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }

    /// The expiry timestamp, with the `0` "never expires" marker folded into `None`.
    #[must_use]
    pub fn expiry(&self) -> Option<i64> {
        self.expires_at.filter(|ts| *ts != 0)
    }

    /// The reset day, with the `0` "no reset" marker folded into `None`.
    #[must_use]
    pub fn periodic_reset_day(&self) -> Option<u32> {
        self.reset_day.filter(|day| *day != 0)
    }

    /// Total traffic used (upload + download).
    #[must_use]
    pub fn used_bytes(&self) -> u64 {
        self.upload_bytes.saturating_add(self.download_bytes)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawId::Int(id)) => Some(id.to_string()),
        Some(RawId::Str(id)) if !id.is_empty() => Some(id),
        _ => None,
    })
}
