//! Subscription record fixtures.

use chrono::{DateTime, Utc};

use crate::subscription::{SECONDS_PER_DAY, SubscriptionRecord};

/// One gibibyte.
pub const GB: u64 = 1024 * 1024 * 1024;

/// Builder for test subscription records.
#[derive(Debug, Clone)]
pub struct RecordFixture {
    record: SubscriptionRecord,
    now: i64,
}

impl RecordFixture {
    /// A user who never subscribed.
    #[must_use]
    pub fn none() -> Self {
        Self {
            record: SubscriptionRecord::default(),
            now: 0,
        }
    }

    /// An active periodic plan expiring 30 days after `now`, resetting on the 1st.
    #[must_use]
    pub fn periodic(plan_id: &str, now: DateTime<Utc>) -> Self {
        let now = now.timestamp();
        Self {
            record: SubscriptionRecord {
                plan_id: Some(plan_id.to_string()),
                plan_name: Some(format!("Plan {}", plan_id)),
                expires_at: Some(now + 30 * SECONDS_PER_DAY),
                reset_day: Some(1),
                quota_bytes: 100 * GB,
                is_available: true,
                ..Default::default()
            },
            now,
        }
    }

    /// A valid one-time package with no expiry.
    #[must_use]
    pub fn package(plan_id: &str) -> Self {
        Self {
            record: SubscriptionRecord {
                plan_id: Some(plan_id.to_string()),
                plan_name: Some(format!("Package {}", plan_id)),
                quota_bytes: 50 * GB,
                is_available: true,
                ..Default::default()
            },
            now: 0,
        }
    }

    #[must_use]
    pub fn quota_gb(mut self, gb: u64) -> Self {
        self.record.quota_bytes = gb * GB;
        self
    }

    /// Traffic used, split evenly between upload and download.
    #[must_use]
    pub fn used_gb(mut self, gb: u64) -> Self {
        let bytes = gb * GB;
        self.record.upload_bytes = bytes / 2;
        self.record.download_bytes = bytes - bytes / 2;
        self
    }

    #[must_use]
    pub fn reset_day(mut self, day: u32) -> Self {
        self.record.reset_day = Some(day);
        self
    }

    /// Expire `days` days after the fixture's `now` (negative for the past).
    #[must_use]
    pub fn expires_in_days(mut self, days: i64) -> Self {
        self.record.expires_at = Some(self.now + days * SECONDS_PER_DAY);
        self
    }

    /// Mark the plan as expired by the backend.
    #[must_use]
    pub fn expired(mut self) -> Self {
        self.record.is_expired = true;
        self.record.is_available = false;
        self
    }

    /// Mark the traffic as depleted by the backend.
    #[must_use]
    pub fn depleted(mut self) -> Self {
        self.record.is_traffic_depleted = true;
        self.record.is_available = false;
        self
    }

    #[must_use]
    pub fn build(self) -> SubscriptionRecord {
        self.record
    }
}
