//! Subscription classification.
//!
//! Collapses a raw [`SubscriptionRecord`] into one status from a closed set,
//! plus the predicates the order gates and the dashboard need.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::remaining_days;
use super::record::SubscriptionRecord;

/// The single derived status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// The user has no plan.
    NoSubscription,
    /// Periodic plan, not expired.
    ServiceActive,
    /// Periodic plan past its expiry, traffic left.
    ServiceExpired,
    /// One-time package with traffic left.
    PackageValid,
    /// One-time package with no traffic left.
    PackageExhausted,
    /// Periodic plan past its expiry and out of traffic.
    ExpiredExhausted,
}

impl SubscriptionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSubscription => "NO_SUBSCRIPTION",
            Self::ServiceActive => "SERVICE_ACTIVE",
            Self::ServiceExpired => "SERVICE_EXPIRED",
            Self::PackageValid => "PACKAGE_VALID",
            Self::PackageExhausted => "PACKAGE_EXHAUSTED",
            Self::ExpiredExhausted => "EXPIRED_EXHAUSTED",
        }
    }

    /// Whether the subscription currently grants service.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::ServiceActive | Self::PackageValid)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived view of a subscription record.
///
/// A plain value recomputed whenever the record changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionClassification {
    pub status: SubscriptionStatus,
    pub plan_id: Option<String>,
    pub is_one_time: bool,
    pub is_periodic: bool,
    pub is_depleted: bool,
    pub is_expired: bool,
    pub is_available: bool,
}

impl SubscriptionClassification {
    /// Classification for a user without a plan.
    #[must_use]
    pub fn none() -> Self {
        Self {
            status: SubscriptionStatus::NoSubscription,
            plan_id: None,
            is_one_time: false,
            is_periodic: false,
            is_depleted: false,
            is_expired: false,
            is_available: false,
        }
    }

    #[must_use]
    pub fn has_subscription(&self) -> bool {
        self.status != SubscriptionStatus::NoSubscription
    }
}

/// Classify a record at time `now` (Unix seconds).
///
/// Rules are checked in order and the first match wins:
///
/// 1. No plan name: `NoSubscription`.
/// 2. No expiry: one-time package, `PackageExhausted` if depleted else `PackageValid`.
/// 3. Periodic and expired (flag set or no days left): `ExpiredExhausted` if
///    depleted else `ServiceExpired`.
/// 4. Otherwise `ServiceActive`.
///
/// Input is not validated.
#[must_use]
pub fn classify(record: &SubscriptionRecord, now: i64) -> SubscriptionClassification {
    if !record.has_plan() {
        return SubscriptionClassification::none();
    }

    let is_depleted = record.is_traffic_depleted;

    let Some(expires_at) = record.expiry() else {
        let status = if is_depleted {
            SubscriptionStatus::PackageExhausted
        } else {
            SubscriptionStatus::PackageValid
        };
        return SubscriptionClassification {
            status,
            plan_id: record.plan_id.clone(),
            is_one_time: true,
            is_periodic: false,
            is_depleted,
            is_expired: false,
            is_available: record.is_available,
        };
    };

    let is_expired = record.is_expired || remaining_days(now, expires_at) <= 0;
    let status = match (is_expired, is_depleted) {
        (true, true) => SubscriptionStatus::ExpiredExhausted,
        (true, false) => SubscriptionStatus::ServiceExpired,
        (false, _) => SubscriptionStatus::ServiceActive,
    };

    SubscriptionClassification {
        status,
        plan_id: record.plan_id.clone(),
        is_one_time: false,
        is_periodic: true,
        is_depleted,
        is_expired,
        is_available: record.is_available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::metrics::SECONDS_PER_DAY;

    const NOW: i64 = 1_760_000_000;

    fn record(name: &str) -> SubscriptionRecord {
        SubscriptionRecord {
            plan_id: Some("1".to_string()),
            plan_name: Some(name.to_string()),
            is_available: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_plan_name_is_no_subscription_regardless_of_fields() {
        for name in [None, Some(""), Some("  ")] {
            let rec = SubscriptionRecord {
                plan_id: Some("1".to_string()),
                plan_name: name.map(str::to_string),
                expires_at: Some(NOW - SECONDS_PER_DAY),
                is_expired: true,
                is_traffic_depleted: true,
                is_available: true,
                ..Default::default()
            };
            let c = classify(&rec, NOW);
            assert_eq!(c.status, SubscriptionStatus::NoSubscription);
            assert_eq!(c, SubscriptionClassification::none());
        }
    }

    #[test]
    fn test_package_exhausted() {
        let rec = SubscriptionRecord {
            expires_at: Some(0),
            is_traffic_depleted: true,
            ..record("Pro")
        };
        let c = classify(&rec, NOW);
        assert_eq!(c.status, SubscriptionStatus::PackageExhausted);
        assert!(c.is_one_time);
        assert!(!c.is_periodic);
        assert!(c.is_depleted);
        assert!(!c.is_expired);
    }

    #[test]
    fn test_package_valid_without_expiry() {
        let c = classify(&record("Pack"), NOW);
        assert_eq!(c.status, SubscriptionStatus::PackageValid);
        assert!(c.is_one_time);
        assert!(c.status.is_usable());
    }

    #[test]
    fn test_package_ignores_expired_flag() {
        let rec = SubscriptionRecord {
            is_expired: true,
            ..record("Pack")
        };
        assert_eq!(classify(&rec, NOW).status, SubscriptionStatus::PackageValid);
    }

    #[test]
    fn test_service_active() {
        let rec = SubscriptionRecord {
            expires_at: Some(NOW + SECONDS_PER_DAY),
            ..record("Pro")
        };
        let c = classify(&rec, NOW);
        assert_eq!(c.status, SubscriptionStatus::ServiceActive);
        assert!(c.is_periodic);
        assert!(!c.is_expired);
        assert_eq!(c.plan_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_service_active_even_when_depleted() {
        let rec = SubscriptionRecord {
            expires_at: Some(NOW + 10 * SECONDS_PER_DAY),
            is_traffic_depleted: true,
            ..record("Pro")
        };
        let c = classify(&rec, NOW);
        assert_eq!(c.status, SubscriptionStatus::ServiceActive);
        assert!(c.is_depleted);
    }

    #[test]
    fn test_expired_by_flag_or_by_date() {
        let by_flag = SubscriptionRecord {
            expires_at: Some(NOW + 10 * SECONDS_PER_DAY),
            is_expired: true,
            ..record("Pro")
        };
        assert_eq!(classify(&by_flag, NOW).status, SubscriptionStatus::ServiceExpired);

        let by_date = SubscriptionRecord {
            expires_at: Some(NOW),
            ..record("Pro")
        };
        let c = classify(&by_date, NOW);
        assert_eq!(c.status, SubscriptionStatus::ServiceExpired);
        assert!(c.is_expired);
    }

    #[test]
    fn test_periodic_expired_depleted_is_expired_exhausted() {
        for (expires_at, flag) in [(NOW - SECONDS_PER_DAY, false), (NOW + SECONDS_PER_DAY, true)] {
            let rec = SubscriptionRecord {
                expires_at: Some(expires_at),
                is_expired: flag,
                is_traffic_depleted: true,
                ..record("Pro")
            };
            let c = classify(&rec, NOW);
            assert_eq!(c.status, SubscriptionStatus::ExpiredExhausted);
            assert_ne!(c.status, SubscriptionStatus::PackageExhausted);
            assert!(c.is_periodic && c.is_depleted && c.is_expired);
        }
    }

    #[test]
    fn test_classify_is_idempotent() {
        let rec = SubscriptionRecord {
            expires_at: Some(NOW + 3 * SECONDS_PER_DAY),
            reset_day: Some(5),
            upload_bytes: 10,
            download_bytes: 20,
            quota_bytes: 100,
            ..record("Pro")
        };
        assert_eq!(classify(&rec, NOW), classify(&rec, NOW));
    }

    #[test]
    fn test_status_serialises_screaming_snake_case() {
        let json = serde_json::to_string(&SubscriptionStatus::ExpiredExhausted).unwrap();
        assert_eq!(json, "\"EXPIRED_EXHAUSTED\"");
        assert_eq!(SubscriptionStatus::ServiceActive.to_string(), "SERVICE_ACTIVE");
    }
}
