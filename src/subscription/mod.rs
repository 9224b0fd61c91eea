//! Subscription classification engine.
//!
//! Turns the raw record from the backend into the status, snapshots, and
//! gate predicates the dashboard and order workflow consume.
//!
//! # Example
//!
//! ```rust
//! use tideway_account::subscription::{classify, SubscriptionRecord, SubscriptionStatus};
//!
//! let record = SubscriptionRecord {
//!     plan_id: Some("1".to_string()),
//!     plan_name: Some("Pro".to_string()),
//!     expires_at: Some(0),
//!     is_traffic_depleted: true,
//!     ..Default::default()
//! };
//!
//! let classification = classify(&record, 1_760_000_000);
//! assert_eq!(classification.status, SubscriptionStatus::PackageExhausted);
//! ```

pub mod classifier;
pub mod gates;
pub mod metrics;
pub mod overview;
pub mod record;

pub use classifier::{SubscriptionClassification, SubscriptionStatus, classify};
pub use gates::{
    DecisionSource, GateDecision, GateKind, RESET_ELIGIBILITY_THRESHOLD, is_plan_or_type_change,
    is_reset_eligible, is_reset_eligible_at, requires_depletion_confirm,
};
pub use metrics::{
    ExpirySnapshot, NEVER_EXPIRES, ResetSnapshot, SECONDS_PER_DAY, TrafficSnapshot,
    days_until_reset, format_bytes, next_reset_date, remaining_days, usage_percentage,
};
pub use overview::AccountOverview;
pub use record::SubscriptionRecord;
