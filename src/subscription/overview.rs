//! The dashboard's per-page-load view of a subscription.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classifier::{SubscriptionClassification, classify};
use super::gates::is_reset_eligible_at;
use super::metrics::{ExpirySnapshot, ResetSnapshot, TrafficSnapshot, local_date};
use super::record::SubscriptionRecord;
use crate::catalog::{Catalog, PlanPrice};
use crate::config::DashboardConfig;

/// Everything the dashboard shows about the current subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountOverview {
    pub classification: SubscriptionClassification,
    pub traffic: TrafficSnapshot,
    pub expiry: ExpirySnapshot,
    pub reset: Option<ResetSnapshot>,
    /// Whether the "reset traffic" option should be shown.
    pub reset_eligible: bool,
    /// The reset price to offer, when eligible and the catalog has one.
    pub reset_price: Option<PlanPrice>,
}

impl AccountOverview {
    /// Derive the overview from a record at `now`.
    #[must_use]
    pub fn build(record: &SubscriptionRecord, now: DateTime<Utc>, config: &DashboardConfig) -> Self {
        let offset = config.offset();
        let now_ts = now.timestamp();
        let today = local_date(now_ts, offset).unwrap_or_else(|| now.date_naive());

        let classification = classify(record, now_ts);
        let traffic = TrafficSnapshot::from_record(record);
        let expiry = ExpirySnapshot::from_record(record, now_ts, offset, &config.date_format);
        let reset = ResetSnapshot::from_record(record, today, &config.date_format);
        let reset_eligible =
            is_reset_eligible_at(&classification, traffic.percentage, config.reset_threshold_percent);

        Self {
            classification,
            traffic,
            expiry,
            reset,
            reset_eligible,
            reset_price: None,
        }
    }

    /// Attach the reset price for the current plan, if a reset is on offer.
    #[must_use]
    pub fn with_reset_offer(mut self, catalog: &Catalog) -> Self {
        if self.reset_eligible {
            self.reset_price = self
                .classification
                .plan_id
                .as_deref()
                .and_then(|plan_id| catalog.reset_price(plan_id))
                .cloned();
        }
        self
    }
}
