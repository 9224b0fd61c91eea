//! Business-rule gates consulted before an order is created.
//!
//! Each predicate only reads the current classification and the proposed
//! selection; none of them can fail.

use serde::Serialize;
use std::fmt;

use super::classifier::SubscriptionClassification;
use crate::catalog::PriceKind;

/// Usage percentage from which a periodic plan may buy a traffic reset.
pub const RESET_ELIGIBILITY_THRESHOLD: f64 = 80.0;

/// The gates that may ask the user for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Switching plan, or between one-time and periodic.
    PlanChange,
    /// Buying a one-time package while a periodic plan is out of traffic.
    TrafficDepletion,
}

impl GateKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlanChange => "plan_change",
            Self::TrafficDepletion => "traffic_depletion",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a gate's verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The gate did not apply.
    Automatic,
    /// The user answered a confirmation.
    User,
}

/// Outcome of a single gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateDecision {
    pub approved: bool,
    pub source: DecisionSource,
}

impl GateDecision {
    /// The gate did not apply, so it passes without asking.
    #[must_use]
    pub fn auto_approved() -> Self {
        Self {
            approved: true,
            source: DecisionSource::Automatic,
        }
    }

    #[must_use]
    pub fn from_user(approved: bool) -> Self {
        Self {
            approved,
            source: DecisionSource::User,
        }
    }
}

/// Whether the selection changes the plan or its one-time/periodic nature.
///
/// Users without a subscription have nothing to change from, so this is
/// always `false` for them.
#[must_use]
pub fn is_plan_or_type_change(
    current: &SubscriptionClassification,
    new_plan_id: &str,
    new_price_kind: PriceKind,
) -> bool {
    if !current.has_subscription() {
        return false;
    }
    let plan_changed = current.plan_id.as_deref() != Some(new_plan_id);
    plan_changed || new_price_kind.is_one_time() != current.is_one_time
}

/// Whether buying a one-time package while a periodic plan is out of
/// traffic needs explicit acknowledgement.
#[must_use]
pub fn requires_depletion_confirm(
    current: &SubscriptionClassification,
    new_price_kind: PriceKind,
) -> bool {
    current.is_periodic && current.is_depleted && new_price_kind.is_one_time()
}

/// Whether to offer a traffic reset at the default 80% threshold.
#[must_use]
pub fn is_reset_eligible(current: &SubscriptionClassification, usage_percentage: f64) -> bool {
    is_reset_eligible_at(current, usage_percentage, RESET_ELIGIBILITY_THRESHOLD)
}

/// Whether to offer a traffic reset at a custom threshold.
#[must_use]
pub fn is_reset_eligible_at(
    current: &SubscriptionClassification,
    usage_percentage: f64,
    threshold: f64,
) -> bool {
    current.is_periodic && usage_percentage >= threshold && !current.is_expired
}
