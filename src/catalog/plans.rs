//! Plan catalog returned by the data source.
//!
//! Plans and their prices are usually deserialised from the backend, but can
//! also be built in code:
//!
//! ```rust
//! use tideway_account::catalog::{Catalog, PriceKind};
//!
//! let catalog = Catalog::builder()
//!     .plan("1", "Basic")
//!         .quota_gb(100)
//!         .price("11", PriceKind::PeriodicRenewal, 999)
//!         .price("12", PriceKind::PeriodicReset, 300)
//!         .done()
//!     .plan("2", "Traffic Pack")
//!         .quota_gb(500)
//!         .price("21", PriceKind::OneTimePackage, 2500)
//!         .done()
//!     .build();
//!
//! assert_eq!(catalog.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

use super::price::PriceKind;
use crate::order::OrderError;

const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// The purchasable plans, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    plans: Vec<Plan>,
}

impl Catalog {
    #[must_use]
    pub fn new(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Get a plan by ID.
    #[must_use]
    pub fn plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    /// Resolve a plan/price pair, checking the price belongs to the plan.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::PlanNotFound` or `OrderError::PriceNotFound`.
    pub fn resolve(&self, plan_id: &str, price_id: &str) -> Result<(&Plan, &PlanPrice), OrderError> {
        let plan = self.plan(plan_id).ok_or_else(|| OrderError::PlanNotFound {
            plan_id: plan_id.to_string(),
        })?;
        let price = plan.price(price_id).ok_or_else(|| OrderError::PriceNotFound {
            plan_id: plan_id.to_string(),
            price_id: price_id.to_string(),
        })?;
        Ok((plan, price))
    }

    /// The traffic-reset price offered for a plan, if any.
    #[must_use]
    pub fn reset_price(&self, plan_id: &str) -> Option<&PlanPrice> {
        self.plan(plan_id)?
            .prices
            .iter()
            .find(|p| p.kind == PriceKind::PeriodicReset)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// A purchasable plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Traffic quota granted by the plan.
    #[serde(default)]
    pub quota_bytes: u64,
    #[serde(default)]
    pub prices: Vec<PlanPrice>,
}

impl Plan {
    #[must_use]
    pub fn price(&self, price_id: &str) -> Option<&PlanPrice> {
        self.prices.iter().find(|p| p.id == price_id)
    }
}

/// One way of paying for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPrice {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PriceKind,
    /// Amount in minor currency units.
    pub amount: u64,
    /// Length of the period bought, for periodic prices.
    #[serde(default)]
    pub period_days: Option<u32>,
}

/// Builder for [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    plans: Vec<Plan>,
}

impl CatalogBuilder {
    /// Start defining a plan.
    #[must_use]
    pub fn plan(self, id: &str, name: &str) -> PlanBuilder {
        PlanBuilder {
            parent: self,
            plan: Plan {
                id: id.to_string(),
                name: name.to_string(),
                quota_bytes: 0,
                prices: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn build(self) -> Catalog {
        Catalog { plans: self.plans }
    }
}

/// Builder for a single plan.
#[derive(Debug)]
pub struct PlanBuilder {
    parent: CatalogBuilder,
    plan: Plan,
}

impl PlanBuilder {
    #[must_use]
    pub fn quota_bytes(mut self, bytes: u64) -> Self {
        self.plan.quota_bytes = bytes;
        self
    }

    #[must_use]
    pub fn quota_gb(self, gb: u64) -> Self {
        self.quota_bytes(gb.saturating_mul(BYTES_PER_GB))
    }

    /// Add a price to this plan.
    #[must_use]
    pub fn price(mut self, id: &str, kind: PriceKind, amount: u64) -> Self {
        self.plan.prices.push(PlanPrice {
            id: id.to_string(),
            kind,
            amount,
            period_days: None,
        });
        self
    }

    /// Add a periodic price covering `period_days`.
    #[must_use]
    pub fn periodic_price(mut self, id: &str, amount: u64, period_days: u32) -> Self {
        self.plan.prices.push(PlanPrice {
            id: id.to_string(),
            kind: PriceKind::PeriodicRenewal,
            amount,
            period_days: Some(period_days),
        });
        self
    }

    /// Finish defining this plan and return to the catalog builder.
    #[must_use]
    pub fn done(mut self) -> CatalogBuilder {
        self.parent.plans.push(self.plan);
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builder()
            .plan("1", "Basic")
            .quota_gb(100)
            .periodic_price("11", 999, 30)
            .price("12", PriceKind::PeriodicReset, 300)
            .done()
            .plan("2", "Pack")
            .price("21", PriceKind::OneTimePackage, 2500)
            .done()
            .build()
    }

    #[test]
    fn test_builder_preserves_order() {
        let catalog = catalog();
        let ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(catalog.plan("1").unwrap().quota_bytes, 100 * BYTES_PER_GB);
    }

    #[test]
    fn test_resolve() {
        let catalog = catalog();
        let (plan, price) = catalog.resolve("1", "11").unwrap();
        assert_eq!(plan.name, "Basic");
        assert_eq!(price.kind, PriceKind::PeriodicRenewal);
        assert_eq!(price.period_days, Some(30));

        assert_eq!(
            catalog.resolve("9", "11").unwrap_err(),
            OrderError::PlanNotFound { plan_id: "9".to_string() }
        );
        // Price exists, but on another plan
        assert_eq!(
            catalog.resolve("1", "21").unwrap_err(),
            OrderError::PriceNotFound {
                plan_id: "1".to_string(),
                price_id: "21".to_string(),
            }
        );
    }

    #[test]
    fn test_reset_price() {
        let catalog = catalog();
        assert_eq!(catalog.reset_price("1").map(|p| p.id.as_str()), Some("12"));
        assert!(catalog.reset_price("2").is_none());
        assert!(catalog.reset_price("missing").is_none());
    }

    #[test]
    fn test_deserialize_backend_catalog() {
        let json = r#"{"plans":[
            {"id":"1","name":"Basic","quotaBytes":1024,"prices":[
                {"id":"11","type":1,"amount":999,"periodDays":30},
                {"id":"12","type":4,"amount":100}
            ]}
        ]}"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let plan = catalog.plan("1").unwrap();
        assert_eq!(plan.prices.len(), 2);
        assert_eq!(plan.price("12").unwrap().kind, PriceKind::TemporaryTopUp);
    }
}
