//! Order collaborator boundary.
//!
//! The HTTP transport, auth headers, and error localisation live behind
//! [`OrderClient`]; the workflow only sees typed requests and responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::OrderError;

/// An existing order awaiting payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub trade_no: String,
    pub plan_id: String,
    #[serde(default)]
    pub price_id: Option<String>,
    /// Amount due in minor currency units.
    pub total_amount: u64,
    /// Unix timestamp of order creation.
    pub created_at: i64,
}

/// The order to create once every gate has approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub plan_id: String,
    pub price_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

/// Identifier of a created order, used to navigate to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub String);

impl TradeId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TradeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Order operations provided by the API layer.
#[async_trait]
pub trait OrderClient: Send + Sync {
    /// Fetch the user's unpaid order, if one exists.
    async fn fetch_unpaid_order(&self) -> Result<Option<OrderSummary>, OrderError>;

    /// Create an order. Expected to be atomic: on error nothing is left behind.
    async fn create_order(&self, draft: &OrderDraft) -> Result<TradeId, OrderError>;
}

/// Mock order client for testing.
#[cfg(any(test, feature = "test-orders"))]
pub mod test {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// In-memory order client that records every call.
    ///
    /// Wraps state in Arc so clones share counters.
    #[derive(Default, Clone)]
    pub struct MockOrderClient {
        inner: Arc<MockOrderClientInner>,
    }

    #[derive(Default)]
    struct MockOrderClientInner {
        unpaid_order: Mutex<Option<OrderSummary>>,
        lookup_error: Mutex<Option<OrderError>>,
        create_error: Mutex<Option<OrderError>>,
        drafts: Mutex<Vec<OrderDraft>>,
        lookup_calls: AtomicUsize,
        trade_counter: AtomicU64,
    }

    impl MockOrderClient {
        /// Create a client with no unpaid order that accepts every draft.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Report this order as unpaid.
        #[must_use]
        pub fn with_unpaid_order(self, order: OrderSummary) -> Self {
            *self.inner.unpaid_order.lock().unwrap() = Some(order);
            self
        }

        /// Fail the unpaid-order lookup.
        #[must_use]
        pub fn with_lookup_error(self, error: OrderError) -> Self {
            *self.inner.lookup_error.lock().unwrap() = Some(error);
            self
        }

        /// Fail order creation.
        #[must_use]
        pub fn with_create_error(self, error: OrderError) -> Self {
            *self.inner.create_error.lock().unwrap() = Some(error);
            self
        }

        /// Number of unpaid-order lookups made.
        pub fn lookup_calls(&self) -> usize {
            self.inner.lookup_calls.load(Ordering::SeqCst)
        }

        /// Number of create calls made, successful or not.
        pub fn create_calls(&self) -> usize {
            self.inner.drafts.lock().unwrap().len()
        }

        /// Every draft passed to `create_order`.
        pub fn drafts(&self) -> Vec<OrderDraft> {
            self.inner.drafts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderClient for MockOrderClient {
        async fn fetch_unpaid_order(&self) -> Result<Option<OrderSummary>, OrderError> {
            self.inner.lookup_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.inner.lookup_error.lock().unwrap().clone() {
                return Err(err);
            }
            Ok(self.inner.unpaid_order.lock().unwrap().clone())
        }

        async fn create_order(&self, draft: &OrderDraft) -> Result<TradeId, OrderError> {
            self.inner.drafts.lock().unwrap().push(draft.clone());
            if let Some(err) = self.inner.create_error.lock().unwrap().clone() {
                return Err(err);
            }
            let n = self.inner.trade_counter.fetch_add(1, Ordering::SeqCst);
            Ok(TradeId(format!("trade_test_{}", n)))
        }
    }

    /// An unpaid order fixture.
    #[must_use]
    pub fn unpaid_order(trade_no: &str, plan_id: &str) -> OrderSummary {
        OrderSummary {
            trade_no: trade_no.to_string(),
            plan_id: plan_id.to_string(),
            price_id: None,
            total_amount: 999,
            created_at: 1_760_000_000,
        }
    }
}
