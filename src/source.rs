//! Where subscription data comes from.

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::subscription::SubscriptionRecord;

/// Read-only access to the user's subscription and the plan catalog.
///
/// Implementations wrap the API client; errors should be mapped to
/// [`AccountError`](crate::AccountError), using `anyhow` for anything
/// without a better variant.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    /// Fetch the current subscription record.
    async fn fetch_subscription(&self) -> Result<SubscriptionRecord>;

    /// Fetch the plans available for purchase.
    async fn fetch_catalog(&self) -> Result<Catalog>;
}

/// Fixed subscription source for testing.
#[cfg(any(test, feature = "test-orders"))]
pub mod test {
    use super::*;
    use crate::error::AccountError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serves a fixed record and catalog.
    ///
    /// Clones share state, so a test can swap the record between calls.
    #[derive(Clone)]
    pub struct StaticSubscriptionSource {
        inner: Arc<StaticSourceInner>,
    }

    struct StaticSourceInner {
        record: Mutex<SubscriptionRecord>,
        catalog: Catalog,
        unavailable: Mutex<Option<String>>,
        fetches: AtomicUsize,
    }

    impl StaticSubscriptionSource {
        #[must_use]
        pub fn new(record: SubscriptionRecord, catalog: Catalog) -> Self {
            Self {
                inner: Arc::new(StaticSourceInner {
                    record: Mutex::new(record),
                    catalog,
                    unavailable: Mutex::new(None),
                    fetches: AtomicUsize::new(0),
                }),
            }
        }

        /// Fail every fetch with `ServiceUnavailable`.
        #[must_use]
        pub fn unavailable(self, message: &str) -> Self {
            *self.inner.unavailable.lock().unwrap() = Some(message.to_string());
            self
        }

        /// Replace the record returned by later fetches.
        pub fn set_record(&self, record: SubscriptionRecord) {
            *self.inner.record.lock().unwrap() = record;
        }

        /// Number of subscription fetches made.
        pub fn fetches(&self) -> usize {
            self.inner.fetches.load(Ordering::SeqCst)
        }

        fn check_available(&self) -> Result<()> {
            match self.inner.unavailable.lock().unwrap().as_deref() {
                Some(message) => Err(AccountError::service_unavailable(message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl SubscriptionSource for StaticSubscriptionSource {
        async fn fetch_subscription(&self) -> Result<SubscriptionRecord> {
            self.inner.fetches.fetch_add(1, Ordering::SeqCst);
            self.check_available()?;
            Ok(self.inner.record.lock().unwrap().clone())
        }

        async fn fetch_catalog(&self) -> Result<Catalog> {
            self.check_available()?;
            Ok(self.inner.catalog.clone())
        }
    }
}
