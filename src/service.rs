//! Account service: the dashboard overview and order submission over a
//! freshly loaded subscription snapshot.

use chrono::{DateTime, Utc};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::order::{
    ConfirmationSurface, NoOpAuditLogger, OrderAuditLogger, OrderClient, OrderSubmission,
    OrderWorkflow, WorkflowRun,
};
use crate::source::SubscriptionSource;
use crate::subscription::{AccountOverview, classify};

/// Composes a [`SubscriptionSource`] with the [`OrderWorkflow`].
///
/// Every call loads a new record, so a submission is always gated on the
/// subscription as it is now, not as it was when the page rendered.
pub struct AccountService<Src, C, S, L = NoOpAuditLogger>
where
    Src: SubscriptionSource,
    C: OrderClient,
    S: ConfirmationSurface,
    L: OrderAuditLogger,
{
    source: Src,
    workflow: OrderWorkflow<C, S, L>,
    config: DashboardConfig,
}

impl<Src, C, S, L> AccountService<Src, C, S, L>
where
    Src: SubscriptionSource,
    C: OrderClient,
    S: ConfirmationSurface,
    L: OrderAuditLogger,
{
    #[must_use]
    pub fn new(source: Src, workflow: OrderWorkflow<C, S, L>, config: DashboardConfig) -> Self {
        Self {
            source,
            workflow,
            config,
        }
    }

    pub fn workflow(&self) -> &OrderWorkflow<C, S, L> {
        &self.workflow
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Build the dashboard overview at `now`.
    ///
    /// # Errors
    ///
    /// Returns whatever the source returns when a fetch fails.
    pub async fn overview(&self, now: DateTime<Utc>) -> Result<AccountOverview> {
        let record = self.source.fetch_subscription().await?;
        let catalog = self.source.fetch_catalog().await?;

        let overview = AccountOverview::build(&record, now, &self.config).with_reset_offer(&catalog);
        tracing::debug!(
            target: "tideway_account::service",
            status = %overview.classification.status,
            usage = overview.traffic.percentage,
            reset_eligible = overview.reset_eligible,
            "built account overview"
        );
        Ok(overview)
    }

    /// Load the current subscription and run `submission` through the
    /// order workflow.
    ///
    /// # Errors
    ///
    /// Fetch failures from the source, and any [`OrderError`](crate::order::OrderError)
    /// the workflow returns, wrapped in [`AccountError::Order`](crate::AccountError::Order).
    pub async fn submit_order(
        &self,
        submission: OrderSubmission,
        now: DateTime<Utc>,
    ) -> Result<WorkflowRun> {
        let record = self.source.fetch_subscription().await?;
        let catalog = self.source.fetch_catalog().await?;
        let current = classify(&record, now.timestamp());

        Ok(self.workflow.submit(&current, &catalog, submission).await?)
    }
}
