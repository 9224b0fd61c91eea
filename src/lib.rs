//! Tideway Account - subscription status and gated order submission
//!
//! The client-side core of a subscription dashboard: it classifies the
//! user's subscription, computes usage and expiry figures, and submits
//! orders only after the user has confirmed anything that would change or
//! waste their current plan.
//!
//! # Features
//!
//! - **Classification**: one status out of a closed set, from the raw record
//! - **Metrics**: traffic usage, days remaining, next traffic reset
//! - **Catalog**: plans and their typed price kinds
//! - **Order workflow**: unpaid-order check, plan-change and depletion
//!   confirmations, then creation
//! - **Testing**: mock collaborators behind the `test-orders` feature
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tideway_account::{self, AccountOverview, ConfigBuilder, SubscriptionRecord};
//!
//! fn main() -> tideway_account::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     tideway_account::init_tracing_with_config(&config);
//!
//!     let record = SubscriptionRecord::default();
//!     let overview = AccountOverview::build(&record, chrono::Utc::now(), &config.dashboard);
//!     println!("{}", overview.classification.status);
//!     Ok(())
//! }
//! ```

pub mod catalog;
mod config;
mod error;
pub mod order;
pub mod service;
pub mod source;
pub mod subscription;
#[cfg(any(test, feature = "test-orders"))]
pub mod testing;
pub mod utils;

// Re-exports for public API
pub use catalog::{Catalog, Plan, PlanPrice, PriceKind};
pub use config::{Config, ConfigBuilder, DashboardConfig, LoggingConfig};
pub use error::{AccountError, Result};
pub use order::{
    AbortReason, ConfirmationPrompt, ConfirmationSurface, DecisionBridge, OrderClient, OrderError,
    OrderSubmission, OrderWorkflow, TradeId, WorkflowOutcome, WorkflowRun, WorkflowState,
};
pub use service::AccountService;
pub use source::SubscriptionSource;
pub use subscription::{
    AccountOverview, SubscriptionClassification, SubscriptionRecord, SubscriptionStatus, classify,
};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "tideway_account=debug")
/// - `ACCOUNT_LOG_JSON`: Set to "true" for JSON formatted logs
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);
    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
