//! Gated order submission.
//!
//! Creates an order only after the unpaid-order check and the two
//! confirmation gates have passed.
//!
//! # Example
//!
//! ```rust,ignore
//! use tideway_account::order::{
//!     ChannelConfirmationSurface, OrderSubmission, OrderWorkflow, WorkflowOutcome,
//! };
//! use tideway_account::subscription::classify;
//!
//! let (surface, mut requests) = ChannelConfirmationSurface::new(1);
//! let workflow = OrderWorkflow::new(api_client, surface);
//!
//! // The UI loop answers prompts as they arrive.
//! tokio::spawn(async move {
//!     while let Some(request) = requests.recv().await {
//!         let approved = show_modal(&request.prompt).await;
//!         request.resolve(approved);
//!     }
//! });
//!
//! let current = classify(&record, now);
//! let run = workflow
//!     .submit(&current, &catalog, OrderSubmission::new("2", "21"))
//!     .await?;
//!
//! if let WorkflowOutcome::Succeeded(trade_id) = run.outcome {
//!     navigate_to_checkout(&trade_id);
//! }
//! ```

pub mod audit;
pub mod client;
pub mod decision;
pub mod error;
pub mod validation;
pub mod workflow;

pub use audit::{NoOpAuditLogger, OrderAuditEvent, OrderAuditLogger, TracingAuditLogger};
pub use client::{OrderClient, OrderDraft, OrderSummary, TradeId};
pub use decision::{
    ChannelConfirmationSurface, ConfirmationPrompt, ConfirmationRequest, ConfirmationSurface,
    DecisionAbandoned, DecisionBridge, PendingDecision,
};
pub use error::OrderError;
pub use workflow::{
    AbortReason, GateRecord, OrderSubmission, OrderWorkflow, WorkflowOutcome, WorkflowRun,
    WorkflowState,
};
