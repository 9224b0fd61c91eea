//! Audit logging for order submissions.
//!
//! Every workflow run reports what it did through an [`OrderAuditLogger`],
//! so declined confirmations and failed creations leave a trail.

use std::fmt;

use crate::subscription::GateKind;

/// Audit event types for order submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderAuditEvent {
    /// A submission passed validation and started running.
    SubmissionStarted { plan_id: String, price_id: String },
    /// An unpaid order blocked the submission.
    UnpaidOrderFound { trade_no: String },
    /// A gate asked the user to confirm.
    ConfirmationRequested { gate: GateKind },
    /// The user answered a confirmation.
    ConfirmationAnswered { gate: GateKind, approved: bool },
    /// The confirmation went away without an answer.
    ConfirmationAbandoned { gate: GateKind },
    /// The order was created.
    OrderCreated {
        trade_no: String,
        plan_id: String,
        price_id: String,
    },
    /// A collaborator call failed.
    OrderFailed { stage: String, error: String },
}

impl fmt::Display for OrderAuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubmissionStarted { plan_id, price_id } => {
                write!(f, "Submission started: plan={}, price={}", plan_id, price_id)
            }
            Self::UnpaidOrderFound { trade_no } => {
                write!(f, "Unpaid order found: trade={}", trade_no)
            }
            Self::ConfirmationRequested { gate } => {
                write!(f, "Confirmation requested: gate={}", gate)
            }
            Self::ConfirmationAnswered { gate, approved } => {
                write!(f, "Confirmation answered: gate={}, approved={}", gate, approved)
            }
            Self::ConfirmationAbandoned { gate } => {
                write!(f, "Confirmation abandoned: gate={}", gate)
            }
            Self::OrderCreated { trade_no, plan_id, price_id } => {
                write!(f, "Order created: trade={}, plan={}, price={}", trade_no, plan_id, price_id)
            }
            Self::OrderFailed { stage, error } => {
                write!(f, "Order failed: stage={}, error={}", stage, error)
            }
        }
    }
}

/// Trait for audit logging backends.
#[allow(async_fn_in_trait)]
pub trait OrderAuditLogger: Send + Sync {
    /// Log an order audit event.
    ///
    /// Implementations must not fail the workflow; handle errors internally.
    async fn log(&self, event: OrderAuditEvent);
}

/// No-op audit logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAuditLogger;

impl OrderAuditLogger for NoOpAuditLogger {
    async fn log(&self, _event: OrderAuditEvent) {}
}

/// Logs audit events with `tracing` at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl OrderAuditLogger for TracingAuditLogger {
    async fn log(&self, event: OrderAuditEvent) {
        tracing::info!(
            target: "order::audit",
            event_type = %event_kind(&event),
            "{}", event
        );
    }
}

fn event_kind(event: &OrderAuditEvent) -> &'static str {
    match event {
        OrderAuditEvent::SubmissionStarted { .. } => "submission_started",
        OrderAuditEvent::UnpaidOrderFound { .. } => "unpaid_order_found",
        OrderAuditEvent::ConfirmationRequested { .. } => "confirmation_requested",
        OrderAuditEvent::ConfirmationAnswered { .. } => "confirmation_answered",
        OrderAuditEvent::ConfirmationAbandoned { .. } => "confirmation_abandoned",
        OrderAuditEvent::OrderCreated { .. } => "order_created",
        OrderAuditEvent::OrderFailed { .. } => "order_failed",
    }
}

/// Audit logger that keeps events in memory, for tests.
#[cfg(any(test, feature = "test-orders"))]
pub mod test {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone)]
    pub struct RecordingAuditLogger {
        events: Arc<Mutex<Vec<OrderAuditEvent>>>,
    }

    impl RecordingAuditLogger {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<OrderAuditEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl OrderAuditLogger for RecordingAuditLogger {
        async fn log(&self, event: OrderAuditEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test::RecordingAuditLogger;
    use super::*;

    #[test]
    fn test_event_display() {
        let event = OrderAuditEvent::ConfirmationAnswered {
            gate: GateKind::PlanChange,
            approved: false,
        };
        assert_eq!(
            event.to_string(),
            "Confirmation answered: gate=plan_change, approved=false"
        );
        assert_eq!(event_kind(&event), "confirmation_answered");
    }

    #[tokio::test]
    async fn test_recording_logger() {
        let logger = RecordingAuditLogger::new();
        logger
            .log(OrderAuditEvent::UnpaidOrderFound {
                trade_no: "t1".to_string(),
            })
            .await;
        assert_eq!(logger.events().len(), 1);
    }

    #[tokio::test]
    async fn test_builtin_loggers_accept_events() {
        let event = OrderAuditEvent::SubmissionStarted {
            plan_id: "1".to_string(),
            price_id: "11".to_string(),
        };
        NoOpAuditLogger.log(event.clone()).await;
        TracingAuditLogger.log(event).await;
    }
}
