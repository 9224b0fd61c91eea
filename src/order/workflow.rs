//! Gated order submission.
//!
//! [`OrderWorkflow`] runs one submission through a fixed sequence of checks:
//!
//! ```text
//! Idle -> CheckingUnpaidOrder -> ConfirmingChange -> ConfirmingDepletion -> Creating -> Succeeded
//!                 \                     \                    \                 \
//!                  +---------------------+--------------------+-----------------+--> Aborted
//! ```
//!
//! A gate that does not apply passes without asking. No order is created
//! while a gate is unresolved, and nothing is retried.

use serde::Serialize;

use super::audit::{NoOpAuditLogger, OrderAuditEvent, OrderAuditLogger};
use super::client::{OrderClient, OrderDraft, OrderSummary, TradeId};
use super::decision::{ConfirmationPrompt, ConfirmationSurface};
use super::error::OrderError;
use super::validation::{normalize_coupon, validate_id};
use crate::catalog::{Catalog, Plan, PlanPrice};
use crate::subscription::{
    GateDecision, GateKind, SubscriptionClassification, is_plan_or_type_change,
    requires_depletion_confirm,
};

/// States of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    CheckingUnpaidOrder,
    ConfirmingChange,
    ConfirmingDepletion,
    Creating,
    Succeeded,
    Aborted,
}

impl WorkflowState {
    /// Whether the run has finished.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Aborted)
    }

    /// Whether `next` is a legal successor of this state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use WorkflowState::*;
        matches!(
            (self, next),
            (Idle, CheckingUnpaidOrder)
                | (CheckingUnpaidOrder, ConfirmingChange)
                | (ConfirmingChange, ConfirmingDepletion)
                | (ConfirmingDepletion, Creating)
                | (Creating, Succeeded)
                | (
                    CheckingUnpaidOrder | ConfirmingChange | ConfirmingDepletion | Creating,
                    Aborted
                )
        )
    }
}

/// What the user selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSubmission {
    pub plan_id: String,
    pub price_id: String,
    pub coupon_code: Option<String>,
}

impl OrderSubmission {
    #[must_use]
    pub fn new(plan_id: impl Into<String>, price_id: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            price_id: price_id.into(),
            coupon_code: None,
        }
    }

    #[must_use]
    pub fn with_coupon(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = Some(code.into());
        self
    }
}

/// Why a run ended without creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// An unpaid order already exists. It is surfaced, never cancelled.
    UnpaidOrderExists(OrderSummary),
    /// The user declined the plan-change confirmation.
    ChangeDeclined,
    /// The user declined the traffic-depletion confirmation.
    DepletionDeclined,
    /// The confirmation surface went away before answering.
    ConfirmationAbandoned(GateKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Succeeded(TradeId),
    Aborted(AbortReason),
}

impl WorkflowOutcome {
    /// The created order, if any.
    #[must_use]
    pub fn trade_id(&self) -> Option<&TradeId> {
        match self {
            Self::Succeeded(id) => Some(id),
            Self::Aborted(_) => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// A gate and how it was passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateRecord {
    pub gate: GateKind,
    pub decision: GateDecision,
}

/// Trace of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    pub outcome: WorkflowOutcome,
    /// Every state entered, starting with `Idle`.
    pub transitions: Vec<WorkflowState>,
    /// Gates evaluated, in order. An abandoned gate has no record.
    pub gates: Vec<GateRecord>,
}

impl WorkflowRun {
    /// The final state.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.transitions.last().copied().unwrap_or(WorkflowState::Idle)
    }

    /// The decision recorded for `gate`, if it was reached.
    #[must_use]
    pub fn decision(&self, gate: GateKind) -> Option<GateDecision> {
        self.gates.iter().find(|r| r.gate == gate).map(|r| r.decision)
    }
}

struct RunTrace {
    transitions: Vec<WorkflowState>,
    gates: Vec<GateRecord>,
}

impl RunTrace {
    fn new() -> Self {
        Self {
            transitions: vec![WorkflowState::Idle],
            gates: Vec::new(),
        }
    }

    fn current(&self) -> WorkflowState {
        self.transitions.last().copied().unwrap_or(WorkflowState::Idle)
    }

    fn advance(&mut self, next: WorkflowState) {
        let from = self.current();
        debug_assert!(
            from.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            from,
            next
        );
        tracing::debug!(
            target: "tideway_account::order",
            from = ?from,
            to = ?next,
            "workflow transition"
        );
        self.transitions.push(next);
    }

    fn finish(mut self, outcome: WorkflowOutcome) -> WorkflowRun {
        let terminal = match outcome {
            WorkflowOutcome::Succeeded(_) => WorkflowState::Succeeded,
            WorkflowOutcome::Aborted(_) => WorkflowState::Aborted,
        };
        self.advance(terminal);
        WorkflowRun {
            outcome,
            transitions: self.transitions,
            gates: self.gates,
        }
    }
}

enum GateResult {
    Passed,
    Stopped(AbortReason),
}

/// Runs order submissions through the unpaid-order check and both
/// confirmation gates before creating the order.
///
/// Holds no per-run state: each [`submit`](Self::submit) is a fresh run.
pub struct OrderWorkflow<C, S, L = NoOpAuditLogger>
where
    C: OrderClient,
    S: ConfirmationSurface,
    L: OrderAuditLogger,
{
    client: C,
    surface: S,
    audit: L,
}

impl<C, S> OrderWorkflow<C, S, NoOpAuditLogger>
where
    C: OrderClient,
    S: ConfirmationSurface,
{
    #[must_use]
    pub fn new(client: C, surface: S) -> Self {
        Self {
            client,
            surface,
            audit: NoOpAuditLogger,
        }
    }
}

impl<C, S, L> OrderWorkflow<C, S, L>
where
    C: OrderClient,
    S: ConfirmationSurface,
    L: OrderAuditLogger,
{
    /// Replace the audit logger.
    #[must_use]
    pub fn with_audit_logger<L2: OrderAuditLogger>(self, audit: L2) -> OrderWorkflow<C, S, L2> {
        OrderWorkflow {
            client: self.client,
            surface: self.surface,
            audit,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Submit an order for the selected plan and price.
    ///
    /// `current` is the classification of the record loaded before the
    /// submission; it is treated as a snapshot for the whole run.
    ///
    /// Declines, abandoned confirmations, and an existing unpaid order end
    /// the run as [`WorkflowOutcome::Aborted`].
    ///
    /// # Errors
    ///
    /// - `InvalidSubmission`, `PlanNotFound`, `PriceNotFound` before any
    ///   collaborator is called.
    /// - `UnpaidOrderLookup` if the unpaid-order check fails.
    /// - `CreateFailed` (or whatever the client returns) if creation fails.
    pub async fn submit(
        &self,
        current: &SubscriptionClassification,
        catalog: &Catalog,
        submission: OrderSubmission,
    ) -> Result<WorkflowRun, OrderError> {
        validate_id("plan_id", &submission.plan_id)?;
        validate_id("price_id", &submission.price_id)?;
        let coupon_code = normalize_coupon(submission.coupon_code.as_deref())?;
        let (plan, price) = catalog.resolve(&submission.plan_id, &submission.price_id)?;

        tracing::info!(
            target: "tideway_account::order",
            plan_id = %plan.id,
            price_id = %price.id,
            price_kind = %price.kind,
            status = %current.status,
            "submitting order"
        );
        self.audit
            .log(OrderAuditEvent::SubmissionStarted {
                plan_id: plan.id.clone(),
                price_id: price.id.clone(),
            })
            .await;

        let mut trace = RunTrace::new();

        trace.advance(WorkflowState::CheckingUnpaidOrder);
        match self.client.fetch_unpaid_order().await {
            Ok(None) => {}
            Ok(Some(order)) => {
                tracing::info!(
                    target: "tideway_account::order",
                    trade_no = %order.trade_no,
                    "unpaid order exists, not creating another"
                );
                self.audit
                    .log(OrderAuditEvent::UnpaidOrderFound {
                        trade_no: order.trade_no.clone(),
                    })
                    .await;
                return Ok(trace.finish(WorkflowOutcome::Aborted(
                    AbortReason::UnpaidOrderExists(order),
                )));
            }
            Err(err) => {
                trace.advance(WorkflowState::Aborted);
                return Err(self.fail("unpaid_order_lookup", err).await);
            }
        }

        trace.advance(WorkflowState::ConfirmingChange);
        let prompt = is_plan_or_type_change(current, &plan.id, price.kind)
            .then(|| change_prompt(current, plan, price));
        if let GateResult::Stopped(reason) =
            self.pass_gate(GateKind::PlanChange, prompt, &mut trace).await
        {
            return Ok(trace.finish(WorkflowOutcome::Aborted(reason)));
        }

        trace.advance(WorkflowState::ConfirmingDepletion);
        let prompt = requires_depletion_confirm(current, price.kind)
            .then(|| depletion_prompt(current, plan));
        if let GateResult::Stopped(reason) = self
            .pass_gate(GateKind::TrafficDepletion, prompt, &mut trace)
            .await
        {
            return Ok(trace.finish(WorkflowOutcome::Aborted(reason)));
        }

        trace.advance(WorkflowState::Creating);
        let draft = OrderDraft {
            plan_id: plan.id.clone(),
            price_id: price.id.clone(),
            coupon_code,
        };
        match self.client.create_order(&draft).await {
            Ok(trade_id) => {
                tracing::info!(
                    target: "tideway_account::order",
                    trade_no = %trade_id,
                    plan_id = %draft.plan_id,
                    "order created"
                );
                self.audit
                    .log(OrderAuditEvent::OrderCreated {
                        trade_no: trade_id.to_string(),
                        plan_id: draft.plan_id,
                        price_id: draft.price_id,
                    })
                    .await;
                Ok(trace.finish(WorkflowOutcome::Succeeded(trade_id)))
            }
            Err(err) => {
                trace.advance(WorkflowState::Aborted);
                Err(self.fail("create_order", err).await)
            }
        }
    }

    async fn pass_gate(
        &self,
        gate: GateKind,
        prompt: Option<ConfirmationPrompt>,
        trace: &mut RunTrace,
    ) -> GateResult {
        let Some(prompt) = prompt else {
            trace.gates.push(GateRecord {
                gate,
                decision: GateDecision::auto_approved(),
            });
            return GateResult::Passed;
        };

        self.audit
            .log(OrderAuditEvent::ConfirmationRequested { gate })
            .await;

        match self.surface.confirm(prompt).await {
            Ok(approved) => {
                tracing::debug!(
                    target: "tideway_account::order",
                    gate = %gate,
                    approved,
                    "confirmation answered"
                );
                self.audit
                    .log(OrderAuditEvent::ConfirmationAnswered { gate, approved })
                    .await;
                trace.gates.push(GateRecord {
                    gate,
                    decision: GateDecision::from_user(approved),
                });
                if approved {
                    GateResult::Passed
                } else {
                    GateResult::Stopped(match gate {
                        GateKind::PlanChange => AbortReason::ChangeDeclined,
                        GateKind::TrafficDepletion => AbortReason::DepletionDeclined,
                    })
                }
            }
            Err(_) => {
                tracing::debug!(
                    target: "tideway_account::order",
                    gate = %gate,
                    "confirmation abandoned"
                );
                self.audit
                    .log(OrderAuditEvent::ConfirmationAbandoned { gate })
                    .await;
                GateResult::Stopped(AbortReason::ConfirmationAbandoned(gate))
            }
        }
    }

    async fn fail(&self, stage: &str, err: OrderError) -> OrderError {
        tracing::warn!(
            target: "tideway_account::order",
            stage,
            error = %err,
            retryable = err.is_retryable(),
            "order submission failed"
        );
        self.audit
            .log(OrderAuditEvent::OrderFailed {
                stage: stage.to_string(),
                error: err.to_string(),
            })
            .await;
        err
    }
}

fn change_prompt(
    current: &SubscriptionClassification,
    plan: &Plan,
    price: &PlanPrice,
) -> ConfirmationPrompt {
    ConfirmationPrompt::PlanChange {
        current_plan_id: current.plan_id.clone(),
        current_status: current.status,
        new_plan_id: plan.id.clone(),
        new_plan_name: plan.name.clone(),
        new_price_kind: price.kind,
    }
}

fn depletion_prompt(current: &SubscriptionClassification, plan: &Plan) -> ConfirmationPrompt {
    ConfirmationPrompt::TrafficDepletion {
        current_plan_id: current.plan_id.clone(),
        new_plan_id: plan.id.clone(),
        new_plan_name: plan.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PriceKind;
    use crate::order::audit::test::RecordingAuditLogger;
    use crate::order::client::test::{MockOrderClient, unpaid_order};
    use crate::order::decision::test::ScriptedConfirmationSurface;
    use crate::subscription::{DecisionSource, SubscriptionStatus};

    fn catalog() -> Catalog {
        Catalog::builder()
            .plan("1", "Standard")
            .quota_gb(100)
            .periodic_price("11", 999, 30)
            .price("13", PriceKind::PeriodicReset, 300)
            .done()
            .plan("2", "Traffic Pack")
            .quota_gb(50)
            .price("21", PriceKind::OneTimePackage, 500)
            .done()
            .build()
    }

    fn periodic(plan_id: &str, depleted: bool) -> SubscriptionClassification {
        SubscriptionClassification {
            status: SubscriptionStatus::ServiceActive,
            plan_id: Some(plan_id.to_string()),
            is_one_time: false,
            is_periodic: true,
            is_depleted: depleted,
            is_expired: false,
            is_available: !depleted,
        }
    }

    #[test]
    fn test_transition_table() {
        use WorkflowState::*;
        assert!(Idle.can_transition_to(CheckingUnpaidOrder));
        assert!(Creating.can_transition_to(Succeeded));
        assert!(ConfirmingChange.can_transition_to(Aborted));
        assert!(!Idle.can_transition_to(Creating));
        assert!(!Idle.can_transition_to(Aborted));
        assert!(!ConfirmingChange.can_transition_to(Succeeded));
        assert!(!Succeeded.can_transition_to(Aborted));
        assert!(Aborted.is_terminal());
        assert!(!Creating.is_terminal());
    }

    #[tokio::test]
    async fn test_renewal_of_same_plan_skips_both_gates() {
        let client = MockOrderClient::new();
        let surface = ScriptedConfirmationSurface::new([]);
        let workflow = OrderWorkflow::new(client.clone(), surface.clone());

        let run = workflow
            .submit(&periodic("1", false), &catalog(), OrderSubmission::new("1", "11"))
            .await
            .unwrap();

        assert_eq!(run.outcome, WorkflowOutcome::Succeeded(TradeId("trade_test_0".into())));
        assert_eq!(
            run.transitions,
            vec![
                WorkflowState::Idle,
                WorkflowState::CheckingUnpaidOrder,
                WorkflowState::ConfirmingChange,
                WorkflowState::ConfirmingDepletion,
                WorkflowState::Creating,
                WorkflowState::Succeeded,
            ]
        );
        assert!(surface.prompts().is_empty());
        assert_eq!(
            run.decision(GateKind::PlanChange).map(|d| d.source),
            Some(DecisionSource::Automatic)
        );
        assert_eq!(client.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_unpaid_order_blocks_creation() {
        let client = MockOrderClient::new().with_unpaid_order(unpaid_order("T100", "1"));
        let surface = ScriptedConfirmationSurface::approving();
        let workflow = OrderWorkflow::new(client.clone(), surface.clone());

        let run = workflow
            .submit(&periodic("1", false), &catalog(), OrderSubmission::new("2", "21"))
            .await
            .unwrap();

        match &run.outcome {
            WorkflowOutcome::Aborted(AbortReason::UnpaidOrderExists(order)) => {
                assert_eq!(order.trade_no, "T100");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(run.state(), WorkflowState::Aborted);
        assert_eq!(client.create_calls(), 0);
        assert!(surface.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_declined_change_never_creates() {
        let client = MockOrderClient::new();
        let surface = ScriptedConfirmationSurface::new([Some(false)]);
        let workflow = OrderWorkflow::new(client.clone(), surface.clone());

        let run = workflow
            .submit(&periodic("1", true), &catalog(), OrderSubmission::new("2", "21"))
            .await
            .unwrap();

        assert_eq!(run.outcome, WorkflowOutcome::Aborted(AbortReason::ChangeDeclined));
        assert_eq!(surface.prompts().len(), 1);
        assert_eq!(surface.prompts()[0].gate(), GateKind::PlanChange);
        assert_eq!(run.decision(GateKind::TrafficDepletion), None);
        assert_eq!(client.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_approved_change_evaluates_depletion_gate() {
        let client = MockOrderClient::new();
        let surface = ScriptedConfirmationSurface::new([Some(true), Some(false)]);
        let workflow = OrderWorkflow::new(client.clone(), surface.clone());

        let run = workflow
            .submit(&periodic("1", true), &catalog(), OrderSubmission::new("2", "21"))
            .await
            .unwrap();

        assert_eq!(run.outcome, WorkflowOutcome::Aborted(AbortReason::DepletionDeclined));
        let gates: Vec<_> = surface.prompts().iter().map(ConfirmationPrompt::gate).collect();
        assert_eq!(gates, vec![GateKind::PlanChange, GateKind::TrafficDepletion]);
        assert_eq!(
            run.decision(GateKind::PlanChange),
            Some(GateDecision::from_user(true))
        );
        assert_eq!(client.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_both_gates_approved_creates_order() {
        let client = MockOrderClient::new();
        let surface = ScriptedConfirmationSurface::approving();
        let workflow = OrderWorkflow::new(client.clone(), surface.clone());

        let run = workflow
            .submit(
                &periodic("1", true),
                &catalog(),
                OrderSubmission::new("2", "21").with_coupon(" SPRING "),
            )
            .await
            .unwrap();

        assert!(run.outcome.is_success());
        assert_eq!(surface.prompts().len(), 2);
        assert_eq!(
            client.drafts(),
            vec![OrderDraft {
                plan_id: "2".to_string(),
                price_id: "21".to_string(),
                coupon_code: Some("SPRING".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_abandoned_confirmation_aborts() {
        let client = MockOrderClient::new();
        let surface = ScriptedConfirmationSurface::new([None]);
        let workflow = OrderWorkflow::new(client.clone(), surface);

        let run = workflow
            .submit(&periodic("1", false), &catalog(), OrderSubmission::new("2", "21"))
            .await
            .unwrap();

        assert_eq!(
            run.outcome,
            WorkflowOutcome::Aborted(AbortReason::ConfirmationAbandoned(GateKind::PlanChange))
        );
        assert!(run.gates.is_empty());
        assert_eq!(client.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_error_is_not_an_unpaid_order() {
        let lookup_error = OrderError::UnpaidOrderLookup {
            message: "timeout".to_string(),
            http_status: None,
        };
        let client = MockOrderClient::new().with_lookup_error(lookup_error.clone());
        let workflow = OrderWorkflow::new(client.clone(), ScriptedConfirmationSurface::approving());

        let err = workflow
            .submit(&periodic("1", false), &catalog(), OrderSubmission::new("1", "11"))
            .await
            .unwrap_err();

        assert_eq!(err, lookup_error);
        assert_eq!(client.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_is_surfaced_without_retry() {
        let create_error = OrderError::CreateFailed {
            message: "coupon expired".to_string(),
            code: Some("coupon_invalid".to_string()),
            http_status: Some(422),
        };
        let client = MockOrderClient::new().with_create_error(create_error.clone());
        let logger = RecordingAuditLogger::new();
        let workflow = OrderWorkflow::new(client.clone(), ScriptedConfirmationSurface::approving())
            .with_audit_logger(logger.clone());

        let err = workflow
            .submit(&periodic("1", false), &catalog(), OrderSubmission::new("1", "11"))
            .await
            .unwrap_err();

        assert_eq!(err, create_error);
        assert_eq!(client.create_calls(), 1);
        assert!(matches!(
            logger.events().last(),
            Some(OrderAuditEvent::OrderFailed { stage, .. }) if stage == "create_order"
        ));
    }

    #[tokio::test]
    async fn test_invalid_submission_calls_nothing() {
        let client = MockOrderClient::new();
        let workflow = OrderWorkflow::new(client.clone(), ScriptedConfirmationSurface::approving());
        let current = periodic("1", false);

        let err = workflow
            .submit(&current, &catalog(), OrderSubmission::new("9", "91"))
            .await
            .unwrap_err();
        assert_eq!(err, OrderError::PlanNotFound { plan_id: "9".to_string() });

        let err = workflow
            .submit(&current, &catalog(), OrderSubmission::new("1", "21"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::PriceNotFound { .. }));

        let err = workflow
            .submit(&current, &catalog(), OrderSubmission::new("1", "11").with_coupon("50% OFF"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidSubmission { .. }));

        assert_eq!(client.lookup_calls(), 0);
        assert_eq!(client.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_new_user_is_never_prompted() {
        let client = MockOrderClient::new();
        let surface = ScriptedConfirmationSurface::new([]);
        let workflow = OrderWorkflow::new(client.clone(), surface.clone());

        let run = workflow
            .submit(
                &SubscriptionClassification::none(),
                &catalog(),
                OrderSubmission::new("2", "21"),
            )
            .await
            .unwrap();

        assert!(run.outcome.is_success());
        assert!(surface.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_audit_trail_for_declined_run() {
        let logger = RecordingAuditLogger::new();
        let workflow = OrderWorkflow::new(
            MockOrderClient::new(),
            ScriptedConfirmationSurface::new([Some(false)]),
        )
        .with_audit_logger(logger.clone());

        workflow
            .submit(&periodic("1", false), &catalog(), OrderSubmission::new("2", "21"))
            .await
            .unwrap();

        assert_eq!(
            logger.events(),
            vec![
                OrderAuditEvent::SubmissionStarted {
                    plan_id: "2".to_string(),
                    price_id: "21".to_string(),
                },
                OrderAuditEvent::ConfirmationRequested { gate: GateKind::PlanChange },
                OrderAuditEvent::ConfirmationAnswered {
                    gate: GateKind::PlanChange,
                    approved: false,
                },
            ]
        );
    }
}
