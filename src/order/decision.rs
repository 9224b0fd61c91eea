//! Suspending the order workflow until the user answers a confirmation.
//!
//! [`DecisionBridge`] is a one-shot handle: the workflow calls
//! [`request_decision`](DecisionBridge::request_decision) and awaits the
//! returned [`PendingDecision`], and the UI calls
//! [`resolve`](DecisionBridge::resolve) from its confirm/cancel buttons.
//!
//! There is no timeout. Tearing the UI down must go through
//! [`cancel`](DecisionBridge::cancel) or drop the bridge; either settles the
//! pending decision as abandoned, which the workflow treats as an abort.
//!
//! ```rust
//! use std::sync::Arc;
//! use tideway_account::order::DecisionBridge;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bridge = Arc::new(DecisionBridge::new());
//! let pending = bridge.request_decision().unwrap();
//!
//! let ui = Arc::clone(&bridge);
//! tokio::spawn(async move {
//!     ui.resolve(true);
//! });
//!
//! assert_eq!(pending.decision().await, Ok(true));
//! # }
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};

use super::error::OrderError;
use crate::catalog::PriceKind;
use crate::subscription::{GateKind, SubscriptionStatus};

/// The decision was never made: the UI cancelled or went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Confirmation abandoned before the user answered")]
pub struct DecisionAbandoned;

/// One-shot bridge between a waiting workflow and a UI action.
#[derive(Debug, Default)]
pub struct DecisionBridge {
    pending: Mutex<Option<oneshot::Sender<bool>>>,
}

impl DecisionBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a decision request.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::DecisionAlreadyPending` while an earlier request
    /// is still waiting for an answer. A request whose [`PendingDecision`]
    /// was dropped no longer counts.
    pub fn request_decision(&self) -> Result<PendingDecision, OrderError> {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(OrderError::DecisionAlreadyPending);
        }

        let (tx, rx) = oneshot::channel();
        *slot = Some(tx);
        Ok(PendingDecision { rx })
    }

    /// Answer the outstanding request.
    ///
    /// Returns `false` if nothing was waiting, including a second call for
    /// the same request.
    pub fn resolve(&self, approved: bool) -> bool {
        match self.slot().take() {
            Some(tx) => tx.send(approved).is_ok(),
            None => false,
        }
    }

    /// Abandon the outstanding request without an answer.
    ///
    /// Returns `true` if a request was waiting.
    pub fn cancel(&self) -> bool {
        self.slot().take().is_some_and(|tx| !tx.is_closed())
    }

    /// Whether a request is waiting for an answer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot().as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn slot(&self) -> MutexGuard<'_, Option<oneshot::Sender<bool>>> {
        // The slot holds no invariant a panicking holder could break.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The waiting side of a decision request.
#[derive(Debug)]
#[must_use = "a decision does nothing unless awaited"]
pub struct PendingDecision {
    rx: oneshot::Receiver<bool>,
}

impl PendingDecision {
    /// Wait for the user's answer.
    ///
    /// # Errors
    ///
    /// Returns `DecisionAbandoned` if the bridge was cancelled or dropped.
    pub async fn decision(self) -> Result<bool, DecisionAbandoned> {
        self.rx.await.map_err(|_| DecisionAbandoned)
    }
}

/// What the user is being asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfirmationPrompt {
    /// The selection changes the plan or its one-time/periodic nature.
    PlanChange {
        current_plan_id: Option<String>,
        current_status: SubscriptionStatus,
        new_plan_id: String,
        new_plan_name: String,
        new_price_kind: PriceKind,
    },
    /// A one-time package is being bought while the periodic plan is out of traffic.
    TrafficDepletion {
        current_plan_id: Option<String>,
        new_plan_id: String,
        new_plan_name: String,
    },
}

impl ConfirmationPrompt {
    /// The gate asking the question.
    #[must_use]
    pub fn gate(&self) -> GateKind {
        match self {
            Self::PlanChange { .. } => GateKind::PlanChange,
            Self::TrafficDepletion { .. } => GateKind::TrafficDepletion,
        }
    }
}

/// The UI confirmation surface.
///
/// Implementations present the prompt (typically a modal) and answer with
/// the user's choice.
#[async_trait]
pub trait ConfirmationSurface: Send + Sync {
    /// Ask the user to confirm.
    ///
    /// # Errors
    ///
    /// Returns `DecisionAbandoned` if the surface went away before answering.
    async fn confirm(&self, prompt: ConfirmationPrompt) -> Result<bool, DecisionAbandoned>;
}

/// A confirmation handed to the UI loop.
///
/// Dropping it without answering abandons the decision.
#[derive(Debug)]
pub struct ConfirmationRequest {
    pub prompt: ConfirmationPrompt,
    bridge: Arc<DecisionBridge>,
}

impl ConfirmationRequest {
    pub fn approve(self) -> bool {
        self.bridge.resolve(true)
    }

    pub fn decline(self) -> bool {
        self.bridge.resolve(false)
    }

    pub fn resolve(self, approved: bool) -> bool {
        self.bridge.resolve(approved)
    }

    /// A handle that can answer the request later, e.g. from a button callback.
    #[must_use]
    pub fn bridge(&self) -> Arc<DecisionBridge> {
        Arc::clone(&self.bridge)
    }
}

/// Confirmation surface that forwards prompts to a UI loop over a channel.
///
/// Each prompt gets its own [`DecisionBridge`], so a gate never has more
/// than one outstanding request.
#[derive(Debug, Clone)]
pub struct ChannelConfirmationSurface {
    tx: mpsc::Sender<ConfirmationRequest>,
}

impl ChannelConfirmationSurface {
    /// Create the surface and the receiver the UI loop reads from.
    #[must_use]
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<ConfirmationRequest>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ConfirmationSurface for ChannelConfirmationSurface {
    async fn confirm(&self, prompt: ConfirmationPrompt) -> Result<bool, DecisionAbandoned> {
        let bridge = Arc::new(DecisionBridge::new());
        let pending = bridge.request_decision().map_err(|_| DecisionAbandoned)?;

        self.tx
            .send(ConfirmationRequest { prompt, bridge })
            .await
            .map_err(|_| DecisionAbandoned)?;

        pending.decision().await
    }
}

/// Scripted confirmation surface for testing.
#[cfg(any(test, feature = "test-orders"))]
pub mod test {
    use super::*;
    use std::collections::VecDeque;

    /// Answers prompts from a script and records what was asked.
    ///
    /// `None` in the script abandons that decision. An exhausted script
    /// abandons every further prompt.
    #[derive(Debug, Default, Clone)]
    pub struct ScriptedConfirmationSurface {
        answers: Arc<Mutex<VecDeque<Option<bool>>>>,
        prompts: Arc<Mutex<Vec<ConfirmationPrompt>>>,
    }

    impl ScriptedConfirmationSurface {
        #[must_use]
        pub fn new<I>(answers: I) -> Self
        where
            I: IntoIterator<Item = Option<bool>>,
        {
            Self {
                answers: Arc::new(Mutex::new(answers.into_iter().collect())),
                prompts: Arc::default(),
            }
        }

        /// Approve every prompt.
        #[must_use]
        pub fn approving() -> Self {
            Self::new(std::iter::repeat_n(Some(true), 8))
        }

        /// Every prompt shown so far.
        pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConfirmationSurface for ScriptedConfirmationSurface {
        async fn confirm(&self, prompt: ConfirmationPrompt) -> Result<bool, DecisionAbandoned> {
            self.prompts.lock().unwrap().push(prompt);
            let answer = self.answers.lock().unwrap().pop_front().flatten();
            answer.ok_or(DecisionAbandoned)
        }
    }
}
