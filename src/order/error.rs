//! Order-specific error types.
//!
//! A user declining a confirmation is not an error; it ends the workflow as
//! an aborted outcome. These errors cover invalid submissions and failures
//! of the order collaborators.

use std::fmt;

/// Order workflow errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    // Validation errors
    /// A submission field failed validation.
    InvalidSubmission { field: String, reason: String },
    /// The selected plan is not in the catalog.
    PlanNotFound { plan_id: String },
    /// The selected price does not belong to the plan.
    PriceNotFound { plan_id: String, price_id: String },

    // Decision errors
    /// A confirmation was requested while another is still outstanding.
    DecisionAlreadyPending,

    // Collaborator errors
    /// The unpaid-order lookup failed (distinct from finding an unpaid order).
    UnpaidOrderLookup {
        message: String,
        http_status: Option<u16>,
    },
    /// Order creation was rejected or failed.
    CreateFailed {
        message: String,
        code: Option<String>,
        http_status: Option<u16>,
    },

    /// An unexpected internal error occurred.
    Internal { message: String },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSubmission { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::PlanNotFound { plan_id } => {
                write!(f, "Plan not found: {}", plan_id)
            }
            Self::PriceNotFound { plan_id, price_id } => {
                write!(f, "Price '{}' not found on plan '{}'", price_id, plan_id)
            }
            Self::DecisionAlreadyPending => {
                write!(f, "A confirmation is already pending")
            }
            Self::UnpaidOrderLookup { message, http_status } => {
                write!(f, "Unpaid order lookup failed: {}", message)?;
                if let Some(status) = http_status {
                    write!(f, " [HTTP {}]", status)?;
                }
                Ok(())
            }
            Self::CreateFailed { message, code, http_status } => {
                write!(f, "Order creation failed: {}", message)?;
                if let Some(code) = code {
                    write!(f, " (code: {})", code)?;
                }
                if let Some(status) = http_status {
                    write!(f, " [HTTP {}]", status)?;
                }
                Ok(())
            }
            Self::Internal { message } => {
                write!(f, "Internal order error: {}", message)
            }
        }
    }
}

impl std::error::Error for OrderError {}

impl OrderError {
    /// Check if this error was caused by the submission itself.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidSubmission { .. }
            | Self::PlanNotFound { .. }
            | Self::PriceNotFound { .. }
            | Self::DecisionAlreadyPending => true,
            Self::UnpaidOrderLookup { http_status, .. } | Self::CreateFailed { http_status, .. } => {
                matches!(http_status, Some(400..=499))
            }
            Self::Internal { .. } => false,
        }
    }

    /// Check if the UI may offer a retry.
    ///
    /// The workflow itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UnpaidOrderLookup { http_status, .. } | Self::CreateFailed { http_status, .. } => {
                // Network failures (no status), rate limits, and server errors
                matches!(http_status, None | Some(429) | Some(500..=599))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrderError::PriceNotFound {
            plan_id: "1".to_string(),
            price_id: "99".to_string(),
        };
        assert_eq!(err.to_string(), "Price '99' not found on plan '1'");

        let err = OrderError::CreateFailed {
            message: "coupon expired".to_string(),
            code: Some("coupon_invalid".to_string()),
            http_status: Some(422),
        };
        assert_eq!(
            err.to_string(),
            "Order creation failed: coupon expired (code: coupon_invalid) [HTTP 422]"
        );
    }

    #[test]
    fn test_error_classification() {
        let err = OrderError::InvalidSubmission {
            field: "coupon_code".to_string(),
            reason: "too long".to_string(),
        };
        assert!(err.is_client_error());
        assert!(!err.is_retryable());

        let err = OrderError::UnpaidOrderLookup {
            message: "connection reset".to_string(),
            http_status: None,
        };
        assert!(!err.is_client_error());
        assert!(err.is_retryable());

        let err = OrderError::CreateFailed {
            message: "bad request".to_string(),
            code: None,
            http_status: Some(400),
        };
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
    }
}
