//! Input validation for order submissions.
//!
//! Runs before any collaborator is called, so a malformed submission never
//! reaches the API.

use super::error::OrderError;

/// Maximum length for plan and price IDs.
const MAX_ID_LENGTH: usize = 64;

/// Maximum length for coupon codes.
const MAX_COUPON_LENGTH: usize = 32;

/// Validate a plan or price identifier.
///
/// IDs must be non-empty, at most 64 characters, and contain only
/// alphanumeric characters, underscores, and hyphens.
///
/// # Errors
///
/// Returns `OrderError::InvalidSubmission` naming `field`.
pub fn validate_id(field: &str, id: &str) -> Result<(), OrderError> {
    if id.is_empty() {
        return Err(invalid(field, format!("{} cannot be empty", field)));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(invalid(
            field,
            format!("{} exceeds maximum length of {}", field, MAX_ID_LENGTH),
        ));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(invalid(
            field,
            format!("{} contains invalid characters", field),
        ));
    }

    Ok(())
}

/// Normalise an optional coupon code.
///
/// Surrounding whitespace is trimmed and a blank code counts as no coupon.
///
/// # Errors
///
/// Returns `OrderError::InvalidSubmission` if the code is too long or
/// contains anything but ASCII letters, digits, underscores, and hyphens.
pub fn normalize_coupon(code: Option<&str>) -> Result<Option<String>, OrderError> {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    if code.len() > MAX_COUPON_LENGTH {
        return Err(invalid(
            "coupon_code",
            format!("coupon_code exceeds maximum length of {}", MAX_COUPON_LENGTH),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(invalid("coupon_code", "coupon_code contains invalid characters".to_string()));
    }

    Ok(Some(code.to_string()))
}

fn invalid(field: &str, reason: String) -> OrderError {
    OrderError::InvalidSubmission {
        field: field.to_string(),
        reason,
    }
}
