//! Price kinds offered by the backend catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What buying a price does to the user's subscription.
///
/// The backend encodes this as a small integer. Only the four documented
/// codes are accepted; anything else fails to deserialise rather than being
/// guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PriceKind {
    /// Renews or starts a periodic (expiring) subscription.
    PeriodicRenewal,
    /// One-time traffic package with no expiry.
    OneTimePackage,
    /// Resets the traffic counter of the current periodic subscription.
    PeriodicReset,
    /// Temporary traffic top-up on top of the current subscription.
    TemporaryTopUp,
}

impl PriceKind {
    /// Wire code used by the backend.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::PeriodicRenewal => 1,
            Self::OneTimePackage => 2,
            Self::PeriodicReset => 3,
            Self::TemporaryTopUp => 4,
        }
    }

    /// Parse a backend wire code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::PeriodicRenewal),
            2 => Some(Self::OneTimePackage),
            3 => Some(Self::PeriodicReset),
            4 => Some(Self::TemporaryTopUp),
            _ => None,
        }
    }

    /// Whether buying this price results in a one-time ("package") subscription.
    #[must_use]
    pub fn is_one_time(self) -> bool {
        matches!(self, Self::OneTimePackage)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PeriodicRenewal => "periodic_renewal",
            Self::OneTimePackage => "one_time_package",
            Self::PeriodicReset => "periodic_reset",
            Self::TemporaryTopUp => "temporary_top_up",
        }
    }
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for price codes outside the documented set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unknown price kind code: {0}")]
pub struct UnknownPriceKind(pub u8);

impl TryFrom<u8> for PriceKind {
    type Error = UnknownPriceKind;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(UnknownPriceKind(code))
    }
}

impl From<PriceKind> for u8 {
    fn from(kind: PriceKind) -> Self {
        kind.code()
    }
}
