use std::fmt;

use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::errors::StoreError;

pub type GymResult<T> = Result<T, GymError>;

/// Why an admission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInBlockReason {
    PaymentIncomplete,
    SubscriptionInactive,
}

impl CheckInBlockReason {
    /// Stable reason code.
    pub fn code(self) -> &'static str {
        match self {
            CheckInBlockReason::PaymentIncomplete => "payment_incomplete",
            CheckInBlockReason::SubscriptionInactive => "subscription_inactive",
        }
    }

    fn message(self) -> &'static str {
        match self {
            CheckInBlockReason::PaymentIncomplete => "member has an incomplete payment",
            CheckInBlockReason::SubscriptionInactive => "member subscription is overdue",
        }
    }
}

impl fmt::Display for CheckInBlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// Failures surfaced by the membership ledger engine.
#[derive(Debug, Error)]
pub enum GymError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Check-in blocked: {0}")]
    CheckInBlocked(CheckInBlockReason),
    #[error("Record store operation failed")]
    Store(#[source] StoreError),
}

impl GymError {
    pub fn validation(message: impl Into<String>) -> Self {
        GymError::Validation(message.into())
    }

    pub fn member_not_found(id: Uuid) -> Self {
        GymError::NotFound {
            entity: "Member",
            id,
        }
    }

    pub fn payment_not_found(id: Uuid) -> Self {
        GymError::NotFound {
            entity: "Payment",
            id,
        }
    }
}

impl From<StoreError> for GymError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "record store failure");
        GymError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_message_carries_reason_code() {
        let err = GymError::CheckInBlocked(CheckInBlockReason::PaymentIncomplete);
        let message = err.to_string();
        assert!(message.contains("payment_incomplete"), "{message}");
    }

    #[test]
    fn store_errors_are_reported_generically() {
        let err: GymError = StoreError::Unavailable("quota exceeded".into()).into();
        assert_eq!(err.to_string(), "Record store operation failed");
        let source = std::error::Error::source(&err).expect("source kept");
        assert!(source.to_string().contains("quota exceeded"));
    }
}
