//! Welcome-message delivery for newly created trainee accounts.
//!
//! Backends are interchangeable `Notifier` implementations chosen in `main`.
//! A delivery failure is reported to the caller and never rolls back the
//! account it was sent for.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod http;
pub mod log;

pub use self::http::HttpEmailNotifier;
pub use self::log::LogNotifier;

#[derive(Debug, Clone)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// Template data for the welcome message. Carries the plaintext temporary
/// password, so it is never logged or serialized into API responses.
#[derive(Debug, Clone)]
pub struct WelcomeMessage {
    pub name: String,
    pub employee_id: String,
    pub temporary_password: String,
    pub company: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider message ID or a backend-specific note.
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail API rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        to: &Recipient,
        message: &WelcomeMessage,
    ) -> Result<DeliveryReceipt, NotifyError>;
}

/// Per-trainee delivery outcome as reported by the account endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOutcome {
    pub delivered: bool,
    pub detail: String,
}

impl From<Result<DeliveryReceipt, NotifyError>> for NotificationOutcome {
    fn from(result: Result<DeliveryReceipt, NotifyError>) -> Self {
        match result {
            Ok(receipt) => Self {
                delivered: true,
                detail: receipt.detail,
            },
            Err(e) => Self {
                delivered: false,
                detail: e.to_string(),
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_receipt() {
        let outcome = NotificationOutcome::from(Ok(DeliveryReceipt {
            detail: "msg-1".to_string(),
        }));
        assert!(outcome.delivered);
        assert_eq!(outcome.detail, "msg-1");
    }

    #[test]
    fn test_outcome_from_error_keeps_reason() {
        let outcome = NotificationOutcome::from(Err(NotifyError::Rejected {
            status: 422,
            message: "invalid recipient".to_string(),
        }));
        assert!(!outcome.delivered);
        assert!(outcome.detail.contains("422"));
        assert!(outcome.detail.contains("invalid recipient"));
    }
}
