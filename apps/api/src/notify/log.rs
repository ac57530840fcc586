use async_trait::async_trait;
use tracing::info;

use crate::notify::{DeliveryReceipt, Notifier, NotifyError, Recipient, WelcomeMessage};

/// Development backend: records the delivery in the log instead of sending
/// mail. The temporary password is left out of the log line.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        to: &Recipient,
        message: &WelcomeMessage,
    ) -> Result<DeliveryReceipt, NotifyError> {
        info!(
            "Welcome message for {} <{}>: employee_id={}, company={}",
            to.name, to.email, message.employee_id, message.company
        );
        Ok(DeliveryReceipt {
            detail: "logged (no mail sent)".to_string(),
        })
    }
}
