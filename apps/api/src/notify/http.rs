//! Templated transactional-email backend (MailerSend-compatible JSON API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MailApiConfig;
use crate::notify::{DeliveryReceipt, Notifier, NotifyError, Recipient, WelcomeMessage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MESSAGE_ID_HEADER: &str = "x-message-id";

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct TemplateData<'a> {
    emp_id: &'a str,
    name: &'a str,
    password: &'a str,
    company: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    email: &'a str,
    data: TemplateData<'a>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    subject: String,
    template_id: &'a str,
    personalization: Vec<Personalization<'a>>,
}

pub struct HttpEmailNotifier {
    client: Client,
    api: MailApiConfig,
    sender_email: String,
    sender_name: String,
}

impl HttpEmailNotifier {
    pub fn new(
        api: MailApiConfig,
        sender_email: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api,
            sender_email: sender_email.into(),
            sender_name: sender_name.into(),
        })
    }

    fn request_body<'a>(
        &'a self,
        to: &'a Recipient,
        message: &'a WelcomeMessage,
    ) -> SendRequest<'a> {
        SendRequest {
            from: Address {
                email: &self.sender_email,
                name: &self.sender_name,
            },
            to: vec![Address {
                email: &to.email,
                name: &to.name,
            }],
            subject: format!("Your New {} Account Credentials", message.company),
            template_id: &self.api.template_id,
            personalization: vec![Personalization {
                email: &to.email,
                data: TemplateData {
                    emp_id: &message.employee_id,
                    name: &message.name,
                    password: &message.temporary_password,
                    company: &message.company,
                },
            }],
        }
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send(
        &self,
        to: &Recipient,
        message: &WelcomeMessage,
    ) -> Result<DeliveryReceipt, NotifyError> {
        let response = self
            .client
            .post(&self.api.api_url)
            .bearer_auth(&self.api.api_key)
            .json(&self.request_body(to, message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Mail API returned {status} for {}", to.email);
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let detail = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|id| format!("message_id={id}"))
            .unwrap_or_else(|| format!("accepted ({status})"));
        debug!("Welcome email accepted for {}: {detail}", to.email);

        Ok(DeliveryReceipt { detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_matches_template_api_shape() {
        let notifier = HttpEmailNotifier::new(
            MailApiConfig {
                api_url: "https://mail.example.com/v1/email".to_string(),
                api_key: "key".to_string(),
                template_id: "tpl-1".to_string(),
            },
            "training@example.com",
            "Pathfinder Training",
        )
        .unwrap();
        let to = Recipient {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
        };
        let message = WelcomeMessage {
            name: "Jane Doe".to_string(),
            employee_id: "MAV-0007".to_string(),
            temporary_password: "Xy7!Kp2@mQ9z".to_string(),
            company: "Maverick Pathfinder".to_string(),
        };

        let body = serde_json::to_value(notifier.request_body(&to, &message)).unwrap();
        assert_eq!(
            body,
            json!({
                "from": {"email": "training@example.com", "name": "Pathfinder Training"},
                "to": [{"email": "jane@x.com", "name": "Jane Doe"}],
                "subject": "Your New Maverick Pathfinder Account Credentials",
                "template_id": "tpl-1",
                "personalization": [{
                    "email": "jane@x.com",
                    "data": {
                        "emp_id": "MAV-0007",
                        "name": "Jane Doe",
                        "password": "Xy7!Kp2@mQ9z",
                        "company": "Maverick Pathfinder"
                    }
                }]
            })
        );
    }
}
