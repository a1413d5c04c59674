use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use crate::external::{EmailMessage, EmailSender};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const BREVO_SEND_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    html_content: String,
}

#[derive(Clone)]
pub struct BrevoEmailService {
    client: Client,
    config: EmailConfig,
}

impl BrevoEmailService {
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent("aula-backend/email")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn body_for(&self, message: &EmailMessage) -> BrevoSendEmailBody {
        BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.config.sender_email.clone(),
                name: Some(self.config.sender_name.clone()),
            },
            to: vec![BrevoEmailAddress {
                email: message.to.clone(),
                name: message.first_name.clone(),
            }],
            subject: message.kind.subject().to_string(),
            html_content: message.html_body(),
        }
    }
}

#[async_trait]
impl EmailSender for BrevoEmailService {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let response = self
            .client
            .post(BREVO_SEND_ENDPOINT)
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&self.body_for(message))
            .send()
            .await
            .map_err(|e| {
                log::error!("Brevo request failed for {}: {e}", message.to);
                AppError::ExternalApiError("Failed to send email".to_string())
            })?;

        if response.status().is_success() {
            log::info!("{:?} email sent to {}", message.kind, message.to);
            Ok(())
        } else {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Brevo send failed (status={status}) for {}: {error_text}", message.to);
            Err(AppError::ExternalApiError("Failed to send email".to_string()))
        }
    }
}
