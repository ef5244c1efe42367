use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    use_cases::auth::EmailSender,
};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers transactional mail through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendEmailSender {
    client: Client,
    api_key: SecretString,
    from: String,
}

impl ResendEmailSender {
    pub fn new(api_key: SecretString, from: String) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self { client, api_key, from })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let request = SendRequest { from: &self.from, to: [to], subject, html };
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("email delivery failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Internal(format!("email provider returned {status}")));
        }

        let accepted: SendResponse =
            response.json().await.map_err(|e| AppError::Internal(e.to_string()))?;
        tracing::debug!(message_id = %accepted.id, "email accepted by provider");

        Ok(())
    }
}
