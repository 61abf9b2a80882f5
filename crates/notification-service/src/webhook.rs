use async_trait::async_trait;

use crate::{NotificationChannel, NotificationError, ReportMessage};

/// Posts the report text as a Slack-compatible `{"text": ...}` payload.
pub struct WebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookNotifier {
    async fn send(&self, message: &ReportMessage) -> Result<(), NotificationError> {
        let payload = serde_json::json!({ "text": message.body });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Webhook(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Webhook(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
