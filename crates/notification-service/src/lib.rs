mod smtp;
mod webhook;

pub use smtp::SmtpNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;

/// A report being pushed out. The subject is the report's first line.
#[derive(Debug, Clone)]
pub struct ReportMessage {
    pub subject: String,
    pub body: String,
}

impl ReportMessage {
    pub fn from_text(text: impl Into<String>) -> Self {
        let body = text.into();
        let subject = body.lines().next().unwrap_or("Analysis report").to_string();
        Self { subject, body }
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, message: &ReportMessage) -> Result<(), NotificationError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system. These never escape
/// `NotificationService::dispatch`; they exist so channels can report what
/// went wrong to the log.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Webhook error: {0}")]
    Webhook(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for the notification service.
#[derive(Debug, Clone, Default)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: Option<String>,
    pub email_to: Vec<String>,
}

impl NotificationConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let email_to = std::env::var("EMAIL_TO")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok().filter(|s| !s.is_empty()),
            smtp_host: std::env::var("SMTP_HOST").ok().filter(|s| !s.is_empty()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USER").ok().filter(|s| !s.is_empty()),
            smtp_password: std::env::var("SMTP_PASS").ok().filter(|s| !s.is_empty()),
            email_from: std::env::var("EMAIL_FROM").ok().filter(|s| !s.is_empty()),
            email_to,
        }
    }
}

/// What a dispatch attempt actually delivered. Transport failures are
/// observable here and in the log, never as errors raised to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchOutcome {
    pub fn delivered(&self) -> bool {
        self.sent > 0
    }
}

/// Dispatches reports to every configured channel, best-effort.
pub struct NotificationService {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationService {
    pub fn new(config: &NotificationConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if let Some(ref url) = config.webhook_url {
            channels.push(Box::new(WebhookNotifier::new(url.clone())));
            tracing::info!("Webhook notifications enabled");
        }

        if config.smtp_host.is_some() && config.email_from.is_some() && !config.email_to.is_empty()
        {
            match SmtpNotifier::new(config) {
                Ok(notifier) => {
                    tracing::info!(
                        "Email notifications enabled (SMTP -> {} recipients)",
                        config.email_to.len()
                    );
                    channels.push(Box::new(notifier));
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize SMTP notifier: {}", e);
                }
            }
        }

        if channels.is_empty() {
            tracing::info!("No notification channels configured (set SLACK_WEBHOOK_URL or SMTP_HOST)");
        }

        Self { channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send the report text to all configured channels. Never fails; with no
    /// channels configured this is a no-op reporting zero deliveries.
    pub async fn dispatch(&self, text: &str) -> DispatchOutcome {
        let message = ReportMessage::from_text(text);
        let mut outcome = DispatchOutcome::default();

        for channel in &self.channels {
            match channel.send(&message).await {
                Ok(()) => {
                    tracing::debug!("Sent notification via {}", channel.name());
                    outcome.sent += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to send notification via {}: {}", channel.name(), e);
                    outcome.failed += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_is_first_line() {
        let message = ReportMessage::from_text("Report for AAPL - 2026-08-05\nLast close: 189.71");
        assert_eq!(message.subject, "Report for AAPL - 2026-08-05");
        assert!(message.body.contains("Last close"));
    }

    #[test]
    fn test_unconfigured_service_has_no_channels() {
        let service = NotificationService::new(&NotificationConfig::default());
        assert_eq!(service.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_without_channels_sends_nothing() {
        let service = NotificationService::new(&NotificationConfig::default());
        let outcome = service.dispatch("Report for AAPL").await;
        assert!(!outcome.delivered());
        assert_eq!(outcome, DispatchOutcome { sent: 0, failed: 0 });
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let config = NotificationConfig {
            webhook_url: Some("http://127.0.0.1:9/hook".to_string()),
            ..NotificationConfig::default()
        };
        let service = NotificationService::new(&config);
        assert_eq!(service.channel_count(), 1);

        let outcome = service.dispatch("Report for AAPL").await;
        assert_eq!(outcome.sent, 0);
        assert_eq!(outcome.failed, 1);
    }
}
