//! Outgoing email
//!
//! Delivery is not retried: a failed send is reported to the caller, which
//! decides how to undo its side effects.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{MailConfig, MailTransport};

#[derive(Debug, Clone, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Template name understood by the relay.
    pub template: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail relay unreachable: {0}")]
    Transport(String),

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Writes messages to the log instead of delivering them.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            template = %email.template,
            body = %email.body,
            "Email (log transport)"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    #[serde(flatten)]
    email: &'a Email,
}

/// POSTs each message as JSON to an HTTP mail relay.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    from: String,
    api_key: Option<Secret<String>>,
}

impl HttpMailer {
    pub fn new(endpoint: String, from: String, api_key: Option<Secret<String>>) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            from,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(&RelayPayload {
            from: &self.from,
            email,
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        tracing::debug!(to = %email.to, template = %email.template, "Email handed to relay");
        Ok(())
    }
}

/// 根据配置创建邮件发送器
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match config.transport {
        MailTransport::Log => Ok(Arc::new(LogMailer::new(config.from.clone()))),
        MailTransport::Http => {
            let endpoint = config
                .endpoint
                .clone()
                .ok_or_else(|| MailError::Transport("mail.endpoint not configured".to_string()))?;
            Ok(Arc::new(HttpMailer::new(
                endpoint,
                config.from.clone(),
                config.api_key.clone(),
            )?))
        }
    }
}
