//! Client for the outbound message-send provider.
//!
//! One call carries one message to the listed recipients. The provider's
//! answer is reduced to [`SendOutcome`]; only transport problems and missing
//! configuration surface as [`SendError`].

use crate::config::MessagingSettings;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: Vec<String>,
    pub title: String,
    pub message: String,
}

/// What the provider said about one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The provider answered but did not accept the message.
    Refused(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("message sending is not configured: {0} is missing")]
    NotConfigured(&'static str),
    #[error("send request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<SendOutcome, SendError>;

    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Serialize)]
struct SendPayload<'a> {
    to: &'a [String],
    title: &'a str,
    source: &'a str,
    app_url: &'a str,
    messages: &'a str,
}

#[derive(Clone)]
pub struct HttpMessageSender {
    http: Client,
    url: Option<String>,
    api_key: Option<Secret<String>>,
    source: String,
    app_url: String,
}

impl HttpMessageSender {
    pub fn new(settings: &MessagingSettings) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(settings.timeout()).build()?,
            url: settings.send_url.clone(),
            api_key: settings.api_key.clone(),
            source: settings.source.clone(),
            app_url: settings.app_url.clone(),
        })
    }
}

#[async_trait]
impl MessageSender for HttpMessageSender {
    async fn send(&self, message: &OutboundMessage) -> Result<SendOutcome, SendError> {
        if message.to.iter().all(|to| to.trim().is_empty()) {
            return Ok(SendOutcome::Refused("recipient is required".to_string()));
        }
        if message.message.trim().is_empty() {
            return Ok(SendOutcome::Refused("message is required".to_string()));
        }

        let url = self.url.as_deref().ok_or(SendError::NotConfigured("messaging.send_url"))?;
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(SendError::NotConfigured("messaging.api_key"))?;

        let response = self
            .http
            .post(url)
            .header("x-api-key", api_key.expose_secret())
            .json(&SendPayload {
                to: &message.to,
                title: &message.title,
                source: &self.source,
                app_url: &self.app_url,
                messages: &message.message,
            })
            .send()
            .await?;

        let status = response.status();
        let body: Option<Value> = response.json().await.ok();

        if !status.is_success() {
            log::error!("send provider returned {}: {:?}", status, body);
            return Ok(SendOutcome::Refused(format!("API error: {}", status.as_u16())));
        }

        match body.as_ref().and_then(|b| b.get("success")) {
            Some(Value::Bool(false)) => {
                let reason = body
                    .as_ref()
                    .and_then(|b| b.get("error"))
                    .and_then(Value::as_str)
                    .unwrap_or("send failed");
                Ok(SendOutcome::Refused(reason.to_string()))
            }
            _ => Ok(SendOutcome::Delivered),
        }
    }

    fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some()
    }
}
