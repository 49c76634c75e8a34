use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use crate::models::payload::DeliveryPayload;

/// The webhook is a spreadsheet script that expects JSON text declared as
/// plain text; receivers must tolerate this header.
const WEBHOOK_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// The single external sink all submissions are relayed to. One attempt per
/// call; the caller decides what a failure means.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError>;
}

/// Delivery channel backed by the spreadsheet webhook.
pub struct WebhookDelivery {
    http: Client,
    endpoint: String,
}

impl WebhookDelivery {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeliveryError::Http)?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl DeliveryChannel for WebhookDelivery {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        let body = serde_json::to_string(payload).map_err(DeliveryError::Serialize)?;

        debug!(kind = %payload.kind(), "posting submission to webhook");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, WEBHOOK_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(DeliveryError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Status(u16),

    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
