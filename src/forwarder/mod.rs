//! Forwarder to the order spreadsheet webhook
//!
//! Sends `{ orderNumber, imageUrl }` to the configured endpoint and interprets
//! its `{ ok, error? }` reply. A single attempt is made per upload; the call is
//! bounded by a deadline and, optionally, by a cap on concurrent calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::ForwarderConfig;
use crate::logger;

/// Body sent to the webhook
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardPayload<'a> {
    pub order_number: &'a str,
    pub image_url: &'a str,
}

/// Body expected back from the webhook
#[derive(Debug, Deserialize)]
pub struct ForwardResult {
    pub ok: bool,
    /// Usually a string; other JSON values are relayed in their JSON form
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ForwardResult {
    /// Message to relay for a rejection, `None` when the endpoint gave a
    /// falsy one (absent, null, `false`, `0` or `""`)
    pub fn rejection_message(self) -> Option<String> {
        match self.error? {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::Number(n) if n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON) => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// What the webhook decided about the order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    Accepted,
    /// The endpoint answered `ok: false`; carries its message if it gave one
    Rejected(Option<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("timeout of {0}s exceeded")]
    Timeout(u64),
    #[error("Request failed with status code {0}")]
    Status(u16),
    #[error("Invalid response from forward endpoint: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    #[error("forward limiter closed")]
    LimiterClosed,
}

pub struct Forwarder {
    client: reqwest::Client,
    endpoint_url: String,
    timeout_secs: u64,
    limiter: Option<Semaphore>,
}

impl Forwarder {
    pub fn from_config(config: &ForwarderConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            timeout_secs: config.timeout_secs,
            limiter: config.max_in_flight.map(Semaphore::new),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Post one payload and classify the reply.
    ///
    /// Non-2xx statuses, unreadable bodies and replies without a boolean `ok`
    /// are errors, never rejections.
    pub async fn forward(&self, payload: &ForwardPayload<'_>) -> Result<ForwardOutcome, ForwardError> {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .acquire()
                    .await
                    .map_err(|_| ForwardError::LimiterClosed)?,
            ),
            None => None,
        };

        let response = self
            .client
            .post(&self.endpoint_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let result: ForwardResult = serde_json::from_slice(&body)?;

        if result.ok {
            Ok(ForwardOutcome::Accepted)
        } else {
            let message = result.rejection_message();
            logger::log_warning(&format!(
                "Forward endpoint rejected order {}: {}",
                payload.order_number,
                message.as_deref().unwrap_or("(no message)")
            ));
            Ok(ForwardOutcome::Rejected(message))
        }
    }

    fn classify(&self, err: reqwest::Error) -> ForwardError {
        if err.is_timeout() {
            ForwardError::Timeout(self.timeout_secs)
        } else {
            ForwardError::Transport(err)
        }
    }
}
