//! Outbound callback delivery.
//!
//! [`HttpCallbackSender`] POSTs a JSON payload to a callback URL exactly
//! once. Failures are returned to the caller (the scheduler), which only
//! logs them.

use std::time::Duration;

use async_trait::async_trait;

/// Default HTTP timeout for a single delivery.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed headers marking deliveries as synthetic test traffic.
pub const SYNTHETIC_HEADERS: [(&str, &str); 2] = [
    ("Dummy-Header", "happy-testing"),
    ("Qa-Api-Header", "happy-qa"),
];

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for callback delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Callback target returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

/// Something that can push a payload to a callback URL.
#[async_trait]
pub trait CallbackSender: Send + Sync + 'static {
    async fn send(&self, url: &str, payload: &serde_json::Value) -> Result<(), DeliveryError>;
}

/// Delivers callbacks over HTTP with `reqwest`.
pub struct HttpCallbackSender {
    client: reqwest::Client,
}

impl HttpCallbackSender {
    /// Build a sender whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CallbackSender for HttpCallbackSender {
    async fn send(&self, url: &str, payload: &serde_json::Value) -> Result<(), DeliveryError> {
        let mut request = self.client.post(url).json(payload);
        for (name, value) in SYNTHETIC_HEADERS {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
