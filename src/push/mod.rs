//! Push delivery transport.
//!
//! The transport is an opaque capability behind a trait so the scheduler can
//! be tested without a network. Delivery failures are classified as permanent
//! (the endpoint is gone, prune the subscription) or transient (leave the
//! subscription for the next pass).

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{PushPayload, Subscription};

/// Classified push delivery failure.
#[derive(Debug)]
pub enum DeliveryError {
    /// The endpoint no longer exists; the subscription should be pruned.
    Permanent(String),
    /// A retryable failure; not retried until the next scheduled pass.
    Transient(String),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::Permanent(msg) => write!(f, "permanent delivery failure: {}", msg),
            DeliveryError::Transient(msg) => write!(f, "transient delivery failure: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Best-effort delivery of a payload to a subscribed endpoint.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<(), DeliveryError>;
}

/// HTTP transport posting the JSON payload to the subscription endpoint.
pub struct HttpPushTransport {
    client: reqwest::Client,
}

impl HttpPushTransport {
    /// A hung delivery must not stall the scheduler, so every attempt gets a
    /// bounded timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &PushPayload,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&subscription.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    DeliveryError::Transient(e.to_string())
                } else {
                    // Unsendable request, e.g. a malformed endpoint URL
                    DeliveryError::Permanent(e.to_string())
                }
            })?;

        classify_status(response.status().as_u16())
    }
}

/// 404/410 mean the endpoint expired (the push service's "gone" signal);
/// other client errors are also unrecoverable for this endpoint. Server
/// errors are worth another attempt next pass.
fn classify_status(status: u16) -> Result<(), DeliveryError> {
    match status {
        200..=299 => Ok(()),
        404 | 410 => Err(DeliveryError::Permanent(format!(
            "endpoint gone (status {})",
            status
        ))),
        400..=499 => Err(DeliveryError::Permanent(format!(
            "endpoint rejected payload (status {})",
            status
        ))),
        _ => Err(DeliveryError::Transient(format!(
            "delivery failed (status {})",
            status
        ))),
    }
}
