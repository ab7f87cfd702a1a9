//! Push subscription models.

use serde::{Deserialize, Serialize};

/// A registered push endpoint for one corrida. Soft state: the scheduler
/// removes it once the ride leaves `Running` or the endpoint is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub corrida_number: String,
    pub endpoint: String,
    /// Opaque client key material, stored and passed through as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<serde_json::Value>,
    pub updated_at: String,
}

/// Push endpoint descriptor as sent by the browser's PushManager.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEndpoint {
    pub endpoint: String,
    #[serde(default)]
    pub keys: Option<serde_json::Value>,
}

/// Request body for POST /api/subscribe.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub corrida_number: String,
    pub subscription: PushEndpoint,
}

/// Payload delivered to a push endpoint. The scheduler sends the silent
/// variant as a client resync trigger, not a user-visible message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrida_number: Option<String>,
    pub silent: bool,
}

impl PushPayload {
    /// The background resync trigger for one corrida.
    pub fn silent_resync(corrida_number: &str) -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            driver_name: None,
            corrida_number: Some(corrida_number.to_string()),
            silent: true,
        }
    }
}
