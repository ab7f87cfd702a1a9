//! REST API module.
//!
//! Contains all API routes and handlers following the browser client contract.

mod locations;
mod rides;
mod subscriptions;

pub use locations::*;
pub use rides::*;
pub use subscriptions::*;

use serde::Serialize;

/// Plain `{message}` acknowledgement body used by mutation endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
