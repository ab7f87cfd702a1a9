//! Ride model and status state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a ride.
///
/// `Waiting` is the initial state; `Finished` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideStatus {
    Waiting,
    Running,
    Finished,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Waiting => "Waiting",
            RideStatus::Running => "Running",
            RideStatus::Finished => "Finished",
            RideStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Waiting" => Some(RideStatus::Waiting),
            "Running" => Some(RideStatus::Running),
            "Finished" => Some(RideStatus::Finished),
            "Cancelled" => Some(RideStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether no further transition is permitted out of this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Finished | RideStatus::Cancelled)
    }

    /// Legal transition edges. A ride must pass through `Running` to reach
    /// `Finished`; terminal states accept nothing, including re-entry.
    pub fn can_transition_to(&self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (RideStatus::Waiting, RideStatus::Running)
                | (RideStatus::Waiting, RideStatus::Cancelled)
                | (RideStatus::Running, RideStatus::Finished)
                | (RideStatus::Running, RideStatus::Cancelled)
        )
    }
}

/// A tracked ride/job record. `hash` is the unique storage key;
/// `corrida_number` is the human-facing correlation key and may be reused
/// across regenerated rides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub hash: String,
    #[serde(rename = "rideId")]
    pub corrida_number: String,
    pub driver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    pub departure_location: String,
    pub final_location: String,
    pub status: RideStatus,
    pub created_at: String,
}

/// Request body for POST /api/rides/generate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    pub departure_location: String,
    pub final_location: String,
    pub driver_name: String,
    #[serde(rename = "rideId")]
    pub corrida_number: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
}

/// Request body for POST /api/ride/status.
///
/// The status arrives as a raw string so an unknown value can be rejected
/// with a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub hash: String,
    pub status: String,
}

/// Dispatcher-facing summary returned by GET /api/rides/{corrida_number}.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideSummary {
    pub corrida_number: String,
    pub status: RideStatus,
    pub origin: String,
    pub destination: String,
    pub driver_name: String,
}

impl From<&Ride> for RideSummary {
    fn from(ride: &Ride) -> Self {
        Self {
            corrida_number: ride.corrida_number.clone(),
            status: ride.status,
            origin: ride.departure_location.clone(),
            destination: ride.final_location.clone(),
            driver_name: ride.driver_name.clone(),
        }
    }
}
