//! Ride API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::MessageResponse;
use crate::errors::AppError;
use crate::models::{CreateRideRequest, Ride, RideStatus, RideSummary, UpdateStatusRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateRideResponse {
    pub hash: String,
}

/// POST /api/rides/generate - Create a new ride in Waiting state.
pub async fn generate_ride(
    State(state): State<AppState>,
    Json(request): Json<CreateRideRequest>,
) -> Result<Json<GenerateRideResponse>, AppError> {
    let ride = state.repo.create_ride(&request).await?;
    tracing::info!(hash = %ride.hash, corrida_number = %ride.corrida_number, "Ride created");
    Ok(Json(GenerateRideResponse { hash: ride.hash }))
}

/// GET /api/ride/{hash} - Get a single ride by its hash.
pub async fn get_ride(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<Ride>, AppError> {
    let ride = state
        .repo
        .get_ride(&hash)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", hash)))?;
    Ok(Json(ride))
}

/// GET /api/rides/{corrida_number} - Dispatcher-facing ride summary by
/// correlation key. The most recently created ride wins when the key was
/// reused.
pub async fn get_ride_summary(
    State(state): State<AppState>,
    Path(corrida_number): Path<String>,
) -> Result<Json<RideSummary>, AppError> {
    let ride = state
        .repo
        .get_ride_by_corrida(&corrida_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", corrida_number)))?;
    Ok(Json(RideSummary::from(&ride)))
}

/// GET /api/rides/all-rides - List all rides, newest first.
pub async fn list_rides(State(state): State<AppState>) -> Result<Json<Vec<Ride>>, AppError> {
    let rides = state.repo.list_rides().await?;
    Ok(Json(rides))
}

/// POST /api/ride/status - Transition a ride's status.
pub async fn update_status(
    State(state): State<AppState>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let new_status = RideStatus::from_str(&request.status).ok_or_else(|| {
        AppError::Validation(format!("Unknown status: {}", request.status))
    })?;

    let ride = state.repo.set_status(&request.hash, new_status).await?;
    tracing::info!(
        hash = %ride.hash,
        corrida_number = %ride.corrida_number,
        status = ride.status.as_str(),
        "Ride status updated"
    );

    Ok(Json(MessageResponse::new("Ride status updated")))
}
