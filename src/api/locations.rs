//! Location API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::models::{
    LocationCheckResponse, LocationReport, ReportLocationRequest, ReportLocationResponse,
    RideStatus,
};
use crate::AppState;

/// POST /api/location - Append a location report.
pub async fn report_location(
    State(state): State<AppState>,
    Json(request): Json<ReportLocationRequest>,
) -> Result<Json<ReportLocationResponse>, AppError> {
    let id = state.repo.insert_location(&request).await?;
    tracing::debug!(
        corrida_number = %request.corrida_number,
        id,
        "Location report saved"
    );
    Ok(Json(ReportLocationResponse {
        message: "Location data saved".to_string(),
        id,
    }))
}

/// GET /api/location - All location reports, for audit/history.
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationReport>>, AppError> {
    let locations = state.repo.list_locations().await?;
    Ok(Json(locations))
}

/// POST /api/recent-locations - The map feed: most recent report per
/// corrida, restricted to rides currently Running. A failed status lookup
/// for one corrida drops that row, never the whole list.
pub async fn recent_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationReport>>, AppError> {
    let latest = state.repo.most_recent_per_ride().await?;

    let mut running = Vec::with_capacity(latest.len());
    for location in latest {
        match state.repo.get_ride_by_corrida(&location.corrida_number).await {
            Ok(Some(ride)) if ride.status == RideStatus::Running => running.push(location),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    corrida_number = %location.corrida_number,
                    "Skipping location row, ride lookup failed: {}", e
                );
            }
        }
    }

    Ok(Json(running))
}

/// GET /api/location/check/{corrida_number} - Liveness check within the
/// configured staleness window.
pub async fn check_location(
    State(state): State<AppState>,
    Path(corrida_number): Path<String>,
) -> Result<Json<LocationCheckResponse>, AppError> {
    let has_recent_location = state
        .repo
        .has_recent_location(&corrida_number, state.config.recent_window)
        .await?;
    Ok(Json(LocationCheckResponse {
        has_recent_location,
    }))
}
