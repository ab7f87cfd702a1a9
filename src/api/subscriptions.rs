//! Push subscription API endpoint.

use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::models::SubscribeRequest;
use crate::AppState;

/// POST /api/subscribe - Register or replace the push endpoint for a
/// corrida. Upsert keyed by corridaNumber: resubscribing replaces the prior
/// endpoint, it never appends.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<StatusCode, AppError> {
    if request.corrida_number.trim().is_empty() {
        return Err(AppError::Validation("corridaNumber is required".to_string()));
    }
    if request.subscription.endpoint.trim().is_empty() {
        return Err(AppError::Validation("endpoint is required".to_string()));
    }

    state
        .repo
        .upsert_subscription(
            &request.corrida_number,
            &request.subscription.endpoint,
            request.subscription.keys.as_ref(),
        )
        .await?;

    tracing::info!(corrida_number = %request.corrida_number, "Subscription registered");
    Ok(StatusCode::CREATED)
}
