use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use kuwgo_booking::TripStatusUpdate;
use kuwgo_shared::{Notification, TripStatus};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{admin_auth_middleware, CallerClaims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateTripStatusRequest {
    pub status: TripStatus,
    pub delay_minutes: Option<u32>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/trips/{id}/status", put(update_trip_status))
        .route("/v1/admin/notifications", get(list_notifications))
        .route_layer(axum::middleware::from_fn_with_state(state, admin_auth_middleware))
}

/// PUT /v1/admin/trips/{id}/status
async fn update_trip_status(
    State(state): State<AppState>,
    Extension(admin): Extension<CallerClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTripStatusRequest>,
) -> Result<Json<TripStatusUpdate>, AppError> {
    info!(admin = %admin.sub, trip_id = %id, status = %req.status, "Trip status change requested");
    let update = state.engine.update_trip_status(id, req.status, req.delay_minutes).await?;
    Ok(Json(update))
}

async fn list_notifications(State(state): State<AppState>) -> Result<Json<Vec<Notification>>, AppError> {
    Ok(Json(state.engine.list_notifications().await?))
}
