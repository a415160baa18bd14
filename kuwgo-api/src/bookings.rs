use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use kuwgo_booking::{Cancellation, NewBooking, RefundQuote};
use kuwgo_core::PaymentDetails;
use kuwgo_shared::Booking;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::Caller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking).delete(delete_booking))
        .route("/v1/bookings/{id}/pay", post(confirm_payment))
        .route("/v1/bookings/{id}/refund-quote", get(refund_quote))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    if req.passenger_name.trim().is_empty() || req.passenger_phone.trim().is_empty() {
        return Err(AppError::ValidationError("Passenger name and phone are required".to_string()));
    }

    let booking = state.engine.create(req, caller.subject()).await?;
    info!(booking_id = %booking.id, user = %booking.user_id, "Booking created via API");

    Ok((StatusCode::CREATED, Json(booking)))
}

async fn list_bookings(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.engine.list_user_bookings(caller.user_id()).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.get(id, caller.user_id()).await?))
}

/// POST /v1/bookings/{id}/pay
async fn confirm_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payment): Json<PaymentDetails>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.confirm_payment(id, caller.user_id(), payment).await?))
}

async fn refund_quote(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<RefundQuote>, AppError> {
    Ok(Json(state.engine.refund_quote(id, caller.user_id()).await?))
}

async fn cancel_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Cancellation>, AppError> {
    Ok(Json(state.engine.cancel(id, caller.user_id()).await?))
}

async fn delete_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.engine.delete(id, caller.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
