use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use kuwgo_booking::BookingError;
use kuwgo_core::TripFilter;
use kuwgo_shared::{Station, Trip};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TakenSeatsResponse {
    pub trip_id: Uuid,
    pub taken_seats: Vec<u32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips", get(list_upcoming_trips))
        .route("/v1/trips/live", get(list_live_trips))
        .route("/v1/trips/{id}", get(get_trip))
        .route("/v1/trips/{id}/seats", get(taken_seats))
        .route("/v1/stations", get(list_stations))
}

/// GET /v1/trips?from=&to=&date=
async fn list_upcoming_trips(
    State(state): State<AppState>,
    Query(filter): Query<TripFilter>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let trips = state
        .catalog
        .list_upcoming_trips(&filter, state.clock.now())
        .await
        .map_err(BookingError::from)?;
    Ok(Json(trips))
}

async fn list_live_trips(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, AppError> {
    let trips = state.catalog.list_live_trips(state.clock.now()).await.map_err(BookingError::from)?;
    Ok(Json(trips))
}

async fn get_trip(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Trip>, AppError> {
    let trip = state
        .catalog
        .get_trip(id)
        .await
        .map_err(BookingError::from)?
        .ok_or_else(|| BookingError::trip_not_found(id))?;
    Ok(Json(trip))
}

async fn taken_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TakenSeatsResponse>, AppError> {
    let seats = state.engine.taken_seats(id).await?;
    Ok(Json(TakenSeatsResponse {
        trip_id: id,
        taken_seats: seats.into_iter().collect(),
    }))
}

async fn list_stations(State(state): State<AppState>) -> Result<Json<Vec<Station>>, AppError> {
    let stations = state.catalog.list_stations().await.map_err(BookingError::from)?;
    Ok(Json(stations))
}
