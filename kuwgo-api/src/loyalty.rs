use axum::{extract::State, routing::{get, post}, Json, Router};
use kuwgo_booking::LoyaltySummary;
use kuwgo_shared::PointRedemption;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::Caller;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub redemption: PointRedemption,
    pub balance: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/loyalty", get(summary))
        .route("/v1/loyalty/redeem", post(redeem))
}

async fn summary(State(state): State<AppState>, caller: Caller) -> Result<Json<LoyaltySummary>, AppError> {
    Ok(Json(state.engine.loyalty_summary(caller.user_id()).await?))
}

async fn redeem(State(state): State<AppState>, caller: Caller) -> Result<Json<RedeemResponse>, AppError> {
    let redemption = state.engine.redeem_points(caller.user_id()).await?;
    let balance = state.engine.points_balance(caller.user_id()).await?;
    Ok(Json(RedeemResponse { redemption, balance }))
}
