use axum::{extract::State, routing::post, Json, Router};
use runway_booking::BoardingPass;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/checkin", post(check_in))
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub pnr: String,
    #[serde(default)]
    pub last_name: String,
}

async fn check_in(
    State(state): State<AppState>,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<BoardingPass>, AppError> {
    let pass = state.lifecycle.check_in(&req.pnr, &req.last_name).await?;
    Ok(Json(pass))
}
