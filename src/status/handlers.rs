use axum::{extract::State, Json};

use crate::http::server::AppState;
use crate::status::{HomeStatus, PingStatus};

pub async fn home(State(state): State<AppState>) -> Json<HomeStatus> {
    Json(state.status.home())
}

pub async fn ping(State(state): State<AppState>) -> Json<PingStatus> {
    Json(state.status.ping())
}
