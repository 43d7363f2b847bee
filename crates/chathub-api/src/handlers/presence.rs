//! Presence snapshot handler.

use axum::extract::State;
use axum::Json;

use crate::dto::response::{ApiResponse, OnlineUsersResponse};
use crate::state::AppState;

/// GET /api/presence/online
pub async fn online_users(
    State(state): State<AppState>,
) -> Json<ApiResponse<OnlineUsersResponse>> {
    Json(ApiResponse::ok(OnlineUsersResponse {
        users: state.engine.presence().online_users(),
    }))
}
