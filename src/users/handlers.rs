use axum::{extract::State, routing::get, Router};
use tracing::instrument;

use crate::{
    auth::extractors::CurrentUser,
    error::AppResult,
    response::ApiResponse,
    state::AppState,
    users::{dto::Dashboard, services},
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[instrument(skip_all, fields(user_id = %ctx.user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> AppResult<ApiResponse<Dashboard>> {
    let dashboard = services::dashboard(&state, &ctx.user).await?;
    Ok(ApiResponse::ok(dashboard, "Dashboard data fetched successfully."))
}
