use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    admin::{
        dto::{
            AddProgressRequest, Analytics, ChangePasswordRequest, PaymentRequest,
            UpdateProfileRequest,
        },
        services,
    },
    auth::{
        dto::PublicUser, extractors::AdminUser, handlers::clear_session,
        services as auth_services,
    },
    error::AppResult,
    progress::repo_types::Progress,
    response::{ApiResponse, Empty},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(analytics))
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/block", patch(toggle_block))
        .route("/users/:user_id/progress", get(user_progress).post(add_progress))
        .route("/payment/:user_id", patch(set_payment))
        .route("/profile", get(profile).patch(update_profile))
        .route("/change-password", patch(change_password))
        .route("/logout", post(logout))
}

#[instrument(skip_all)]
pub async fn analytics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<ApiResponse<Analytics>> {
    let data = services::analytics(&state).await?;
    Ok(ApiResponse::ok(data, "Analytics fetched successfully."))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<ApiResponse<Vec<PublicUser>>> {
    let users = services::list_students(&state).await?;
    let users = users.iter().map(PublicUser::from).collect();
    Ok(ApiResponse::ok(users, "Users fetched successfully."))
}

#[instrument(skip(state, _admin))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = services::get_user(&state, user_id).await?;
    Ok(ApiResponse::ok(PublicUser::from(&user), "User fetched successfully."))
}

#[instrument(skip(state, _admin))]
pub async fn toggle_block(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = services::toggle_block(&state, user_id).await?;
    let message = if user.is_blocked {
        "User blocked successfully."
    } else {
        "User unblocked successfully."
    };
    Ok(ApiResponse::ok(PublicUser::from(&user), message))
}

#[instrument(skip(state, _admin, body))]
pub async fn set_payment(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<PaymentRequest>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = services::set_payment(&state, user_id, body.is_paid).await?;
    Ok(ApiResponse::ok(PublicUser::from(&user), "Payment status updated."))
}

#[instrument(skip(state, _admin))]
pub async fn user_progress(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Progress>>> {
    let rows = services::user_progress(&state, user_id).await?;
    Ok(ApiResponse::ok(rows, "Progress fetched successfully."))
}

#[instrument(skip(state, ctx, body))]
pub async fn add_progress(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AddProgressRequest>,
) -> AppResult<ApiResponse<Progress>> {
    let row = services::add_progress(&state, &ctx.user, user_id, body).await?;
    Ok(ApiResponse::created(row, "Progress added successfully."))
}

pub async fn profile(AdminUser(ctx): AdminUser) -> ApiResponse<PublicUser> {
    ApiResponse::ok(PublicUser::from(&ctx.user), "Profile fetched successfully.")
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = services::update_profile(&state, &ctx.user, body).await?;
    Ok(ApiResponse::ok(PublicUser::from(&user), "Profile updated successfully."))
}

#[instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<Empty>> {
    auth_services::change_password(&state, &ctx.user, &body.old_password, &body.new_password)
        .await?;
    Ok(ApiResponse::ok(Empty {}, "Password changed successfully."))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    AdminUser(ctx): AdminUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<Empty>)> {
    auth_services::logout(&state, &ctx.user).await?;
    Ok((clear_session(jar), ApiResponse::ok(Empty {}, "Logged out successfully.")))
}
