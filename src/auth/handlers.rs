use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            ForgotPasswordRequest, LoginRequest, LoginResponse, PublicUser, RefreshRequest,
            RefreshResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest,
            VerifyOtpRequest,
        },
        extractors::{CurrentUser, ACCESS_COOKIE, REFRESH_COOKIE},
        jwt::TokenPair,
        services,
    },
    error::AppResult,
    response::{ApiResponse, Empty},
    state::AppState,
};

const COURSE_COOKIE: &str = "preferred_course";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/logout", post(logout))
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

fn with_session(jar: CookieJar, tokens: &TokenPair) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, tokens.access_token.clone()))
        .add(session_cookie(REFRESH_COOKIE, tokens.refresh_token.clone()))
}

pub(crate) fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(CookieJar, ApiResponse<RegisterResponse>)> {
    let course = payload.course.clone();
    let user_id = services::register(&state, payload).await?;

    let jar = match course {
        Some(course) if !course.is_empty() => jar.add(session_cookie(COURSE_COOKIE, course)),
        _ => jar,
    };
    Ok((
        jar,
        ApiResponse::created(RegisterResponse { user_id }, "OTP sent to email."),
    ))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<ApiResponse<Empty>> {
    services::verify_otp(&state, &payload.email, &payload.otp).await?;
    Ok(ApiResponse::ok(Empty {}, "Account verified successfully."))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, ApiResponse<LoginResponse>)> {
    let (user, tokens) = services::login(&state, &payload.email, &payload.password).await?;
    let jar = with_session(jar, &tokens);
    Ok((
        jar,
        ApiResponse::ok(
            LoginResponse {
                user: PublicUser::from(&user),
                access_token: tokens.access_token,
            },
            "Logged in successfully.",
        ),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> AppResult<(CookieJar, ApiResponse<RefreshResponse>)> {
    let incoming = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| payload.and_then(|Json(body)| body.refresh_token));

    let tokens = services::refresh(&state, incoming).await?;
    let jar = with_session(jar, &tokens);
    Ok((
        jar,
        ApiResponse::ok(
            RefreshResponse {
                access_token: tokens.access_token,
            },
            "Token refreshed.",
        ),
    ))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<Empty>> {
    services::forgot_password(&state, &payload.email).await?;
    Ok(ApiResponse::ok(Empty {}, "Reset token sent."))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<ApiResponse<Empty>> {
    services::reset_password(&state, &payload.token, &payload.password).await?;
    Ok(ApiResponse::ok(Empty {}, "Password has been reset."))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<Empty>)> {
    services::logout(&state, &ctx.user).await?;
    Ok((clear_session(jar), ApiResponse::ok(Empty {}, "Logged out successfully.")))
}
