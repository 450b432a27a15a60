use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{admin, auth, contact, users};

const BODY_LIMIT_BYTES: usize = 16 * 1024;

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]),
        None => CorsLayer::permissive(),
    }
}

async fn welcome() -> Json<Value> {
    Json(json!({ "success": true, "message": "Welcome to the Academy API" }))
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .route("/", get(welcome))
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(users::router())
                .merge(admin::router())
                .merge(contact::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::test_utils::TestApp;

    fn server(app: &TestApp) -> TestServer {
        TestServer::new(build_app(app.state.clone())).unwrap()
    }

    #[tokio::test]
    async fn health_and_welcome_are_public() {
        let app = TestApp::new();
        let server = server(&app);

        server.get("/api/v1/health").await.assert_text("ok");
        let res = server.get("/").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.json::<Value>()["success"], true);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = TestApp::new();
        let server = server(&app);

        let res = server
            .post("/api/v1/contact")
            .json(&json!({
                "name": "A",
                "phone": "1",
                "email": "a@x.com",
                "message": "x".repeat(BODY_LIMIT_BYTES + 1)
            }))
            .await;
        assert_eq!(res.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn register_verify_login_dashboard() {
        let app = TestApp::new();
        let server = server(&app);

        let res = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "name": "Amina",
                "email": " Amina@X.com ",
                "password": "password123",
                "phone": "123",
                "course": "tajweed",
                "registrationType": "form"
            }))
            .await;
        assert_eq!(res.status_code(), StatusCode::CREATED);
        let user_id: uuid::Uuid = res.json::<Value>()["data"]["userId"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();

        let early = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "amina@x.com", "password": "password123"}))
            .await;
        assert_eq!(early.status_code(), StatusCode::UNAUTHORIZED);

        let otp = app.store.user(user_id).otp.unwrap();
        server
            .post("/api/v1/auth/verify-otp")
            .json(&json!({"email": "amina@x.com", "otp": otp}))
            .await
            .assert_status_ok();

        let login = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "AMINA@x.com", "password": "password123"}))
            .await;
        assert_eq!(login.status_code(), StatusCode::OK);
        let token = login.json::<Value>()["data"]["accessToken"]
            .as_str()
            .unwrap()
            .to_string();

        let res = server
            .get("/api/v1/user/dashboard")
            .add_header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            )
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body: Value = res.json();
        assert_eq!(body["data"]["profile"]["email"], "amina@x.com");
        assert_eq!(body["data"]["profile"]["accessTier"], "trial");
        assert_eq!(body["data"]["stats"]["trialDaysRemaining"], 3);
        assert_eq!(body["data"]["stats"]["attendancePercentage"], "0%");
    }

    #[tokio::test]
    async fn dashboard_accepts_access_cookie() {
        let app = TestApp::new();
        app.verified_user("a@x.com").await;
        let server = server(&app);

        let login = server
            .post("/api/v1/auth/login")
            .json(&json!({"email": "a@x.com", "password": "password123"}))
            .await;
        let cookie = login.cookie("accessToken");

        let res = server.get("/api/v1/user/dashboard").add_cookie(cookie).await;
        assert_eq!(res.status_code(), StatusCode::OK);

        let res = server
            .get("/api/v1/user/dashboard")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer garbage"))
            .await;
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    }
}
