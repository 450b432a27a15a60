use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    contact::dto::{ContactRequest, TrialRequest},
    error::AppResult,
    mail::send_detached,
    response::{ApiResponse, Empty},
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact))
        .route("/trial-request", post(trial_request))
}

#[instrument(skip_all)]
pub async fn contact(
    State(state): State<AppState>,
    Json(body): Json<ContactRequest>,
) -> AppResult<ApiResponse<Empty>> {
    body.validate()?;
    send_detached(state.mailer.clone(), body.notification(&state.config.contact_email));
    info!("contact message forwarded");
    Ok(ApiResponse::ok(Empty {}, "Message sent successfully."))
}

#[instrument(skip_all, fields(course = %body.course))]
pub async fn trial_request(
    State(state): State<AppState>,
    Json(body): Json<TrialRequest>,
) -> AppResult<ApiResponse<Empty>> {
    body.validate()?;
    send_detached(state.mailer.clone(), body.notification(&state.config.contact_email));
    info!("trial request forwarded");
    Ok(ApiResponse::ok(Empty {}, "Trial request submitted successfully."))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::app::build_app;
    use crate::test_utils::TestApp;

    #[tokio::test]
    async fn contact_forwards_to_office_inbox() {
        let app = TestApp::new();
        let server = TestServer::new(build_app(app.state.clone())).unwrap();

        let res = server
            .post("/api/v1/contact")
            .json(&json!({"name": "Bilal", "phone": "1", "email": "b@x.com", "message": "Hello"}))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let sent = app.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "office@example.com");
        assert!(sent[0].text.contains("Hello"));
    }

    #[tokio::test]
    async fn contact_missing_field_is_400() {
        let app = TestApp::new();
        let server = TestServer::new(build_app(app.state.clone())).unwrap();

        let res = server
            .post("/api/v1/contact")
            .json(&json!({"name": "Bilal", "email": "b@x.com"}))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["message"], "All fields are required.");
    }

    #[tokio::test]
    async fn trial_request_succeeds_even_if_mail_fails() {
        let app = TestApp::with_failing_mailer();
        let server = TestServer::new(build_app(app.state.clone())).unwrap();

        let res = server
            .post("/api/v1/trial-request")
            .json(&json!({"name": "Bilal", "email": "b@x.com", "phone": "1", "course": "hifz"}))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.json::<Value>()["success"], true);
    }
}
