mod admin;
mod app;
mod auth;
mod clock;
mod config;
mod contact;
mod db;
mod error;
mod mail;
mod progress;
mod response;
mod state;
#[cfg(test)]
mod test_utils;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "academy=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    if let Some(seed) = state.config.admin_seed.clone() {
        if let Err(e) = auth::services::seed_admin(&state, &seed).await {
            tracing::warn!(error = %e, "admin seed skipped");
        }
    }

    app::serve(app::build_app(state)).await
}
