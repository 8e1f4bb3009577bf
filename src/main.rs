mod app;
mod config;
mod dates;
mod db;
mod error;
mod exercises;
mod extract;
mod middleware;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod users;

use crate::{config::AppConfig, middleware::rate_limit::spawn_sweeper, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "exercise_tracker=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or_else(|_| config.environment.is_production());

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init(config).await?;
    let sweeper = spawn_sweeper(app_state.limiter.clone());

    let app = app::build_app(app_state.clone());
    let served = app::serve(app, &app_state.config).await;

    sweeper.abort();
    app_state.store.close().await;
    served
}
