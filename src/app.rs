use std::{net::SocketAddr, time::Duration};

use axum::{handler::HandlerWithoutStateExt, middleware, Router};
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};
use tracing::{error, info};

use crate::{
    config::AppConfig,
    error::not_found,
    exercises,
    middleware::{access_log, panic::handle_panic, rate_limit, security_headers::security_headers},
    state::AppState,
    users,
};

/// How long in-flight requests may take to drain after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub fn build_app(state: AppState) -> Router {
    let config = state.config.clone();

    let limited = Router::new()
        .merge(users::router())
        .merge(exercises::router())
        .route_service("/", ServeFile::new(config.landing_page()))
        .layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit::enforce,
        ));

    let assets = ServeDir::new(&config.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .merge(limited)
        .fallback_service(assets)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(security_headers))
        .layer(access_log::layer(config.environment.is_production()))
        .layer(CorsLayer::permissive())
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server running on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("closed out remaining connections");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM and arms a watchdog that kills the process
/// if draining takes longer than [`SHUTDOWN_GRACE`].
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("gracefully shutting down");
    tokio::spawn(async {
        tokio::time::sleep(SHUTDOWN_GRACE).await;
        error!("forced shutdown, connections did not drain in time");
        std::process::exit(1);
    });
}
