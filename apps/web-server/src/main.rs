//! # Yatube Web Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer};
use tracing_actix_web::TracingLogger;

use web_server::config::AppConfig;
use web_server::observability::RequestIdMiddleware;
use web_server::state::AppState;
use web_server::telemetry::{TelemetryConfig, init_telemetry};
use web_server::{bootstrap, configure_app};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Yatube web server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;

    bootstrap::seed_groups(&state, &config.seed_groups)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    if let Some(admin) = &config.admin {
        bootstrap::seed_admin(&state, admin)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
    }

    #[cfg(feature = "scheduler")]
    let _scheduler = web_server::background::start_cache_sweep(
        web_server::background::SchedulerConfig::from_env(),
        state.memory_cache.clone(),
    )
    .await
    .map_err(|e| std::io::Error::other(e.to_string()))?;

    let app_config = configure_app(state);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(app_config.clone())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
