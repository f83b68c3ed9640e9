mod app;
mod config;
mod error;
mod state;
mod users;

#[cfg(test)]
mod test_util;

use crate::{
    app::{build_app, serve, shutdown_signal},
    config::AppConfig,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_directory=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env()?;
    let (app_state, db) = AppState::init(&config).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let result = serve(
        listener,
        build_app(app_state),
        shutdown_signal(),
        config.shutdown_timeout,
    )
    .await;

    if tokio::time::timeout(config.shutdown_timeout, db.close()).await.is_err() {
        tracing::warn!("connection pool did not close before the deadline");
    } else {
        tracing::info!("connection pool closed");
    }
    result
}
