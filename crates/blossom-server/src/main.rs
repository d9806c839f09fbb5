use std::net::SocketAddr;
use std::path::PathBuf;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use blossom_api::config::{Config, ConfigError};
use blossom_api::routes;
use blossom_api::state::AppStateInner;
use blossom_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "blossom_server=debug,blossom_api=debug,blossom_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingDatabaseUrl) => {
            eprintln!("FATAL: DATABASE_URL is not set.");
            eprintln!("       Point it at the SQLite database file and restart.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if config.uses_placeholder_secret() {
        warn!("JWT_SECRET is unset; using the development placeholder");
    }
    if config.google.is_none() {
        warn!("Google sign-in disabled: GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_CALLBACK_URL are required");
    }

    let db = match Database::open(&PathBuf::from(&config.database_url)) {
        Ok(db) => db,
        Err(e) => {
            error!("Could not open database {}: {:#}", config.database_url, e);
            std::process::exit(1);
        }
    };

    let state = AppStateInner::new(db, &config);
    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("BlossomHub API listening on {}", addr);
    info!("API docs at http://{}/api-docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    warn!("Could not install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
